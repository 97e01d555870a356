//! This mod is everything about membership: who is in the cluster, who is alive, who leads, how a
//! new member gets in, and how the leader's writes reach everyone else.
mod heartbeat;
mod join;
mod leader;
mod member;
mod peer_client;
mod replication;
mod time;

pub(crate) use heartbeat::HeartbeatMonitor;
pub(crate) use join::candidate_addresses;
pub(crate) use join::join_cluster;
pub(crate) use join::member_from_proto;
pub(crate) use join::member_to_proto;
pub use join::JoinError;
pub(crate) use leader::LeaderCache;
pub use leader::resolve_leader;
pub use member::member_address;
pub use member::member_port;
pub use member::Member;
pub use member::MemberHealth;
pub use member::MemberId;
pub(crate) use member::health_of;
pub use peer_client::PeerCallError;
pub(crate) use peer_client::PeerPool;
pub(crate) use peer_client::PeerTransport;
pub(crate) use replication::ReplicationCoordinator;
pub(crate) use time::Clock;
pub(crate) use time::RealClock;
pub use time::Timestamp;

#[cfg(test)]
pub(crate) use peer_client::mock::MockTransport;
#[cfg(test)]
pub(crate) use time::{mocked_clock, MockClock, MockClockController};
