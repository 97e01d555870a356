use crate::cluster::time::Timestamp;
use std::fmt;
use tokio::time::Duration;

/// Operator assigned, unique per process. The lowest live id is the leader.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct MemberId(u64);

impl MemberId {
    /// Members without a live predecessor start the cluster on their own.
    pub const BOOTSTRAP: MemberId = MemberId(0);

    pub fn new(id: u64) -> Self {
        MemberId(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn is_bootstrap(self) -> bool {
        self == Self::BOOTSTRAP
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    /// `host:port`
    pub address: String,
    pub last_heartbeat: Timestamp,
}

/// Health is derived from the registry rather than stored. A member that isn't in the registry is
/// `Unknown`; once it ages out it becomes `Dead` and gets removed, after which it is `Unknown`
/// again until it rejoins.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MemberHealth {
    Unknown,
    Alive,
    Dead,
}

impl Member {
    pub fn new(id: MemberId, address: String, last_heartbeat: Timestamp) -> Self {
        Member {
            id,
            address,
            last_heartbeat,
        }
    }

    pub(crate) fn age_at(&self, now: Timestamp) -> Duration {
        now.saturating_duration_since(self.last_heartbeat)
    }
}

pub(crate) fn health_of(member: Option<&Member>, now: Timestamp, heartbeat_timeout: Duration) -> MemberHealth {
    match member {
        None => MemberHealth::Unknown,
        Some(m) if m.age_at(now) > heartbeat_timeout => MemberHealth::Dead,
        Some(_) => MemberHealth::Alive,
    }
}

/// Every member listens on `base_port + id`. `None` when that doesn't fit in a port number.
pub fn member_port(base_port: u16, id: MemberId) -> Option<u16> {
    let port = u64::from(base_port).checked_add(id.as_u64())?;
    if port > u64::from(u16::MAX) {
        return None;
    }
    Some(port as u16)
}

pub fn member_address(host: &str, base_port: u16, id: MemberId) -> Option<String> {
    member_port(base_port, id).map(|port| format!("{}:{}", host, port))
}
