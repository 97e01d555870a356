use crate::cluster::leader::LeaderCache;
use crate::cluster::peer_client::PeerTransport;
use crate::cluster::time::{Clock, RealClock};
use crate::cluster::{Member, MemberId};
use crate::grpc::ProtoReplicateReq;
use crate::storage::{Registry, StorageError};
use std::sync::Arc;
use tokio::time::Duration;

/// Outcome of one fan-out. Only ever logged; the client's write already succeeded locally.
#[derive(Debug, Default, Eq, PartialEq)]
pub(crate) struct ReplicationReport {
    pub(crate) applied: Vec<MemberId>,
    pub(crate) failed: Vec<MemberId>,
    pub(crate) skipped_stale: Vec<MemberId>,
}

/// ReplicationCoordinator pushes writes from the leader to every replica that looks alive.
/// Delivery is best effort: nothing is retried or acknowledged beyond the single call.
pub(crate) struct ReplicationCoordinator<T: PeerTransport, C: Clock = RealClock> {
    logger: slog::Logger,
    registry: Arc<Registry>,
    leader: Arc<LeaderCache>,
    transport: Arc<T>,
    clock: C,
    heartbeat_timeout: Duration,
}

impl<T: PeerTransport, C: Clock> ReplicationCoordinator<T, C> {
    pub(crate) fn new(
        logger: slog::Logger,
        registry: Arc<Registry>,
        leader: Arc<LeaderCache>,
        transport: Arc<T>,
        clock: C,
        heartbeat_timeout: Duration,
    ) -> Self {
        ReplicationCoordinator {
            logger,
            registry,
            leader,
            transport,
            clock,
            heartbeat_timeout,
        }
    }

    /// Fans the operation out if this member is the leader. Replicas never re-replicate.
    pub(crate) async fn replicate_if_leader(
        &self,
        operation: &ProtoReplicateReq,
    ) -> Result<Option<ReplicationReport>, StorageError> {
        if !self.leader.is_me() {
            return Ok(None);
        }

        self.fan_out(operation, &[]).await.map(Some)
    }

    /// Sends the operation to every other member whose last heartbeat is within the heartbeat
    /// timeout, except the ones in `except`. Calls run concurrently, each bounded by the peer
    /// transport's timeout.
    pub(crate) async fn fan_out(
        &self,
        operation: &ProtoReplicateReq,
        except: &[MemberId],
    ) -> Result<ReplicationReport, StorageError> {
        let me = self.leader.me();
        let now = self.clock.now();
        let mut report = ReplicationReport::default();

        let mut targets: Vec<Member> = Vec::new();
        for member in self.registry.get()? {
            if member.id == me || except.contains(&member.id) {
                continue;
            }
            if member.age_at(now) > self.heartbeat_timeout {
                slog::debug!(self.logger, "Skipping replica {:?}, heartbeat timed out", member.id);
                report.skipped_stale.push(member.id);
                continue;
            }
            targets.push(member);
        }

        let calls = targets.iter().map(|member| {
            let rpc_request = operation.clone();
            async move { (member, self.transport.replicate(&member.address, rpc_request).await) }
        });
        for (member, result) in futures::future::join_all(calls).await {
            match result {
                Ok(reply) if reply.success => report.applied.push(member.id),
                Ok(reply) => {
                    slog::warn!(
                        self.logger,
                        "Replication of {} to replica {:?} failed: {}",
                        operation.method_name,
                        member.id,
                        reply.message
                    );
                    report.failed.push(member.id);
                }
                Err(e) => {
                    slog::warn!(
                        self.logger,
                        "Error replicating {} to replica {:?}: {}",
                        operation.method_name,
                        member.id,
                        e
                    );
                    report.failed.push(member.id);
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::peer_client::mock::MockTransport;
    use crate::cluster::time::{mocked_clock, MockClock, MockClockController};
    use crate::storage::Database;

    fn address(id: u64) -> String {
        format!("localhost:{}", 50051 + id)
    }

    fn operation() -> ProtoReplicateReq {
        ProtoReplicateReq {
            method_name: "Logout".to_string(),
            payload: vec![10, 5, 97, 108, 105, 99, 101],
        }
    }

    fn coordinator(
        me: u64,
        ids: &[u64],
    ) -> (ReplicationCoordinator<MockTransport, MockClock>, Arc<Registry>, Arc<MockTransport>, MockClockController) {
        let (clock, controller) = mocked_clock();
        let now = controller.current_time();
        let registry = Arc::new(Registry::open(&Database::open_temporary().unwrap()).unwrap());
        let members: Vec<Member> = ids
            .iter()
            .map(|id| Member::new(MemberId::new(*id), address(*id), now))
            .collect();
        registry.replace_all(&members).unwrap();
        let leader = Arc::new(LeaderCache::new(MemberId::new(me), crate::cluster::resolve_leader(&members)));
        let transport = Arc::new(MockTransport::default());

        let coordinator = ReplicationCoordinator::new(
            slog::Logger::root(slog::Discard, slog::o!()),
            registry.clone(),
            leader,
            transport.clone(),
            clock,
            Duration::from_secs(10),
        );
        (coordinator, registry, transport, controller)
    }

    #[tokio::test]
    async fn leader_pushes_to_every_live_replica() {
        let (coordinator, _registry, transport, _controller) = coordinator(0, &[0, 1, 2]);

        let report = coordinator.replicate_if_leader(&operation()).await.unwrap().unwrap();

        assert_eq!(report.applied, vec![MemberId::new(1), MemberId::new(2)]);
        let mut targets: Vec<String> = transport.replicated().into_iter().map(|(a, _)| a).collect();
        targets.sort();
        assert_eq!(targets, vec![address(1), address(2)]);
        assert!(transport.replicated().iter().all(|(_, req)| *req == operation()));
    }

    #[tokio::test]
    async fn replicas_do_not_replicate() {
        let (coordinator, _registry, transport, _controller) = coordinator(1, &[0, 1, 2]);

        assert_eq!(coordinator.replicate_if_leader(&operation()).await.unwrap(), None);
        assert!(transport.replicated().is_empty());
    }

    #[tokio::test]
    async fn failures_and_stale_members_are_reported_not_raised() {
        let (coordinator, registry, transport, mut controller) = coordinator(0, &[0, 1, 2, 3]);
        transport.set_down(&address(2), true);

        // Member 3 stops heartbeating; the others were refreshed just now.
        controller.advance(Duration::from_secs(11));
        let now = controller.current_time();
        for id in &[0, 1, 2] {
            registry.refresh(MemberId::new(*id), now).unwrap();
        }

        let report = coordinator.fan_out(&operation(), &[]).await.unwrap();
        assert_eq!(report.applied, vec![MemberId::new(1)]);
        assert_eq!(report.failed, vec![MemberId::new(2)]);
        assert_eq!(report.skipped_stale, vec![MemberId::new(3)]);
    }

    #[tokio::test]
    async fn fan_out_honors_exclusions() {
        let (coordinator, _registry, transport, _controller) = coordinator(0, &[0, 1, 2]);

        let report = coordinator.fan_out(&operation(), &[MemberId::new(2)]).await.unwrap();

        assert_eq!(report.applied, vec![MemberId::new(1)]);
        assert_eq!(transport.replicated().len(), 1);
    }
}
