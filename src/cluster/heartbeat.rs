use crate::cluster::leader::LeaderCache;
use crate::cluster::peer_client::PeerTransport;
use crate::cluster::time::{Clock, RealClock};
use crate::cluster::{Member, MemberId};
use crate::server::{FatalNotifier, ShutdownSignal};
use crate::storage::{Registry, StorageError};
use std::sync::Arc;
use tokio::time::Duration;

/// What one round of pinging changed.
#[derive(Debug, Default, Eq, PartialEq)]
pub(crate) struct TickReport {
    pub(crate) refreshed: Vec<MemberId>,
    pub(crate) unreachable: Vec<MemberId>,
    pub(crate) evicted: Vec<MemberId>,
    pub(crate) new_leader: Option<Option<MemberId>>,
}

/// HeartbeatMonitor pings every other registered member once per interval, and removes the ones
/// that haven't answered within the heartbeat timeout. Every member runs one, so a follower that
/// can still reach its peers notices a dead leader on its own.
pub(crate) struct HeartbeatMonitor<T: PeerTransport, C: Clock = RealClock> {
    logger: slog::Logger,
    me: Member,
    registry: Arc<Registry>,
    leader: Arc<LeaderCache>,
    transport: Arc<T>,
    clock: C,
    interval: Duration,
    timeout: Duration,
}

impl<T: PeerTransport, C: Clock> HeartbeatMonitor<T, C> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        logger: slog::Logger,
        me: Member,
        registry: Arc<Registry>,
        leader: Arc<LeaderCache>,
        transport: Arc<T>,
        clock: C,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        HeartbeatMonitor {
            logger,
            me,
            registry,
            leader,
            transport,
            clock,
            interval,
            timeout,
        }
    }

    pub(crate) async fn run(mut self, mut shutdown: ShutdownSignal, fatal: FatalNotifier) {
        slog::info!(self.logger, "Heartbeat monitor started, interval {:?}, timeout {:?}", self.interval, self.timeout);
        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                _ = self.clock.sleep(self.interval) => {}
            }

            if let Err(e) = self.tick().await {
                slog::crit!(self.logger, "Registry unusable, stopping heartbeats: {}", e);
                fatal.notify(format!("Registry failure during heartbeat: {}", e));
                break;
            }
        }
        slog::info!(self.logger, "Heartbeat monitor exited");
    }

    pub(crate) async fn tick(&self) -> Result<TickReport, StorageError> {
        let mut report = TickReport::default();

        // A member always considers itself alive.
        let now = self.clock.now();
        if !self.registry.refresh(self.me.id, now)? {
            let mut me = self.me.clone();
            me.last_heartbeat = now;
            self.registry.upsert(&me)?;
        }

        let peers: Vec<Member> = self
            .registry
            .get()?
            .into_iter()
            .filter(|member| member.id != self.me.id)
            .collect();

        let pings = peers.iter().map(|peer| async move {
            let result = self.transport.heartbeat(&peer.address, self.me.id).await;
            (peer, result)
        });
        for (peer, result) in futures::future::join_all(pings).await {
            match result {
                Ok(true) => {
                    self.registry.refresh(peer.id, self.clock.now())?;
                    report.refreshed.push(peer.id);
                }
                Ok(false) => {
                    slog::warn!(self.logger, "Member {:?} answered heartbeat as not alive", peer.id);
                    report.unreachable.push(peer.id);
                }
                Err(e) => {
                    slog::debug!(self.logger, "Heartbeat to member {:?} at {} failed: {}", peer.id, peer.address, e);
                    report.unreachable.push(peer.id);
                }
            }
        }

        let now = self.clock.now();
        for peer in &peers {
            if let Some(dead) = self.registry.remove_if_stale(peer.id, now, self.timeout)? {
                slog::info!(
                    self.logger,
                    "Member {:?} is considered dead, last heartbeat {:?} ago",
                    dead.id,
                    dead.age_at(now)
                );
                report.evicted.push(dead.id);
            }
        }

        let leader_evicted = match self.leader.current() {
            Some(leader) => report.evicted.contains(&leader),
            None => true,
        };
        if leader_evicted {
            report.new_leader = self.leader.resolve_from(&self.registry.get()?);
            if let Some(new_leader) = report.new_leader {
                slog::info!(self.logger, "Member {:?} becoming the new leader", new_leader);
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
    use crate::cluster::Timestamp;
    use crate::server;
    use crate::storage::Database;

    fn address(id: u64) -> String {
        format!("localhost:{}", 50051 + id)
    }

    struct Fixture {
        monitor: HeartbeatMonitor<MockTransport, MockClock>,
        registry: Arc<Registry>,
        leader: Arc<LeaderCache>,
        transport: Arc<MockTransport>,
        controller: MockClockController,
    }

    /// Member `me` with a registry holding `ids`, all last seen now.
    fn fixture(me: u64, ids: &[u64]) -> Fixture {
        let (clock, controller) = mocked_clock();
        let now = controller.current_time();
        let database = Database::open_temporary().unwrap();
        let registry = Arc::new(Registry::open(&database).unwrap());
        let members: Vec<Member> = ids
            .iter()
            .map(|id| Member::new(MemberId::new(*id), address(*id), now))
            .collect();
        registry.replace_all(&members).unwrap();

        let leader = Arc::new(LeaderCache::new(
            MemberId::new(me),
            crate::cluster::resolve_leader(&members),
        ));
        let transport = Arc::new(MockTransport::default());
        let monitor = HeartbeatMonitor::new(
            slog::Logger::root(slog::Discard, slog::o!()),
            Member::new(MemberId::new(me), address(me), now),
            registry.clone(),
            leader.clone(),
            transport.clone(),
            clock,
            Duration::from_secs(2),
            Duration::from_secs(10),
        );

        Fixture {
            monitor,
            registry,
            leader,
            transport,
            controller,
        }
    }

    fn heartbeat_of(registry: &Registry, id: u64) -> Option<Timestamp> {
        registry.member(MemberId::new(id)).unwrap().map(|m| m.last_heartbeat)
    }

    #[tokio::test]
    async fn successful_pings_refresh_timestamps() {
        let mut f = fixture(1, &[0, 1, 2]);
        f.controller.advance(Duration::from_secs(2));

        let report = f.monitor.tick().await.unwrap();

        let now = f.controller.current_time();
        assert_eq!(report.refreshed, vec![MemberId::new(0), MemberId::new(2)]);
        assert!(report.evicted.is_empty());
        assert_eq!(report.new_leader, None);
        assert_eq!(heartbeat_of(&f.registry, 0), Some(now));
        assert_eq!(heartbeat_of(&f.registry, 1), Some(now));
        assert_eq!(heartbeat_of(&f.registry, 2), Some(now));

        let mut pinged = f.transport.heartbeats();
        pinged.sort();
        assert_eq!(pinged, vec![address(0), address(2)]);
    }

    #[tokio::test]
    async fn unreachable_member_is_kept_until_timeout() {
        let mut f = fixture(1, &[1, 2]);
        f.transport.set_down(&address(2), true);
        let last_seen = f.controller.current_time();

        f.controller.advance(Duration::from_secs(10));
        let report = f.monitor.tick().await.unwrap();
        assert_eq!(report.unreachable, vec![MemberId::new(2)]);
        assert!(report.evicted.is_empty());
        assert_eq!(heartbeat_of(&f.registry, 2), Some(last_seen));

        f.controller.advance(Duration::from_millis(1));
        let report = f.monitor.tick().await.unwrap();
        assert_eq!(report.evicted, vec![MemberId::new(2)]);
        assert_eq!(heartbeat_of(&f.registry, 2), None);

        // Coming back doesn't resurrect it; it has to rejoin.
        f.transport.set_down(&address(2), false);
        let report = f.monitor.tick().await.unwrap();
        assert!(report.refreshed.is_empty());
        assert_eq!(heartbeat_of(&f.registry, 2), None);
    }

    #[tokio::test]
    async fn dead_leader_is_replaced_by_lowest_survivor() {
        let mut f = fixture(2, &[0, 1, 2]);
        assert_eq!(f.leader.current(), Some(MemberId::new(0)));
        f.transport.set_down(&address(0), true);

        // Still within the timeout.
        f.controller.advance(Duration::from_secs(6));
        let report = f.monitor.tick().await.unwrap();
        assert_eq!(report.new_leader, None);

        f.controller.advance(Duration::from_secs(6));
        let report = f.monitor.tick().await.unwrap();
        assert_eq!(report.evicted, vec![MemberId::new(0)]);
        assert_eq!(report.new_leader, Some(Some(MemberId::new(1))));
        assert_eq!(f.leader.current(), Some(MemberId::new(1)));
        assert!(!f.leader.is_me());
    }

    #[tokio::test]
    async fn last_survivor_becomes_leader() {
        let mut f = fixture(2, &[1, 2]);
        f.transport.set_down(&address(1), true);

        f.controller.advance(Duration::from_secs(11));
        let report = f.monitor.tick().await.unwrap();

        assert_eq!(report.new_leader, Some(Some(MemberId::new(2))));
        assert!(f.leader.is_me());
        assert_eq!(f.registry.get().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dead_leader_stamped_by_a_fast_clock_still_ages_out() {
        let mut f = fixture(2, &[2]);
        let now = f.controller.current_time();
        let skewed = Member::new(MemberId::new(1), address(1), now.saturating_add(Duration::from_secs(3_600)));
        f.registry.merge(&[skewed], MemberId::new(2), now).unwrap();
        f.leader.resolve_from(&f.registry.get().unwrap());
        assert_eq!(f.leader.current(), Some(MemberId::new(1)));

        f.transport.set_down(&address(1), true);
        f.controller.advance(Duration::from_secs(60));
        let report = f.monitor.tick().await.unwrap();

        assert_eq!(report.evicted, vec![MemberId::new(1)]);
        assert_eq!(report.new_leader, Some(Some(MemberId::new(2))));
        assert!(f.leader.is_me());
    }

    #[tokio::test]
    async fn successful_ping_pulls_future_heartbeat_back_to_local_time() {
        let mut f = fixture(0, &[0]);
        let now = f.controller.current_time();
        f.registry
            .upsert(&Member::new(MemberId::new(1), address(1), now.saturating_add(Duration::from_secs(3_600))))
            .unwrap();

        let report = f.monitor.tick().await.unwrap();
        assert_eq!(report.refreshed, vec![MemberId::new(1)]);
        assert_eq!(heartbeat_of(&f.registry, 1), Some(now));

        f.transport.set_down(&address(1), true);
        f.controller.advance(Duration::from_secs(11));
        let report = f.monitor.tick().await.unwrap();
        assert_eq!(report.evicted, vec![MemberId::new(1)]);
    }

    #[tokio::test]
    async fn run_ticks_on_the_clock_until_shutdown() {
        let mut f = fixture(1, &[0, 1]);
        let transport = f.transport.clone();
        let (shutdown_handle, shutdown) = server::shutdown_signal();
        let (fatal, _fatal_listener) = server::fatal_signal();
        let task = tokio::spawn(f.monitor.run(shutdown, fatal));

        // Nothing happens before the first interval elapses.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(transport.heartbeats().is_empty());

        f.controller.advance(Duration::from_secs(2));
        for _ in 0..100 {
            if !transport.heartbeats().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(transport.heartbeats(), vec![address(0)]);

        shutdown_handle.shutdown();
        tokio::time::timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
    }
}
