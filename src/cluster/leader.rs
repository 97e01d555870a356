use crate::cluster::{Member, MemberId};
use std::sync::Mutex;
use tokio::sync::watch;

/// The leader is the lowest id present in the registry. `None` only for an empty registry, which a
/// running member never has since it always holds its own row.
pub fn resolve_leader(members: &[Member]) -> Option<MemberId> {
    members.iter().map(|member| member.id).min()
}

/// LeaderCache is this process' current belief of who the leader is. It only changes when
/// someone explicitly re-resolves it from the registry.
pub(crate) struct LeaderCache {
    me: MemberId,
    update_lock: Mutex<()>,
    snd: watch::Sender<Option<MemberId>>,
    // Held so that `send` never fails for lack of receivers.
    rcv: watch::Receiver<Option<MemberId>>,
}

impl LeaderCache {
    pub(crate) fn new(me: MemberId, initial: Option<MemberId>) -> Self {
        let (snd, rcv) = watch::channel(initial);
        LeaderCache {
            me,
            update_lock: Mutex::new(()),
            snd,
            rcv,
        }
    }

    pub(crate) fn current(&self) -> Option<MemberId> {
        *self.rcv.borrow()
    }

    pub(crate) fn is_me(&self) -> bool {
        self.current() == Some(self.me)
    }

    pub(crate) fn me(&self) -> MemberId {
        self.me
    }

    /// Re-resolves the leader from `members`. Returns the new leader if it changed.
    pub(crate) fn resolve_from(&self, members: &[Member]) -> Option<Option<MemberId>> {
        let _guard = self.update_lock.lock().expect("LeaderCache mutex guard poison");
        let resolved = resolve_leader(members);
        if resolved == self.current() {
            return None;
        }

        let _ = self.snd.send(resolved);
        Some(resolved)
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<MemberId>> {
        self.rcv.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Timestamp;
    use rand::seq::SliceRandom;

    fn members(ids: &[u64]) -> Vec<Member> {
        ids.iter()
            .map(|id| Member::new(MemberId::new(*id), format!("localhost:{}", 50051 + id), Timestamp::from_millis(0)))
            .collect()
    }

    #[test]
    fn leader_is_lowest_id_regardless_of_order() {
        let mut rng = rand::thread_rng();
        let mut registry = members(&[7, 3, 12, 4, 9]);
        for _ in 0..20 {
            registry.shuffle(&mut rng);
            assert_eq!(resolve_leader(&registry), Some(MemberId::new(3)));
        }

        assert_eq!(resolve_leader(&members(&[5])), Some(MemberId::new(5)));
        assert_eq!(resolve_leader(&[]), None);
    }

    #[tokio::test]
    async fn cache_reports_only_changes() {
        let cache = LeaderCache::new(MemberId::new(1), Some(MemberId::new(0)));
        let mut listener = cache.subscribe();
        assert!(!cache.is_me());

        assert_eq!(cache.resolve_from(&members(&[0, 1, 2])), None);

        assert_eq!(cache.resolve_from(&members(&[1, 2])), Some(Some(MemberId::new(1))));
        assert!(cache.is_me());

        listener.changed().await.unwrap();
        assert_eq!(*listener.borrow(), Some(MemberId::new(1)));
    }
}
