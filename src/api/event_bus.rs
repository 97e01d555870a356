use crate::cluster::MemberId;
use tokio::sync::watch;

/// A leadership change, as observed by the local member.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LeaderEvent {
    /// This member now leads.
    Leader,
    Follower { leader_id: MemberId },
    /// The registry is empty. A running member never sees this for long, it always holds its own row.
    NoLeader,
}

/// LeaderListener follows the member's cached leader. Consuming it is subtle: it doesn't queue
/// intermediate changes, so several changes between two `next_event()` calls collapse into the
/// most recent one.
pub struct LeaderListener {
    me: MemberId,
    rcv: watch::Receiver<Option<MemberId>>,
}

impl LeaderListener {
    pub(crate) fn new(me: MemberId, rcv: watch::Receiver<Option<MemberId>>) -> Self {
        LeaderListener { me, rcv }
    }

    /// The leader as of now, without waiting.
    pub fn current(&self) -> LeaderEvent {
        self.event_for(*self.rcv.borrow())
    }

    /// `next_event()` waits for the next leadership change. `None` once the member has shut down.
    pub async fn next_event(&mut self) -> Option<LeaderEvent> {
        self.rcv.changed().await.ok()?;
        let leader = *self.rcv.borrow();
        Some(self.event_for(leader))
    }

    fn event_for(&self, leader: Option<MemberId>) -> LeaderEvent {
        match leader {
            Some(id) if id == self.me => LeaderEvent::Leader,
            Some(id) => LeaderEvent::Follower { leader_id: id },
            None => LeaderEvent::NoLeader,
        }
    }
}
