use chrono::Utc;
use std::convert::TryFrom;
use std::fmt;
use tokio::time::Duration;

/// Wall clock time in unix milliseconds. Registry rows carry these across processes, so unlike
/// `Instant` they must mean the same thing on every member.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    pub(crate) fn saturating_add(self, duration: Duration) -> Self {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        Timestamp(self.0.saturating_add(millis))
    }

    /// Zero if `earlier` is actually later, which happens when member clocks drift apart.
    pub(crate) fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        if self.0 > earlier.0 {
            Duration::from_millis((self.0 - earlier.0) as u64)
        } else {
            Duration::from_millis(0)
        }
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[async_trait::async_trait]
pub(crate) trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Timestamp;
    async fn sleep_until(&mut self, deadline: Timestamp);

    async fn sleep(&mut self, duration: Duration) {
        let deadline = self.now().saturating_add(duration);
        self.sleep_until(deadline).await;
    }
}

#[derive(Copy, Clone)]
pub(crate) struct RealClock;

#[async_trait::async_trait]
impl Clock for RealClock {
    fn now(&self) -> Timestamp {
        Timestamp(Utc::now().timestamp_millis())
    }

    async fn sleep_until(&mut self, deadline: Timestamp) {
        // The wall clock can be stepped while we sleep, so re-check after waking.
        loop {
            let now = self.now();
            if now >= deadline {
                return;
            }
            tokio::time::sleep(deadline.saturating_duration_since(now)).await;
        }
    }
}

#[cfg(test)]
pub(crate) use mock::{mocked_clock, MockClock, MockClockController};

#[cfg(test)]
mod mock {
    use super::{Clock, Timestamp};
    use tokio::sync::watch;
    use tokio::time::Duration;

    pub(crate) fn mocked_clock() -> (MockClock, MockClockController) {
        let now = Timestamp::from_millis(1_000_000);
        let (tx, rx) = watch::channel(now);
        let sleeper = MockClock { current_time: rx };
        let controller = MockClockController {
            current_time: tx,
            time_of_instantiation: now,
        };

        (sleeper, controller)
    }

    #[derive(Clone)]
    pub(crate) struct MockClock {
        current_time: watch::Receiver<Timestamp>,
    }

    #[async_trait::async_trait]
    impl Clock for MockClock {
        fn now(&self) -> Timestamp {
            *self.current_time.borrow()
        }

        async fn sleep_until(&mut self, deadline: Timestamp) {
            loop {
                if *self.current_time.borrow() >= deadline {
                    return;
                }

                self.current_time.changed().await.expect("Controller dropped");
            }
        }
    }

    pub(crate) struct MockClockController {
        current_time: watch::Sender<Timestamp>,
        time_of_instantiation: Timestamp,
    }

    impl MockClockController {
        pub(crate) fn current_time(&self) -> Timestamp {
            *self.current_time.borrow()
        }

        pub(crate) fn elapsed_time(&self) -> Duration {
            self.current_time().saturating_duration_since(self.time_of_instantiation)
        }

        /// Sleepers whose deadline falls inside the step all wake at the end of it.
        pub(crate) fn advance(&mut self, duration: Duration) {
            let new_now = self.current_time().saturating_add(duration);
            self.current_time.send(new_now).expect("MockClock dropped");
        }
    }
}
