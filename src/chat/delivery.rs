use crate::grpc::ProtoLiveMessage;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::time::{Duration, Instant};

/// Most messages held for one user. A session without a stream (a replicated login whose client
/// never came here) would otherwise grow forever. Every message is already stored, so dropping
/// the oldest only loses the push.
const MAX_PENDING_MESSAGES: usize = 1024;

/// Identifies one open live-delivery stream. A user re-opening their stream gets a new id, which
/// retires the previous stream.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct StreamId(u64);

/// A logged in user on this process. `stream` is empty until the client opens its live-delivery
/// stream, and for sessions created by replicated logins.
#[derive(Debug)]
struct Session {
    stream: Option<StreamId>,
}

#[derive(Debug, PartialEq)]
pub(crate) enum Pull {
    Message(ProtoLiveMessage),
    TimedOut,
    /// The session ended or another stream took the queue over.
    Closed,
}

/// DeliveryHub tracks sessions and their pending live messages for this process only.
///
/// Lock order is `sessions` then `queues`.
pub(crate) struct DeliveryHub {
    sessions: Mutex<HashMap<String, Session>>,
    queues: Mutex<HashMap<String, Arc<PendingQueue>>>,
    next_stream_id: AtomicU64,
}

impl DeliveryHub {
    pub(crate) fn new() -> Self {
        DeliveryHub {
            sessions: Mutex::new(HashMap::new()),
            queues: Mutex::new(HashMap::new()),
            next_stream_id: AtomicU64::new(1),
        }
    }

    /// Idempotent. An existing session keeps its stream.
    pub(crate) fn open_session(&self, username: &str) {
        let mut sessions = self.sessions.lock().expect("Sessions mutex guard poison");
        let mut queues = self.queues.lock().expect("Queues mutex guard poison");
        sessions
            .entry(username.to_string())
            .or_insert(Session { stream: None });
        queues
            .entry(username.to_string())
            .or_insert_with(|| Arc::new(PendingQueue::new()));
    }

    /// Drops the session and whatever was still queued for it. An attached stream ends.
    pub(crate) fn close_session(&self, username: &str) {
        let mut sessions = self.sessions.lock().expect("Sessions mutex guard poison");
        let mut queues = self.queues.lock().expect("Queues mutex guard poison");
        sessions.remove(username);
        if let Some(queue) = queues.remove(username) {
            queue.close();
        }
    }

    pub(crate) fn has_session(&self, username: &str) -> bool {
        self.sessions
            .lock()
            .expect("Sessions mutex guard poison")
            .contains_key(username)
    }

    /// Queues `message` if `username` has a session here. Returns whether it was queued.
    pub(crate) fn push(&self, username: &str, message: ProtoLiveMessage) -> bool {
        let sessions = self.sessions.lock().expect("Sessions mutex guard poison");
        if !sessions.contains_key(username) {
            return false;
        }

        let mut queues = self.queues.lock().expect("Queues mutex guard poison");
        queues
            .entry(username.to_string())
            .or_insert_with(|| Arc::new(PendingQueue::new()))
            .push(message);
        true
    }

    /// Binds a new stream to `username`'s session, creating the session if needed. Any stream
    /// that was attached before stops receiving.
    pub(crate) fn attach_stream(&self, username: &str) -> (StreamId, Arc<PendingQueue>) {
        let stream = StreamId(self.next_stream_id.fetch_add(1, Ordering::Relaxed));

        let mut sessions = self.sessions.lock().expect("Sessions mutex guard poison");
        let mut queues = self.queues.lock().expect("Queues mutex guard poison");
        sessions.insert(username.to_string(), Session { stream: Some(stream) });
        let queue = queues
            .entry(username.to_string())
            .or_insert_with(|| Arc::new(PendingQueue::new()))
            .clone();
        queue.take_over(stream);

        (stream, queue)
    }

    /// Ends the session when `stream` is still the one attached to it. A stream that was already
    /// replaced leaves the newer session alone.
    pub(crate) fn detach_stream(&self, username: &str, stream: StreamId) -> bool {
        let mut sessions = self.sessions.lock().expect("Sessions mutex guard poison");
        let current = sessions.get(username).and_then(|session| session.stream);
        if current != Some(stream) {
            return false;
        }

        let mut queues = self.queues.lock().expect("Queues mutex guard poison");
        sessions.remove(username);
        if let Some(queue) = queues.remove(username) {
            queue.close();
        }
        true
    }

    /// Ends every stream, used on shutdown.
    pub(crate) fn close_all(&self) {
        let mut sessions = self.sessions.lock().expect("Sessions mutex guard poison");
        let mut queues = self.queues.lock().expect("Queues mutex guard poison");
        sessions.clear();
        for (_, queue) in queues.drain() {
            queue.close();
        }
    }
}

/// FIFO of live messages for one user. Only the stream that most recently took it over may pull.
pub(crate) struct PendingQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

struct QueueState {
    messages: VecDeque<ProtoLiveMessage>,
    owner: Option<StreamId>,
    closed: bool,
}

impl PendingQueue {
    fn new() -> Self {
        PendingQueue {
            state: Mutex::new(QueueState {
                messages: VecDeque::new(),
                owner: None,
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    fn push(&self, message: ProtoLiveMessage) {
        {
            let mut state = self.state.lock().expect("PendingQueue mutex guard poison");
            if state.messages.len() >= MAX_PENDING_MESSAGES {
                state.messages.pop_front();
            }
            state.messages.push_back(message);
        }
        self.notify.notify_waiters();
    }

    fn take_over(&self, stream: StreamId) {
        self.state.lock().expect("PendingQueue mutex guard poison").owner = Some(stream);
        self.notify.notify_waiters();
    }

    fn close(&self) {
        self.state.lock().expect("PendingQueue mutex guard poison").closed = true;
        self.notify.notify_waiters();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.state.lock().expect("PendingQueue mutex guard poison").messages.len()
    }

    /// Waits up to `timeout` for the next message.
    pub(crate) async fn pull(&self, stream: StreamId, timeout: Duration) -> Pull {
        let deadline = Instant::now() + timeout;
        loop {
            // Registered before checking, so a push between the check and the await still wakes us.
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock().expect("PendingQueue mutex guard poison");
                if state.closed || state.owner != Some(stream) {
                    return Pull::Closed;
                }
                if let Some(message) = state.messages.pop_front() {
                    return Pull::Message(message);
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Pull::TimedOut;
            }
        }
    }
}
