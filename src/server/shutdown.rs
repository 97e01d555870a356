use std::sync::Arc;
use tokio::sync::watch;

/// A broadcast stop signal. Dropping every `ShutdownHandle` counts as a shutdown too, so a task
/// can't outlive the member that spawned it.
pub(crate) fn shutdown_signal() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);

    (ShutdownHandle { tx: Arc::new(tx) }, ShutdownSignal { rx })
}

#[derive(Clone)]
pub(crate) struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

#[derive(Clone)]
pub(crate) struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownHandle {
    pub(crate) fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

impl ShutdownSignal {
    pub(crate) fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    pub(crate) async fn wait(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                // Every handle dropped.
                return;
            }
        }
    }
}

/// Raised by whatever hits an unrecoverable local failure, such as the database going away. The
/// member keeps the first reason it was given.
pub(crate) fn fatal_signal() -> (FatalNotifier, FatalListener) {
    let (tx, rx) = watch::channel(None);

    (FatalNotifier { tx: Arc::new(tx) }, FatalListener { rx })
}

#[derive(Clone)]
pub(crate) struct FatalNotifier {
    tx: Arc<watch::Sender<Option<String>>>,
}

pub(crate) struct FatalListener {
    rx: watch::Receiver<Option<String>>,
}

impl FatalNotifier {
    pub(crate) fn notify(&self, reason: String) {
        if self.tx.borrow().is_none() {
            let _ = self.tx.send(Some(reason));
        }
    }
}

impl FatalListener {
    /// Resolves with the reason once a fatal failure was raised. Pending forever if the member
    /// is torn down without one.
    pub(crate) async fn wait(&mut self) -> String {
        loop {
            if let Some(reason) = self.rx.borrow().clone() {
                return reason;
            }
            if self.rx.changed().await.is_err() {
                futures::future::pending::<()>().await;
            }
        }
    }
}
