// Cancellable worker: a spawned unit of work plus the token that stops it
use std::future::Future;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

pub struct Worker {
    name: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Worker {
    /// Spawn `work` on the runtime. The closure receives the worker's token and
    /// is expected to observe it at its suspension points.
    pub fn spawn<F, Fut>(name: impl Into<String>, work: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(work(cancel.clone()));
        log::debug!("🧵 worker '{name}' spawned");
        Self {
            name,
            cancel,
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_alive(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the worker at its next suspension point.
    ///
    /// The token is cancelled first so gate waits and sleeps unwind cleanly,
    /// then the task is aborted so it cannot run another step whatever it is
    /// awaiting. Blocking capture work already handed to the blocking pool
    /// finishes on its own.
    pub fn terminate(&self) {
        self.cancel.cancel();
        self.handle.abort();
        log::debug!("🧵 worker '{}' terminated", self.name);
    }

    pub async fn join(self) -> Result<(), JoinError> {
        self.handle.await
    }
}
