//! Executor abstraction for store loops and effects.

use futures::future::BoxFuture;
use tokio::runtime::Handle;

/// Runs detached tasks on behalf of a store.
///
/// The store itself never blocks; everything asynchronous (its own
/// dispatch loop and every effect) is handed to a scheduler. Timeouts are
/// the business of the futures being scheduled, not of the store.
pub trait Scheduler: Send + Sync + 'static {
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

/// Scheduler backed by a tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler for the runtime the caller is running in.
    ///
    /// # Errors
    /// Returns an error when called outside of a tokio runtime.
    pub fn try_current() -> Result<Self, tokio::runtime::TryCurrentError> {
        Handle::try_current().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self.handle.spawn(task);
    }
}
