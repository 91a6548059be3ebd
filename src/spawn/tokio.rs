use std::future::Future;
use tokio::task::JoinHandle;

/// Spawn a future on the tokio runtime, detached from its caller.
pub fn spawn<F>(f: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::task::spawn(f);
}

/// Spawn a future on the tokio runtime, returning a handle that can abort it.
pub fn spawn_with_handle<F>(f: F) -> TaskHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    TaskHandle(tokio::task::spawn(f))
}

pub struct TaskHandle<T>(JoinHandle<T>);

impl<T: Send + 'static> TaskHandle<T> {
    /// Abort the task. Safe to call after the task has already finished.
    pub fn abort(&mut self) {
        self.0.abort();
    }
}
