use thiserror::Error;

/// Errors that can occur when handing work to the render thread
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The queue no longer accepts tasks because its consumer is shutting down
    #[error("Dispatch queue has been shut down, no new tasks are accepted")]
    ShutDown,

    /// The task was dropped before producing a result: it panicked on the
    /// render thread, or the queue shut down before running it
    #[error("Dispatched task was dropped before it completed (it panicked or the queue shut down)")]
    Abandoned,

    /// A blocking submit was issued from the thread that drains the queue
    #[error("Blocking submit from the thread that drains the dispatch queue would deadlock")]
    WouldDeadlock,
}
