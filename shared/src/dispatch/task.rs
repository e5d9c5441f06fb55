use std::{
    panic::{self, AssertUnwindSafe},
    time::{Duration, Instant},
};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};

use crate::{call::panic_message, dispatch::DispatchError};

const MIN_STALL_WARNING: Duration = Duration::from_millis(1);

/// A deferred unit of work for the thread that owns the render context `C`.
///
/// Executed exactly once, then discarded.
pub struct DispatchTask<C> {
    body: Box<dyn FnOnce(&mut C) + Send + 'static>,
}

impl<C> DispatchTask<C> {
    /// A task with no result channel
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        Self {
            body: Box::new(body),
        }
    }

    /// A task whose return value is handed back through the returned
    /// `Completion`. Works for any `Send` result type, `()` included.
    pub fn with_completion<F, R>(body: F, stall_warning: Duration) -> (Self, Completion<R>)
    where
        F: FnOnce(&mut C) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (sender, receiver) = bounded(1);
        let task = Self::new(move |context: &mut C| {
            // the waiter may have given up, nothing to do then
            let _ = sender.send(body(context));
        });
        (task, Completion::new(receiver, stall_warning))
    }

    /// Runs the body, converting a panic into an error message
    pub(crate) fn run(self, context: &mut C) -> Result<(), String> {
        let body = self.body;
        panic::catch_unwind(AssertUnwindSafe(move || body(context)))
            .map_err(|payload| panic_message(payload.as_ref()))
    }
}

/// Receiving end of a dispatched task's result
pub struct Completion<R> {
    receiver: Receiver<R>,
    stall_warning: Duration,
}

impl<R> Completion<R> {
    fn new(receiver: Receiver<R>, stall_warning: Duration) -> Self {
        Self {
            receiver,
            stall_warning: stall_warning.max(MIN_STALL_WARNING),
        }
    }

    /// Blocks until the task has run on the consumer thread.
    ///
    /// There is no timeout: a stalled consumer is logged every
    /// `stall_warning` but never abandoned.
    pub fn wait(self) -> Result<R, DispatchError> {
        let started = Instant::now();
        loop {
            match self.receiver.recv_timeout(self.stall_warning) {
                Ok(value) => return Ok(value),
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(
                        "Still waiting on a dispatched task after {:?}, the render thread may be stalled",
                        started.elapsed()
                    );
                }
                Err(RecvTimeoutError::Disconnected) => return Err(DispatchError::Abandoned),
            }
        }
    }

    /// Returns the result if the task has already run, without blocking
    pub fn try_take(&self) -> Option<R> {
        self.receiver.try_recv().ok()
    }
}
