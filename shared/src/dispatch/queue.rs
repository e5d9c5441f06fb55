use std::{
    mem,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
    thread::{self, ThreadId},
};

use crate::dispatch::{Completion, DispatchConfig, DispatchError, DispatchTask};

/// Outcome of one drain of the queue
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct DrainReport {
    /// Tasks that ran to completion
    pub executed: usize,
    /// Tasks that panicked
    pub failed: usize,
}

struct QueueState<C> {
    tasks: Vec<DispatchTask<C>>,
    shut_down: bool,
}

struct QueueInner<C> {
    state: Mutex<QueueState<C>>,
    consumer: OnceLock<ThreadId>,
    config: DispatchConfig,
}

/// The only way for other threads to get work done on the thread that owns
/// the render/physics context `C`.
///
/// Producers submit closures over `&mut C`; the owning thread calls `drain`
/// once per frame. Each drain takes the whole pending batch under the lock
/// and runs it in submission order after releasing the lock, so tasks
/// submitted during a drain run on the next one.
///
/// Ordering is FIFO per drain batch. Successive submits from one thread run
/// in order; submits racing from different threads run in whatever order
/// they took the lock.
pub struct DispatchQueue<C> {
    inner: Arc<QueueInner<C>>,
}

impl<C> Clone for DispatchQueue<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C> Default for DispatchQueue<C> {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

impl<C> DispatchQueue<C> {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    tasks: Vec::new(),
                    shut_down: false,
                }),
                consumer: OnceLock::new(),
                config,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, QueueState<C>> {
        // tasks never run under the lock, so a poisoned guard still holds a valid list
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Producers

    /// Enqueues a prepared task without waiting for it
    pub fn submit_task(&self, task: DispatchTask<C>) -> Result<(), DispatchError> {
        let mut state = self.state();
        if state.shut_down {
            return Err(DispatchError::ShutDown);
        }
        state.tasks.push(task);
        Ok(())
    }

    /// Enqueues `body`. With `want_barrier` the call blocks until the body has
    /// run, so everything this thread enqueued before it has run as well.
    pub fn submit<F>(&self, body: F, want_barrier: bool) -> Result<(), DispatchError>
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        if want_barrier {
            self.submit_with_result(body)
        } else {
            self.submit_task(DispatchTask::new(body))
        }
    }

    /// Enqueues `body` and blocks until the render thread has run it,
    /// returning its value
    pub fn submit_with_result<F, R>(&self, body: F) -> Result<R, DispatchError>
    where
        F: FnOnce(&mut C) -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_consumer_thread() {
            return Err(DispatchError::WouldDeadlock);
        }
        self.submit_deferred(body)?.wait()
    }

    /// Enqueues `body` and returns a handle to wait on later
    pub fn submit_deferred<F, R>(&self, body: F) -> Result<Completion<R>, DispatchError>
    where
        F: FnOnce(&mut C) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (task, completion) = DispatchTask::with_completion(body, self.inner.config.stall_warning);
        self.submit_task(task)?;
        Ok(completion)
    }

    /// Blocks until everything enqueued before this call has executed
    pub fn barrier(&self) -> Result<(), DispatchError> {
        self.submit(|_| log::trace!("--- Draw barrier ---"), true)
    }

    // Consumer

    /// Runs every task pending at the time of the call against `context`.
    ///
    /// The first thread to drain becomes the queue's consumer; blocking
    /// submits from that thread are refused from then on.
    pub fn drain(&self, context: &mut C) -> DrainReport {
        if !self.claim_consumer() {
            log::warn!("Dispatch queue drained from a thread other than its consumer");
        }

        let tasks = mem::take(&mut self.state().tasks);

        let mut report = DrainReport::default();
        for task in tasks {
            match task.run(context) {
                Ok(()) => report.executed += 1,
                Err(message) => {
                    log::warn!("Dispatched task failed: {}", message);
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Stops accepting tasks and drops everything still pending; their
    /// waiters receive `DispatchError::Abandoned`. Returns the number dropped.
    pub fn shutdown(&self) -> usize {
        let pending = {
            let mut state = self.state();
            state.shut_down = true;
            mem::take(&mut state.tasks)
        };
        let dropped = pending.len();
        if dropped > 0 {
            log::info!("Dispatch queue shut down with {} pending tasks", dropped);
        }
        dropped
    }

    pub fn is_shut_down(&self) -> bool {
        self.state().shut_down
    }

    /// Number of tasks waiting for the next drain
    pub fn pending(&self) -> usize {
        self.state().tasks.len()
    }

    /// Makes the calling thread the consumer if none is set yet, so blocking
    /// submits from it are refused even before its first drain. Returns
    /// whether the calling thread is the consumer.
    pub fn claim_consumer(&self) -> bool {
        let consumer = *self.inner.consumer.get_or_init(|| thread::current().id());
        consumer == thread::current().id()
    }

    pub fn is_consumer_thread(&self) -> bool {
        self.inner.consumer.get() == Some(&thread::current().id())
    }
}
