use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Instant,
};

use crate::dispatch::{DispatchQueue, DrainReport, FrameConfig};

/// Asks a running FrameLoop to stop after its current frame
#[derive(Clone, Default)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// What happened during one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    pub index: u64,
    pub drained: DrainReport,
}

/// Drives the thread that owns the render/physics context.
///
/// Every frame drains the dispatch queue against the context, then runs the
/// caller's frame callback (drawing, physics step), then sleeps out the rest
/// of the frame budget.
pub struct FrameLoop<C> {
    queue: DispatchQueue<C>,
    context: C,
    config: FrameConfig,
    shutdown: ShutdownHandle,
    frame_index: u64,
}

impl<C> FrameLoop<C> {
    pub fn new(queue: DispatchQueue<C>, context: C, config: FrameConfig) -> Self {
        Self {
            queue,
            context,
            config,
            shutdown: ShutdownHandle::default(),
            frame_index: 0,
        }
    }

    pub fn queue(&self) -> &DispatchQueue<C> {
        &self.queue
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    /// Runs a single frame without any pacing
    pub fn step<F>(&mut self, frame: &mut F) -> FrameInfo
    where
        F: FnMut(&mut C, &FrameInfo),
    {
        let drained = self.queue.drain(&mut self.context);
        let info = FrameInfo {
            index: self.frame_index,
            drained,
        };
        frame(&mut self.context, &info);
        self.frame_index += 1;
        info
    }

    /// Runs frames until shutdown is requested, then shuts the queue down so
    /// that late producers fail instead of waiting forever
    pub fn run<F>(&mut self, mut frame: F)
    where
        F: FnMut(&mut C, &FrameInfo),
    {
        if !self.queue.claim_consumer() {
            log::warn!("Frame loop running on a thread other than the queue's consumer");
        }
        let budget = self.config.frame_budget();
        log::info!("Frame loop started ({} fps)", self.config.desired_fps);

        while !self.shutdown.is_requested() {
            let started = Instant::now();
            self.step(&mut frame);

            let elapsed = started.elapsed();
            if elapsed < budget {
                thread::sleep(budget - elapsed);
            } else if !budget.is_zero() {
                log::warn!(
                    "Frame {} took {:?}, longer than the 1/{} s budget",
                    self.frame_index,
                    elapsed,
                    self.config.desired_fps
                );
            }
        }

        self.queue.shutdown();
        log::info!("Frame loop stopped after {} frames", self.frame_index);
    }
}
