use std::thread::{self, JoinHandle};

use modbox_shared::{DispatchQueue, FrameConfig, FrameLoop, ShutdownHandle};

/// Runs a FrameLoop over `C` on its own thread, standing in for the engine's
/// render/physics thread
pub struct RenderThread<C> {
    queue: DispatchQueue<C>,
    shutdown: ShutdownHandle,
    thread: JoinHandle<C>,
}

impl<C: Send + 'static> RenderThread<C> {
    /// Frames run back to back so tests do not wait on pacing
    pub fn spawn(context: C) -> Self {
        Self::spawn_with(DispatchQueue::default(), context, FrameConfig { desired_fps: 0 })
    }

    pub fn spawn_with(queue: DispatchQueue<C>, context: C, config: FrameConfig) -> Self {
        let mut frame_loop = FrameLoop::new(queue.clone(), context, config);
        let shutdown = frame_loop.shutdown_handle();
        let thread = thread::Builder::new()
            .name("render".to_string())
            .spawn(move || {
                frame_loop.run(|_, _| thread::yield_now());
                frame_loop.into_context()
            })
            .unwrap_or_else(|error| panic!("failed to spawn render thread: {}", error));
        Self {
            queue,
            shutdown,
            thread,
        }
    }

    pub fn queue(&self) -> &DispatchQueue<C> {
        &self.queue
    }

    /// Stops the loop and hands back the context for inspection
    pub fn stop(self) -> C {
        self.shutdown.request();
        match self.thread.join() {
            Ok(context) => context,
            Err(_) => panic!("render thread panicked"),
        }
    }
}
