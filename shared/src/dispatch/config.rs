use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by a DispatchQueue
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// How long a blocked producer waits before logging that the consumer
    /// looks stalled. Waiting continues afterwards; this only controls logging.
    pub stall_warning: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            stall_warning: Duration::from_secs(5),
        }
    }
}

/// Contains Config properties which will be used by a FrameLoop
#[derive(Clone, Debug)]
pub struct FrameConfig {
    /// Target frames per second. 0 runs frames back to back.
    pub desired_fps: u32,
}

impl FrameConfig {
    pub fn frame_budget(&self) -> Duration {
        if self.desired_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / self.desired_fps
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { desired_fps: 60 }
    }
}
