pub mod config;
pub mod error;
pub mod frame_loop;
pub mod queue;
pub mod task;

pub use config::{DispatchConfig, FrameConfig};
pub use error::DispatchError;
pub use frame_loop::{FrameInfo, FrameLoop, ShutdownHandle};
pub use queue::{DispatchQueue, DrainReport};
pub use task::{Completion, DispatchTask};
