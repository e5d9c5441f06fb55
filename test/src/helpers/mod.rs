mod render_thread;

pub use render_thread::RenderThread;
pub use session::{local_module, LocalModule, LocalModuleClient};
