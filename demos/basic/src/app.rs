use std::{io, thread, time::Duration};

use crossbeam_channel::unbounded;

use modbox_server::{ModuleServer, ServerConfig};
use modbox_shared::{DispatchConfig, DispatchQueue, FrameConfig, FrameLoop, FunctionRegistry};

use crate::{
    game::{GameFunctions, GameLoop},
    graphics::GraphicsFunctions,
    scene::Scene,
};

/// Contains Config properties which will be used by the demo App
pub struct DemoConfig {
    pub server: ServerConfig,
    pub frame: FrameConfig,
    pub dispatch: DispatchConfig,
    /// Game ticks run at a tenth of the frame rate
    pub tick_interval: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        let frame = FrameConfig::default();
        let tick_interval = frame.frame_budget() * 10;
        Self {
            server: ServerConfig::default(),
            frame,
            dispatch: DispatchConfig::default(),
            tick_interval,
        }
    }
}

pub struct App {
    config: DemoConfig,
}

impl App {
    pub fn new(config: DemoConfig) -> Self {
        Self { config }
    }

    /// Serves modules until the process is killed. The calling thread
    /// becomes the render thread.
    pub fn run(self) -> io::Result<()> {
        log::info!("Modbox basic demo started");

        let queue = DispatchQueue::<Scene>::new(self.config.dispatch.clone());
        let (tick_sender, tick_receiver) = unbounded();

        let mut registry = FunctionRegistry::builder();
        registry
            .add_plugin(GraphicsFunctions {
                queue: queue.clone(),
            })
            .add_plugin(GameFunctions {
                requests: tick_sender,
            });
        let registry = registry.into_shared();
        log::info!("Registered functions: {}", registry.names().join(", "));

        let server = ModuleServer::with_shared_registry(self.config.server.clone(), registry.clone());
        let (server_handle, acceptor) = server.spawn()?;
        log::info!("Modules can connect to {}", server_handle.local_addr());

        let mut frame_loop = FrameLoop::new(queue, Scene::default(), self.config.frame.clone());
        frame_loop.queue().claim_consumer();
        let shutdown = frame_loop.shutdown_handle();

        let game = GameLoop::new(registry, tick_receiver, self.config.tick_interval, shutdown);
        let game_thread = thread::Builder::new()
            .name("game".to_string())
            .spawn(move || game.run())?;

        let dt = self.config.frame.frame_budget().as_secs_f32();
        frame_loop.run(|scene, frame| {
            scene.step(dt);
            if frame.index % 600 == 0 {
                log::debug!(
                    "Frame {}: {} objects, {} textures",
                    frame.index,
                    scene.objects.len(),
                    scene.textures.len()
                );
            }
        });

        server_handle.stop();
        if acceptor.join().is_err() {
            log::error!("Module acceptor thread panicked");
        }
        if game_thread.join().is_err() {
            log::error!("Game thread panicked");
        }
        Ok(())
    }
}
