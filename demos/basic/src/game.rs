use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender};

use modbox_shared::{
    ArgValue, CallArgs, CallResult, FunctionRegistry, HandlerError, RegistryPlugin, ShutdownHandle,
    Signature, TickCalls,
};

/// A function a module asked to have called every game tick
#[derive(Debug)]
pub struct TickRequest {
    pub command: String,
    pub param: u64,
}

/// Exposes `game.eachTick (s, u) -> ()`: registers `command` to be called
/// with `param` on every game tick until it fails
pub struct GameFunctions {
    pub requests: Sender<TickRequest>,
}

impl RegistryPlugin for GameFunctions {
    fn build(&self, registry: &mut FunctionRegistry) {
        let requests = self.requests.clone();
        let arg_signature: Signature = match "su".parse() {
            Ok(signature) => signature,
            Err(error) => panic!("invalid game.eachTick signature: {}", error),
        };
        registry.register(
            "game.eachTick",
            move |args: &CallArgs| {
                let request = TickRequest {
                    command: args.str(0)?.to_string(),
                    param: args.u64(1)?,
                };
                requests
                    .send(request)
                    .map_err(|_| HandlerError::failed("game loop has stopped"))?;
                Ok(CallResult::empty())
            },
            arg_signature,
            Signature::empty(),
        );
    }
}

/// Game-logic thread: runs the per-tick calls at a fixed rate
pub struct GameLoop {
    registry: Arc<FunctionRegistry>,
    requests: Receiver<TickRequest>,
    ticks: TickCalls,
    tick_interval: Duration,
    shutdown: ShutdownHandle,
}

impl GameLoop {
    pub fn new(
        registry: Arc<FunctionRegistry>,
        requests: Receiver<TickRequest>,
        tick_interval: Duration,
        shutdown: ShutdownHandle,
    ) -> Self {
        Self {
            registry,
            requests,
            ticks: TickCalls::new(),
            tick_interval,
            shutdown,
        }
    }

    /// Takes in newly requested calls, then runs every call once
    pub fn tick(&mut self) -> usize {
        for request in self.requests.try_iter() {
            if !self.registry.contains(&request.command) {
                log::warn!("Ignoring tick request for unknown function '{}'", request.command);
                continue;
            }
            log::info!("Calling '{}' every tick", request.command);
            self.ticks.add(&request.command, vec![ArgValue::U64(request.param)]);
        }

        let removed = self.ticks.run(&self.registry);
        if removed > 0 {
            log::info!("{} calls removed from the each-tick list", removed);
        }
        removed
    }

    pub fn run(mut self) {
        log::info!("Game loop started");
        while !self.shutdown.is_requested() {
            let started = Instant::now();
            self.tick();
            if let Some(rest) = self.tick_interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
        log::info!("Game loop stopped");
    }

    pub fn tick_calls(&self) -> &TickCalls {
        &self.ticks
    }
}
