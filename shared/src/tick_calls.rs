use modbox_serde::ArgValue;

use crate::{
    call::{CallArgs, HandlerError},
    registry::FunctionRegistry,
};

/// A registered function a game loop invokes on every tick
#[derive(Debug, Clone)]
pub struct TickCall {
    command: String,
    args: CallArgs,
}

impl TickCall {
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &CallArgs {
        &self.args
    }
}

/// Calls that repeat every tick until they fail.
///
/// Owned by the game-logic thread; a call that fails is logged and dropped
/// from the list.
#[derive(Debug, Clone, Default)]
pub struct TickCalls {
    calls: Vec<TickCall>,
}

impl TickCalls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, command: &str, args: Vec<ArgValue>) {
        self.calls.push(TickCall {
            command: command.to_string(),
            args: CallArgs::new(args),
        });
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn calls(&self) -> &[TickCall] {
        &self.calls
    }

    /// Invokes every call once, in insertion order. Returns the number of
    /// calls removed because they failed.
    pub fn run(&mut self, registry: &FunctionRegistry) -> usize {
        let before = self.calls.len();
        self.calls.retain(|call| match Self::invoke(registry, call) {
            Ok(()) => true,
            Err(error) => {
                log::warn!(
                    "Tick call '{}' failed: {}. It will be removed from the tick list",
                    call.command,
                    error
                );
                false
            }
        });
        before - self.calls.len()
    }

    fn invoke(registry: &FunctionRegistry, call: &TickCall) -> Result<(), HandlerError> {
        let entry = registry
            .lookup(&call.command)
            .map_err(|error| HandlerError::failed(error.to_string()))?;
        let result = entry.invoke(&call.args)?;
        if !result.is_empty() {
            log::debug!(
                "Tick call '{}' returned {} values, ignoring them",
                call.command,
                result.len()
            );
        }
        Ok(())
    }
}
