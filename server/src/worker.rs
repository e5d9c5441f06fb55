use std::{
    io::{Read, Write},
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use modbox_shared::{
    handshake, panic_message, CallArgs, FunctionRegistry, Marshaler, MarshalError, EXIT_COMMAND,
};

use crate::{
    error::ModuleError,
    session::{ModuleSession, SessionEnd, SessionOutcome},
};

/// Where a ModuleWorker is in the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingHandshake,
    AwaitingCommand,
    DecodingArgs,
    Invoking,
    EncodingResult,
    Closed,
}

/// Runs the module protocol over one connection.
///
/// A worker holds no engine state. Handlers reach the engine through the
/// dispatch queue they captured at registration.
pub struct ModuleWorker<R, W> {
    session: ModuleSession<R, W>,
    registry: Arc<FunctionRegistry>,
    marshaler: Marshaler,
    state: SessionState,
    commands_served: u64,
}

impl<R: Read, W: Write> ModuleWorker<R, W> {
    pub fn new(
        session: ModuleSession<R, W>,
        registry: Arc<FunctionRegistry>,
        marshaler: Marshaler,
    ) -> Self {
        if !registry.is_locked() {
            log::warn!("Module worker started with an unlocked function registry");
        }
        Self {
            session,
            registry,
            marshaler,
            state: SessionState::AwaitingHandshake,
            commands_served: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> &ModuleSession<R, W> {
        &self.session
    }

    /// Serves the connection until the module exits, disconnects or fails.
    ///
    /// Never panics and never returns an error: whatever ended the session is
    /// logged and reported in the outcome.
    pub fn run(mut self) -> SessionOutcome {
        self.run_to_close()
    }

    /// Like `run`, but hands the closed session back
    pub fn run_into_session(mut self) -> (SessionOutcome, ModuleSession<R, W>) {
        let outcome = self.run_to_close();
        (outcome, self.session)
    }

    fn run_to_close(&mut self) -> SessionOutcome {
        let end = match panic::catch_unwind(AssertUnwindSafe(|| self.serve())) {
            Ok(Ok(end)) => end,
            Ok(Err(error)) => SessionEnd::Failed(error),
            Err(payload) => SessionEnd::Failed(ModuleError::Panicked {
                message: panic_message(payload.as_ref()),
            }),
        };

        match &end {
            SessionEnd::Exited => log::info!(
                "Module '{}' exited after {} commands",
                self.session.display_name(),
                self.commands_served
            ),
            SessionEnd::Disconnected => log::info!(
                "Module '{}' disconnected after {} commands",
                self.session.display_name(),
                self.commands_served
            ),
            SessionEnd::Failed(error) => log::warn!(
                "Closing module '{}' (state {:?}): {}",
                self.session.display_name(),
                self.state,
                error
            ),
        }

        self.state = SessionState::Closed;
        self.session.close();

        SessionOutcome {
            module_name: self.session.module_name().map(str::to_string),
            commands_served: self.commands_served,
            end,
        }
    }

    fn serve(&mut self) -> Result<SessionEnd, ModuleError> {
        self.handshake()?;

        loop {
            self.state = SessionState::AwaitingCommand;
            let Some(command) = self.read_command()? else {
                return Ok(SessionEnd::Disconnected);
            };
            if command == EXIT_COMMAND {
                return Ok(SessionEnd::Exited);
            }
            self.serve_command(&command)?;
            self.commands_served += 1;
        }
    }

    fn handshake(&mut self) -> Result<(), ModuleError> {
        self.state = SessionState::AwaitingHandshake;
        handshake::write_server_header(self.session.writer())?;
        handshake::read_module_header(self.session.reader())?;
        let name = handshake::read_module_name(&self.marshaler, self.session.reader())?;

        log::info!("Module '{}' connected from {}", name, self.session.label());
        self.session.set_module_name(name);
        Ok(())
    }

    /// Next command name, or `None` on a clean end of stream at the command
    /// boundary
    fn read_command(&mut self) -> Result<Option<String>, ModuleError> {
        let first = self
            .session
            .read_first_byte()
            .map_err(|error| ModuleError::Command {
                source: error.into(),
            })?;
        let Some(first) = first else {
            return Ok(None);
        };

        let prefix = [first];
        let mut reader = Read::chain(&prefix[..], self.session.reader());
        let command = self
            .marshaler
            .read_string(&mut reader)
            .map_err(|source| ModuleError::Command { source })?;
        log::trace!("Module '{}' called '{}'", self.session.display_name(), command);
        Ok(Some(command))
    }

    fn serve_command(&mut self, command: &str) -> Result<(), ModuleError> {
        let entry = self
            .registry
            .lookup(command)
            .map_err(|_| ModuleError::UnknownFunction {
                name: command.to_string(),
            })?;

        self.state = SessionState::DecodingArgs;
        let args = self
            .marshaler
            .decode_all(entry.arg_signature(), self.session.reader())
            .map_err(|source| marshal_error(command, source))?;

        self.state = SessionState::Invoking;
        let result = entry
            .invoke(&CallArgs::new(args))
            .map_err(|source| ModuleError::from_handler(command, source))?;

        self.state = SessionState::EncodingResult;
        let mut frame = Vec::new();
        self.marshaler
            .encode_all(entry.ret_signature(), result.values(), &mut frame)
            .map_err(|source| marshal_error(command, source))?;
        self.session
            .send(&frame)
            .map_err(|error| marshal_error(command, error.into()))?;

        // args and result are dropped here whether or not the send succeeded
        Ok(())
    }
}

fn marshal_error(command: &str, source: MarshalError) -> ModuleError {
    ModuleError::Marshal {
        command: command.to_string(),
        source,
    }
}
