use thiserror::Error;

use modbox_shared::{HandlerError, MarshalError, ProtocolError};

/// Reasons a module session is closed.
///
/// Every variant is fatal for its own session only; the server keeps
/// serving every other connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    /// Handshake did not complete
    #[error("Handshake failed: {0}")]
    Protocol(#[from] ProtocolError),

    /// The next command name could not be read
    #[error("Failed to read the next command: {source}")]
    Command { source: MarshalError },

    /// Module asked for a function that was never registered. The stream
    /// cannot be resynchronized since the argument layout is unknown.
    #[error("Unknown function '{name}'")]
    UnknownFunction { name: String },

    /// Arguments or results of `command` could not be transferred
    #[error("Failed to transfer values of '{command}': {source}")]
    Marshal {
        command: String,
        source: MarshalError,
    },

    /// Handler reported a failure
    #[error("Function '{name}' failed: {source}")]
    Handler { name: String, source: HandlerError },

    /// Handler and its registered signatures disagree
    #[error("Function '{name}' does not match its registered signature: {source}")]
    BadSignature { name: String, source: HandlerError },

    /// Worker panicked outside of a handler
    #[error("Module worker panicked: {message}")]
    Panicked { message: String },
}

impl ModuleError {
    pub(crate) fn from_handler(name: &str, source: HandlerError) -> Self {
        if source.is_signature_mismatch() {
            ModuleError::BadSignature {
                name: name.to_string(),
                source,
            }
        } else {
            ModuleError::Handler {
                name: name.to_string(),
                source,
            }
        }
    }
}
