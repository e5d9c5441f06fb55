use std::io;

use thiserror::Error;

use modbox_shared::{MarshalError, ProtocolError};

/// Errors that can occur on the module side of a connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Could not reach the engine
    #[error("Failed to connect to the engine: {kind:?}")]
    Connect { kind: io::ErrorKind },

    /// Engine did not answer with the expected handshake
    #[error("Handshake failed: {0}")]
    Protocol(#[from] ProtocolError),

    /// A call could not be sent, or its results could not be read. The
    /// engine closes the connection on any failed call, so this usually
    /// means the call was rejected.
    #[error("Call to '{command}' failed: {source}")]
    Call {
        command: String,
        source: MarshalError,
    },

    /// `call` was used after `exit` or after a failed call
    #[error("Connection to the engine is closed")]
    Closed,
}
