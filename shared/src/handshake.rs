use std::io::{Read, Write};

use thiserror::Error;

use modbox_serde::{read_bytes, MarshalError, Marshaler};

/// Fixed header the engine sends first on every module connection
pub const SERVER_HEADER: &[u8; 8] = b"ModBox/M";

/// Fixed header a module answers with
pub const MODULE_HEADER: &[u8; 8] = b"ModBox/m";

/// Reserved command that ends a session gracefully
pub const EXIT_COMMAND: &str = "exit";

/// Errors that can occur while establishing a module session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Peer sent a header other than the one this side expects
    #[error("Handshake header mismatch: expected {expected:?}, got {found:?}")]
    HeaderMismatch { expected: String, found: String },

    /// The handshake could not be read or written
    #[error("Handshake failed: {0}")]
    Marshal(#[from] MarshalError),
}

fn write_header(writer: &mut dyn Write, header: &[u8; 8]) -> Result<(), ProtocolError> {
    writer.write_all(header).map_err(MarshalError::from)?;
    writer.flush().map_err(MarshalError::from)?;
    Ok(())
}

fn read_header(reader: &mut dyn Read, expected: &[u8; 8]) -> Result<(), ProtocolError> {
    let found = read_bytes(reader, expected.len())?;
    if found.as_slice() != expected.as_slice() {
        return Err(ProtocolError::HeaderMismatch {
            expected: String::from_utf8_lossy(expected).into_owned(),
            found: String::from_utf8_lossy(&found).into_owned(),
        });
    }
    Ok(())
}

// Engine side

pub fn write_server_header(writer: &mut dyn Write) -> Result<(), ProtocolError> {
    write_header(writer, SERVER_HEADER)
}

pub fn read_module_header(reader: &mut dyn Read) -> Result<(), ProtocolError> {
    read_header(reader, MODULE_HEADER)
}

pub fn read_module_name(
    marshaler: &Marshaler,
    reader: &mut dyn Read,
) -> Result<String, ProtocolError> {
    Ok(marshaler.read_string(reader)?)
}

// Module side

pub fn read_server_header(reader: &mut dyn Read) -> Result<(), ProtocolError> {
    read_header(reader, SERVER_HEADER)
}

/// Answers the engine's header and announces the module's display name
pub fn write_module_hello(
    marshaler: &Marshaler,
    writer: &mut dyn Write,
    module_name: &str,
) -> Result<(), ProtocolError> {
    writer.write_all(MODULE_HEADER).map_err(MarshalError::from)?;
    marshaler.write_string(writer, module_name)?;
    writer.flush().map_err(MarshalError::from)?;
    Ok(())
}
