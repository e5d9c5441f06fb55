use std::io;

use thiserror::Error;

use crate::type_code::TypeCode;

/// Errors that can occur while encoding or decoding values on a module connection
///
/// SECURITY: decoding processes untrusted bytes from an external process. Every
/// malformed input maps to one of these variants instead of a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    /// The stream ended before a complete value could be read
    #[error("Connection closed in the middle of a value (unexpected end of stream)")]
    UnexpectedEof,

    /// Any other I/O failure on the underlying connection
    #[error("I/O error on module connection: {kind:?}")]
    Io { kind: io::ErrorKind },

    /// A string length prefix above the configured limit
    #[error("String of {len} bytes exceeds the maximum of {max} bytes")]
    StringTooLong { len: u64, max: u64 },

    /// String payload was not valid UTF-8
    #[error("String of {len} bytes is not valid UTF-8")]
    InvalidUtf8 { len: usize },

    /// A textual floating-point value could not be parsed
    #[error("Malformed {type_code} numeral '{text}'")]
    MalformedNumeral { type_code: TypeCode, text: String },

    /// Boolean encoded as something other than 0 or 1
    #[error("Invalid boolean byte {byte:#04x}, expected 0x00 or 0x01")]
    InvalidBool { byte: u8 },

    /// A value was handed to the encoder for a slot of a different type
    #[error("Expected a {expected} value but got {found}")]
    TypeMismatch { expected: TypeCode, found: TypeCode },

    /// The number of values does not match the signature being encoded
    #[error("Signature has {expected} values but {found} were supplied")]
    CountMismatch { expected: usize, found: usize },
}

impl From<io::Error> for MarshalError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::UnexpectedEof => MarshalError::UnexpectedEof,
            kind => MarshalError::Io { kind },
        }
    }
}
