use std::io::{Read, Write};

use crate::error::MarshalError;

/// A value with a single fixed wire layout, independent of any configuration
pub trait WireSerde: Sized {
    /// Writes the value to the connection
    fn ser(&self, writer: &mut dyn Write) -> Result<(), MarshalError>;

    /// Reads a value from the connection
    fn de(reader: &mut dyn Read) -> Result<Self, MarshalError>;

    /// Number of bytes this value occupies on the wire, if fixed
    fn wire_len() -> Option<usize> {
        None
    }
}

impl WireSerde for bool {
    fn ser(&self, writer: &mut dyn Write) -> Result<(), MarshalError> {
        writer.write_all(&[u8::from(*self)])?;
        Ok(())
    }

    fn de(reader: &mut dyn Read) -> Result<Self, MarshalError> {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        match byte[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(MarshalError::InvalidBool { byte: other }),
        }
    }

    fn wire_len() -> Option<usize> {
        Some(1)
    }
}

/// Reads exactly `len` bytes, failing with UnexpectedEof when the stream ends early
pub fn read_bytes(reader: &mut dyn Read, len: usize) -> Result<Vec<u8>, MarshalError> {
    let mut buffer = Vec::new();
    let read = Read::take(&mut *reader, len as u64).read_to_end(&mut buffer)?;
    if read < len {
        return Err(MarshalError::UnexpectedEof);
    }
    Ok(buffer)
}
