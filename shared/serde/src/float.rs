use std::{
    fmt::Debug,
    io::{Read, Write},
    str::FromStr,
    sync::Arc,
};

use crate::{
    error::MarshalError,
    serde::{read_bytes, WireSerde},
    type_code::TypeCode,
};

/// Longest decimal text accepted for a single floating-point value.
///
/// Fixed-point peers print every integer digit, so `%f` of `-f64::MAX`
/// alone takes 317 bytes.
pub const MAX_FLOAT_TEXT_LEN: u64 = 512;

/// Strategy for putting floating-point values on the wire.
///
/// Call sites go through the `Marshaler`, which holds one of these, so the
/// encoding can be swapped without touching them.
pub trait FloatCodec: Debug + Send + Sync {
    fn write_f32(&self, writer: &mut dyn Write, value: f32) -> Result<(), MarshalError>;
    fn write_f64(&self, writer: &mut dyn Write, value: f64) -> Result<(), MarshalError>;
    fn read_f32(&self, reader: &mut dyn Read) -> Result<f32, MarshalError>;
    fn read_f64(&self, reader: &mut dyn Read) -> Result<f64, MarshalError>;
}

/// Floats as length-prefixed decimal text.
///
/// Independent of the peer's native float layout, at the cost of speed.
/// Uses the shortest representation that parses back to the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFloats;

impl TextFloats {
    fn write_text(writer: &mut dyn Write, text: &str) -> Result<(), MarshalError> {
        (text.len() as u64).ser(writer)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn read_numeral<T: FromStr>(
        reader: &mut dyn Read,
        type_code: TypeCode,
    ) -> Result<T, MarshalError> {
        let len = u64::de(reader)?;
        if len > MAX_FLOAT_TEXT_LEN {
            return Err(MarshalError::StringTooLong {
                len,
                max: MAX_FLOAT_TEXT_LEN,
            });
        }
        let bytes = read_bytes(reader, len as usize)?;
        let text = String::from_utf8_lossy(&bytes);
        text.trim()
            .parse::<T>()
            .map_err(|_| MarshalError::MalformedNumeral {
                type_code,
                text: text.into_owned(),
            })
    }
}

impl FloatCodec for TextFloats {
    fn write_f32(&self, writer: &mut dyn Write, value: f32) -> Result<(), MarshalError> {
        Self::write_text(writer, &format!("{:?}", value))
    }

    fn write_f64(&self, writer: &mut dyn Write, value: f64) -> Result<(), MarshalError> {
        Self::write_text(writer, &format!("{:?}", value))
    }

    fn read_f32(&self, reader: &mut dyn Read) -> Result<f32, MarshalError> {
        Self::read_numeral(reader, TypeCode::F32)
    }

    fn read_f64(&self, reader: &mut dyn Read) -> Result<f64, MarshalError> {
        Self::read_numeral(reader, TypeCode::F64)
    }
}

/// Floats as their raw IEEE-754 bits, big-endian
#[derive(Debug, Clone, Copy, Default)]
pub struct IeeeFloats;

impl FloatCodec for IeeeFloats {
    fn write_f32(&self, writer: &mut dyn Write, value: f32) -> Result<(), MarshalError> {
        writer.write_all(&value.to_bits().to_be_bytes())?;
        Ok(())
    }

    fn write_f64(&self, writer: &mut dyn Write, value: f64) -> Result<(), MarshalError> {
        value.to_bits().ser(writer)
    }

    fn read_f32(&self, reader: &mut dyn Read) -> Result<f32, MarshalError> {
        let mut bytes = [0u8; 4];
        reader.read_exact(&mut bytes)?;
        Ok(f32::from_bits(u32::from_be_bytes(bytes)))
    }

    fn read_f64(&self, reader: &mut dyn Read) -> Result<f64, MarshalError> {
        Ok(f64::from_bits(u64::de(reader)?))
    }
}

/// Built-in float encodings, selectable from configuration
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FloatEncoding {
    Text,
    Ieee754,
}

impl FloatEncoding {
    pub fn codec(&self) -> Arc<dyn FloatCodec> {
        match self {
            FloatEncoding::Text => Arc::new(TextFloats),
            FloatEncoding::Ieee754 => Arc::new(IeeeFloats),
        }
    }
}

cfg_if! {
    if #[cfg(feature = "ieee_floats")] {
        impl Default for FloatEncoding {
            fn default() -> Self {
                FloatEncoding::Ieee754
            }
        }
    } else {
        impl Default for FloatEncoding {
            fn default() -> Self {
                FloatEncoding::Text
            }
        }
    }
}
