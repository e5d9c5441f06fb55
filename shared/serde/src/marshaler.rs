use std::{
    io::{Read, Write},
    sync::Arc,
};

use crate::{
    arg_value::ArgValue,
    error::MarshalError,
    float::{FloatCodec, FloatEncoding},
    serde::{read_bytes, WireSerde},
    type_code::{Signature, TypeCode},
};

/// Default upper bound on a single decoded string
pub const DEFAULT_MAX_STRING_LEN: u64 = 16 * 1024 * 1024;

/// Contains Config properties which will be used by the Marshaler
#[derive(Debug, Clone)]
pub struct MarshalConfig {
    /// How floating-point values are put on the wire
    pub float_encoding: FloatEncoding,
    /// Strings with a longer length prefix are rejected before any allocation
    pub max_string_len: u64,
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self {
            float_encoding: FloatEncoding::default(),
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

/// Encodes and decodes typed values on a module connection.
///
/// The TypeCode alone decides the layout of every value.
#[derive(Debug, Clone)]
pub struct Marshaler {
    floats: Arc<dyn FloatCodec>,
    max_string_len: u64,
}

impl Default for Marshaler {
    fn default() -> Self {
        Self::new(&MarshalConfig::default())
    }
}

impl Marshaler {
    pub fn new(config: &MarshalConfig) -> Self {
        Self {
            floats: config.float_encoding.codec(),
            max_string_len: config.max_string_len,
        }
    }

    /// Replaces the float strategy with a custom codec
    pub fn with_float_codec(mut self, codec: Arc<dyn FloatCodec>) -> Self {
        self.floats = codec;
        self
    }

    pub fn max_string_len(&self) -> u64 {
        self.max_string_len
    }

    // Strings

    pub fn write_string(&self, writer: &mut dyn Write, value: &str) -> Result<(), MarshalError> {
        let len = value.len() as u64;
        if len > self.max_string_len {
            return Err(MarshalError::StringTooLong {
                len,
                max: self.max_string_len,
            });
        }
        len.ser(writer)?;
        writer.write_all(value.as_bytes())?;
        Ok(())
    }

    pub fn read_string(&self, reader: &mut dyn Read) -> Result<String, MarshalError> {
        let len = u64::de(reader)?;
        if len > self.max_string_len {
            log::warn!(
                "Rejecting incoming string of {} bytes, limit is {}",
                len,
                self.max_string_len
            );
            return Err(MarshalError::StringTooLong {
                len,
                max: self.max_string_len,
            });
        }
        let bytes = read_bytes(reader, len as usize)?;
        let len = bytes.len();
        String::from_utf8(bytes).map_err(|_| MarshalError::InvalidUtf8 { len })
    }

    // Typed values

    /// Writes one value using the layout of its own TypeCode
    pub fn encode(&self, value: &ArgValue, writer: &mut dyn Write) -> Result<(), MarshalError> {
        match value {
            ArgValue::U64(value) => value.ser(writer),
            ArgValue::I64(value) => value.ser(writer),
            ArgValue::F32(value) => self.floats.write_f32(writer, *value),
            ArgValue::F64(value) => self.floats.write_f64(writer, *value),
            ArgValue::Str(value) => self.write_string(writer, value),
            ArgValue::Bool(value) => value.ser(writer),
        }
    }

    /// Writes one value into the slot described by `type_code`
    pub fn encode_as(
        &self,
        type_code: TypeCode,
        value: &ArgValue,
        writer: &mut dyn Write,
    ) -> Result<(), MarshalError> {
        if value.type_code() != type_code {
            return Err(MarshalError::TypeMismatch {
                expected: type_code,
                found: value.type_code(),
            });
        }
        self.encode(value, writer)
    }

    pub fn decode(
        &self,
        type_code: TypeCode,
        reader: &mut dyn Read,
    ) -> Result<ArgValue, MarshalError> {
        let value = match type_code {
            TypeCode::U64 => ArgValue::U64(u64::de(reader)?),
            TypeCode::I64 => ArgValue::I64(i64::de(reader)?),
            TypeCode::F32 => ArgValue::F32(self.floats.read_f32(reader)?),
            TypeCode::F64 => ArgValue::F64(self.floats.read_f64(reader)?),
            TypeCode::Str => ArgValue::Str(self.read_string(reader)?),
            TypeCode::Bool => ArgValue::Bool(bool::de(reader)?),
        };
        Ok(value)
    }

    /// Encodes a single value into a fresh buffer
    pub fn to_bytes(&self, value: &ArgValue) -> Result<Vec<u8>, MarshalError> {
        let mut bytes = Vec::new();
        self.encode(value, &mut bytes)?;
        Ok(bytes)
    }

    // Signatures

    /// Decodes values left-to-right per `signature`.
    ///
    /// Values decoded before a failure are dropped here, so nothing leaks when a
    /// call is aborted mid-argument-list.
    pub fn decode_all(
        &self,
        signature: &Signature,
        reader: &mut dyn Read,
    ) -> Result<Vec<ArgValue>, MarshalError> {
        let mut values = Vec::with_capacity(signature.len());
        for type_code in signature.iter() {
            values.push(self.decode(type_code, reader)?);
        }
        Ok(values)
    }

    pub fn encode_all(
        &self,
        signature: &Signature,
        values: &[ArgValue],
        writer: &mut dyn Write,
    ) -> Result<(), MarshalError> {
        if values.len() != signature.len() {
            return Err(MarshalError::CountMismatch {
                expected: signature.len(),
                found: values.len(),
            });
        }
        for (type_code, value) in signature.iter().zip(values) {
            self.encode_as(type_code, value, writer)?;
        }
        Ok(())
    }
}
