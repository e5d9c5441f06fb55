//! # Modbox Serde
//! Wire encoding of the primitive values that modules and the engine exchange.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod arg_value;
mod error;
mod float;
mod integer;
mod marshaler;
mod serde;
mod type_code;

pub use arg_value::ArgValue;
pub use error::MarshalError;
pub use float::{FloatCodec, FloatEncoding, IeeeFloats, TextFloats, MAX_FLOAT_TEXT_LEN};
pub use marshaler::{MarshalConfig, Marshaler, DEFAULT_MAX_STRING_LEN};
pub use serde::{read_bytes, WireSerde};
pub use type_code::{Signature, SignatureError, TypeCode};
