//! # Modbox Shared
//! Function registry, handshake and cross-thread dispatch shared between
//! modbox-server & modbox-client crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use modbox_serde::{
    read_bytes, ArgValue, FloatCodec, FloatEncoding, IeeeFloats, MarshalConfig, MarshalError,
    Marshaler, Signature, SignatureError, TextFloats, TypeCode, WireSerde,
    DEFAULT_MAX_STRING_LEN,
};

mod call;
pub mod dispatch;
mod handle_table;
pub mod handshake;
mod registry;
mod tick_calls;

pub use call::{panic_message, CallArgs, CallResult, HandlerError};
pub use dispatch::{
    Completion, DispatchConfig, DispatchError, DispatchQueue, DispatchTask, DrainReport,
    FrameConfig, FrameInfo, FrameLoop, ShutdownHandle,
};
pub use handle_table::{HandleError, HandleTable, NULL_HANDLE};
pub use handshake::{ProtocolError, EXIT_COMMAND, MODULE_HEADER, SERVER_HEADER};
pub use registry::{FunctionEntry, FunctionRegistry, Handler, RegistryError, RegistryPlugin};
pub use tick_calls::{TickCall, TickCalls};
