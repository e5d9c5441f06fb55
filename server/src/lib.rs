//! # Modbox Server
//! Accepts connections from out-of-process modules and runs the module
//! protocol on each of them: handshake, then a loop of command lookups,
//! argument decoding, handler invocation and result encoding.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use modbox_shared::{
        ArgValue, CallArgs, CallResult, DispatchQueue, FunctionRegistry, HandlerError,
        MarshalConfig, RegistryPlugin, Signature, TypeCode,
    };
}

mod acceptor;
mod error;
mod server_config;
mod session;
mod worker;

pub use acceptor::{ModuleServer, ServerHandle};
pub use error::ModuleError;
pub use server_config::ServerConfig;
pub use session::{ModuleSession, SessionEnd, SessionOutcome};
pub use worker::{ModuleWorker, SessionState};
