//! # Modbox Client
//! The module side of the modbox protocol. Connects to an engine, announces
//! a module name and calls the functions the engine registered.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use modbox_shared::{ArgValue, MarshalConfig, Signature, TypeCode};
}

mod client_config;
mod error;
mod module_client;

pub use client_config::ClientConfig;
pub use error::ClientError;
pub use module_client::{ModuleClient, TcpModuleClient};
