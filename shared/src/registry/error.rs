use thiserror::Error;

/// Errors that can occur during function registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Registry is locked and cannot be modified
    #[error("Function registry is already locked and cannot be modified. FunctionRegistry.lock() has been called and no further registrations are allowed")]
    AlreadyLocked,

    /// Another function was already registered under this name
    #[error("Function '{name}' is already registered")]
    DuplicateFunction { name: String },

    /// No function is registered under this name
    #[error("Function '{name}' not found")]
    NotFound { name: String },
}
