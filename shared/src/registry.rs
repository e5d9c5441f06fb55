use std::{
    collections::HashMap,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use modbox_serde::Signature;

use crate::call::{panic_message, CallArgs, CallResult, HandlerError};

pub mod error;
pub use error::RegistryError;

/// Engine-side body of a registered function
pub type Handler = Arc<dyn Fn(&CallArgs) -> Result<CallResult, HandlerError> + Send + Sync>;

// Registry Plugin
pub trait RegistryPlugin {
    fn build(&self, registry: &mut FunctionRegistry);
}

/// A registered function: its handler plus argument and return signatures.
/// Immutable once registered.
pub struct FunctionEntry {
    name: String,
    handler: Handler,
    arg_signature: Signature,
    ret_signature: Signature,
}

impl FunctionEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arg_signature(&self) -> &Signature {
        &self.arg_signature
    }

    pub fn ret_signature(&self) -> &Signature {
        &self.ret_signature
    }

    /// Runs the handler, checking both ends against the registered signatures.
    ///
    /// A panicking handler is caught here and reported as
    /// `HandlerError::Panicked`.
    pub fn invoke(&self, args: &CallArgs) -> Result<CallResult, HandlerError> {
        self.check_args(args)?;

        let result = panic::catch_unwind(AssertUnwindSafe(|| (self.handler)(args)))
            .map_err(|payload| HandlerError::Panicked {
                message: panic_message(payload.as_ref()),
            })??;

        let found = result.signature();
        if found != self.ret_signature {
            return Err(HandlerError::ResultMismatch {
                expected: self.ret_signature.clone(),
                found,
            });
        }
        Ok(result)
    }

    fn check_args(&self, args: &CallArgs) -> Result<(), HandlerError> {
        args.expect_len(self.arg_signature.len())?;
        for (index, (expected, value)) in self
            .arg_signature
            .iter()
            .zip(args.values())
            .enumerate()
        {
            if value.type_code() != expected {
                return Err(HandlerError::ArgumentType {
                    index,
                    expected,
                    found: value.type_code(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FunctionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionEntry")
            .field("name", &self.name)
            .field("arg_signature", &self.arg_signature.to_string())
            .field("ret_signature", &self.ret_signature.to_string())
            .finish()
    }
}

/// Maps command names to the functions modules may invoke.
///
/// Built once during single-threaded startup, then locked and shared
/// read-only (typically behind an `Arc`) with every module worker.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionEntry>,
    locked: bool,
}

impl FunctionRegistry {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: RegistryPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    /// Registers `handler` under `name`.
    ///
    /// # Panics
    ///
    /// Panics if the name is already taken or the registry is locked. Both are
    /// programming errors in startup code.
    pub fn register<H>(
        &mut self,
        name: &str,
        handler: H,
        arg_signature: impl Into<Signature>,
        ret_signature: impl Into<Signature>,
    ) -> &mut Self
    where
        H: Fn(&CallArgs) -> Result<CallResult, HandlerError> + Send + Sync + 'static,
    {
        if let Err(error) = self.try_register(name, handler, arg_signature, ret_signature) {
            panic!("{}", error);
        }
        self
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: RegistryPlugin>(
        &mut self,
        plugin: P,
    ) -> Result<&mut Self, RegistryError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_register<H>(
        &mut self,
        name: &str,
        handler: H,
        arg_signature: impl Into<Signature>,
        ret_signature: impl Into<Signature>,
    ) -> Result<&mut Self, RegistryError>
    where
        H: Fn(&CallArgs) -> Result<CallResult, HandlerError> + Send + Sync + 'static,
    {
        self.try_check_lock()?;
        if self.functions.contains_key(name) {
            return Err(RegistryError::DuplicateFunction {
                name: name.to_string(),
            });
        }

        let entry = FunctionEntry {
            name: name.to_string(),
            handler: Arc::new(handler),
            arg_signature: arg_signature.into(),
            ret_signature: ret_signature.into(),
        };
        log::debug!(
            "Registered function '{}' ({}) -> ({})",
            entry.name,
            entry.arg_signature,
            entry.ret_signature
        );
        self.functions.insert(name.to_string(), entry);
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), RegistryError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if registry is locked without panicking
    /// Returns Err if registry is locked
    pub fn try_check_lock(&self) -> Result<(), RegistryError> {
        if self.locked {
            Err(RegistryError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if registry is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Function registry already locked!");
        }
    }

    // Lookup

    pub fn lookup(&self, name: &str) -> Result<&FunctionEntry, RegistryError> {
        self.functions
            .get(name)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Locks the registry and wraps it for sharing across worker threads
    pub fn into_shared(mut self) -> Arc<Self> {
        self.locked = true;
        Arc::new(self)
    }
}
