use std::any::Any;

use thiserror::Error;

use modbox_serde::{ArgValue, Signature, TypeCode};

use crate::{dispatch::DispatchError, handle_table::HandleError};

/// Errors a handler can report back to the module worker
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// Handler was given a different number of arguments than its signature declares
    #[error("Handler expected {expected} arguments but received {found}")]
    ArgumentCount { expected: usize, found: usize },

    /// Handler read an argument slot with the wrong type
    #[error("Argument {index} is {found}, but the handler read it as {expected}")]
    ArgumentType {
        index: usize,
        expected: TypeCode,
        found: TypeCode,
    },

    /// Handler read past the end of its arguments
    #[error("Argument {index} is missing")]
    MissingArgument { index: usize },

    /// Handler produced values that do not match its return signature
    #[error("Handler returned '{found}' but its return signature is '{expected}'")]
    ResultMismatch {
        expected: Signature,
        found: Signature,
    },

    /// A handle sent by the module does not refer to a live engine object
    #[error("No such {kind} handle: {handle}")]
    NotFound { kind: &'static str, handle: u64 },

    /// The dispatched engine work did not complete
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// Handler panicked
    #[error("Handler panicked: {message}")]
    Panicked { message: String },

    /// Any other handler-internal failure
    #[error("{message}")]
    Failed { message: String },
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed {
            message: message.into(),
        }
    }

    /// Whether this error means the registration itself is inconsistent,
    /// rather than a failure of one particular call
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(
            self,
            HandlerError::ArgumentCount { .. }
                | HandlerError::ArgumentType { .. }
                | HandlerError::MissingArgument { .. }
                | HandlerError::ResultMismatch { .. }
        )
    }
}

impl From<HandleError> for HandlerError {
    fn from(error: HandleError) -> Self {
        match error {
            HandleError::NotFound { kind, handle } => HandlerError::NotFound { kind, handle },
        }
    }
}

/// Best-effort text of a caught panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Decoded arguments of one call, in signature order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    values: Vec<ArgValue>,
}

impl CallArgs {
    pub fn new(values: Vec<ArgValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }

    pub fn signature(&self) -> Signature {
        Signature::new(self.values.iter().map(ArgValue::type_code).collect())
    }

    /// Fails unless exactly `expected` arguments are present
    pub fn expect_len(&self, expected: usize) -> Result<(), HandlerError> {
        if self.values.len() != expected {
            return Err(HandlerError::ArgumentCount {
                expected,
                found: self.values.len(),
            });
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<&ArgValue, HandlerError> {
        self.values
            .get(index)
            .ok_or(HandlerError::MissingArgument { index })
    }

    fn typed<'a, T>(
        &'a self,
        index: usize,
        expected: TypeCode,
        read: impl FnOnce(&'a ArgValue) -> Option<T>,
    ) -> Result<T, HandlerError> {
        let value = self.get(index)?;
        read(value).ok_or(HandlerError::ArgumentType {
            index,
            expected,
            found: value.type_code(),
        })
    }

    pub fn u64(&self, index: usize) -> Result<u64, HandlerError> {
        self.typed(index, TypeCode::U64, ArgValue::as_u64)
    }

    pub fn i64(&self, index: usize) -> Result<i64, HandlerError> {
        self.typed(index, TypeCode::I64, ArgValue::as_i64)
    }

    pub fn f32(&self, index: usize) -> Result<f32, HandlerError> {
        self.typed(index, TypeCode::F32, ArgValue::as_f32)
    }

    pub fn f64(&self, index: usize) -> Result<f64, HandlerError> {
        self.typed(index, TypeCode::F64, ArgValue::as_f64)
    }

    pub fn str(&self, index: usize) -> Result<&str, HandlerError> {
        self.typed(index, TypeCode::Str, ArgValue::as_str)
    }

    pub fn bool(&self, index: usize) -> Result<bool, HandlerError> {
        self.typed(index, TypeCode::Bool, ArgValue::as_bool)
    }
}

impl From<Vec<ArgValue>> for CallArgs {
    fn from(values: Vec<ArgValue>) -> Self {
        Self { values }
    }
}

/// Values a handler returns, in return-signature order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallResult {
    values: Vec<ArgValue>,
}

impl CallResult {
    /// A result with no return values
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(values: Vec<ArgValue>) -> Self {
        Self { values }
    }

    /// A result holding a single value
    pub fn single(value: impl Into<ArgValue>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }

    pub fn push(&mut self, value: impl Into<ArgValue>) -> &mut Self {
        self.values.push(value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<ArgValue> {
        self.values
    }

    pub fn signature(&self) -> Signature {
        Signature::new(self.values.iter().map(ArgValue::type_code).collect())
    }
}

impl From<Vec<ArgValue>> for CallResult {
    fn from(values: Vec<ArgValue>) -> Self {
        Self { values }
    }
}
