use std::collections::HashMap;

use thiserror::Error;

/// Handle value that never refers to an object
pub const NULL_HANDLE: u64 = 0;

/// Errors that can occur when resolving a handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    /// Handle was never issued, or its object has been removed
    #[error("No such {kind} handle: {handle}")]
    NotFound { kind: &'static str, handle: u64 },
}

/// Maps opaque `u64` handles handed to modules onto engine objects.
///
/// Handles are issued from 1 upward and never reused, so a stale handle from a
/// module fails to resolve instead of aliasing a newer object.
pub struct HandleTable<T> {
    kind: &'static str,
    entries: HashMap<u64, T>,
    next_handle: u64,
}

impl<T> HandleTable<T> {
    /// `kind` names the object type in lookup errors, e.g. "drawable"
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
            next_handle: NULL_HANDLE + 1,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn insert(&mut self, value: T) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.entries.insert(handle, value);
        handle
    }

    pub fn get(&self, handle: u64) -> Result<&T, HandleError> {
        self.entries.get(&handle).ok_or(HandleError::NotFound {
            kind: self.kind,
            handle,
        })
    }

    pub fn get_mut(&mut self, handle: u64) -> Result<&mut T, HandleError> {
        let kind = self.kind;
        self.entries
            .get_mut(&handle)
            .ok_or(HandleError::NotFound { kind, handle })
    }

    pub fn remove(&mut self, handle: u64) -> Result<T, HandleError> {
        self.entries.remove(&handle).ok_or(HandleError::NotFound {
            kind: self.kind,
            handle,
        })
    }

    pub fn contains(&self, handle: u64) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live entries in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> {
        self.entries.iter().map(|(handle, value)| (*handle, value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u64, &mut T)> {
        self.entries.iter_mut().map(|(handle, value)| (*handle, value))
    }
}
