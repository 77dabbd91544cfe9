//! Argument-identity keys
//!
//! A `CompositeKey` is the identity of an ordered list of values: two keys
//! are equal iff their lists are structurally equal element-wise. Memoized
//! methods and constructors key their caches with it, so repeated calls with
//! *equal* (not merely identical) arguments hit the cache.
//!
//! The runtime treats the key builder as a pluggable collaborator; this
//! module provides the default.

use crate::value::Value;

/// Identity of an ordered argument list, usable as a map key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey(Box<[Value]>);

impl CompositeKey {
    /// Build a key from an ordered list of values
    pub fn new(values: &[Value]) -> Self {
        CompositeKey(values.to_vec().into_boxed_slice())
    }

    /// The values this key was built from, in order
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Number of values in the key
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the key is empty (zero-argument call)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build the default composite key for an argument list
pub fn composite_key(values: &[Value]) -> CompositeKey {
    CompositeKey::new(values)
}
