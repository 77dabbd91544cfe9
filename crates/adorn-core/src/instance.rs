//! Object model
//!
//! An `Instance` is the heap object decorated accessors operate on: a
//! process-unique object ID plus a named field map. Instances are shared as
//! `Arc<Instance>` and use interior mutability for fields, so a getter, a
//! setter, and a predicate consulting instance state can all hold the same
//! `&Instance` during one access.
//!
//! Decorator-private state (memoization cells, old-value slots) is *not*
//! stored in the field map; strategies keep side tables keyed by
//! `object_id`, so per-instance caches never show up as fields.

use crate::value::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Global counter for generating unique object IDs
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique object ID
fn generate_object_id() -> u64 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Shared handle to an instance
pub type InstanceRef = Arc<Instance>;

/// Object instance (heap-allocated)
#[derive(Debug)]
pub struct Instance {
    /// Unique object ID (assigned on creation, used to key side tables)
    object_id: u64,
    /// Named field values
    fields: RwLock<FxHashMap<String, Value>>,
}

impl Instance {
    /// Create a new instance with no fields
    pub fn new() -> Self {
        Self {
            object_id: generate_object_id(),
            fields: RwLock::new(FxHashMap::default()),
        }
    }

    /// The instance's unique object ID
    pub fn object_id(&self) -> u64 {
        self.object_id
    }

    /// Get a field value by name
    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.read().get(name).cloned()
    }

    /// Set a field value by name
    pub fn set_field(&self, name: &str, value: Value) {
        self.fields.write().insert(name.to_string(), value);
    }

    /// Check if a field exists
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.read().contains_key(name)
    }

    /// Get number of fields
    pub fn field_count(&self) -> usize {
        self.fields.read().len()
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}
