//! Member descriptors
//!
//! A descriptor captures a class member's current behavior as a set of
//! shared closures. A base descriptor is created once at class-definition
//! time, then progressively replaced by each decorator in the chain (each
//! consumes one descriptor and produces a new one wrapping it); the final
//! descriptor is installed on the class and is immutable thereafter.

use crate::error::AccessError;
use adorn_core::{Instance, InstanceRef, Value};
use std::fmt;
use std::sync::Arc;

/// Produce the current value of a property
pub type GetFn = Arc<dyn Fn(&Instance) -> Result<Value, AccessError> + Send + Sync>;

/// Accept a new value for a property
pub type SetFn = Arc<dyn Fn(&Instance, Value) -> Result<(), AccessError> + Send + Sync>;

/// Transform an initial value before first storage
pub type InitFn = Arc<dyn Fn(&Instance, Value) -> Result<Value, AccessError> + Send + Sync>;

/// Invoke a method with an argument list
pub type CallFn = Arc<dyn Fn(&Instance, &[Value]) -> Result<Value, AccessError> + Send + Sync>;

/// Construct an instance from an argument list
pub type CtorFn = Arc<dyn Fn(&[Value]) -> Result<InstanceRef, AccessError> + Send + Sync>;

/// One property's current behavior: optional get/set/init capabilities
///
/// At least one of `get`/`set` must be present for accessor kinds; a field
/// descriptor may carry `init` only in addition to its storage pair.
#[derive(Clone, Default)]
pub struct AccessorDescriptor {
    /// Read path
    pub get: Option<GetFn>,
    /// Write path
    pub set: Option<SetFn>,
    /// Initial-value transform
    pub init: Option<InitFn>,
}

impl AccessorDescriptor {
    /// Create an empty descriptor (capabilities added via the `with_` builders)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a getter
    pub fn with_get(
        mut self,
        get: impl Fn(&Instance) -> Result<Value, AccessError> + Send + Sync + 'static,
    ) -> Self {
        self.get = Some(Arc::new(get));
        self
    }

    /// Add a setter
    pub fn with_set(
        mut self,
        set: impl Fn(&Instance, Value) -> Result<(), AccessError> + Send + Sync + 'static,
    ) -> Self {
        self.set = Some(Arc::new(set));
        self
    }

    /// Add an initial-value transform
    pub fn with_init(
        mut self,
        init: impl Fn(&Instance, Value) -> Result<Value, AccessError> + Send + Sync + 'static,
    ) -> Self {
        self.init = Some(Arc::new(init));
        self
    }

    /// A get/set pair backed by a named instance field
    ///
    /// Reads of a missing backing field produce `Null`.
    pub fn field_backed(field: &str) -> Self {
        let read_field = field.to_string();
        let write_field = field.to_string();
        Self::new()
            .with_get(move |inst| Ok(inst.get_field(&read_field).unwrap_or(Value::Null)))
            .with_set(move |inst, value| {
                inst.set_field(&write_field, value);
                Ok(())
            })
    }

    /// Check if the descriptor has a read path
    pub fn is_readable(&self) -> bool {
        self.get.is_some()
    }

    /// Check if the descriptor has a write path
    pub fn is_writable(&self) -> bool {
        self.set.is_some()
    }
}

impl fmt::Debug for AccessorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorDescriptor")
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .field("init", &self.init.is_some())
            .finish()
    }
}

/// An argument-taking method's behavior
#[derive(Clone)]
pub struct MethodDescriptor {
    /// Call path
    pub call: CallFn,
}

impl MethodDescriptor {
    /// Create a method descriptor from a call closure
    pub fn new(
        call: impl Fn(&Instance, &[Value]) -> Result<Value, AccessError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            call: Arc::new(call),
        }
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor").finish_non_exhaustive()
    }
}

/// A constructor's behavior
#[derive(Clone)]
pub struct ConstructorDescriptor {
    /// Construction path
    pub construct: CtorFn,
}

impl ConstructorDescriptor {
    /// Create a constructor descriptor from a construction closure
    pub fn new(
        construct: impl Fn(&[Value]) -> Result<InstanceRef, AccessError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            construct: Arc::new(construct),
        }
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .finish_non_exhaustive()
    }
}

/// A class member's behavior, in whatever shape its kind requires
///
/// Accessor, getter, setter, and field kinds all use the
/// [`AccessorDescriptor`] shape; their [`Kind`](crate::context::Kind) tag in
/// the decoration context tells strategies which capabilities to expect.
#[derive(Debug, Clone)]
pub enum Member {
    /// A get/set/init property
    Accessor(AccessorDescriptor),
    /// An argument-taking method
    Method(MethodDescriptor),
    /// The class constructor
    Constructor(ConstructorDescriptor),
}

impl Member {
    /// Borrow the accessor shape, if this member has one
    pub fn as_accessor(&self) -> Option<&AccessorDescriptor> {
        match self {
            Member::Accessor(desc) => Some(desc),
            _ => None,
        }
    }

    /// Consume into the accessor shape, if this member has one
    pub fn into_accessor(self) -> Option<AccessorDescriptor> {
        match self {
            Member::Accessor(desc) => Some(desc),
            _ => None,
        }
    }
}
