//! Adorn Decorator Runtime
//!
//! Composable behavioral decorators for property accessors, methods, and
//! constructors:
//! - **Chain composer**: applies an ordered decorator list to one member at
//!   class-definition time (`chain` module)
//! - **Strategies**: memoization, validation, normalization, and write
//!   hooks (`decorators` module)
//! - **Class registry**: builds immutable class definitions and dispatches
//!   property access through the installed chains (`class` module)
//!
//! # Example
//!
//! ```rust
//! use adorn_runtime::{AccessorDescriptor, ClassBuilder, Decorator, Validate, predicate};
//! use adorn_core::Value;
//! use std::sync::Arc;
//!
//! let positive: Arc<dyn Decorator> = Arc::new(
//!     Validate::new(vec![predicate(|_, v| {
//!         Ok(v.as_int().is_some_and(|i| i > 0))
//!     })])
//!     .unwrap(),
//! );
//!
//! let class = ClassBuilder::new("Counter")
//!     .accessor_with_initial(
//!         "count",
//!         AccessorDescriptor::field_backed("count"),
//!         Value::from(1),
//!         vec![positive],
//!     )
//!     .build()
//!     .unwrap();
//!
//! let inst = class.construct(&[]).unwrap();
//! class.set(&inst, "count", Value::from(-5)).unwrap(); // silently rejected
//! assert_eq!(class.get(&inst, "count").unwrap(), Value::from(1));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod chain;
pub mod class;
pub mod context;
pub mod decorators;
pub mod descriptor;
pub mod error;

pub use chain::{compose, Decorator};
pub use class::{ClassBuilder, ClassDef, CtorBody};
pub use context::{DecoratorContext, Kind};
pub use decorators::{
    predicate, Changed, DidSet, KeyFn, Memoized, Normalize, Predicate, Rejection, Validate,
    WillChange, WillSet,
};
pub use descriptor::{
    AccessorDescriptor, CallFn, ConstructorDescriptor, CtorFn, GetFn, InitFn, Member,
    MethodDescriptor, SetFn,
};
pub use error::{AccessError, DefineError};

// Re-export core types so downstream users need only one crate
pub use adorn_core::{composite_key, CompositeKey, Instance, InstanceRef, Value};
