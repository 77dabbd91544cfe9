//! Adorn Core
//!
//! Foundation types for the Adorn decorator runtime:
//! - **Value**: dynamic value representation with structural equality (`value` module)
//! - **Composite keys**: argument-identity keys for memoization (`composite` module)
//! - **Instance**: the heap object model decorated accessors operate on (`instance` module)

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod composite;
pub mod instance;
pub mod value;

pub use composite::{composite_key, CompositeKey};
pub use instance::{Instance, InstanceRef};
pub use value::Value;
