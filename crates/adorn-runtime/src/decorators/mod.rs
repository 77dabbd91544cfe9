//! Behavioral decorator strategies
//!
//! Each strategy is a thin [`Decorator`](crate::chain::Decorator)
//! implementation applied by the same chaining mechanism:
//! - `memoize`: cache computed results (getters, methods, constructors)
//! - `validate`: gate writes on predicates, silently or loudly
//! - `normalize`: canonicalize every incoming value before storage
//! - `observe`: side-effect hooks around writes (`will_set`, `did_set`,
//!   `will_change`, `changed`)

pub mod memoize;
pub mod normalize;
pub mod observe;
pub mod validate;

pub use memoize::{KeyFn, Memoized};
pub use normalize::Normalize;
pub use observe::{Changed, DidSet, EqualsFn, WillChange, WillSet};
pub use validate::{predicate, Predicate, Rejection, Validate};
