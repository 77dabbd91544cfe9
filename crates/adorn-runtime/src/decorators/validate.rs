//! Validation strategy
//!
//! Gates writes on one or more predicates. Every predicate receives the
//! instance (so it can consult current state) and the candidate value; the
//! write delegates to the wrapped setter only if every predicate returns
//! `true`. Rejection is a single configuration axis: silent (the default,
//! the write is discarded with no error) or loud
//! ([`AccessError::Rejected`]). A predicate error propagates unmodified and
//! prevents the write either way.
//!
//! Initialization is not a write: the `init` path is left untouched.

use crate::chain::Decorator;
use crate::context::{DecoratorContext, Kind};
use crate::descriptor::{AccessorDescriptor, Member, SetFn};
use crate::error::{AccessError, DefineError};
use adorn_core::{Instance, Value};
use std::fmt;
use std::sync::Arc;

/// A write-gating predicate
pub type Predicate = Arc<dyn Fn(&Instance, &Value) -> Result<bool, AccessError> + Send + Sync>;

/// Wrap a closure as a [`Predicate`]
pub fn predicate(
    f: impl Fn(&Instance, &Value) -> Result<bool, AccessError> + Send + Sync + 'static,
) -> Predicate {
    Arc::new(f)
}

/// What a failed predicate does to the write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Discard the write, no error (default)
    Silent,
    /// Fail the write with [`AccessError::Rejected`]
    Loud,
}

/// The `validate` decorator
///
/// Supports accessor and setter kinds; requires a setter.
pub struct Validate {
    predicates: Vec<Predicate>,
    rejection: Rejection,
}

impl Validate {
    /// Create a validation decorator from one or more predicates
    ///
    /// Fails with [`DefineError::Configuration`] if the list is empty; that
    /// check happens at decorator-construction time, before any class or
    /// instance exists.
    pub fn new(predicates: Vec<Predicate>) -> Result<Self, DefineError> {
        if predicates.is_empty() {
            return Err(DefineError::Configuration {
                decorator: "validate",
                reason: "at least one predicate is required".to_string(),
            });
        }
        Ok(Self {
            predicates,
            rejection: Rejection::Silent,
        })
    }

    /// Switch rejection from silent to loud
    pub fn loud(self) -> Self {
        self.with_rejection(Rejection::Loud)
    }

    /// Set the rejection mode explicitly
    pub fn with_rejection(mut self, rejection: Rejection) -> Self {
        self.rejection = rejection;
        self
    }
}

impl fmt::Debug for Validate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validate")
            .field("predicates", &self.predicates.len())
            .field("rejection", &self.rejection)
            .finish()
    }
}

impl Decorator for Validate {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn apply(&self, member: Member, cx: &DecoratorContext) -> Result<Member, DefineError> {
        match cx.kind {
            Kind::Accessor | Kind::Setter => {}
            Kind::Getter | Kind::Method | Kind::Field | Kind::Class => {
                return Err(DefineError::UnsupportedKind {
                    decorator: self.name(),
                    kind: cx.kind,
                    name: cx.name.clone(),
                });
            }
        }

        let desc = member.into_accessor().ok_or(DefineError::MismatchedMember {
            kind: cx.kind,
            name: cx.name.clone(),
        })?;
        let inner = desc.set.clone().ok_or(DefineError::MissingCapability {
            decorator: "validate",
            name: cx.name.clone(),
            capability: "setter",
        })?;

        let predicates = self.predicates.clone();
        let rejection = self.rejection;
        let property = cx.name.clone();
        let set: SetFn = Arc::new(move |inst, value| {
            for pred in &predicates {
                if !pred(inst, &value)? {
                    return match rejection {
                        Rejection::Silent => Ok(()),
                        Rejection::Loud => Err(AccessError::Rejected {
                            name: property.clone(),
                        }),
                    };
                }
            }
            inner(inst, value)
        });

        Ok(Member::Accessor(AccessorDescriptor {
            get: desc.get,
            set: Some(set),
            init: desc.init,
        }))
    }
}
