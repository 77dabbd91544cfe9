//! Normalization strategy
//!
//! Transforms every incoming value into canonical form before it reaches the
//! wrapped setter or is used as the stored initial value. Normalization is
//! unconditional: every write and every initial value is transformed, never
//! rejected. The normalizer's return value is what persists.

use crate::chain::Decorator;
use crate::context::{DecoratorContext, Kind};
use crate::descriptor::{AccessorDescriptor, InitFn, Member, SetFn};
use crate::error::{AccessError, DefineError};
use adorn_core::{Instance, Value};
use std::sync::Arc;

/// A value-canonicalizing function
pub type Normalizer = Arc<dyn Fn(&Instance, Value) -> Result<Value, AccessError> + Send + Sync>;

/// The `normalize` decorator
///
/// Supports accessor, setter, and field kinds; requires a setter or an
/// initial-value path to transform.
pub struct Normalize {
    normalizer: Normalizer,
}

impl Normalize {
    /// Create a normalization decorator from exactly one normalizer
    pub fn new(
        normalizer: impl Fn(&Instance, Value) -> Result<Value, AccessError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            normalizer: Arc::new(normalizer),
        }
    }
}

impl Decorator for Normalize {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn apply(&self, member: Member, cx: &DecoratorContext) -> Result<Member, DefineError> {
        match cx.kind {
            Kind::Accessor | Kind::Setter | Kind::Field => {}
            Kind::Getter | Kind::Method | Kind::Class => {
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
        if desc.set.is_none() && desc.init.is_none() && cx.kind != Kind::Field {
            return Err(DefineError::MissingCapability {
                decorator: "normalize",
                name: cx.name.clone(),
                capability: "setter",
            });
        }

        // Write path: normalize, then delegate
        let set: Option<SetFn> = desc.set.clone().map(|inner| {
            let normalizer = self.normalizer.clone();
            let set: SetFn = Arc::new(move |inst: &Instance, value: Value| {
                let canonical = normalizer(inst, value)?;
                inner(inst, canonical)
            });
            set
        });

        // Init path: normalize the initial value after any inner transform
        // has produced it, so the stored seed is canonical too
        let inner_init = desc.init.clone();
        let normalizer = self.normalizer.clone();
        let init: InitFn = Arc::new(move |inst: &Instance, value: Value| {
            let value = match &inner_init {
                Some(f) => f(inst, value)?,
                None => value,
            };
            normalizer(inst, value)
        });

        Ok(Member::Accessor(AccessorDescriptor {
            get: desc.get,
            set,
            init: Some(init),
        }))
    }
}
