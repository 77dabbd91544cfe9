//! Memoization strategy
//!
//! Caches a computed result so the wrapped operation runs at most once per
//! cache key:
//! - **accessor/getter**: one cached value per instance, keyed by object ID;
//!   the write path (if any) is untouched
//! - **method**: one shared cache per decorator application, keyed by the
//!   argument-identity [`CompositeKey`]; the key builder is pluggable
//! - **class**: same keying over constructor arguments, caching the
//!   `InstanceRef` itself, so equal-argument constructions return the same
//!   instance
//!
//! Entries are never invalidated or evicted; a cache lives as long as the
//! member it is installed on. Each entry is an `Arc<OnceCell<..>>` inside a
//! `DashMap`, which makes the check-then-compute sequence atomic per key:
//! concurrent first calls block on the cell and exactly one runs the wrapped
//! operation. A failed computation is not cached.

use crate::chain::Decorator;
use crate::context::{DecoratorContext, Kind};
use crate::descriptor::{
    AccessorDescriptor, ConstructorDescriptor, GetFn, Member, MethodDescriptor,
};
use crate::error::DefineError;
use adorn_core::{composite_key, CompositeKey, Value};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Builds a cache key from an ordered argument list
pub type KeyFn = Arc<dyn Fn(&[Value]) -> CompositeKey + Send + Sync>;

/// The `memoized` decorator
///
/// Supports accessor, getter, method, and class kinds.
pub struct Memoized {
    key_fn: KeyFn,
}

impl Memoized {
    /// Create a memoization decorator with the default argument-identity key
    pub fn new() -> Self {
        Self {
            key_fn: Arc::new(|args| composite_key(args)),
        }
    }

    /// Create a memoization decorator with a custom key builder
    pub fn with_key(
        key_fn: impl Fn(&[Value]) -> CompositeKey + Send + Sync + 'static,
    ) -> Self {
        Self {
            key_fn: Arc::new(key_fn),
        }
    }

    fn wrap_getter(&self, desc: AccessorDescriptor, cx: &DecoratorContext) -> Result<Member, DefineError> {
        let inner = desc.get.clone().ok_or(DefineError::MissingCapability {
            decorator: "memoized",
            name: cx.name.clone(),
            capability: "getter",
        })?;

        // One cell per instance; the getter runs at most once per instance
        let cache: Arc<DashMap<u64, Arc<OnceCell<Value>>>> = Arc::new(DashMap::new());
        let get: GetFn = Arc::new(move |inst| {
            let cell = cache.entry(inst.object_id()).or_default().value().clone();
            cell.get_or_try_init(|| inner(inst)).cloned()
        });

        Ok(Member::Accessor(AccessorDescriptor {
            get: Some(get),
            set: desc.set,
            init: desc.init,
        }))
    }

    fn wrap_method(&self, desc: MethodDescriptor) -> Member {
        let inner = desc.call;
        let key_fn = self.key_fn.clone();
        let cache: Arc<DashMap<CompositeKey, Arc<OnceCell<Value>>>> = Arc::new(DashMap::new());

        Member::Method(MethodDescriptor {
            call: Arc::new(move |inst, args| {
                let key = key_fn(args);
                let cell = cache.entry(key).or_default().value().clone();
                cell.get_or_try_init(|| inner(inst, args)).cloned()
            }),
        })
    }

    fn wrap_constructor(&self, desc: ConstructorDescriptor) -> Member {
        let inner = desc.construct;
        let key_fn = self.key_fn.clone();
        let cache: Arc<DashMap<CompositeKey, Arc<OnceCell<adorn_core::InstanceRef>>>> =
            Arc::new(DashMap::new());

        Member::Constructor(ConstructorDescriptor {
            construct: Arc::new(move |args| {
                let key = key_fn(args);
                let cell = cache.entry(key).or_default().value().clone();
                cell.get_or_try_init(|| inner(args)).cloned()
            }),
        })
    }
}

impl Default for Memoized {
    fn default() -> Self {
        Self::new()
    }
}

impl Decorator for Memoized {
    fn name(&self) -> &'static str {
        "memoized"
    }

    fn apply(&self, member: Member, cx: &DecoratorContext) -> Result<Member, DefineError> {
        match cx.kind {
            Kind::Accessor | Kind::Getter => {
                let desc = member.into_accessor().ok_or(DefineError::MismatchedMember {
                    kind: cx.kind,
                    name: cx.name.clone(),
                })?;
                self.wrap_getter(desc, cx)
            }
            Kind::Method => match member {
                Member::Method(desc) => Ok(self.wrap_method(desc)),
                _ => Err(DefineError::MismatchedMember {
                    kind: cx.kind,
                    name: cx.name.clone(),
                }),
            },
            Kind::Class => match member {
                Member::Constructor(desc) => Ok(self.wrap_constructor(desc)),
                _ => Err(DefineError::MismatchedMember {
                    kind: cx.kind,
                    name: cx.name.clone(),
                }),
            },
            Kind::Setter | Kind::Field => Err(DefineError::UnsupportedKind {
                decorator: self.name(),
                kind: cx.kind,
                name: cx.name.clone(),
            }),
        }
    }
}
