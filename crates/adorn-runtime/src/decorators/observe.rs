//! Side-effect strategies around writes
//!
//! Four hook decorators, all supporting accessor and setter kinds:
//! - [`WillSet`]: observer runs before the wrapped setter; an observer error
//!   aborts the write
//! - [`DidSet`]: wrapped setter first, then the observer
//! - [`WillChange`]: equality-gated; on a real change the observer runs with
//!   `(new, old)`, then the setter, then the old-value slot updates
//! - [`Changed`]: same gate, but setter first, then the observer, then the
//!   slot update; an observer error here leaves the write in place
//!
//! The change-gated pair keeps a per-instance old-value slot in a side
//! table keyed by object ID, seeded by wrapping the member's `init` path.
//! An unseeded slot reads as `Null`, so the first write to a never-
//! initialized property always counts as a change (unless it writes `Null`).

use crate::chain::Decorator;
use crate::context::{DecoratorContext, Kind};
use crate::descriptor::{AccessorDescriptor, InitFn, Member, SetFn};
use crate::error::{AccessError, DefineError};
use adorn_core::{Instance, Value};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// An observer invoked with the candidate value of a write
pub type WriteHook = Arc<dyn Fn(&Instance, &Value) -> Result<(), AccessError> + Send + Sync>;

/// An observer invoked with `(new, old)` when a value actually changes
pub type ChangeHook =
    Arc<dyn Fn(&Instance, &Value, &Value) -> Result<(), AccessError> + Send + Sync>;

/// Equality used to gate the change-detecting hooks
pub type EqualsFn = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// Per-instance storage of the previously observed value
type OldValueSlots = Arc<Mutex<FxHashMap<u64, Value>>>;

fn structural_equals() -> EqualsFn {
    Arc::new(|a, b| a == b)
}

/// Reject kinds outside accessor/setter, then extract the wrapped setter
fn writable_descriptor(
    decorator: &'static str,
    member: Member,
    cx: &DecoratorContext,
) -> Result<(AccessorDescriptor, SetFn), DefineError> {
    match cx.kind {
        Kind::Accessor | Kind::Setter => {}
        Kind::Getter | Kind::Method | Kind::Field | Kind::Class => {
            return Err(DefineError::UnsupportedKind {
                decorator,
                kind: cx.kind,
                name: cx.name.clone(),
            });
        }
    }
    let desc = member.into_accessor().ok_or(DefineError::MismatchedMember {
        kind: cx.kind,
        name: cx.name.clone(),
    })?;
    let set = desc.set.clone().ok_or(DefineError::MissingCapability {
        decorator,
        name: cx.name.clone(),
        capability: "setter",
    })?;
    Ok((desc, set))
}

/// Wrap a member's `init` path so each seeded value also lands in the
/// old-value slot for its instance
fn seeding_init(inner: Option<InitFn>, slots: OldValueSlots) -> InitFn {
    Arc::new(move |inst, value| {
        let value = match &inner {
            Some(f) => f(inst, value)?,
            None => value,
        };
        slots.lock().insert(inst.object_id(), value.clone());
        Ok(value)
    })
}

fn old_value(slots: &OldValueSlots, inst: &Instance) -> Value {
    slots
        .lock()
        .get(&inst.object_id())
        .cloned()
        .unwrap_or(Value::Null)
}

/// The `will_set` decorator: observe a write before it happens
pub struct WillSet {
    hook: WriteHook,
}

impl WillSet {
    /// Create a pre-write observer
    pub fn new(
        hook: impl Fn(&Instance, &Value) -> Result<(), AccessError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            hook: Arc::new(hook),
        }
    }
}

impl Decorator for WillSet {
    fn name(&self) -> &'static str {
        "will_set"
    }

    fn apply(&self, member: Member, cx: &DecoratorContext) -> Result<Member, DefineError> {
        let (desc, inner) = writable_descriptor(self.name(), member, cx)?;
        let hook = self.hook.clone();
        let set: SetFn = Arc::new(move |inst, value| {
            hook(inst, &value)?;
            inner(inst, value)
        });
        Ok(Member::Accessor(AccessorDescriptor {
            get: desc.get,
            set: Some(set),
            init: desc.init,
        }))
    }
}

/// The `did_set` decorator: observe a write after it happens
pub struct DidSet {
    hook: WriteHook,
}

impl DidSet {
    /// Create a post-write observer
    pub fn new(
        hook: impl Fn(&Instance, &Value) -> Result<(), AccessError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            hook: Arc::new(hook),
        }
    }
}

impl Decorator for DidSet {
    fn name(&self) -> &'static str {
        "did_set"
    }

    fn apply(&self, member: Member, cx: &DecoratorContext) -> Result<Member, DefineError> {
        let (desc, inner) = writable_descriptor(self.name(), member, cx)?;
        let hook = self.hook.clone();
        let set: SetFn = Arc::new(move |inst, value| {
            inner(inst, value.clone())?;
            hook(inst, &value)
        });
        Ok(Member::Accessor(AccessorDescriptor {
            get: desc.get,
            set: Some(set),
            init: desc.init,
        }))
    }
}

/// The `will_change` decorator: observe a real change before it happens
pub struct WillChange {
    hook: ChangeHook,
    equals: EqualsFn,
}

impl WillChange {
    /// Create a change observer with structural value equality
    pub fn new(
        hook: impl Fn(&Instance, &Value, &Value) -> Result<(), AccessError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            hook: Arc::new(hook),
            equals: structural_equals(),
        }
    }

    /// Replace the equality used to detect changes
    pub fn with_equals(mut self, equals: impl Fn(&Value, &Value) -> bool + Send + Sync + 'static) -> Self {
        self.equals = Arc::new(equals);
        self
    }
}

impl Decorator for WillChange {
    fn name(&self) -> &'static str {
        "will_change"
    }

    fn apply(&self, member: Member, cx: &DecoratorContext) -> Result<Member, DefineError> {
        let (desc, inner) = writable_descriptor(self.name(), member, cx)?;
        let slots: OldValueSlots = Arc::new(Mutex::new(FxHashMap::default()));

        let hook = self.hook.clone();
        let equals = self.equals.clone();
        let write_slots = slots.clone();
        let set: SetFn = Arc::new(move |inst, value| {
            let old = old_value(&write_slots, inst);
            if equals(&value, &old) {
                return Ok(());
            }
            hook(inst, &value, &old)?;
            inner(inst, value.clone())?;
            write_slots.lock().insert(inst.object_id(), value);
            Ok(())
        });

        Ok(Member::Accessor(AccessorDescriptor {
            get: desc.get,
            set: Some(set),
            init: Some(seeding_init(desc.init, slots)),
        }))
    }
}

/// The `changed` decorator: observe a real change after it happens
pub struct Changed {
    hook: ChangeHook,
    equals: EqualsFn,
}

impl Changed {
    /// Create a change observer with structural value equality
    pub fn new(
        hook: impl Fn(&Instance, &Value, &Value) -> Result<(), AccessError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            hook: Arc::new(hook),
            equals: structural_equals(),
        }
    }

    /// Replace the equality used to detect changes
    pub fn with_equals(mut self, equals: impl Fn(&Value, &Value) -> bool + Send + Sync + 'static) -> Self {
        self.equals = Arc::new(equals);
        self
    }
}

impl Decorator for Changed {
    fn name(&self) -> &'static str {
        "changed"
    }

    fn apply(&self, member: Member, cx: &DecoratorContext) -> Result<Member, DefineError> {
        let (desc, inner) = writable_descriptor(self.name(), member, cx)?;
        let slots: OldValueSlots = Arc::new(Mutex::new(FxHashMap::default()));

        let hook = self.hook.clone();
        let equals = self.equals.clone();
        let write_slots = slots.clone();
        let set: SetFn = Arc::new(move |inst, value| {
            let old = old_value(&write_slots, inst);
            if equals(&value, &old) {
                return Ok(());
            }
            inner(inst, value.clone())?;
            hook(inst, &value, &old)?;
            write_slots.lock().insert(inst.object_id(), value);
            Ok(())
        });

        Ok(Member::Accessor(AccessorDescriptor {
            get: desc.get,
            set: Some(set),
            init: Some(seeding_init(desc.init, slots)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn logging_base(log: Log) -> AccessorDescriptor {
        AccessorDescriptor::field_backed("v").with_set(move |inst, value| {
            log.lock().push(format!("store {}", value));
            inst.set_field("v", value);
            Ok(())
        })
    }

    fn apply_one(decorator: &dyn Decorator, base: AccessorDescriptor) -> SetFn {
        let cx = DecoratorContext::new(Kind::Accessor, "v");
        let member = decorator.apply(Member::Accessor(base), &cx).unwrap();
        member.as_accessor().unwrap().set.clone().unwrap()
    }

    #[test]
    fn test_will_set_runs_before_store() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let hook_log = log.clone();
        let will_set = WillSet::new(move |_, v| {
            hook_log.lock().push(format!("will {}", v));
            Ok(())
        });
        let set = apply_one(&will_set, logging_base(log.clone()));

        let inst = Instance::new();
        set(&inst, Value::from(1)).unwrap();
        assert_eq!(*log.lock(), vec!["will 1", "store 1"]);
    }

    #[test]
    fn test_will_set_error_aborts_write() {
        let will_set = WillSet::new(|_, _| Err("nope".into()));
        let set = apply_one(&will_set, AccessorDescriptor::field_backed("v"));
        let inst = Instance::new();
        assert!(set(&inst, Value::from(1)).is_err());
        assert_eq!(inst.get_field("v"), None);
    }

    #[test]
    fn test_did_set_runs_after_store() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let hook_log = log.clone();
        let did_set = DidSet::new(move |_, v| {
            hook_log.lock().push(format!("did {}", v));
            Ok(())
        });
        let set = apply_one(&did_set, logging_base(log.clone()));

        let inst = Instance::new();
        set(&inst, Value::from(2)).unwrap();
        assert_eq!(*log.lock(), vec!["store 2", "did 2"]);
    }

    #[test]
    fn test_did_set_error_leaves_write_in_place() {
        let did_set = DidSet::new(|_, _| Err("post hook failed".into()));
        let set = apply_one(&did_set, AccessorDescriptor::field_backed("v"));
        let inst = Instance::new();
        assert!(set(&inst, Value::from(3)).is_err());
        assert_eq!(inst.get_field("v"), Some(Value::from(3)));
    }

    #[test]
    fn test_will_change_gates_equal_writes() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let hook_log = log.clone();
        let will_change = WillChange::new(move |_, new, old| {
            hook_log.lock().push(format!("{} -> {}", old, new));
            Ok(())
        });
        let set = apply_one(&will_change, AccessorDescriptor::field_backed("v"));

        let inst = Instance::new();
        set(&inst, Value::from(1)).unwrap();
        set(&inst, Value::from(1)).unwrap();
        set(&inst, Value::from(2)).unwrap();
        assert_eq!(*log.lock(), vec!["null -> 1", "1 -> 2"]);
        assert_eq!(inst.get_field("v"), Some(Value::from(2)));
    }

    #[test]
    fn test_will_change_seeded_by_init() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let hook_log = log.clone();
        let will_change = WillChange::new(move |_, new, old| {
            hook_log.lock().push(format!("{} -> {}", old, new));
            Ok(())
        });
        let cx = DecoratorContext::new(Kind::Accessor, "v");
        let member = will_change
            .apply(Member::Accessor(AccessorDescriptor::field_backed("v")), &cx)
            .unwrap();
        let desc = member.into_accessor().unwrap();

        let inst = Instance::new();
        let seeded = (desc.init.unwrap())(&inst, Value::from(5)).unwrap();
        inst.set_field("v", seeded);

        // Writing the seeded value is a no-op; the hook sees the seed as old
        let set = desc.set.unwrap();
        set(&inst, Value::from(5)).unwrap();
        assert!(log.lock().is_empty());
        set(&inst, Value::from(6)).unwrap();
        assert_eq!(*log.lock(), vec!["5 -> 6"]);
    }

    #[test]
    fn test_will_change_error_prevents_write_and_keeps_old() {
        let will_change = WillChange::new(|_, _, _| Err("veto".into()));
        let set = apply_one(&will_change, AccessorDescriptor::field_backed("v"));
        let inst = Instance::new();
        assert!(set(&inst, Value::from(1)).is_err());
        assert_eq!(inst.get_field("v"), None);
        // Old value slot unchanged, so the same write still counts as a change
        assert!(set(&inst, Value::from(1)).is_err());
    }

    #[test]
    fn test_changed_runs_after_store() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let hook_log = log.clone();
        let changed = Changed::new(move |_, new, old| {
            hook_log.lock().push(format!("changed {} -> {}", old, new));
            Ok(())
        });
        let set = apply_one(&changed, logging_base(log.clone()));

        let inst = Instance::new();
        set(&inst, Value::from(1)).unwrap();
        set(&inst, Value::from(1)).unwrap();
        assert_eq!(*log.lock(), vec!["store 1", "changed null -> 1"]);
    }

    #[test]
    fn test_custom_equality() {
        // Case-insensitive equality: rewrites differing only in case are no-ops
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let hook_log = log.clone();
        let changed = Changed::new(move |_, new, _| {
            hook_log.lock().push(new.to_string());
            Ok(())
        })
        .with_equals(|a, b| match (a.as_str(), b.as_str()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => a == b,
        });
        let set = apply_one(&changed, AccessorDescriptor::field_backed("v"));

        let inst = Instance::new();
        set(&inst, Value::str("Hello")).unwrap();
        set(&inst, Value::str("HELLO")).unwrap();
        set(&inst, Value::str("bye")).unwrap();
        assert_eq!(*log.lock(), vec!["Hello", "bye"]);
    }

    #[test]
    fn test_unsupported_kind_rejected() {
        let will_set = WillSet::new(|_, _| Ok(()));
        let cx = DecoratorContext::new(Kind::Class, "v");
        let member = Member::Accessor(AccessorDescriptor::field_backed("v"));
        let err = will_set.apply(member, &cx).unwrap_err();
        assert!(matches!(err, DefineError::UnsupportedKind { .. }));
    }
}
