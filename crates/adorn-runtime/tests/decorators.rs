//! End-to-end decorator behavior through class definitions

use adorn_core::Value;
use adorn_runtime::{
    predicate, AccessError, AccessorDescriptor, ClassBuilder, Changed, Decorator, DefineError,
    DidSet, Memoized, Normalize, Validate, WillSet,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn memoized_getter_invokes_underlying_once_per_instance() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let class = ClassBuilder::new("Circle")
        .field("radius", Value::from(2), vec![])
        .getter(
            "area",
            move |inst| {
                counter.fetch_add(1, Ordering::SeqCst);
                let r = inst.get_field("radius").and_then(|v| v.as_int()).unwrap_or(0);
                Ok(Value::from(r * r * 3))
            },
            vec![Arc::new(Memoized::new())],
        )
        .build()
        .unwrap();

    let inst = class.construct(&[]).unwrap();
    for _ in 0..4 {
        assert_eq!(class.get(&inst, "area").unwrap(), Value::from(12));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // The cached value survives even a change to the backing field
    class.set(&inst, "radius", Value::from(10)).unwrap();
    assert_eq!(class.get(&inst, "area").unwrap(), Value::from(12));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Each instance has its own cache slot
    let other = class.construct(&[]).unwrap();
    assert_eq!(class.get(&other, "area").unwrap(), Value::from(12));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn memoized_method_keyed_by_argument_identity() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let class = ClassBuilder::new("Math")
        .method(
            "concat",
            move |_, args| {
                counter.fetch_add(1, Ordering::SeqCst);
                let joined: Vec<String> = args.iter().map(|v| v.to_string()).collect();
                Ok(Value::str(joined.join(",")))
            },
            vec![Arc::new(Memoized::new())],
        )
        .build()
        .unwrap();

    let inst = class.construct(&[]).unwrap();
    let ab = [Value::from(1), Value::from(2)];
    assert_eq!(class.call(&inst, "concat", &ab).unwrap(), Value::str("1,2"));
    assert_eq!(class.call(&inst, "concat", &ab).unwrap(), Value::str("1,2"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let ba = [Value::from(2), Value::from(1)];
    assert_eq!(class.call(&inst, "concat", &ba).unwrap(), Value::str("2,1"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn memoized_constructor_reuses_instances_for_equal_arguments() {
    let class = ClassBuilder::new("Point")
        .field("x", Value::from(0), vec![])
        .constructor(
            |inst, args| {
                if let Some(x) = args.first() {
                    inst.set_field("x", x.clone());
                }
                Ok(())
            },
            vec![Arc::new(Memoized::new())],
        )
        .build()
        .unwrap();

    let a = class.construct(&[Value::from(7)]).unwrap();
    let b = class.construct(&[Value::from(7)]).unwrap();
    assert_eq!(a.object_id(), b.object_id());

    let c = class.construct(&[Value::from(8)]).unwrap();
    assert_ne!(a.object_id(), c.object_id());
    assert_eq!(class.get(&c, "x").unwrap(), Value::from(8));
}

#[test]
fn memoized_method_computes_once_under_concurrency() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let class = Arc::new(
        ClassBuilder::new("Slow")
            .method(
                "compute",
                move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    std::thread::sleep(std::time::Duration::from_millis(20));
                    Ok(Value::from(99))
                },
                vec![Arc::new(Memoized::new())],
            )
            .build()
            .unwrap(),
    );
    let inst = class.construct(&[]).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let class = class.clone();
            let inst = inst.clone();
            std::thread::spawn(move || class.call(&inst, "compute", &[Value::from(1)]).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Value::from(99));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn validation_silently_discards_failing_writes() {
    let is_positive: Arc<dyn Decorator> = Arc::new(
        Validate::new(vec![predicate(|_, v| {
            Ok(v.as_int().is_some_and(|i| i > 0))
        })])
        .unwrap(),
    );

    let class = ClassBuilder::new("C")
        .accessor_with_initial(
            "foo",
            AccessorDescriptor::field_backed("foo"),
            Value::from(5),
            vec![is_positive],
        )
        .build()
        .unwrap();

    let inst = class.construct(&[]).unwrap();
    class.set(&inst, "foo", Value::from(-1)).unwrap();
    assert_eq!(class.get(&inst, "foo").unwrap(), Value::from(5));

    class.set(&inst, "foo", Value::from(10)).unwrap();
    assert_eq!(class.get(&inst, "foo").unwrap(), Value::from(10));
}

#[test]
fn validation_composes_predicates_over_instance_state() {
    let in_range: Arc<dyn Decorator> = Arc::new(
        Validate::new(vec![
            predicate(|_, v| Ok(v.as_int().is_some())),
            predicate(|inst, v| {
                let max = inst.get_field("max").and_then(|m| m.as_int()).unwrap_or(0);
                Ok(v.as_int().is_some_and(|i| i <= max))
            }),
        ])
        .unwrap(),
    );

    let class = ClassBuilder::new("C")
        .field("max", Value::from(10), vec![])
        .accessor(
            "level",
            AccessorDescriptor::field_backed("level"),
            vec![in_range],
        )
        .build()
        .unwrap();

    let inst = class.construct(&[]).unwrap();
    class.set(&inst, "level", Value::from(3)).unwrap();
    assert_eq!(class.get(&inst, "level").unwrap(), Value::from(3));

    // Fails the range predicate
    class.set(&inst, "level", Value::from(11)).unwrap();
    assert_eq!(class.get(&inst, "level").unwrap(), Value::from(3));

    // Fails the numeric predicate
    class.set(&inst, "level", Value::str("high")).unwrap();
    assert_eq!(class.get(&inst, "level").unwrap(), Value::from(3));

    // Raising the bound admits the larger value
    class.set(&inst, "max", Value::from(20)).unwrap();
    class.set(&inst, "level", Value::from(11)).unwrap();
    assert_eq!(class.get(&inst, "level").unwrap(), Value::from(11));
}

#[test]
fn loud_validation_surfaces_rejection() {
    let is_positive: Arc<dyn Decorator> = Arc::new(
        Validate::new(vec![predicate(|_, v| {
            Ok(v.as_int().is_some_and(|i| i > 0))
        })])
        .unwrap()
        .loud(),
    );

    let class = ClassBuilder::new("C")
        .accessor(
            "foo",
            AccessorDescriptor::field_backed("foo"),
            vec![is_positive],
        )
        .build()
        .unwrap();

    let inst = class.construct(&[]).unwrap();
    let err = class.set(&inst, "foo", Value::from(-1)).unwrap_err();
    assert!(matches!(err, AccessError::Rejected { .. }));
}

#[test]
fn normalization_is_total_over_writes_and_defaults() {
    let to_list = || {
        let decorator: Arc<dyn Decorator> = Arc::new(Normalize::new(|_, v| {
            Ok(match v {
                Value::Null => Value::list(vec![]),
                Value::List(_) => v,
                other => Value::list(vec![other]),
            })
        }));
        decorator
    };

    let class = ClassBuilder::new("C")
        .field("items", Value::from(9), vec![to_list()])
        .accessor(
            "extra",
            AccessorDescriptor::field_backed("extra"),
            vec![to_list()],
        )
        .build()
        .unwrap();

    let inst = class.construct(&[]).unwrap();
    // The field default was normalized during seeding
    assert_eq!(
        class.get(&inst, "items").unwrap(),
        Value::list(vec![Value::from(9)])
    );

    class.set(&inst, "extra", Value::from(5)).unwrap();
    assert_eq!(
        class.get(&inst, "extra").unwrap(),
        Value::list(vec![Value::from(5)])
    );

    let list = Value::list(vec![Value::from(1), Value::from(2)]);
    class.set(&inst, "extra", list.clone()).unwrap();
    assert_eq!(class.get(&inst, "extra").unwrap(), list);

    class.set(&inst, "extra", Value::Null).unwrap();
    assert_eq!(class.get(&inst, "extra").unwrap(), Value::list(vec![]));
}

#[test]
fn will_set_and_did_set_bracket_the_store() {
    let log = new_log();
    let before = log.clone();
    let after = log.clone();
    let stored = log.clone();

    let base = AccessorDescriptor::new()
        .with_get(|inst| Ok(inst.get_field("v").unwrap_or(Value::Null)))
        .with_set(move |inst, value| {
            stored.lock().push(format!("store {}", value));
            inst.set_field("v", value);
            Ok(())
        });

    let class = ClassBuilder::new("C")
        .accessor(
            "v",
            base,
            vec![
                Arc::new(DidSet::new(move |_, v| {
                    after.lock().push(format!("after {}", v));
                    Ok(())
                })),
                Arc::new(WillSet::new(move |_, v| {
                    before.lock().push(format!("before {}", v));
                    Ok(())
                })),
            ],
        )
        .build()
        .unwrap();

    let inst = class.construct(&[]).unwrap();
    class.set(&inst, "v", Value::from(1)).unwrap();
    assert_eq!(*log.lock(), vec!["before 1", "store 1", "after 1"]);
}

#[test]
fn changed_gates_on_seeded_initial_value() {
    let log = new_log();
    let hook_log = log.clone();

    let class = ClassBuilder::new("C")
        .accessor_with_initial(
            "v",
            AccessorDescriptor::field_backed("v"),
            Value::from(5),
            vec![Arc::new(Changed::new(move |_, new, old| {
                hook_log.lock().push(format!("{} -> {}", old, new));
                Ok(())
            }))],
        )
        .build()
        .unwrap();

    let inst = class.construct(&[]).unwrap();
    // Seeding is not a change notification
    assert!(log.lock().is_empty());

    // Equal to the seeded value: complete no-op
    class.set(&inst, "v", Value::from(5)).unwrap();
    assert!(log.lock().is_empty());

    class.set(&inst, "v", Value::from(6)).unwrap();
    class.set(&inst, "v", Value::from(6)).unwrap();
    assert_eq!(*log.lock(), vec!["5 -> 6"]);
    assert_eq!(class.get(&inst, "v").unwrap(), Value::from(6));
}

#[test]
fn composition_order_is_observable() {
    let abs = || {
        let d: Arc<dyn Decorator> = Arc::new(Normalize::new(|_, v| {
            Ok(match v.as_int() {
                Some(i) => Value::from(i.abs()),
                None => v,
            })
        }));
        d
    };
    let positive = || {
        let d: Arc<dyn Decorator> = Arc::new(
            Validate::new(vec![predicate(|_, v| {
                Ok(v.as_int().is_some_and(|i| i > 0))
            })])
            .unwrap(),
        );
        d
    };

    // validate listed last is outermost: it sees the raw -5 and rejects
    let validate_outer = ClassBuilder::new("A")
        .accessor(
            "v",
            AccessorDescriptor::field_backed("v"),
            vec![abs(), positive()],
        )
        .build()
        .unwrap();
    let inst = validate_outer.construct(&[]).unwrap();
    validate_outer.set(&inst, "v", Value::from(-5)).unwrap();
    assert_eq!(validate_outer.get(&inst, "v").unwrap(), Value::Null);

    // normalize listed last is outermost: -5 becomes 5 before validation
    let normalize_outer = ClassBuilder::new("B")
        .accessor(
            "v",
            AccessorDescriptor::field_backed("v"),
            vec![positive(), abs()],
        )
        .build()
        .unwrap();
    let inst = normalize_outer.construct(&[]).unwrap();
    normalize_outer.set(&inst, "v", Value::from(-5)).unwrap();
    assert_eq!(normalize_outer.get(&inst, "v").unwrap(), Value::from(5));
}

#[test]
fn misapplication_fails_the_class_definition() {
    // memoized cannot decorate a bare setter
    let err = ClassBuilder::new("C")
        .setter(
            "sink",
            |inst, value| {
                inst.set_field("sink", value);
                Ok(())
            },
            vec![Arc::new(Memoized::new())],
        )
        .build()
        .unwrap_err();
    assert!(matches!(err, DefineError::UnsupportedKind { .. }));

    // validate requires at least one predicate, at construction time
    let err = Validate::new(vec![]).unwrap_err();
    assert!(matches!(err, DefineError::Configuration { .. }));
}

#[test]
fn user_callback_errors_propagate_to_the_writer() {
    let exploding: Arc<dyn Decorator> = Arc::new(
        Validate::new(vec![predicate(|_, v| {
            if v.is_null() {
                Err("null is not a value".into())
            } else {
                Ok(true)
            }
        })])
        .unwrap(),
    );

    let class = ClassBuilder::new("C")
        .accessor(
            "v",
            AccessorDescriptor::field_backed("v"),
            vec![exploding],
        )
        .build()
        .unwrap();

    let inst = class.construct(&[]).unwrap();
    class.set(&inst, "v", Value::from(1)).unwrap();

    let err = class.set(&inst, "v", Value::Null).unwrap_err();
    assert_eq!(err.to_string(), "null is not a value");
    assert_eq!(class.get(&inst, "v").unwrap(), Value::from(1));
}
