//! Class definition registry
//!
//! The builder collects member declarations with their decorator lists, then
//! `build()` composes every chain and produces an immutable [`ClassDef`].
//! Chains are built exactly once, at definition time; every later property
//! access goes through the installed members.
//!
//! Initialization is not a write: members with an initial value seed storage
//! through the composed `init` chain and then the *base* storage path
//! snapshotted before decoration, so write hooks and validation do not fire
//! during construction, but normalization and old-value seeding do apply.

use crate::chain::{compose, Decorator};
use crate::context::{DecoratorContext, Kind};
use crate::descriptor::{
    AccessorDescriptor, ConstructorDescriptor, CtorFn, InitFn, Member, MethodDescriptor, SetFn,
};
use crate::error::{AccessError, DefineError};
use adorn_core::{Instance, InstanceRef, Value};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// A user-supplied constructor body, run after field seeding
pub type CtorBody = Arc<dyn Fn(&Instance, &[Value]) -> Result<(), AccessError> + Send + Sync>;

struct MemberDecl {
    name: String,
    kind: Kind,
    base: Member,
    decorators: Vec<Arc<dyn Decorator>>,
    initial: Option<Value>,
    /// Base storage path, snapshotted before decoration, used for seeding
    store: Option<SetFn>,
}

/// Seeding recipe for one member with an initial value
struct Seed {
    init: Option<InitFn>,
    value: Value,
    store: SetFn,
}

/// Builder for a class definition
pub struct ClassBuilder {
    name: String,
    members: Vec<MemberDecl>,
    constructor: Option<(CtorBody, Vec<Arc<dyn Decorator>>)>,
}

impl ClassBuilder {
    /// Start defining a class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            constructor: None,
        }
    }

    fn push(
        mut self,
        name: impl Into<String>,
        kind: Kind,
        base: Member,
        decorators: Vec<Arc<dyn Decorator>>,
        initial: Option<Value>,
        store: Option<SetFn>,
    ) -> Self {
        self.members.push(MemberDecl {
            name: name.into(),
            kind,
            base,
            decorators,
            initial,
            store,
        });
        self
    }

    /// Register a get/set accessor
    pub fn accessor(
        self,
        name: impl Into<String>,
        desc: AccessorDescriptor,
        decorators: Vec<Arc<dyn Decorator>>,
    ) -> Self {
        self.push(name, Kind::Accessor, Member::Accessor(desc), decorators, None, None)
    }

    /// Register a get/set accessor whose backing value is seeded at construction
    pub fn accessor_with_initial(
        self,
        name: impl Into<String>,
        desc: AccessorDescriptor,
        initial: Value,
        decorators: Vec<Arc<dyn Decorator>>,
    ) -> Self {
        let store = desc.set.clone();
        self.push(
            name,
            Kind::Accessor,
            Member::Accessor(desc),
            decorators,
            Some(initial),
            store,
        )
    }

    /// Register a read-only accessor
    pub fn getter(
        self,
        name: impl Into<String>,
        get: impl Fn(&Instance) -> Result<Value, AccessError> + Send + Sync + 'static,
        decorators: Vec<Arc<dyn Decorator>>,
    ) -> Self {
        let desc = AccessorDescriptor::new().with_get(get);
        self.push(name, Kind::Getter, Member::Accessor(desc), decorators, None, None)
    }

    /// Register a write-only accessor
    pub fn setter(
        self,
        name: impl Into<String>,
        set: impl Fn(&Instance, Value) -> Result<(), AccessError> + Send + Sync + 'static,
        decorators: Vec<Arc<dyn Decorator>>,
    ) -> Self {
        let desc = AccessorDescriptor::new().with_set(set);
        self.push(name, Kind::Setter, Member::Accessor(desc), decorators, None, None)
    }

    /// Register a stored field with a default value
    ///
    /// The field is backed by instance storage under its own name; its
    /// default is seeded at construction through the composed `init` chain.
    pub fn field(
        self,
        name: impl Into<String>,
        default: Value,
        decorators: Vec<Arc<dyn Decorator>>,
    ) -> Self {
        let name = name.into();
        let desc = AccessorDescriptor::field_backed(&name);
        let raw_field = name.clone();
        let store: SetFn = Arc::new(move |inst, value| {
            inst.set_field(&raw_field, value);
            Ok(())
        });
        self.push(
            name,
            Kind::Field,
            Member::Accessor(desc),
            decorators,
            Some(default),
            Some(store),
        )
    }

    /// Register an argument-taking method
    pub fn method(
        self,
        name: impl Into<String>,
        call: impl Fn(&Instance, &[Value]) -> Result<Value, AccessError> + Send + Sync + 'static,
        decorators: Vec<Arc<dyn Decorator>>,
    ) -> Self {
        let desc = MethodDescriptor::new(call);
        self.push(name, Kind::Method, Member::Method(desc), decorators, None, None)
    }

    /// Register a constructor body, run after field seeding
    pub fn constructor(
        mut self,
        body: impl Fn(&Instance, &[Value]) -> Result<(), AccessError> + Send + Sync + 'static,
        decorators: Vec<Arc<dyn Decorator>>,
    ) -> Self {
        self.constructor = Some((Arc::new(body), decorators));
        self
    }

    /// Compose every decorator chain and produce the immutable class
    ///
    /// Fails fast: any chain error aborts the build with nothing installed.
    pub fn build(self) -> Result<ClassDef, DefineError> {
        let mut members: FxHashMap<String, Member> = FxHashMap::default();
        let mut seeds: Vec<Seed> = Vec::new();

        for decl in self.members {
            let MemberDecl {
                name,
                kind,
                base,
                decorators,
                initial,
                store,
            } = decl;
            if members.contains_key(&name) {
                return Err(DefineError::DuplicateMember { name });
            }

            let cx = DecoratorContext::new(kind, name.clone());
            let member = compose(base, &cx, &decorators)?;

            if let Some(value) = initial {
                let store = store.ok_or(DefineError::MissingCapability {
                    decorator: "initial",
                    name: name.clone(),
                    capability: "setter",
                })?;
                let init = member.as_accessor().and_then(|d| d.init.clone());
                seeds.push(Seed { init, value, store });
            }

            members.insert(name, member);
        }

        // Base constructor: allocate, seed initial values, run the body
        let seeds = Arc::new(seeds);
        let (body, ctor_decorators) = match self.constructor {
            Some((body, decorators)) => (Some(body), decorators),
            None => (None, Vec::new()),
        };
        let base_ctor: CtorFn = Arc::new(move |args| {
            let inst: InstanceRef = Arc::new(Instance::new());
            for seed in seeds.iter() {
                let value = match &seed.init {
                    Some(f) => f(&inst, seed.value.clone())?,
                    None => seed.value.clone(),
                };
                (seed.store)(&inst, value)?;
            }
            if let Some(body) = &body {
                body(&inst, args)?;
            }
            Ok(inst)
        });

        let cx = DecoratorContext::new(Kind::Class, self.name.clone());
        let ctor_member = compose(
            Member::Constructor(ConstructorDescriptor { construct: base_ctor }),
            &cx,
            &ctor_decorators,
        )?;
        let constructor = match ctor_member {
            Member::Constructor(desc) => desc.construct,
            _ => {
                return Err(DefineError::MismatchedMember {
                    kind: Kind::Class,
                    name: self.name,
                })
            }
        };

        Ok(ClassDef {
            name: self.name,
            members,
            constructor,
        })
    }
}

/// An immutable class definition with all decorator chains installed
pub struct ClassDef {
    name: String,
    members: FxHashMap<String, Member>,
    constructor: CtorFn,
}

impl ClassDef {
    /// The class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if a member with this name exists
    pub fn has_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Construct an instance through the (possibly decorated) constructor
    pub fn construct(&self, args: &[Value]) -> Result<InstanceRef, AccessError> {
        (self.constructor)(args)
    }

    /// Read a property through its installed chain
    pub fn get(&self, inst: &Instance, name: &str) -> Result<Value, AccessError> {
        let member = self.member(name)?;
        let get = member
            .as_accessor()
            .and_then(|d| d.get.clone())
            .ok_or_else(|| AccessError::NotReadable {
                name: name.to_string(),
            })?;
        get(inst)
    }

    /// Write a property through its installed chain
    pub fn set(&self, inst: &Instance, name: &str, value: Value) -> Result<(), AccessError> {
        let member = self.member(name)?;
        let set = member
            .as_accessor()
            .and_then(|d| d.set.clone())
            .ok_or_else(|| AccessError::NotWritable {
                name: name.to_string(),
            })?;
        set(inst, value)
    }

    /// Call a method through its installed chain
    pub fn call(&self, inst: &Instance, name: &str, args: &[Value]) -> Result<Value, AccessError> {
        match self.member(name)? {
            Member::Method(desc) => (desc.call)(inst, args),
            _ => Err(AccessError::NotCallable {
                name: name.to_string(),
            }),
        }
    }

    fn member(&self, name: &str) -> Result<&Member, AccessError> {
        self.members.get(name).ok_or_else(|| AccessError::NoSuchMember {
            class: self.name.clone(),
            name: name.to_string(),
        })
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}
