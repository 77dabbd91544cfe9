//! Decoration-site metadata
//!
//! `Kind` tags the syntactic construct a decorator is applied to. It is a
//! closed enum: every strategy matches on it exhaustively and rejects
//! variants it does not support with [`DefineError::UnsupportedKind`]
//! rather than falling through silently.
//!
//! [`DefineError::UnsupportedKind`]: crate::error::DefineError::UnsupportedKind

use std::fmt;

/// The kind of class member being decorated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A get/set pair governing one logical property
    Accessor,
    /// A read-only accessor (get half only)
    Getter,
    /// A write-only accessor (set half only)
    Setter,
    /// An argument-taking instance method
    Method,
    /// A stored field with an initial value
    Field,
    /// The class constructor
    Class,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Accessor => "accessor",
            Kind::Getter => "getter",
            Kind::Setter => "setter",
            Kind::Method => "method",
            Kind::Field => "field",
            Kind::Class => "class",
        };
        write!(f, "{}", name)
    }
}

/// Metadata passed alongside a member descriptor during decoration
///
/// Constructed fresh for each decorator application and read-only; nothing
/// retains it after the decorator returns.
#[derive(Debug, Clone)]
pub struct DecoratorContext {
    /// Kind of member being decorated
    pub kind: Kind,
    /// Name of the property, method, or class
    pub name: String,
}

impl DecoratorContext {
    /// Create a context for one decoration site
    pub fn new(kind: Kind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}
