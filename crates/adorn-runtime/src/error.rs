//! Error types for the decorator runtime
//!
//! Two enums, one per failure phase: [`DefineError`] covers class-definition
//! time (decorator misconfiguration, kind mismatches) and always aborts the
//! definition with nothing installed; [`AccessError`] covers property-access
//! time. Errors raised by user callbacks travel as
//! [`AccessError::User`] and propagate unmodified through the chain.

use crate::context::Kind;
use thiserror::Error;

/// Errors raised while defining a class (composing decorator chains)
///
/// All of these are unrecoverable for the definition in progress: the chain
/// is abandoned and no member is installed.
#[derive(Debug, Error, Clone)]
pub enum DefineError {
    /// A decorator was applied to a member kind it does not support
    #[error("decorator '{decorator}' cannot be applied to {kind} '{name}'")]
    UnsupportedKind {
        /// Name of the offending decorator
        decorator: &'static str,
        /// The unsupported kind
        kind: Kind,
        /// Name of the member being decorated
        name: String,
    },

    /// A decorator factory was misconfigured
    #[error("decorator '{decorator}' is misconfigured: {reason}")]
    Configuration {
        /// Name of the offending decorator
        decorator: &'static str,
        /// What was wrong with the configuration
        reason: String,
    },

    /// The member lacks a capability the decorator needs
    #[error("decorator '{decorator}' requires a {capability} on '{name}'")]
    MissingCapability {
        /// Name of the offending decorator
        decorator: &'static str,
        /// Name of the member being decorated
        name: String,
        /// The missing capability ("getter" or "setter")
        capability: &'static str,
    },

    /// Context kind and member shape disagree
    #[error("{kind} '{name}' has an incompatible member shape")]
    MismatchedMember {
        /// The declared kind
        kind: Kind,
        /// Name of the member
        name: String,
    },

    /// The same member name was registered twice on one class
    #[error("duplicate member '{name}'")]
    DuplicateMember {
        /// The duplicated name
        name: String,
    },
}

/// Errors raised while accessing a property on an instance
#[derive(Debug, Error, Clone)]
pub enum AccessError {
    /// No member with this name exists on the class
    #[error("class '{class}' has no member '{name}'")]
    NoSuchMember {
        /// Class name
        class: String,
        /// Requested member name
        name: String,
    },

    /// The member has no getter
    #[error("property '{name}' is not readable")]
    NotReadable {
        /// Member name
        name: String,
    },

    /// The member has no setter
    #[error("property '{name}' is not writable")]
    NotWritable {
        /// Member name
        name: String,
    },

    /// The member is not a method
    #[error("member '{name}' is not callable")]
    NotCallable {
        /// Member name
        name: String,
    },

    /// A loud validation strategy rejected the write
    #[error("validation rejected write to '{name}'")]
    Rejected {
        /// Member name
        name: String,
    },

    /// An error surfaced by a user-supplied callback
    #[error("{0}")]
    User(String),
}

impl From<String> for AccessError {
    fn from(s: String) -> Self {
        AccessError::User(s)
    }
}

impl From<&str> for AccessError {
    fn from(s: &str) -> Self {
        AccessError::User(s.to_string())
    }
}
