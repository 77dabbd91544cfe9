//! Decorator chain composition
//!
//! The composer takes a base member, a decoration context, and an ordered
//! list of decorators, and produces the final member to install. Decorators
//! apply strictly left-to-right in declaration order; each receives the
//! output of the previous one.
//!
//! # Composition order
//!
//! Because the first-listed decorator wraps the base member, it ends up
//! *innermost*; the last-listed decorator is *outermost* and observes a
//! write first. So `[normalize(f), validate(p)]` validates the raw candidate
//! value and normalizes only accepted writes, while
//! `[validate(p), normalize(f)]` normalizes first and validates the
//! normalized value. This order is fixed and relied on by the strategies'
//! tests.

use crate::context::{DecoratorContext, Kind};
use crate::descriptor::Member;
use crate::error::DefineError;
use std::sync::Arc;

/// A behavioral decorator: consumes one member descriptor, produces a new one
///
/// Implementations must match exhaustively on `cx.kind` and reject variants
/// they do not support with [`DefineError::UnsupportedKind`]; a silent
/// no-op on an unsupported kind is a contract violation.
pub trait Decorator: Send + Sync {
    /// The decorator's name, used in error messages
    fn name(&self) -> &'static str;

    /// Apply this decorator to a member at the given decoration site
    fn apply(&self, member: Member, cx: &DecoratorContext) -> Result<Member, DefineError>;
}

/// Compose a decorator chain over a base member
///
/// Validates the base member's shape against the context kind, then applies
/// each decorator in declaration order, re-checking the shape after every
/// step so a decorator cannot hand back a member of the wrong kind or strip
/// a capability the kind requires. Any error aborts composition; nothing is
/// installed.
pub fn compose(
    base: Member,
    cx: &DecoratorContext,
    decorators: &[Arc<dyn Decorator>],
) -> Result<Member, DefineError> {
    check_shape(&base, cx)?;
    let mut member = base;
    for decorator in decorators {
        member = decorator.apply(member, cx)?;
        check_shape(&member, cx)?;
    }
    Ok(member)
}

/// Check that a member's shape and capabilities match its declared kind
fn check_shape(member: &Member, cx: &DecoratorContext) -> Result<(), DefineError> {
    let mismatch = || DefineError::MismatchedMember {
        kind: cx.kind,
        name: cx.name.clone(),
    };
    match cx.kind {
        Kind::Accessor => {
            let desc = member.as_accessor().ok_or_else(mismatch)?;
            if !desc.is_readable() && !desc.is_writable() {
                return Err(mismatch());
            }
        }
        Kind::Getter => {
            let desc = member.as_accessor().ok_or_else(mismatch)?;
            if !desc.is_readable() {
                return Err(mismatch());
            }
        }
        Kind::Setter => {
            let desc = member.as_accessor().ok_or_else(mismatch)?;
            if !desc.is_writable() {
                return Err(mismatch());
            }
        }
        Kind::Field => {
            member.as_accessor().ok_or_else(mismatch)?;
        }
        Kind::Method => {
            if !matches!(member, Member::Method(_)) {
                return Err(mismatch());
            }
        }
        Kind::Class => {
            if !matches!(member, Member::Constructor(_)) {
                return Err(mismatch());
            }
        }
    }
    Ok(())
}
