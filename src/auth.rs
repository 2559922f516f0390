//! Field-level write authorization.
//!
//! This module provides:
//! - `AuthTriple`: the `(field name, proposed, current)` values a permission compares
//! - `AuthorizationAdapter`: per-field-kind strategies computing that triple
//! - `Permission`: the policy extension point consulted before a write
//! - `Authorization`: the decorator folding the check into a field's incoming handler
//!
//! Adapters are generic over the field kind they read, so an adapter can
//! only be attached to fields whose shape it understands.

mod adapter;
mod decorator;
mod permission;

pub use adapter::{
    AuthorizationAdapter, ScalarAdapter, SubResourceAdapter, TemporalAdapter, UriAdapter,
    UriListAdapter,
};
pub use decorator::{Authorization, Clearance, IncomingHandler};
pub use permission::Permission;

use crate::value::Value;

/// The values a permission object compares before a write.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthTriple {
    /// Wire key of the field
    pub name: String,
    /// Proposed value taken from the inbound wire mapping
    pub source: Value,
    /// Current value read from the backing object
    pub target: Value,
}

impl AuthTriple {
    /// Creates a new triple.
    pub fn new(name: impl Into<String>, source: Value, target: Value) -> Self {
        Self {
            name: name.into(),
            source,
            target,
        }
    }

    /// Returns `true` if the write would not change the current value.
    pub fn is_unchanged(&self) -> bool {
        self.source == self.target
    }
}
