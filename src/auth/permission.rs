use std::fmt;

use crate::auth::AuthorizationAdapter;
use crate::context::Context;
use crate::model::Model;
use crate::value::Value;

/// A write policy attached to a field.
///
/// `F` is the field kind the permission is attached to. Policies that do not
/// care about the field kind implement this generically over `F`.
///
/// # Examples
///
/// ```
/// use resource_fields::{Context, Model, Permission, Value};
///
/// /// Only lets a field be set once.
/// #[derive(Debug)]
/// struct WriteOnce;
///
/// impl<F> Permission<F> for WriteOnce {
///     fn is_write_authorized(
///         &self,
///         _ctx: &dyn Context,
///         _target: &dyn Model,
///         source: &Value,
///         current: &Value,
///     ) -> bool {
///         current.is_null() || source == current
///     }
/// }
/// ```
pub trait Permission<F>: fmt::Debug + Send + Sync {
    /// Decides whether `target` may have the field changed from `current`
    /// to `source`.
    fn is_write_authorized(
        &self,
        ctx: &dyn Context,
        target: &dyn Model,
        source: &Value,
        current: &Value,
    ) -> bool;

    /// Adapter to compute the compared values with, overriding the one the
    /// field was defined with.
    fn auth_adapter(&self) -> Option<&dyn AuthorizationAdapter<F>> {
        None
    }
}
