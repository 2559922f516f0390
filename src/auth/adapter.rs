use std::fmt;

use serde_json::Value as JsonValue;

use crate::auth::AuthTriple;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::fields::{
    required_wire_value, sorted_uris, FieldAdapter, ScalarField, SubResourceField, UriField,
    UriListField,
};
use crate::model::Model;
use crate::resource::RESOURCE_URI_KEY;
use crate::value::{Value, WireMap};

/// Computes the values a permission compares for one field kind.
///
/// `F` is the field kind. Each field kind names a default adapter; a
/// permission object may supply its own for the same kind.
pub trait AuthorizationAdapter<F>: fmt::Debug + Send + Sync {
    /// Builds the `(name, proposed, current)` triple for a write of
    /// `source` onto `target`.
    fn triple(
        &self,
        field: &F,
        ctx: &dyn Context,
        source: &WireMap,
        target: &dyn Model,
    ) -> Result<AuthTriple>;
}

/// Adapter for single-valued scalar fields.
///
/// Both sides are converted with the field's declared type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarAdapter;

impl<F: ScalarField> AuthorizationAdapter<F> for ScalarAdapter {
    fn triple(
        &self,
        field: &F,
        _ctx: &dyn Context,
        source: &WireMap,
        target: &dyn Model,
    ) -> Result<AuthTriple> {
        let name = field.json_key();
        let field_type = field.field_type();
        let proposed = field_type.from_wire(required_wire_value(source, name)?)?;
        let current = field_type.coerce(field.current_value(target)?)?;
        Ok(AuthTriple::new(name, proposed, current))
    }
}

/// Adapter for date, time and datetime fields.
///
/// The current value is already a native timestamp on the backing object and
/// is compared as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalAdapter;

impl<F: ScalarField> AuthorizationAdapter<F> for TemporalAdapter {
    fn triple(
        &self,
        field: &F,
        _ctx: &dyn Context,
        source: &WireMap,
        target: &dyn Model,
    ) -> Result<AuthTriple> {
        let name = field.json_key();
        let proposed = field
            .field_type()
            .from_wire(required_wire_value(source, name)?)?;
        let current = field.current_value(target)?;
        Ok(AuthTriple::new(name, proposed, current))
    }
}

/// Adapter for nested sub-resource fields.
///
/// Compares the nested mapping's `resourceUri` against the identifier of the
/// sub-object currently attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubResourceAdapter;

impl AuthorizationAdapter<SubResourceField> for SubResourceAdapter {
    fn triple(
        &self,
        field: &SubResourceField,
        ctx: &dyn Context,
        source: &WireMap,
        target: &dyn Model,
    ) -> Result<AuthTriple> {
        let name = field.json_key();
        let proposed = match required_wire_value(source, name)? {
            JsonValue::Null => Value::Null,
            JsonValue::Object(nested) => nested
                .get(RESOURCE_URI_KEY)
                .map_or(Value::Null, Value::from_wire),
            _ => {
                return Err(Error::InvalidValue {
                    field: name.to_string(),
                    reason: "expected an object".to_string(),
                })
            }
        };
        let current = field.current_uri(ctx, target)?;
        Ok(AuthTriple::new(name, proposed, current))
    }
}

/// Adapter for single resource-identifier fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriAdapter;

impl AuthorizationAdapter<UriField> for UriAdapter {
    fn triple(
        &self,
        field: &UriField,
        ctx: &dyn Context,
        source: &WireMap,
        target: &dyn Model,
    ) -> Result<AuthTriple> {
        let name = field.json_key();
        let proposed = source.get(name).map_or(Value::Null, Value::from_wire);
        let current = field.current_uri(ctx, target)?;
        Ok(AuthTriple::new(name, proposed, current))
    }
}

/// Adapter for resource-identifier list fields.
///
/// Both lists are sorted so the comparison ignores order.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriListAdapter;

impl AuthorizationAdapter<UriListField> for UriListAdapter {
    fn triple(
        &self,
        field: &UriListField,
        ctx: &dyn Context,
        source: &WireMap,
        target: &dyn Model,
    ) -> Result<AuthTriple> {
        let name = field.json_key();
        let proposed = match source.get(name) {
            None | Some(JsonValue::Null) => Value::Null,
            Some(JsonValue::Array(items)) => {
                Value::List(sorted_uris(name, items)?.into_iter().map(Value::Text).collect())
            }
            Some(_) => {
                return Err(Error::InvalidValue {
                    field: name.to_string(),
                    reason: "expected a list of resource URIs".to_string(),
                })
            }
        };
        let current = field.current_uris(ctx, target)?;
        Ok(AuthTriple::new(name, proposed, current))
    }
}
