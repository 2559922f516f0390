//! Field adapters.
//!
//! A field adapter moves one logical attribute between a backing object and
//! a wire mapping. Every field kind also names the authorization adapter
//! that matches its shape, so the write check is assembled together with
//! the field when the schema is defined.

mod property;
mod sub_resource;
mod uri;

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

pub use property::{ForeignPropertyField, PropertyField};
pub use sub_resource::SubResourceField;
pub use uri::{UriField, UriListField};

use crate::auth::{Authorization, AuthorizationAdapter, IncomingHandler, Permission};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::path::{to_camel_case, PropertyPath};
use crate::query::QueryBuilder;
use crate::value::{FieldType, Value, WireMap};

/// Reads and writes one attribute in both directions.
pub trait FieldAdapter: fmt::Debug + Send + Sync {
    /// The key this field occupies in wire mappings.
    fn json_key(&self) -> &str;

    /// Reads the attribute from `source` and stores it in `target` under
    /// the wire key.
    fn handle_outgoing(&self, ctx: &dyn Context, source: &dyn Model, target: &mut WireMap)
        -> Result<()>;

    /// Reads the wire key from `source` and writes the attribute onto
    /// `target`. No authorization is performed here.
    fn handle_incoming(&self, ctx: &dyn Context, source: &WireMap, target: &mut dyn Model)
        -> Result<()>;

    /// Relation path worth eager-loading when reading this field.
    fn select_related_path(&self) -> Option<String> {
        None
    }
}

/// A field kind that can be guarded by a permission.
pub trait AuthorizedField: FieldAdapter + Sized + 'static {
    /// The permission attached to this field, if any.
    fn permission(&self) -> Option<&dyn Permission<Self>>;

    /// The authorization adapter matching this field kind.
    fn default_auth_adapter(&self) -> Arc<dyn AuthorizationAdapter<Self>>;
}

/// A field holding a single scalar attribute.
pub trait ScalarField: AuthorizedField {
    /// Declared type used for coercion.
    fn field_type(&self) -> FieldType;

    /// The attribute's current value on `model`, unconverted.
    ///
    /// Null when a relation on the way is null.
    fn current_value(&self, model: &dyn Model) -> Result<Value>;
}

/// A field as stored on a resource schema.
///
/// Holds the adapter and its incoming handler with the authorization check
/// already folded in.
///
/// # Examples
///
/// ```
/// use resource_fields::{Ctx, Field, FieldType, Model, PropertyField, Record, RequestMeta, WireMap};
/// use serde_json::json;
///
/// let field: Field = PropertyField::new("first_name", FieldType::Text).unwrap().into();
/// assert_eq!(field.json_key(), "firstName");
///
/// let ctx = Ctx::new(RequestMeta::new("req-1"));
/// let mut wire = WireMap::new();
/// wire.insert("firstName".to_string(), json!("Ada"));
///
/// let mut person = Record::new();
/// field.handle_incoming(&ctx, &wire, &mut person).unwrap();
/// assert_eq!(person.get("first_name").unwrap().as_str(), Some("Ada"));
/// ```
#[derive(Clone)]
pub struct Field {
    adapter: Arc<dyn FieldAdapter>,
    incoming: IncomingHandler,
}

impl Field {
    /// Builds a field guarded by its kind's default authorization adapter.
    pub fn new<F: AuthorizedField>(field: F) -> Self {
        let adapter = field.default_auth_adapter();
        Self::with_authorization(field, Authorization::from_arc(adapter))
    }

    /// Builds a field guarded by the given decorator.
    pub fn with_authorization<F: AuthorizedField>(field: F, authorization: Authorization<F>) -> Self {
        let field = Arc::new(field);
        let incoming = authorization.wrap(Arc::clone(&field), F::handle_incoming);
        Self {
            adapter: field,
            incoming,
        }
    }

    /// The key this field occupies in wire mappings.
    pub fn json_key(&self) -> &str {
        self.adapter.json_key()
    }

    /// Serializes the attribute from `source` into `target`.
    pub fn handle_outgoing(
        &self,
        ctx: &dyn Context,
        source: &dyn Model,
        target: &mut WireMap,
    ) -> Result<()> {
        self.adapter.handle_outgoing(ctx, source, target)
    }

    /// Authorizes and applies the write of `source` onto `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authorization`] without touching `target` if the
    /// field's permission denies the write.
    pub fn handle_incoming(
        &self,
        ctx: &dyn Context,
        source: &WireMap,
        target: &mut dyn Model,
    ) -> Result<()> {
        (self.incoming)(ctx, source, target)
    }

    /// Relation path worth eager-loading when reading this field.
    pub fn select_related_path(&self) -> Option<String> {
        self.adapter.select_related_path()
    }

    /// Adds this field's eager-load hint to `query`.
    pub fn prepare<Q: QueryBuilder>(&self, query: Q) -> Q {
        match self.select_related_path() {
            Some(path) => query.select_related(&path),
            None => query,
        }
    }
}

impl<F: AuthorizedField> From<F> for Field {
    fn from(field: F) -> Self {
        Field::new(field)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.adapter, f)
    }
}

/// Wire key for a property: the override if given, otherwise the camelCase
/// form of the final path segment.
pub(crate) fn json_key_for(path: &PropertyPath, json_property: Option<String>) -> String {
    json_property.unwrap_or_else(|| to_camel_case(path.attribute()))
}

/// Looks up a key the inbound mapping must carry.
pub(crate) fn required_wire_value<'a>(source: &'a WireMap, key: &str) -> Result<&'a JsonValue> {
    source
        .get(key)
        .ok_or_else(|| Error::MissingField(key.to_string()))
}

/// Reads a wire list of resource identifiers, sorted.
pub(crate) fn sorted_uris(field: &str, items: &[JsonValue]) -> Result<Vec<String>> {
    let mut uris = items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::InvalidValue {
                    field: field.to_string(),
                    reason: format!("expected a resource URI, got {}", item),
                })
        })
        .collect::<Result<Vec<_>>>()?;
    uris.sort();
    Ok(uris)
}
