use std::sync::Arc;

use crate::auth::{AuthorizationAdapter, Permission, ScalarAdapter, TemporalAdapter};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::fields::{json_key_for, required_wire_value, AuthorizedField, FieldAdapter, ScalarField};
use crate::model::Model;
use crate::path::PropertyPath;
use crate::query::QueryBuilder;
use crate::value::{FieldType, Value, WireMap};

/// Path, wire key and type shared by the scalar field kinds.
#[derive(Debug, Clone)]
struct Accessor {
    path: PropertyPath,
    json_key: String,
    field_type: FieldType,
}

impl Accessor {
    fn new(property: &str, field_type: FieldType) -> Result<Self> {
        let path = PropertyPath::parse(property)?;
        Ok(Self {
            json_key: json_key_for(&path, None),
            path,
            field_type,
        })
    }

    fn current_value(&self, model: &dyn Model) -> Result<Value> {
        match self.path.resolve(model)? {
            Some(owner) => owner.get(self.path.attribute()),
            None => Ok(Value::Null),
        }
    }

    fn outgoing(&self, source: &dyn Model, target: &mut WireMap) -> Result<()> {
        let value = self.field_type.to_wire(self.current_value(source)?)?;
        target.insert(self.json_key.clone(), value);
        Ok(())
    }

    fn incoming(&self, source: &WireMap, target: &mut dyn Model) -> Result<()> {
        let value = self
            .field_type
            .from_wire(required_wire_value(source, &self.json_key)?)?;
        let owner = self
            .path
            .resolve_mut(target)?
            .ok_or_else(|| Error::MissingRelation(self.path.to_string()))?;
        owner.set(self.path.attribute(), value)
    }

    fn default_auth_adapter<F: ScalarField>(&self) -> Arc<dyn AuthorizationAdapter<F>> {
        match self.field_type {
            FieldType::DateTime => Arc::new(TemporalAdapter),
            _ => Arc::new(ScalarAdapter),
        }
    }
}

/// A field mapped directly onto an attribute of the backing object.
///
/// # Examples
///
/// ```
/// use resource_fields::{Ctx, FieldAdapter, FieldType, PropertyField, Record, RequestMeta, WireMap};
/// use serde_json::json;
///
/// let field = PropertyField::new("foo", FieldType::Int)
///     .unwrap()
///     .with_json_property("bar");
///
/// let ctx = Ctx::new(RequestMeta::new("req-1"));
/// let mut wire = WireMap::new();
/// field.handle_outgoing(&ctx, &Record::new().with("foo", 20), &mut wire).unwrap();
/// assert_eq!(wire["bar"], json!(20));
/// ```
#[derive(Debug, Clone)]
pub struct PropertyField {
    accessor: Accessor,
    permission: Option<Arc<dyn Permission<PropertyField>>>,
}

impl PropertyField {
    /// Defines a field over the attribute `property`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if `property` is not a single attribute
    /// name. Use [`ForeignPropertyField`] for dotted paths.
    pub fn new(property: &str, field_type: FieldType) -> Result<Self> {
        let accessor = Accessor::new(property, field_type)?;
        if !accessor.path.is_direct() {
            return Err(Error::InvalidPath(property.to_string()));
        }
        Ok(Self {
            accessor,
            permission: None,
        })
    }

    /// Uses `key` as the wire key instead of the derived camelCase name.
    pub fn with_json_property(mut self, key: impl Into<String>) -> Self {
        self.accessor.json_key = key.into();
        self
    }

    /// Guards writes to this field with `permission`.
    pub fn with_permission(mut self, permission: impl Permission<Self> + 'static) -> Self {
        self.permission = Some(Arc::new(permission));
        self
    }

    /// The attribute path.
    pub fn property(&self) -> &PropertyPath {
        &self.accessor.path
    }
}

impl FieldAdapter for PropertyField {
    fn json_key(&self) -> &str {
        &self.accessor.json_key
    }

    fn handle_outgoing(
        &self,
        _ctx: &dyn Context,
        source: &dyn Model,
        target: &mut WireMap,
    ) -> Result<()> {
        self.accessor.outgoing(source, target)
    }

    fn handle_incoming(
        &self,
        _ctx: &dyn Context,
        source: &WireMap,
        target: &mut dyn Model,
    ) -> Result<()> {
        self.accessor.incoming(source, target)
    }
}

impl AuthorizedField for PropertyField {
    fn permission(&self) -> Option<&dyn Permission<Self>> {
        self.permission.as_deref()
    }

    fn default_auth_adapter(&self) -> Arc<dyn AuthorizationAdapter<Self>> {
        self.accessor.default_auth_adapter()
    }
}

impl ScalarField for PropertyField {
    fn field_type(&self) -> FieldType {
        self.accessor.field_type
    }

    fn current_value(&self, model: &dyn Model) -> Result<Value> {
        self.accessor.current_value(model)
    }
}

/// A field reached through one or more relations (`owner.name`).
///
/// The wire key derives from the final segment. When a relation on the way
/// is null, reading yields null and writing fails with
/// [`Error::MissingRelation`].
#[derive(Debug, Clone)]
pub struct ForeignPropertyField {
    accessor: Accessor,
    permission: Option<Arc<dyn Permission<ForeignPropertyField>>>,
}

impl ForeignPropertyField {
    /// Defines a field over the dotted path `property`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if `property` has no dereference hop.
    pub fn new(property: &str, field_type: FieldType) -> Result<Self> {
        let accessor = Accessor::new(property, field_type)?;
        if accessor.path.is_direct() {
            return Err(Error::InvalidPath(property.to_string()));
        }
        Ok(Self {
            accessor,
            permission: None,
        })
    }

    /// Uses `key` as the wire key instead of the derived camelCase name.
    pub fn with_json_property(mut self, key: impl Into<String>) -> Self {
        self.accessor.json_key = key.into();
        self
    }

    /// Guards writes to this field with `permission`.
    pub fn with_permission(mut self, permission: impl Permission<Self> + 'static) -> Self {
        self.permission = Some(Arc::new(permission));
        self
    }

    /// The attribute path.
    pub fn property(&self) -> &PropertyPath {
        &self.accessor.path
    }

    /// Returns `query` configured to eager-load the relations this field
    /// traverses.
    pub fn prepare<Q: QueryBuilder>(&self, query: Q) -> Q {
        match self.accessor.path.eager_path() {
            Some(path) => query.select_related(&path),
            None => query,
        }
    }
}

impl FieldAdapter for ForeignPropertyField {
    fn json_key(&self) -> &str {
        &self.accessor.json_key
    }

    fn handle_outgoing(
        &self,
        _ctx: &dyn Context,
        source: &dyn Model,
        target: &mut WireMap,
    ) -> Result<()> {
        self.accessor.outgoing(source, target)
    }

    fn handle_incoming(
        &self,
        _ctx: &dyn Context,
        source: &WireMap,
        target: &mut dyn Model,
    ) -> Result<()> {
        self.accessor.incoming(source, target)
    }

    fn select_related_path(&self) -> Option<String> {
        self.accessor.path.eager_path()
    }
}

impl AuthorizedField for ForeignPropertyField {
    fn permission(&self) -> Option<&dyn Permission<Self>> {
        self.permission.as_deref()
    }

    fn default_auth_adapter(&self) -> Arc<dyn AuthorizationAdapter<Self>> {
        self.accessor.default_auth_adapter()
    }
}

impl ScalarField for ForeignPropertyField {
    fn field_type(&self) -> FieldType {
        self.accessor.field_type
    }

    fn current_value(&self, model: &dyn Model) -> Result<Value> {
        self.accessor.current_value(model)
    }
}
