use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::auth::{AuthorizationAdapter, Permission, UriAdapter, UriListAdapter};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::fields::{json_key_for, required_wire_value, sorted_uris, AuthorizedField, FieldAdapter};
use crate::model::Model;
use crate::path::PropertyPath;
use crate::resource::ResourceSchema;
use crate::value::{Value, WireMap};

/// A field whose value is the resource identifier of a related object.
#[derive(Debug, Clone)]
pub struct UriField {
    path: PropertyPath,
    json_key: String,
    resource: Arc<ResourceSchema>,
    permission: Option<Arc<dyn Permission<UriField>>>,
}

impl UriField {
    /// Defines a field over the relation `property`, addressed through
    /// `resource`.
    pub fn new(property: &str, resource: Arc<ResourceSchema>) -> Result<Self> {
        let path = PropertyPath::parse(property)?;
        Ok(Self {
            json_key: json_key_for(&path, None),
            path,
            resource,
            permission: None,
        })
    }

    /// Uses `key` as the wire key instead of the derived camelCase name.
    pub fn with_json_property(mut self, key: impl Into<String>) -> Self {
        self.json_key = key.into();
        self
    }

    /// Guards writes to this field with `permission`.
    pub fn with_permission(mut self, permission: impl Permission<Self> + 'static) -> Self {
        self.permission = Some(Arc::new(permission));
        self
    }

    /// The relation path.
    pub fn property(&self) -> &PropertyPath {
        &self.path
    }

    /// The identifier of the related object, or null.
    pub fn current_uri(&self, ctx: &dyn Context, model: &dyn Model) -> Result<Value> {
        let Some(owner) = self.path.resolve(model)? else {
            return Ok(Value::Null);
        };
        match owner.related(self.path.attribute())? {
            Some(related) => Ok(Value::Text(
                ctx.build_resource_uri(&self.resource.wrap(related))?,
            )),
            None => Ok(Value::Null),
        }
    }
}

impl FieldAdapter for UriField {
    fn json_key(&self) -> &str {
        &self.json_key
    }

    fn handle_outgoing(
        &self,
        ctx: &dyn Context,
        source: &dyn Model,
        target: &mut WireMap,
    ) -> Result<()> {
        let uri = self.current_uri(ctx, source)?;
        target.insert(self.json_key.clone(), uri.to_wire());
        Ok(())
    }

    fn handle_incoming(
        &self,
        ctx: &dyn Context,
        source: &WireMap,
        target: &mut dyn Model,
    ) -> Result<()> {
        let related = match required_wire_value(source, &self.json_key)? {
            JsonValue::Null => None,
            JsonValue::String(uri) => Some(ctx.resolve_resource_uri(uri)?),
            other => {
                return Err(Error::InvalidValue {
                    field: self.json_key.clone(),
                    reason: format!("expected a resource URI, got {}", other),
                })
            }
        };
        let owner = self
            .path
            .resolve_mut(target)?
            .ok_or_else(|| Error::MissingRelation(self.path.to_string()))?;
        owner.set_related(self.path.attribute(), related)
    }

    fn select_related_path(&self) -> Option<String> {
        Some(self.path.query_path())
    }
}

impl AuthorizedField for UriField {
    fn permission(&self) -> Option<&dyn Permission<Self>> {
        self.permission.as_deref()
    }

    fn default_auth_adapter(&self) -> Arc<dyn AuthorizationAdapter<Self>> {
        Arc::new(UriAdapter)
    }
}

/// A field whose value is the sorted list of resource identifiers of a
/// collection relation.
///
/// Incoming lists replace the collection wholesale.
#[derive(Debug, Clone)]
pub struct UriListField {
    path: PropertyPath,
    json_key: String,
    resource: Arc<ResourceSchema>,
    permission: Option<Arc<dyn Permission<UriListField>>>,
}

impl UriListField {
    /// Defines a field over the collection relation `property`, addressed
    /// through `resource`.
    pub fn new(property: &str, resource: Arc<ResourceSchema>) -> Result<Self> {
        let path = PropertyPath::parse(property)?;
        Ok(Self {
            json_key: json_key_for(&path, None),
            path,
            resource,
            permission: None,
        })
    }

    /// Uses `key` as the wire key instead of the derived camelCase name.
    pub fn with_json_property(mut self, key: impl Into<String>) -> Self {
        self.json_key = key.into();
        self
    }

    /// Guards writes to this field with `permission`.
    pub fn with_permission(mut self, permission: impl Permission<Self> + 'static) -> Self {
        self.permission = Some(Arc::new(permission));
        self
    }

    /// The relation path.
    pub fn property(&self) -> &PropertyPath {
        &self.path
    }

    /// The sorted identifiers of the collection, or null when a relation on
    /// the way is null.
    pub fn current_uris(&self, ctx: &dyn Context, model: &dyn Model) -> Result<Value> {
        let Some(owner) = self.path.resolve(model)? else {
            return Ok(Value::Null);
        };
        let mut uris = owner
            .related_all(self.path.attribute())?
            .into_iter()
            .map(|item| ctx.build_resource_uri(&self.resource.wrap(item)))
            .collect::<Result<Vec<_>>>()?;
        uris.sort();
        Ok(Value::List(uris.into_iter().map(Value::Text).collect()))
    }
}

impl FieldAdapter for UriListField {
    fn json_key(&self) -> &str {
        &self.json_key
    }

    fn handle_outgoing(
        &self,
        ctx: &dyn Context,
        source: &dyn Model,
        target: &mut WireMap,
    ) -> Result<()> {
        let uris = self.current_uris(ctx, source)?;
        target.insert(self.json_key.clone(), uris.to_wire());
        Ok(())
    }

    fn handle_incoming(
        &self,
        ctx: &dyn Context,
        source: &WireMap,
        target: &mut dyn Model,
    ) -> Result<()> {
        let related = match required_wire_value(source, &self.json_key)? {
            JsonValue::Null => Vec::new(),
            JsonValue::Array(items) => sorted_uris(&self.json_key, items)?
                .iter()
                .map(|uri| ctx.resolve_resource_uri(uri))
                .collect::<Result<Vec<_>>>()?,
            _ => {
                return Err(Error::InvalidValue {
                    field: self.json_key.clone(),
                    reason: "expected a list of resource URIs".to_string(),
                })
            }
        };
        let owner = self
            .path
            .resolve_mut(target)?
            .ok_or_else(|| Error::MissingRelation(self.path.to_string()))?;
        owner.set_related_all(self.path.attribute(), related)
    }

    fn select_related_path(&self) -> Option<String> {
        self.path.eager_path()
    }
}

impl AuthorizedField for UriListField {
    fn permission(&self) -> Option<&dyn Permission<Self>> {
        self.permission.as_deref()
    }

    fn default_auth_adapter(&self) -> Arc<dyn AuthorizationAdapter<Self>> {
        Arc::new(UriListAdapter)
    }
}
