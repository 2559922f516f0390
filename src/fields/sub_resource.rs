use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::auth::{AuthorizationAdapter, Permission, SubResourceAdapter};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::fields::{json_key_for, required_wire_value, AuthorizedField, FieldAdapter};
use crate::model::Model;
use crate::path::PropertyPath;
use crate::resource::ResourceSchema;
use crate::value::{Value, WireMap};

/// A field whose value is a nested resource serialized inline.
///
/// Outgoing, the related object is serialized with the nested schema.
/// Incoming, the nested mapping is applied to the existing related object,
/// or to a fresh one built by the schema's factory, which is then saved and
/// attached. A wire null clears the relation.
#[derive(Debug, Clone)]
pub struct SubResourceField {
    path: PropertyPath,
    json_key: String,
    resource: Arc<ResourceSchema>,
    permission: Option<Arc<dyn Permission<SubResourceField>>>,
}

impl SubResourceField {
    /// Defines a field over the relation `property`, serialized with
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

    /// The schema nested objects are serialized with.
    pub fn resource(&self) -> &ResourceSchema {
        &self.resource
    }

    /// The related object currently attached to `model`, if any.
    pub fn current<'m>(&self, model: &'m dyn Model) -> Result<Option<&'m dyn Model>> {
        match self.path.resolve(model)? {
            Some(owner) => owner.related(self.path.attribute()),
            None => Ok(None),
        }
    }

    /// The resource identifier of the related object, or null.
    pub fn current_uri(&self, ctx: &dyn Context, model: &dyn Model) -> Result<Value> {
        match self.current(model)? {
            Some(sub) => Ok(Value::Text(ctx.build_resource_uri(&self.resource.wrap(sub))?)),
            None => Ok(Value::Null),
        }
    }
}

impl FieldAdapter for SubResourceField {
    fn json_key(&self) -> &str {
        &self.json_key
    }

    fn handle_outgoing(
        &self,
        ctx: &dyn Context,
        source: &dyn Model,
        target: &mut WireMap,
    ) -> Result<()> {
        let value = match self.current(source)? {
            Some(sub) => JsonValue::Object(self.resource.serialize(ctx, sub)?),
            None => JsonValue::Null,
        };
        target.insert(self.json_key.clone(), value);
        Ok(())
    }

    fn handle_incoming(
        &self,
        ctx: &dyn Context,
        source: &WireMap,
        target: &mut dyn Model,
    ) -> Result<()> {
        let nested = match required_wire_value(source, &self.json_key)? {
            JsonValue::Null => None,
            JsonValue::Object(nested) => Some(nested),
            _ => {
                return Err(Error::InvalidValue {
                    field: self.json_key.clone(),
                    reason: "expected an object".to_string(),
                })
            }
        };

        let attr = self.path.attribute();
        let owner = self
            .path
            .resolve_mut(target)?
            .ok_or_else(|| Error::MissingRelation(self.path.to_string()))?;

        let Some(nested) = nested else {
            return owner.set_related(attr, None);
        };

        match owner.related_mut(attr)? {
            Some(existing) => {
                self.resource.deserialize(ctx, nested, existing)?;
                existing.save()
            }
            None => {
                let mut created = self.resource.new_model()?;
                self.resource.deserialize(ctx, nested, &mut *created)?;
                created.save()?;
                owner.set_related(attr, Some(created))
            }
        }
    }

    fn select_related_path(&self) -> Option<String> {
        Some(self.path.query_path())
    }
}

impl AuthorizedField for SubResourceField {
    fn permission(&self) -> Option<&dyn Permission<Self>> {
        self.permission.as_deref()
    }

    fn default_auth_adapter(&self) -> Arc<dyn AuthorizationAdapter<Self>> {
        Arc::new(SubResourceAdapter)
    }
}
