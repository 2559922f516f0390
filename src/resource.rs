//! Resource schemas.
//!
//! A schema lists the fields of one kind of resource and knows how to build
//! fresh backing objects for it. Nested and URI fields hold the schema of the
//! resource they point at.

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::fields::Field;
use crate::model::{Model, ModelFactory};
use crate::query::QueryBuilder;
use crate::value::{Value, WireMap};

/// Wire key of a nested resource's identifier.
pub const RESOURCE_URI_KEY: &str = "resourceUri";

/// The field list and addressing of one kind of resource.
///
/// # Examples
///
/// ```
/// use resource_fields::{Ctx, FieldType, PropertyField, Record, RequestMeta, ResourceSchema};
/// use serde_json::json;
///
/// let schema = ResourceSchema::new("user")
///     .field(PropertyField::new("name", FieldType::Text).unwrap())
///     .field(PropertyField::new("login_count", FieldType::Int).unwrap());
///
/// let ctx = Ctx::new(RequestMeta::new("req-1"));
/// let user = Record::new().with("name", "Ada").with("login_count", 3);
/// let wire = schema.serialize(&ctx, &user).unwrap();
/// assert_eq!(json!(wire), json!({"name": "Ada", "loginCount": 3}));
/// ```
pub struct ResourceSchema {
    resource_path: String,
    key_attribute: String,
    fields: Vec<Field>,
    model_factory: Option<Arc<dyn ModelFactory>>,
}

impl ResourceSchema {
    /// Creates an empty schema addressed under `resource_path`.
    pub fn new(resource_path: impl Into<String>) -> Self {
        Self {
            resource_path: resource_path.into(),
            key_attribute: "pk".to_string(),
            fields: Vec::new(),
            model_factory: None,
        }
    }

    /// Adds a field.
    pub fn field(mut self, field: impl Into<Field>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Sets the attribute holding the resource key. Defaults to `pk`.
    pub fn with_key_attribute(mut self, attr: impl Into<String>) -> Self {
        self.key_attribute = attr.into();
        self
    }

    /// Sets the factory used for new backing objects.
    pub fn with_model_factory(mut self, factory: impl ModelFactory + 'static) -> Self {
        self.model_factory = Some(Arc::new(factory));
        self
    }

    /// The path segment resource identifiers are built under.
    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    /// The attribute holding the resource key.
    pub fn key_attribute(&self) -> &str {
        &self.key_attribute
    }

    /// The fields in definition order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Builds a fresh backing object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoModelFactory`] if no factory was configured.
    pub fn new_model(&self) -> Result<Box<dyn Model>> {
        self.model_factory
            .as_ref()
            .map(|factory| factory.create())
            .ok_or_else(|| Error::NoModelFactory(self.resource_path.clone()))
    }

    /// Pairs this schema with a backing object.
    pub fn wrap<'a>(&'a self, model: &'a dyn Model) -> Resource<'a> {
        Resource {
            schema: self,
            model,
        }
    }

    /// Runs every field's outgoing handler over `model`.
    pub fn serialize(&self, ctx: &dyn Context, model: &dyn Model) -> Result<WireMap> {
        tracing::trace!(
            request_id = %ctx.request_id(),
            resource = %self.resource_path,
            "serializing"
        );
        let mut wire = WireMap::new();
        for field in &self.fields {
            field.handle_outgoing(ctx, model, &mut wire)?;
        }
        Ok(wire)
    }

    /// Runs every field's incoming handler, authorization included, over
    /// `model`.
    ///
    /// Fields are applied in definition order and the first error stops the
    /// rest; fields applied before it keep their writes. The model is not
    /// saved.
    pub fn deserialize(
        &self,
        ctx: &dyn Context,
        source: &WireMap,
        model: &mut dyn Model,
    ) -> Result<()> {
        tracing::trace!(
            request_id = %ctx.request_id(),
            resource = %self.resource_path,
            "deserializing"
        );
        for field in &self.fields {
            field.handle_incoming(ctx, source, model)?;
        }
        Ok(())
    }

    /// Folds every field's eager-load hint into `query`.
    pub fn prepare<Q: QueryBuilder>(&self, query: Q) -> Q {
        self.fields
            .iter()
            .fold(query, |query, field| field.prepare(query))
    }
}

impl fmt::Debug for ResourceSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSchema")
            .field("resource_path", &self.resource_path)
            .field("key_attribute", &self.key_attribute)
            .field("fields", &self.fields)
            .field("model_factory", &self.model_factory.is_some())
            .finish()
    }
}

/// A backing object viewed through its schema.
#[derive(Debug, Clone, Copy)]
pub struct Resource<'a> {
    schema: &'a ResourceSchema,
    model: &'a dyn Model,
}

impl<'a> Resource<'a> {
    /// The schema's resource path.
    pub fn path(&self) -> &'a str {
        self.schema.resource_path()
    }

    /// The schema.
    pub fn schema(&self) -> &'a ResourceSchema {
        self.schema
    }

    /// The backing object.
    pub fn model(&self) -> &'a dyn Model {
        self.model
    }

    /// The key attribute's value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] if the key is absent or null, as for an
    /// unsaved object.
    pub fn key(&self) -> Result<Value> {
        match self.model.get(self.schema.key_attribute()) {
            Ok(Value::Null) | Err(Error::UnknownAttribute(_)) => {
                Err(Error::MissingKey(self.schema.resource_path.clone()))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::context::Ctx;
    use crate::fields::{ForeignPropertyField, PropertyField, SubResourceField};
    use crate::model::Record;
    use crate::query::Query;
    use crate::request::RequestMeta;
    use crate::value::FieldType;

    fn ctx() -> Ctx {
        Ctx::new(RequestMeta::new("req-resource"))
    }

    fn person() -> ResourceSchema {
        ResourceSchema::new("person")
            .field(PropertyField::new("name", FieldType::Text).expect("valid"))
            .field(PropertyField::new("age", FieldType::Int).expect("valid"))
    }

    #[test]
    fn serialize_runs_every_field() {
        let model = Record::new().with("name", "Ada").with("age", 36);
        let wire = person().serialize(&ctx(), &model).expect("serialize");
        assert_eq!(json!(wire), json!({"name": "Ada", "age": 36}));
    }

    #[test]
    fn deserialize_stops_at_first_error() {
        let mut source = WireMap::new();
        source.insert("name".to_string(), json!("Ada"));
        let mut model = Record::new();
        assert_eq!(
            person().deserialize(&ctx(), &source, &mut model),
            Err(Error::MissingField("age".to_string()))
        );
        assert_eq!(model.get("name"), Ok(Value::from("Ada")));
    }

    #[test]
    fn prepare_collects_eager_paths() {
        let address = Arc::new(ResourceSchema::new("address"));
        let schema = person()
            .field(ForeignPropertyField::new("employer.name", FieldType::Text).expect("valid"))
            .field(SubResourceField::new("address", address).expect("valid"));
        let query = schema.prepare(Query::new("person"));
        assert_eq!(query.related(), ["employer", "address"]);
    }

    #[test]
    fn new_model_requires_factory() {
        assert_eq!(
            person().new_model().map(|_| ()),
            Err(Error::NoModelFactory("person".to_string()))
        );
        let schema = person().with_model_factory(|| Box::new(Record::new()) as Box<dyn Model>);
        assert!(schema.new_model().is_ok());
    }

    #[test]
    fn key_uses_key_attribute() {
        let schema = person().with_key_attribute("slug");
        let model = Record::new().with("slug", "ada").with("pk", 1);
        assert_eq!(schema.wrap(&model).key(), Ok(Value::from("ada")));

        let unsaved = Record::new().with("slug", Value::Null);
        assert_eq!(
            schema.wrap(&unsaved).key(),
            Err(Error::MissingKey("person".to_string()))
        );
    }
}
