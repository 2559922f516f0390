//! Field adapters and field-level write authorization for resource
//! serialization.
//!
//! A resource exposes a backing object to callers as a wire mapping (a JSON
//! object). Each attribute travels through a field adapter:
//! - **Property fields**: a direct attribute, or one reached through
//!   relations (`owner.name`)
//! - **Sub-resource fields**: a related object serialized inline
//! - **URI fields**: a related object, or a collection, by resource identifier
//!
//! Incoming writes can be guarded per field by a [`Permission`]. The check is
//! folded into the field's incoming handler once, when the schema is built,
//! and a denied write leaves the backing object untouched.
//!
//! # Core Types
//!
//! - [`ResourceSchema`]: the field list of one kind of resource
//! - [`Field`]: a schema entry with its authorization already applied
//! - [`Model`]: the object graph fields read and write
//! - [`Ctx`]: per-request context that builds and resolves resource identifiers
//! - [`Authorization`]: the decorator guarding a field's incoming handler
//!
//! # Examples
//!
//! ```
//! use resource_fields::{
//!     Context, Ctx, Error, FieldType, Model, Permission, Principal, PropertyField, Record,
//!     RequestMeta, ResourceSchema, Value, WireMap,
//! };
//! use serde_json::json;
//!
//! /// Only admins may change a value.
//! #[derive(Debug)]
//! struct AdminOnly;
//!
//! impl<F> Permission<F> for AdminOnly {
//!     fn is_write_authorized(
//!         &self,
//!         ctx: &dyn Context,
//!         _target: &dyn Model,
//!         source: &Value,
//!         current: &Value,
//!     ) -> bool {
//!         source == current || ctx.principal().is_some_and(|p| p.name == "admin")
//!     }
//! }
//!
//! let schema = ResourceSchema::new("account")
//!     .field(PropertyField::new("display_name", FieldType::Text).unwrap())
//!     .field(
//!         PropertyField::new("credit_limit", FieldType::Int)
//!             .unwrap()
//!             .with_permission(AdminOnly),
//!     );
//!
//! let meta = RequestMeta::new("req-123").with_principal(Principal {
//!     id: "user-1".to_string(),
//!     name: "alice".to_string(),
//! });
//! let ctx = Ctx::new(meta);
//!
//! let mut account = Record::new().with("display_name", "Alice").with("credit_limit", 100);
//! let mut wire: WireMap = schema.serialize(&ctx, &account).unwrap();
//! assert_eq!(wire["creditLimit"], json!(100));
//!
//! wire.insert("creditLimit".to_string(), json!(5000));
//! let err = schema.deserialize(&ctx, &wire, &mut account).unwrap_err();
//! assert!(matches!(err, Error::Authorization(ref e) if e.field() == "creditLimit"));
//! assert_eq!(account.get("credit_limit").unwrap(), Value::Int(100));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod coerce;
mod context;
mod error;
mod fields;
mod model;
mod params;
mod path;
mod query;
mod request;
mod resource;
mod value;

pub use auth::{
    AuthTriple, Authorization, AuthorizationAdapter, Clearance, IncomingHandler, Permission,
    ScalarAdapter, SubResourceAdapter, TemporalAdapter, UriAdapter, UriListAdapter,
};
pub use coerce::{delimited_string_to_list, epoch_millis_to_time};
pub use context::{Context, Ctx, UriResolver};
pub use error::{AuthorizationError, Error, Result};
pub use fields::{
    AuthorizedField, Field, FieldAdapter, ForeignPropertyField, PropertyField, ScalarField,
    SubResourceField, UriField, UriListField,
};
pub use model::{Model, ModelFactory, Record};
pub use params::{ParamsView, QueryParams};
pub use path::{PropertyPath, to_camel_case};
pub use query::{Query, QueryBuilder};
pub use request::{Principal, RequestMeta};
pub use resource::{RESOURCE_URI_KEY, Resource, ResourceSchema};
pub use value::{FieldType, Value, WireMap};
