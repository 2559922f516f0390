use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::Model;
use crate::request::{Principal, RequestMeta};
use crate::resource::Resource;

/// Per-request collaborator handed to every field operation.
///
/// The context knows who is asking and how resources are addressed. Fields
/// use it to turn related objects into resource identifiers and back;
/// permission objects use it to decide.
pub trait Context: Send + Sync {
    /// Returns the request ID for this context.
    fn request_id(&self) -> &str;

    /// Returns the principal if present.
    fn principal(&self) -> Option<&Principal> {
        None
    }

    /// Builds the resource identifier for a resource wrapping an object.
    fn build_resource_uri(&self, resource: &Resource<'_>) -> Result<String>;

    /// Resolves a resource identifier to the object it names.
    ///
    /// The default cannot resolve anything.
    fn resolve_resource_uri(&self, uri: &str) -> Result<Box<dyn Model>> {
        Err(Error::UnresolvedUri(uri.to_string()))
    }
}

/// Looks up backing objects by resource identifier.
pub trait UriResolver: Send + Sync {
    /// Returns the object named by `uri`, or `None` if there is none.
    fn resolve(&self, uri: &str) -> Result<Option<Box<dyn Model>>>;
}

impl<F> UriResolver for F
where
    F: Fn(&str) -> Option<Box<dyn Model>> + Send + Sync,
{
    fn resolve(&self, uri: &str) -> Result<Option<Box<dyn Model>>> {
        Ok(self(uri))
    }
}

/// Execution context for one request.
///
/// Resource identifiers have the form `{base_uri}{resource_path}/{key}`.
///
/// # Examples
///
/// ```
/// use resource_fields::{Context, Ctx, Principal, Record, RequestMeta, ResourceSchema};
///
/// let meta = RequestMeta::new("req-123").with_principal(Principal {
///     id: "user-1".to_string(),
///     name: "Alice".to_string(),
/// });
/// let ctx = Ctx::new(meta).with_base_uri("/api/");
///
/// let schema = ResourceSchema::new("user");
/// let user = Record::new().with("pk", 7);
/// let uri = ctx.build_resource_uri(&schema.wrap(&user)).unwrap();
/// assert_eq!(uri, "/api/user/7");
/// assert_eq!(ctx.principal().unwrap().id, "user-1");
/// ```
#[derive(Clone)]
pub struct Ctx {
    request_id: String,
    principal: Option<Principal>,
    base_uri: String,
    resolver: Option<Arc<dyn UriResolver>>,
}

impl Ctx {
    /// Creates a context rooted at `/`.
    pub fn new(meta: RequestMeta) -> Self {
        Self {
            request_id: meta.request_id,
            principal: meta.principal,
            base_uri: "/".to_string(),
            resolver: None,
        }
    }

    /// Sets the prefix resource identifiers are built under.
    ///
    /// A trailing `/` is added if missing.
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        let mut base_uri = base_uri.into();
        if !base_uri.ends_with('/') {
            base_uri.push('/');
        }
        self.base_uri = base_uri;
        self
    }

    /// Sets the collaborator used to resolve identifiers back to objects.
    pub fn with_resolver(mut self, resolver: impl UriResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Returns the identifier prefix.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }
}

impl fmt::Debug for Ctx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ctx")
            .field("request_id", &self.request_id)
            .field("principal", &self.principal)
            .field("base_uri", &self.base_uri)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

impl Context for Ctx {
    fn request_id(&self) -> &str {
        &self.request_id
    }

    fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    fn build_resource_uri(&self, resource: &Resource<'_>) -> Result<String> {
        let key = resource.key()?;
        Ok(format!("{}{}/{}", self.base_uri, resource.path(), key))
    }

    fn resolve_resource_uri(&self, uri: &str) -> Result<Box<dyn Model>> {
        match &self.resolver {
            Some(resolver) => resolver
                .resolve(uri)?
                .ok_or_else(|| Error::UnresolvedUri(uri.to_string())),
            None => Err(Error::UnresolvedUri(uri.to_string())),
        }
    }
}
