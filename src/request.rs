/// Metadata about the request a set of field writes belongs to.
///
/// Contains the request identifier and optional principal (authenticated user/service).
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    /// Unique identifier for this request
    pub request_id: String,
    /// Authenticated principal, if any
    pub principal: Option<Principal>,
}

impl RequestMeta {
    /// Creates metadata for an anonymous request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            principal: None,
        }
    }

    /// Attaches the authenticated principal.
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }
}

/// An authenticated user or service principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Unique identifier for this principal
    pub id: String,
    /// Display name
    pub name: String,
}
