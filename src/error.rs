use thiserror::Error;

use crate::value::FieldType;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while reading or writing resource fields.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// A permission object denied a field write.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// The inbound wire mapping has no entry for the field's wire key.
    #[error("Missing field in request body: {0}")]
    MissingField(String),

    /// The backing object has no attribute with this name.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// A relation on the property path is null where a value was required.
    #[error("Relation is not set: {0}")]
    MissingRelation(String),

    /// A dotted property path could not be parsed, or has the wrong shape
    /// for the field kind it was given to.
    #[error("Invalid property path: '{0}'")]
    InvalidPath(String),

    /// A value could not be converted to the field's declared type.
    #[error("Cannot convert {found} to {expected}")]
    Conversion {
        /// The declared field type
        expected: FieldType,
        /// A rendering of the offending value
        found: String,
    },

    /// A wire value has the wrong shape for the field reading it.
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue {
        /// Wire key of the field
        field: String,
        /// What was wrong with the value
        reason: String,
    },

    /// A query parameter could not be parsed into the requested type.
    #[error("Invalid query parameter '{key}': '{value}'")]
    InvalidParameter {
        /// Parameter name
        key: String,
        /// Raw parameter value
        value: String,
    },

    /// A resource has no model factory to construct new backing objects.
    #[error("Resource '{0}' has no model factory")]
    NoModelFactory(String),

    /// A resource identifier could not be resolved to a backing object.
    #[error("Cannot resolve resource URI: {0}")]
    UnresolvedUri(String),

    /// A backing object has no key to build a resource identifier from.
    #[error("Resource '{0}' has no key")]
    MissingKey(String),
}

/// Raised when a permission object denies a write to a field.
///
/// Carries the wire name of the field so the dispatch layer can report
/// which part of the request was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Not authorized to write field '{field}'")]
pub struct AuthorizationError {
    field: String,
}

impl AuthorizationError {
    /// Creates a new authorization error for the named field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Returns the wire name of the denied field.
    pub fn field(&self) -> &str {
        &self.field
    }
}
