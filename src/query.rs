//! Query-builder collaborator used for eager-loading hints.

/// A query that can be asked to eager-load related objects.
///
/// Implementations return a new query; the receiver is consumed.
pub trait QueryBuilder: Sized {
    /// Requests eager loading of the relation path (`__`-separated).
    fn select_related(self, path: &str) -> Self;
}

/// A query that records the eager-load paths requested of it.
///
/// # Examples
///
/// ```
/// use resource_fields::{Query, QueryBuilder};
///
/// let query = Query::new("book").select_related("author").select_related("author");
/// assert_eq!(query.related(), ["author"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    model: String,
    related: Vec<String>,
}

impl Query {
    /// Creates a query over the named model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            related: Vec::new(),
        }
    }

    /// The model this query selects from.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Eager-load paths in the order they were first requested.
    pub fn related(&self) -> &[String] {
        &self.related
    }
}

impl QueryBuilder for Query {
    fn select_related(mut self, path: &str) -> Self {
        if !self.related.iter().any(|p| p == path) {
            self.related.push(path.to_string());
        }
        self
    }
}
