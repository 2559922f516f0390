//! Parsed property paths and wire-key naming.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::Model;

/// A dotted property path, parsed once when a field is defined.
///
/// `"author.address.city"` has the hops `author` and `address` and the final
/// attribute `city`. Each hop is resolved through [`Model::related`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    hops: Vec<String>,
    attribute: String,
}

impl PropertyPath {
    /// Parses a dotted property path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] for an empty path or an empty segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_fields::PropertyPath;
    ///
    /// let path = PropertyPath::parse("foo.bar.baz").unwrap();
    /// assert_eq!(path.hops(), ["foo", "bar"]);
    /// assert_eq!(path.attribute(), "baz");
    /// assert_eq!(path.eager_path().as_deref(), Some("foo__bar"));
    /// ```
    pub fn parse(path: &str) -> Result<Self> {
        let mut segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidPath(path.to_string()));
        }

        // split always yields at least one segment
        let attribute = segments.pop().unwrap_or_default();
        Ok(Self {
            hops: segments,
            attribute,
        })
    }

    /// Relations traversed before the final attribute.
    pub fn hops(&self) -> &[String] {
        &self.hops
    }

    /// The final attribute name.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Returns `true` if the path has no dereference hops.
    pub fn is_direct(&self) -> bool {
        self.hops.is_empty()
    }

    /// The eager-load path for the hops, in query-builder notation.
    ///
    /// `None` for direct paths.
    pub fn eager_path(&self) -> Option<String> {
        if self.hops.is_empty() {
            None
        } else {
            Some(self.hops.join("__"))
        }
    }

    /// The full path in query-builder notation, final attribute included.
    pub fn query_path(&self) -> String {
        match self.eager_path() {
            Some(prefix) => format!("{}__{}", prefix, self.attribute),
            None => self.attribute.clone(),
        }
    }

    /// Walks the hops from `model`.
    ///
    /// Returns `Ok(None)` when an intermediate relation is null.
    pub fn resolve<'m>(&self, model: &'m dyn Model) -> Result<Option<&'m dyn Model>> {
        let mut current = model;
        for hop in &self.hops {
            match current.related(hop)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Walks the hops from `model` for writing.
    ///
    /// Returns `Ok(None)` when an intermediate relation is null.
    pub fn resolve_mut<'m>(&self, model: &'m mut dyn Model) -> Result<Option<&'m mut dyn Model>> {
        let mut current = model;
        for hop in &self.hops {
            current = match current.related_mut(hop)? {
                Some(next) => next,
                None => return Ok(None),
            };
        }
        Ok(Some(current))
    }
}

impl FromStr for PropertyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hop in &self.hops {
            write!(f, "{}.", hop)?;
        }
        write!(f, "{}", self.attribute)
    }
}

/// Converts a snake_case property name into a camelCase wire key.
///
/// # Examples
///
/// ```
/// use resource_fields::to_camel_case;
///
/// assert_eq!(to_camel_case("foo_bar"), "fooBar");
/// assert_eq!(to_camel_case("resource_uri"), "resourceUri");
/// assert_eq!(to_camel_case("name"), "name");
/// ```
pub fn to_camel_case(name: &str) -> String {
    let mut parts = name.split('_').filter(|p| !p.is_empty());
    let mut key = parts.next().map(str::to_lowercase).unwrap_or_default();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            key.extend(first.to_uppercase());
            key.push_str(chars.as_str());
        }
    }
    key
}
