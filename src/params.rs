//! Query-parameter access over plain string maps.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use crate::error::{Error, Result};

/// The interface filter consumers read request parameters through.
///
/// Implementors supply [`keys`](QueryParams::keys) and
/// [`get`](QueryParams::get); typed and list-shaped access is derived.
pub trait QueryParams {
    /// The parameter names.
    fn keys(&self) -> BTreeSet<&str>;

    /// The raw value of `key`, if present.
    fn get(&self, key: &str) -> Option<&str>;

    /// Returns `true` if `key` is present.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The raw value of `key`, or `default`.
    fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// The value of `key` parsed as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the value does not parse.
    fn get_as<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        self.get(key).map(|raw| parse(key, raw)).transpose()
    }

    /// The value of `key` parsed as `T`, or `default` when absent.
    fn get_as_or<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.get_as(key)?.unwrap_or(default))
    }

    /// The value of `key` as a list.
    ///
    /// Each key holds a single value, so the list has one element, or none
    /// when the key is absent.
    fn get_list(&self, key: &str) -> Vec<&str> {
        self.get(key).into_iter().collect()
    }

    /// Like [`get_list`](QueryParams::get_list), with each element parsed as
    /// `T`.
    fn get_list_of<T: FromStr>(&self, key: &str) -> Result<Vec<T>> {
        self.get_list(key)
            .into_iter()
            .map(|raw| parse(key, raw))
            .collect()
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| Error::InvalidParameter {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// A read-only [`QueryParams`] view over a string map.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use resource_fields::{ParamsView, QueryParams};
///
/// let raw = HashMap::from([
///     ("limit".to_string(), "20".to_string()),
///     ("tag".to_string(), "red".to_string()),
/// ]);
/// let params = ParamsView::new(&raw);
///
/// assert_eq!(params.get_as::<u32>("limit").unwrap(), Some(20));
/// assert_eq!(params.get_as_or("offset", 0u32).unwrap(), 0);
/// assert_eq!(params.get_list("tag"), ["red"]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ParamsView<'a> {
    params: &'a HashMap<String, String>,
}

impl<'a> ParamsView<'a> {
    /// Wraps `params`.
    pub fn new(params: &'a HashMap<String, String>) -> Self {
        Self { params }
    }
}

impl QueryParams for ParamsView<'_> {
    fn keys(&self) -> BTreeSet<&str> {
        self.params.keys().map(String::as_str).collect()
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
