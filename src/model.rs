//! Backing objects.
//!
//! Fields never touch a concrete persistence type. They walk the object graph
//! through [`Model`], one named accessor step at a time.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::value::Value;

/// A persistent domain object that a resource wraps.
///
/// Attributes hold native [`Value`]s. Relations are named: a single relation
/// points at zero or one related object, a collection relation at any number.
pub trait Model: fmt::Debug + Send {
    /// Reads a scalar attribute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAttribute`] if the attribute does not exist.
    fn get(&self, attr: &str) -> Result<Value>;

    /// Writes a scalar attribute.
    fn set(&mut self, attr: &str, value: Value) -> Result<()>;

    /// Follows a single relation. `Ok(None)` means the relation is null.
    fn related(&self, name: &str) -> Result<Option<&dyn Model>>;

    /// Follows a single relation for writing.
    fn related_mut(&mut self, name: &str) -> Result<Option<&mut dyn Model>>;

    /// Replaces a single relation.
    fn set_related(&mut self, name: &str, model: Option<Box<dyn Model>>) -> Result<()>;

    /// Returns every object in a collection relation.
    fn related_all(&self, name: &str) -> Result<Vec<&dyn Model>>;

    /// Replaces the contents of a collection relation.
    fn set_related_all(&mut self, name: &str, models: Vec<Box<dyn Model>>) -> Result<()>;

    /// Persists the object.
    fn save(&mut self) -> Result<()>;

    /// Returns `self` as `Any` so hosts can recover their concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Builds fresh backing objects for a resource.
pub trait ModelFactory: Send + Sync {
    /// Constructs a new, unsaved backing object.
    fn create(&self) -> Box<dyn Model>;
}

impl<F> ModelFactory for F
where
    F: Fn() -> Box<dyn Model> + Send + Sync,
{
    fn create(&self) -> Box<dyn Model> {
        self()
    }
}

/// An in-memory backing object.
///
/// `Record` keeps attributes and relations in ordered maps and counts how
/// often it was saved. Reading an attribute or relation that was never set
/// is an error, matching a typed model without that member.
///
/// # Examples
///
/// ```
/// use resource_fields::{Model, Record, Value};
///
/// let mut author = Record::new().with("name", "Ada");
/// author.set("born", Value::Int(1815)).unwrap();
///
/// let book = Record::new().with_related("author", author);
/// let author = book.related("author").unwrap().unwrap();
/// assert_eq!(author.get("born").unwrap(), Value::Int(1815));
/// ```
#[derive(Debug, Default)]
pub struct Record {
    attributes: BTreeMap<String, Value>,
    relations: BTreeMap<String, Option<Box<dyn Model>>>,
    collections: BTreeMap<String, Vec<Box<dyn Model>>>,
    save_count: usize,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, builder style.
    pub fn with(mut self, attr: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(attr.to_string(), value.into());
        self
    }

    /// Sets a single relation, builder style.
    pub fn with_related(mut self, name: &str, model: impl Model + 'static) -> Self {
        self.relations
            .insert(name.to_string(), Some(Box::new(model)));
        self
    }

    /// Declares a single relation that is currently null.
    pub fn with_null_related(mut self, name: &str) -> Self {
        self.relations.insert(name.to_string(), None);
        self
    }

    /// Sets a collection relation, builder style.
    pub fn with_collection<M>(mut self, name: &str, models: impl IntoIterator<Item = M>) -> Self
    where
        M: Model + 'static,
    {
        let models = models
            .into_iter()
            .map(|m| Box::new(m) as Box<dyn Model>)
            .collect();
        self.collections.insert(name.to_string(), models);
        self
    }

    /// Number of times [`Model::save`] was called on this record.
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl Model for Record {
    fn get(&self, attr: &str) -> Result<Value> {
        self.attributes
            .get(attr)
            .cloned()
            .ok_or_else(|| Error::UnknownAttribute(attr.to_string()))
    }

    fn set(&mut self, attr: &str, value: Value) -> Result<()> {
        self.attributes.insert(attr.to_string(), value);
        Ok(())
    }

    fn related(&self, name: &str) -> Result<Option<&dyn Model>> {
        match self.relations.get(name) {
            Some(Some(model)) => Ok(Some(&**model)),
            Some(None) => Ok(None),
            None => Err(Error::UnknownAttribute(name.to_string())),
        }
    }

    fn related_mut(&mut self, name: &str) -> Result<Option<&mut dyn Model>> {
        match self.relations.get_mut(name) {
            Some(Some(model)) => Ok(Some(&mut **model)),
            Some(None) => Ok(None),
            None => Err(Error::UnknownAttribute(name.to_string())),
        }
    }

    fn set_related(&mut self, name: &str, model: Option<Box<dyn Model>>) -> Result<()> {
        self.relations.insert(name.to_string(), model);
        Ok(())
    }

    fn related_all(&self, name: &str) -> Result<Vec<&dyn Model>> {
        self.collections
            .get(name)
            .map(|models| models.iter().map(|m| &**m as &dyn Model).collect())
            .ok_or_else(|| Error::UnknownAttribute(name.to_string()))
    }

    fn set_related_all(&mut self, name: &str, models: Vec<Box<dyn Model>>) -> Result<()> {
        self.collections.insert(name.to_string(), models);
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        self.save_count += 1;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
