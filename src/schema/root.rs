//! Root fields: the entry points a query may address.
//!
//! Each root field pairs a declared kind with a [`RootResolver`] that pulls
//! the raw value out of the data source. Adding a root field is a matter of
//! registering another entry on the builder; the executor never changes.

use crate::model::Value;
use crate::schema::FieldKind;
use crate::source::DataSource;
use crate::{Error, Result};

/// Supplies the raw value of a root field.
pub trait RootResolver: Send + Sync {
    fn resolve(&self, source: &dyn DataSource) -> Result<Value>;
}

impl<F> RootResolver for F
where
    F: Fn(&dyn DataSource) -> Result<Value> + Send + Sync,
{
    fn resolve(&self, source: &dyn DataSource) -> Result<Value> {
        self(source)
    }
}

/// A registered root field.
pub struct RootField {
    pub name: String,
    pub kind: FieldKind,
    resolver: Box<dyn RootResolver>,
}

impl RootField {
    pub fn new(name: impl Into<String>, kind: FieldKind, resolver: impl RootResolver + 'static) -> Self {
        Self {
            name: name.into(),
            kind,
            resolver: Box::new(resolver),
        }
    }

    pub fn resolve(&self, source: &dyn DataSource) -> Result<Value> {
        self.resolver.resolve(source)
    }
}

/// Resolves to every value of a named collection, as a list.
#[derive(Debug, Clone)]
pub struct CollectionResolver {
    collection: String,
}

impl CollectionResolver {
    pub fn new(collection: impl Into<String>) -> Self {
        Self { collection: collection.into() }
    }
}

impl RootResolver for CollectionResolver {
    fn resolve(&self, source: &dyn DataSource) -> Result<Value> {
        let snapshot = source.collection(&self.collection).ok_or_else(|| {
            Error::DataSource(format!("collection \"{}\" not found", self.collection))
        })?;
        Ok(Value::List(snapshot.to_vec()))
    }
}
