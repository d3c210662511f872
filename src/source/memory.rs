//! In-memory data source.
//!
//! Collections are held as `Arc<[Value]>` behind a `parking_lot::RwLock`.
//! Readers clone the `Arc` and release the lock immediately, so a query
//! keeps a stable snapshot even if the owner swaps a collection mid-flight.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::DataSource;
use crate::model::Value;

/// Named collections of root values.
#[derive(Default)]
pub struct MemorySource {
    collections: RwLock<HashMap<String, Arc<[Value]>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for setup code.
    pub fn with_collection(self, name: impl Into<String>, values: impl Into<Vec<Value>>) -> Self {
        self.replace(name, values);
        self
    }

    /// Install or swap a collection. Snapshots already handed out are unaffected.
    pub fn replace(&self, name: impl Into<String>, values: impl Into<Vec<Value>>) {
        let name = name.into();
        let values: Vec<Value> = values.into();
        let values: Arc<[Value]> = values.into();
        tracing::debug!(collection = %name, len = values.len(), "collection replaced");
        self.collections.write().insert(name, values);
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl DataSource for MemorySource {
    fn collection(&self, name: &str) -> Option<Arc<[Value]>> {
        self.collections.read().get(name).cloned()
    }
}

impl std::fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySource")
            .field("collections", &self.collection_names())
            .finish()
    }
}
