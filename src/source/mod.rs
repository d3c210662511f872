//! # Data Source Trait
//!
//! The contract between the executor and whatever holds the root-level data.
//! The engine only reads; it never mutates a source.
//!
//! ## Implementations
//!
//! | Source | Module | Description |
//! |--------|--------|-------------|
//! | `MemorySource` | `memory` | Named in-memory collections |

pub mod memory;

use std::sync::Arc;

use crate::model::Value;

pub use memory::MemorySource;

/// Read-only access to named collections of root values.
///
/// A returned collection is a snapshot: it must not change underneath the
/// caller for as long as the `Arc` is held.
pub trait DataSource: Send + Sync {
    /// Snapshot of the named collection, or `None` if it does not exist.
    fn collection(&self, name: &str) -> Option<Arc<[Value]>>;
}

impl<S: DataSource + ?Sized> DataSource for Arc<S> {
    fn collection(&self, name: &str) -> Option<Arc<[Value]>> {
        (**self).collection(name)
    }
}
