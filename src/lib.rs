//! # payload-query: Field-Selection Queries over Polymorphic Data
//!
//! Answers structured queries over an in-memory dataset in which a field may
//! hold values of different shapes (a union "payload"). For each value the
//! engine finds its concrete shape, picks the selection written for that
//! shape, and projects only the requested fields into a uniform
//! `{"data": ..., "errors": [...]}` envelope.
//!
//! ## Design Principles
//!
//! 1. **Explicit discriminators**: every object carries its shape name; union
//!    resolution is an exact match on that tag, never a guess
//! 2. **Frozen schema**: shapes are registered on a `SchemaBuilder`, then
//!    frozen into an immutable `Schema` before any query runs
//! 3. **Partial success**: a bad field costs that field, not the query
//! 4. **Selections are data**: query-language parsing belongs to the caller
//!
//! ## Quick Start
//!
//! ```rust
//! use payload_query::{Engine, Query, SelectionNode, events};
//! use payload_query::events::{Document, Event, FILE_UPLOADED_EVENT};
//!
//! # fn example() -> payload_query::Result<()> {
//! let engine = Engine::new(
//!     events::schema()?,
//!     events::source([Event::new(
//!         "1",
//!         FILE_UPLOADED_EVENT,
//!         "direct",
//!         Document { id: "1".into(), title: "This is a document".into() },
//!     )]),
//! );
//!
//! let query = Query::new(SelectionNode::fields("events", [
//!     SelectionNode::leaf("id"),
//!     SelectionNode::variants("payload", [
//!         ("Document", vec![SelectionNode::leaf("title")]),
//!         ("Report", vec![SelectionNode::leaf("name")]),
//!     ]),
//! ]));
//!
//! let response = engine.execute(&query);
//! assert!(response.is_ok());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod schema;
pub mod selection;
pub mod resolver;
pub mod projection;
pub mod execution;
pub mod source;
pub mod config;
pub mod events;

use std::sync::Arc;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{FieldMap, Object, Value};

pub use schema::{
    CollectionResolver, FieldDef, FieldKind, RootField, RootResolver,
    ScalarKind, Schema, SchemaBuilder, Shape, ShapeDef, ShapeRegistry, UnionShape,
};

pub use selection::{Query, Selection, SelectionNode};
pub use resolver::{resolve_variant, Discriminator};
pub use projection::{project, Projection};
pub use execution::{ErrorKind, FieldError, Path, PathSegment, Response, ResultMap, ResultValue};
pub use source::{DataSource, MemorySource};
pub use config::EngineConfig;

// ============================================================================
// Top-level Engine handle
// ============================================================================

/// The primary entry point. An `Engine` pairs a frozen schema with a data
/// source and answers queries against them.
pub struct Engine<S: DataSource> {
    schema: Arc<Schema>,
    source: S,
    config: EngineConfig,
}

impl<S: DataSource> Engine<S> {
    /// Create an engine with the default configuration.
    pub fn new(schema: impl Into<Arc<Schema>>, source: S) -> Self {
        Self::with_config(schema, source, EngineConfig::default())
    }

    pub fn with_config(schema: impl Into<Arc<Schema>>, source: S, config: EngineConfig) -> Self {
        Self {
            schema: schema.into(),
            source,
            config,
        }
    }

    /// Execute a query. Always yields a well-formed envelope.
    pub fn execute(&self, query: &Query) -> Response {
        execution::execute(&self.schema, &self.config, query, &self.source)
    }

    /// Transport entry point: decode a JSON-encoded [`Query`], execute it and
    /// encode the response envelope.
    pub fn execute_json(&self, request: &str) -> Result<String> {
        let query: Query = serde_json::from_str(request).map_err(Error::Decode)?;
        self.execute(&query).to_json()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Access the underlying data source.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Shape \"{0}\" is already registered")]
    DuplicateShape(String),

    #[error("Unknown shape \"{0}\"")]
    UnknownShape(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Root field \"{0}\" is already registered")]
    DuplicateRootField(String),

    #[error("Value of shape \"{observed}\" matches no member of union \"{union}\"")]
    UnresolvedUnionVariant { union: String, observed: String },

    #[error("Cannot query field \"{field}\" on type \"{shape}\"")]
    UnknownField { shape: String, field: String },

    #[error("Cannot query field \"{0}\" on type \"Query\"")]
    UnknownRootField(String),

    #[error("Type error on \"{shape}.{field}\": expected {expected}, got {got}")]
    TypeMismatch {
        shape: String,
        field: String,
        expected: String,
        got: String,
    },

    #[error("Invalid selection on \"{shape}.{field}\": {message}")]
    InvalidSelection {
        shape: String,
        field: String,
        message: String,
    },

    #[error("Selection depth {depth} exceeds the limit of {limit}")]
    SelectionTooDeep { depth: usize, limit: usize },

    #[error("Resolver for root field \"{field}\" failed: {message}")]
    ResolverFailed { field: String, message: String },

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Malformed request: {0}")]
    Decode(serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Code reported in the response envelope.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateShape(_) => ErrorKind::DuplicateShape,
            Error::UnknownShape(_) => ErrorKind::UnknownShape,
            Error::InvalidSchema(_) => ErrorKind::InvalidSchema,
            Error::DuplicateRootField(_) => ErrorKind::DuplicateRootField,
            Error::UnresolvedUnionVariant { .. } => ErrorKind::UnresolvedUnionVariant,
            Error::UnknownField { .. } => ErrorKind::UnknownField,
            Error::UnknownRootField(_) => ErrorKind::UnknownRootField,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::InvalidSelection { .. } => ErrorKind::InvalidSelection,
            Error::SelectionTooDeep { .. } => ErrorKind::SelectionTooDeep,
            Error::ResolverFailed { .. } | Error::DataSource(_) => ErrorKind::ResolverFailed,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
