//! # Schema
//!
//! Declared shapes, unions and root fields.
//!
//! Setup is single-writer: a [`SchemaBuilder`] owns the mutable registry and
//! the root-field table, and [`SchemaBuilder::build`] validates both and
//! freezes them into an immutable [`Schema`]. Query execution only ever sees
//! `&Schema`, so concurrent reads need no locking.

pub mod registry;
pub mod root;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub use registry::ShapeRegistry;
pub use root::{CollectionResolver, RootField, RootResolver};

/// Name of the meta field available on every object shape.
pub const TYPENAME_FIELD: &str = "__typename";

// ============================================================================
// Field kinds
// ============================================================================

/// Built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    Id,
    String,
    Int,
    Float,
    Boolean,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Id => "ID",
            ScalarKind::String => "String",
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::Boolean => "Boolean",
        }
    }
}

/// Declared kind of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// Nested object of the named shape.
    Shape(String),
    /// One of the members of the named union.
    Union(String),
    List(Box<FieldKind>),
}

impl FieldKind {
    pub fn shape(name: impl Into<String>) -> Self { FieldKind::Shape(name.into()) }
    pub fn union(name: impl Into<String>) -> Self { FieldKind::Union(name.into()) }
    pub fn list(inner: FieldKind) -> Self { FieldKind::List(Box::new(inner)) }

    pub fn is_scalar(&self) -> bool {
        matches!(self, FieldKind::Scalar(_))
    }

    /// Innermost non-list kind.
    pub fn item_kind(&self) -> &FieldKind {
        match self {
            FieldKind::List(inner) => inner.item_kind(),
            other => other,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar(s) => write!(f, "{}", s.name()),
            FieldKind::Shape(name) | FieldKind::Union(name) => write!(f, "{name}"),
            FieldKind::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

// ============================================================================
// Shapes
// ============================================================================

/// A declared field on a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

/// A named object shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl Shape {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    /// Declare a field. Duplicates are rejected when the shape is registered.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef { name: name.into(), kind });
        self
    }

    pub fn scalar(self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.field(name, FieldKind::Scalar(kind))
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A named closed set of alternative object shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionShape {
    pub name: String,
    /// Member shape names, in registration order.
    pub members: Vec<String>,
}

impl UnionShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), members: Vec::new() }
    }

    pub fn member(mut self, shape: impl Into<String>) -> Self {
        self.members.push(shape.into());
        self
    }

    pub fn has_member(&self, shape: &str) -> bool {
        self.members.iter().any(|m| m == shape)
    }
}

/// Anything the registry can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeDef {
    Object(Shape),
    Union(UnionShape),
}

impl ShapeDef {
    pub fn name(&self) -> &str {
        match self {
            ShapeDef::Object(s) => &s.name,
            ShapeDef::Union(u) => &u.name,
        }
    }
}

impl From<Shape> for ShapeDef { fn from(s: Shape) -> Self { ShapeDef::Object(s) } }
impl From<UnionShape> for ShapeDef { fn from(u: UnionShape) -> Self { ShapeDef::Union(u) } }

// ============================================================================
// Schema / SchemaBuilder
// ============================================================================

/// Frozen schema: registry plus root-field table.
pub struct Schema {
    registry: ShapeRegistry,
    roots: IndexMap<String, RootField>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn root_field(&self, name: &str) -> Result<&RootField> {
        self.roots
            .get(name)
            .ok_or_else(|| Error::UnknownRootField(name.to_owned()))
    }

    pub fn root_field_names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("registry", &self.registry)
            .field("roots", &self.roots.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Mutable setup phase of a [`Schema`].
#[derive(Default)]
pub struct SchemaBuilder {
    registry: ShapeRegistry,
    roots: IndexMap<String, RootField>,
}

impl SchemaBuilder {
    /// Register a shape or union. Fails on a duplicate name.
    pub fn register(&mut self, def: impl Into<ShapeDef>) -> Result<&mut Self> {
        self.registry.register(def.into())?;
        Ok(self)
    }

    /// Register a root field and the resolver that supplies its value.
    pub fn root_field<R>(&mut self, name: impl Into<String>, kind: FieldKind, resolver: R) -> Result<&mut Self>
    where
        R: RootResolver + 'static,
    {
        let name = name.into();
        if self.roots.contains_key(&name) {
            return Err(Error::DuplicateRootField(name));
        }
        tracing::debug!(root = %name, kind = %kind, "registered root field");
        let field = RootField::new(name.clone(), kind, resolver);
        self.roots.insert(name, field);
        Ok(self)
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    /// Validate every reference and freeze.
    pub fn build(self) -> Result<Schema> {
        self.registry.validate()?;
        for root in self.roots.values() {
            self.registry.check_kind(&root.kind).map_err(|e| {
                Error::InvalidSchema(format!("root field \"{}\": {e}", root.name))
            })?;
        }
        tracing::info!(
            shapes = self.registry.len(),
            roots = self.roots.len(),
            "schema built"
        );
        Ok(Schema { registry: self.registry, roots: self.roots })
    }
}
