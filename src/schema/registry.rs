//! Shape registry: every declared shape and union, keyed by name.

use hashbrown::{HashMap, HashSet};

use super::{FieldKind, Shape, ShapeDef, UnionShape};
use crate::{Error, Result};

/// Name → shape definition, plus registration order.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    defs: HashMap<String, ShapeDef>,
    order: Vec<String>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape or union. Fails with `DuplicateShape` if the name is
    /// taken, or `InvalidSchema` if an object shape repeats a field name.
    pub fn register(&mut self, def: ShapeDef) -> Result<()> {
        let name = def.name().to_owned();
        if self.defs.contains_key(&name) {
            return Err(Error::DuplicateShape(name));
        }
        if let ShapeDef::Object(shape) = &def {
            let mut seen = HashSet::new();
            for field in &shape.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(Error::InvalidSchema(format!(
                        "shape \"{name}\" declares field \"{}\" twice",
                        field.name
                    )));
                }
            }
        }
        tracing::debug!(shape = %name, "registered shape");
        self.order.push(name.clone());
        self.defs.insert(name, def);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&ShapeDef> {
        self.defs
            .get(name)
            .ok_or_else(|| Error::UnknownShape(name.to_owned()))
    }

    pub fn lookup_object(&self, name: &str) -> Result<&Shape> {
        match self.lookup(name)? {
            ShapeDef::Object(shape) => Ok(shape),
            ShapeDef::Union(_) => Err(Error::InvalidSchema(format!(
                "\"{name}\" is a union, expected an object shape"
            ))),
        }
    }

    pub fn lookup_union(&self, name: &str) -> Result<&UnionShape> {
        match self.lookup(name)? {
            ShapeDef::Union(union) => Ok(union),
            ShapeDef::Object(_) => Err(Error::InvalidSchema(format!(
                "\"{name}\" is an object shape, expected a union"
            ))),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ShapeDef> {
        self.order.iter().filter_map(|name| self.defs.get(name))
    }

    /// Check that a field kind only references registered shapes of the
    /// right kind.
    pub fn check_kind(&self, kind: &FieldKind) -> Result<()> {
        match kind {
            FieldKind::Scalar(_) => Ok(()),
            FieldKind::Shape(name) => self.lookup_object(name).map(|_| ()),
            FieldKind::Union(name) => self.lookup_union(name).map(|_| ()),
            FieldKind::List(inner) => self.check_kind(inner),
        }
    }

    /// Whole-registry consistency check, run once before the schema is frozen.
    pub fn validate(&self) -> Result<()> {
        for def in self.iter() {
            match def {
                ShapeDef::Object(shape) => {
                    for field in &shape.fields {
                        self.check_kind(&field.kind).map_err(|e| {
                            Error::InvalidSchema(format!(
                                "field \"{}.{}\": {e}",
                                shape.name, field.name
                            ))
                        })?;
                    }
                }
                ShapeDef::Union(union) => self.validate_union(union)?,
            }
        }
        Ok(())
    }

    fn validate_union(&self, union: &UnionShape) -> Result<()> {
        if union.members.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "union \"{}\" has no members",
                union.name
            )));
        }
        let mut seen = HashSet::new();
        for member in &union.members {
            // Members are told apart by name alone.
            if !seen.insert(member.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "union \"{}\" lists member \"{member}\" twice",
                    union.name
                )));
            }
            self.lookup_object(member).map_err(|e| {
                Error::InvalidSchema(format!("union \"{}\": {e}", union.name))
            })?;
        }
        Ok(())
    }
}
