//! Object values: a shape tag plus named fields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Value;

/// Field name → value.
pub type FieldMap = HashMap<String, Value>;

/// A structured value of a concrete shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Discriminator: the name of the shape this object concretely is.
    pub shape: String,
    pub fields: FieldMap,
}

impl Object {
    pub fn new(shape: impl Into<String>) -> Self {
        Self {
            shape: shape.into(),
            fields: FieldMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Insert `value` only when `present` holds. Used for `omitempty`-style
    /// identifiers that are left off the object when blank.
    pub fn with_field_if(self, present: bool, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if present { self.with_field(key, value) } else { self }
    }

    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_shape(&self, shape: &str) -> bool {
        self.shape == shape
    }
}
