//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Tunables for query execution. Every field has a default, so a partial
/// JSON document (or `{}`) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest selection tree accepted; deeper queries are rejected whole.
    pub max_depth: usize,
    /// Treat a union variant with no selection branch as an error instead
    /// of projecting it to an empty object.
    pub strict_variant_selection: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            strict_variant_selection: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_variant_selection = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json(r#"{"strict_variant_selection": true}"#).unwrap();
        assert!(config.strict_variant_selection);
        assert_eq!(config.max_depth, 32);
    }

    #[test]
    fn test_bad_json_is_serialization_error() {
        let err = EngineConfig::from_json(r#"{"max_depth": "deep"}"#).unwrap_err();
        assert!(matches!(err, crate::Error::Serialization(_)));
    }
}
