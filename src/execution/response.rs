//! Response envelope: `{"data": ..., "errors": [...]}`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Path;
use crate::model::Value;
use crate::{Error, Result};

/// Insertion-ordered object in the result tree. Keys appear in the order the
/// selection requested them, so serialization is deterministic.
pub type ResultMap = IndexMap<String, ResultValue>;

/// A node of the result tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ResultValue>),
    Object(ResultMap),
}

impl ResultValue {
    pub fn is_null(&self) -> bool { matches!(self, ResultValue::Null) }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResultValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ResultValue]> {
        match self {
            ResultValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ResultMap> {
        match self {
            ResultValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Object member lookup; `None` for non-objects and absent keys.
    pub fn get(&self, key: &str) -> Option<&ResultValue> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl From<&str> for ResultValue { fn from(v: &str) -> Self { ResultValue::String(v.to_owned()) } }
impl From<String> for ResultValue { fn from(v: String) -> Self { ResultValue::String(v) } }
impl From<i64> for ResultValue { fn from(v: i64) -> Self { ResultValue::Int(v) } }
impl From<bool> for ResultValue { fn from(v: bool) -> Self { ResultValue::Bool(v) } }
impl From<ResultMap> for ResultValue { fn from(v: ResultMap) -> Self { ResultValue::Object(v) } }

impl TryFrom<&Value> for ResultValue {
    type Error = &'static str;

    /// Scalars only; containers go through the projector.
    fn try_from(value: &Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(ResultValue::Null),
            Value::Bool(b) => Ok(ResultValue::Bool(*b)),
            Value::Int(i) => Ok(ResultValue::Int(*i)),
            Value::Float(f) => Ok(ResultValue::Float(*f)),
            Value::String(s) => Ok(ResultValue::String(s.clone())),
            other => Err(other.type_name()),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Machine-readable error code, reported as `extensions.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    DuplicateShape,
    UnknownShape,
    InvalidSchema,
    DuplicateRootField,
    UnresolvedUnionVariant,
    UnknownField,
    UnknownRootField,
    TypeMismatch,
    InvalidSelection,
    SelectionTooDeep,
    ResolverFailed,
    Decode,
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ErrorKind::DuplicateShape => "DUPLICATE_SHAPE",
            ErrorKind::UnknownShape => "UNKNOWN_SHAPE",
            ErrorKind::InvalidSchema => "INVALID_SCHEMA",
            ErrorKind::DuplicateRootField => "DUPLICATE_ROOT_FIELD",
            ErrorKind::UnresolvedUnionVariant => "UNRESOLVED_UNION_VARIANT",
            ErrorKind::UnknownField => "UNKNOWN_FIELD",
            ErrorKind::UnknownRootField => "UNKNOWN_ROOT_FIELD",
            ErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ErrorKind::InvalidSelection => "INVALID_SELECTION",
            ErrorKind::SelectionTooDeep => "SELECTION_TOO_DEEP",
            ErrorKind::ResolverFailed => "RESOLVER_FAILED",
            ErrorKind::Decode => "DECODE",
            ErrorKind::Serialization => "SERIALIZATION",
        };
        f.write_str(code)
    }
}

/// `extensions` member of a [`FieldError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorExtensions {
    pub code: ErrorKind,
}

/// One entry of the `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub message: String,
    /// Where in `data` the failure happened; empty for query-level errors.
    #[serde(default, skip_serializing_if = "Path::is_empty")]
    pub path: Path,
    pub extensions: ErrorExtensions,
}

impl FieldError {
    pub fn new(error: &Error, path: Path) -> Self {
        Self {
            message: error.to_string(),
            path,
            extensions: ErrorExtensions { code: error.kind() },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.extensions.code
    }
}

// ============================================================================
// Response
// ============================================================================

/// The two-channel result of one query.
///
/// `data` holds whatever could be projected; `errors` lists every failure.
/// `data` is `None` only when the query as a whole was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub data: Option<ResultMap>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl Response {
    pub fn new(data: ResultMap, errors: Vec<FieldError>) -> Self {
        Self { data: Some(data), errors }
    }

    /// Query-level rejection: no data, a single error.
    pub fn rejected(error: FieldError) -> Self {
        Self { data: None, errors: vec![error] }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Top-level entry of `data`.
    pub fn get(&self, key: &str) -> Option<&ResultValue> {
        self.data.as_ref().and_then(|data| data.get(key))
    }

    pub fn error_kinds(&self) -> Vec<ErrorKind> {
        self.errors.iter().map(FieldError::kind).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
