//! # Selection Trees
//!
//! The caller-specified set of fields to include in a response, already
//! parsed by whoever owns the query language. Pure data, no schema
//! references, no execution logic.
//!
//! A union-typed field does not carry one flat field list: it carries one
//! list per member shape (`Selection::Variants`), so each concrete variant
//! can ask for different fields. A variant with no entry is legal.
//!
//! ```text
//! events {                       SelectionNode::fields("events", [
//!   id                             leaf("id"),
//!   payload {                      variants("payload", [
//!     ... on Document { title }      ("Document", [leaf("title")]),
//!     ... on Report { name }         ("Report",   [leaf("name")]),
//!   }                              ]),
//! }                              ])
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A query: exactly one root field and its selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub root: SelectionNode,
}

impl Query {
    pub fn new(root: SelectionNode) -> Self {
        Self { root }
    }

    /// Name of the addressed root field.
    pub fn root_name(&self) -> &str {
        &self.root.name
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

/// One requested field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionNode {
    pub name: String,
    /// Output key to use instead of `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Selection::is_leaf")]
    pub selection: Selection,
}

/// What to select beneath a field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Scalar field; nothing beneath.
    #[default]
    Leaf,
    /// Object (or list of objects) of one shape.
    Fields(Vec<SelectionNode>),
    /// Union (or list of unions): member shape name → fields for that member.
    Variants(IndexMap<String, Vec<SelectionNode>>),
}

impl SelectionNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self { name: name.into(), alias: None, selection: Selection::Leaf }
    }

    pub fn fields(name: impl Into<String>, fields: impl IntoIterator<Item = SelectionNode>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            selection: Selection::Fields(fields.into_iter().collect()),
        }
    }

    pub fn variants<S, I>(name: impl Into<String>, variants: impl IntoIterator<Item = (S, I)>) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = SelectionNode>,
    {
        let variants = variants
            .into_iter()
            .map(|(shape, fields)| (shape.into(), fields.into_iter().collect()))
            .collect();
        Self {
            name: name.into(),
            alias: None,
            selection: Selection::Variants(variants),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Key this field is written under in the result.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Nesting depth; a leaf counts as 1.
    pub fn depth(&self) -> usize {
        1 + self.selection.depth()
    }
}

impl Selection {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Selection::Leaf)
    }

    pub fn depth(&self) -> usize {
        fn deepest<'a>(nodes: impl Iterator<Item = &'a SelectionNode>) -> usize {
            nodes.map(SelectionNode::depth).max().unwrap_or(0)
        }
        match self {
            Selection::Leaf => 0,
            Selection::Fields(nodes) => deepest(nodes.iter()),
            Selection::Variants(branches) => deepest(branches.values().flatten()),
        }
    }
}
