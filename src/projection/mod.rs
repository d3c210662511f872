//! # Field Projection
//!
//! Walks a selection over a value and its declared shape, keeping only the
//! requested fields. Union-typed fields are handed to the union resolver
//! first; the member's own branch of the selection is then projected.
//!
//! Failures never abort siblings. Each one is recorded as a [`FieldError`]
//! at its path and the affected entry becomes `null` (or is left out, for
//! fields the shape does not declare).

use crate::config::EngineConfig;
use crate::execution::{FieldError, Path, ResultMap, ResultValue};
use crate::model::{Object, Value};
use crate::resolver::resolve_variant;
use crate::schema::{FieldKind, ScalarKind, Shape, ShapeRegistry, TYPENAME_FIELD};
use crate::selection::{Selection, SelectionNode};
use crate::Error;
use hashbrown::HashSet;

/// Output of a standalone projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub tree: ResultMap,
    pub errors: Vec<FieldError>,
}

/// Project `selection` out of `value`, which is declared as `shape`.
pub fn project(registry: &ShapeRegistry, value: &Object, shape: &Shape, selection: &[SelectionNode]) -> Projection {
    let config = EngineConfig::default();
    let mut projector = Projector::new(registry, &config);
    let tree = projector.project_object(value, shape, selection);
    Projection { tree, errors: projector.finish() }
}

/// Projection state for one query: the current path and collected errors.
pub struct Projector<'a> {
    registry: &'a ShapeRegistry,
    strict_variants: bool,
    path: Path,
    errors: Vec<FieldError>,
    /// Variant selections whose keys were already checked against their union.
    checked_variants: HashSet<*const Selection>,
}

impl<'a> Projector<'a> {
    pub fn new(registry: &'a ShapeRegistry, config: &EngineConfig) -> Self {
        Self {
            registry,
            strict_variants: config.strict_variant_selection,
            path: Path::new(),
            errors: Vec::new(),
            checked_variants: HashSet::new(),
        }
    }

    /// Start projecting below `path` instead of the root.
    pub fn set_path(&mut self, path: Path) {
        self.path = path;
    }

    /// Hand back every error collected so far.
    pub fn finish(self) -> Vec<FieldError> {
        self.errors
    }

    /// Record an error at the current path.
    pub fn record(&mut self, error: Error) {
        tracing::warn!(path = %self.path, %error, "field error");
        self.errors.push(FieldError::new(&error, self.path.clone()));
    }

    /// Project the requested fields of one object.
    pub fn project_object(&mut self, value: &Object, shape: &Shape, nodes: &[SelectionNode]) -> ResultMap {
        let mut out = ResultMap::with_capacity(nodes.len());
        for node in nodes {
            let key = node.response_key();
            self.path.push_key(key);

            if node.name == TYPENAME_FIELD {
                let entry = if node.selection.is_leaf() {
                    ResultValue::from(shape.name.as_str())
                } else {
                    self.record(invalid(&shape.name, &node.name, "__typename takes no sub-selection"));
                    ResultValue::Null
                };
                out.insert(key.to_owned(), entry);
            } else if let Some(def) = shape.get_field(&node.name) {
                let entry = self.project_field(&shape.name, &def.name, &def.kind, value.get(&def.name), &node.selection);
                out.insert(key.to_owned(), entry);
            } else {
                self.record(Error::UnknownField {
                    shape: shape.name.clone(),
                    field: node.name.clone(),
                });
            }

            self.path.pop();
        }
        out
    }

    /// Project one field of `owner`. The current path must already point at
    /// the field's response key.
    pub fn project_field(
        &mut self,
        owner: &str,
        field: &str,
        kind: &FieldKind,
        value: Option<&Value>,
        selection: &Selection,
    ) -> ResultValue {
        if let Err(error) = self.check_selection(owner, field, kind, selection) {
            self.record(error);
            return ResultValue::Null;
        }
        // Once per selection node, not once per list element.
        if let (FieldKind::Union(name), Selection::Variants(branches)) = (kind.item_kind(), selection) {
            if self.checked_variants.insert(std::ptr::from_ref(selection)) {
                self.check_variant_keys(owner, field, name, branches.keys());
            }
        }
        self.project_kind(owner, field, kind, value, selection)
    }

    fn project_kind(
        &mut self,
        owner: &str,
        field: &str,
        kind: &FieldKind,
        value: Option<&Value>,
        selection: &Selection,
    ) -> ResultValue {
        let registry = self.registry;
        // Absent is not an error: it projects to null.
        let value = match value {
            None | Some(Value::Null) => return ResultValue::Null,
            Some(v) => v,
        };

        match kind {
            FieldKind::Scalar(scalar) => match coerce_scalar(*scalar, value) {
                Some(out) => out,
                None => self.mismatch(owner, field, kind, value),
            },

            FieldKind::Shape(name) => {
                let Selection::Fields(nodes) = selection else {
                    return ResultValue::Null;
                };
                let obj = match value.as_object() {
                    Some(obj) if obj.is_shape(name) => obj,
                    _ => return self.mismatch(owner, field, kind, value),
                };
                match registry.lookup_object(name) {
                    Ok(shape) => ResultValue::Object(self.project_object(obj, shape, nodes)),
                    Err(error) => {
                        self.record(error);
                        ResultValue::Null
                    }
                }
            }

            FieldKind::Union(name) => {
                let Selection::Variants(branches) = selection else {
                    return ResultValue::Null;
                };
                let member = match registry
                    .lookup_union(name)
                    .and_then(|union| resolve_variant(registry, union, value))
                {
                    Ok(member) => member,
                    Err(error) => {
                        self.record(error);
                        return ResultValue::Null;
                    }
                };
                // Resolution only succeeds for objects.
                let Some(obj) = value.as_object() else {
                    return ResultValue::Null;
                };
                match branches.get(&member.name) {
                    Some(nodes) => ResultValue::Object(self.project_object(obj, member, nodes)),
                    None if self.strict_variants => {
                        self.record(invalid(
                            owner,
                            field,
                            &format!("no selection given for variant \"{}\" of union \"{name}\"", member.name),
                        ));
                        ResultValue::Null
                    }
                    None => ResultValue::Object(ResultMap::new()),
                }
            }

            FieldKind::List(inner) => {
                let Some(items) = value.as_list() else {
                    return self.mismatch(owner, field, kind, value);
                };
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    self.path.push_index(idx);
                    out.push(self.project_kind(owner, field, inner, Some(item), selection));
                    self.path.pop();
                }
                ResultValue::List(out)
            }
        }
    }

    /// The selection must have the form the field's kind calls for.
    fn check_selection(&self, owner: &str, field: &str, kind: &FieldKind, selection: &Selection) -> Result<(), Error> {
        let problem = match kind.item_kind() {
            FieldKind::Scalar(_) if !selection.is_leaf() => "scalar field takes no sub-selection".to_owned(),
            FieldKind::Shape(name) => match selection {
                Selection::Fields(nodes) if !nodes.is_empty() => return Ok(()),
                _ => format!("shape \"{name}\" requires a non-empty field selection"),
            },
            FieldKind::Union(name) => match selection {
                Selection::Variants(branches) if !branches.is_empty() => return Ok(()),
                _ => format!("union \"{name}\" requires a per-variant selection"),
            },
            _ => return Ok(()),
        };
        Err(invalid(owner, field, &problem))
    }

    fn check_variant_keys<'k>(
        &mut self,
        owner: &str,
        field: &str,
        union_name: &str,
        keys: impl Iterator<Item = &'k String>,
    ) {
        let registry = self.registry;
        let Ok(union) = registry.lookup_union(union_name) else {
            return;
        };
        let unknown: Vec<&String> = keys.filter(|k| !union.has_member(k)).collect();
        for key in unknown {
            let message = format!("\"{key}\" is not a member of union \"{union_name}\"");
            self.record(invalid(owner, field, &message));
        }
    }

    fn mismatch(&mut self, owner: &str, field: &str, kind: &FieldKind, value: &Value) -> ResultValue {
        let got = match value.as_object() {
            Some(obj) => obj.shape().to_owned(),
            None => value.type_name().to_owned(),
        };
        self.record(Error::TypeMismatch {
            shape: owner.to_owned(),
            field: field.to_owned(),
            expected: kind.to_string(),
            got,
        });
        ResultValue::Null
    }
}

fn invalid(shape: &str, field: &str, message: &str) -> Error {
    Error::InvalidSelection {
        shape: shape.to_owned(),
        field: field.to_owned(),
        message: message.to_owned(),
    }
}

/// Scalar coercion. IDs accept integers and render them as strings.
fn coerce_scalar(kind: ScalarKind, value: &Value) -> Option<ResultValue> {
    match (kind, value) {
        (ScalarKind::Id, Value::String(s)) | (ScalarKind::String, Value::String(s)) => {
            Some(ResultValue::String(s.clone()))
        }
        (ScalarKind::Id, Value::Int(i)) => Some(ResultValue::String(i.to_string())),
        (ScalarKind::Int, Value::Int(i)) => Some(ResultValue::Int(*i)),
        (ScalarKind::Float, Value::Float(_) | Value::Int(_)) => value.as_float().map(ResultValue::Float),
        (ScalarKind::Boolean, Value::Bool(b)) => Some(ResultValue::Bool(*b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ErrorKind;
    use crate::schema::UnionShape;
    use pretty_assertions::assert_eq;

    fn registry() -> ShapeRegistry {
        let mut reg = ShapeRegistry::new();
        reg.register(
            Shape::new("Document")
                .scalar("id", ScalarKind::Id)
                .scalar("title", ScalarKind::String)
                .into(),
        )
        .unwrap();
        reg.register(
            Shape::new("Report")
                .scalar("id", ScalarKind::Id)
                .scalar("name", ScalarKind::String)
                .into(),
        )
        .unwrap();
        reg.register(UnionShape::new("Payload").member("Document").member("Report").into())
            .unwrap();
        reg.register(
            Shape::new("Event")
                .scalar("id", ScalarKind::Id)
                .scalar("name", ScalarKind::String)
                .field("payload", FieldKind::union("Payload"))
                .field("attachments", FieldKind::list(FieldKind::union("Payload")))
                .field("origin", FieldKind::shape("Document"))
                .into(),
        )
        .unwrap();
        reg.validate().unwrap();
        reg
    }

    fn report_event() -> Object {
        Object::new("Event")
            .with_field("id", "2")
            .with_field("name", "REPORT_CREATED_EVENT")
            .with_field(
                "payload",
                Object::new("Report").with_field("id", "2").with_field("name", "This is a report"),
            )
    }

    fn payload_selection() -> SelectionNode {
        SelectionNode::variants(
            "payload",
            [
                ("Document", vec![SelectionNode::leaf("id"), SelectionNode::leaf("title")]),
                ("Report", vec![SelectionNode::leaf("id"), SelectionNode::leaf("name")]),
            ],
        )
    }

    fn leaf_strings(map: &ResultMap) -> Vec<(&str, Option<&str>)> {
        map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn test_selection_narrowing() {
        let reg = registry();
        let shape = reg.lookup_object("Report").unwrap();
        let report = Object::new("Report").with_field("id", "2").with_field("name", "r");

        let out = project(&reg, &report, shape, &[SelectionNode::leaf("id")]);
        assert!(out.errors.is_empty());
        assert_eq!(leaf_strings(&out.tree), vec![("id", Some("2"))]);
    }

    #[test]
    fn test_unknown_field_keeps_siblings() {
        let reg = registry();
        let shape = reg.lookup_object("Report").unwrap();
        let report = Object::new("Report").with_field("id", "2").with_field("name", "r");

        let out = project(
            &reg,
            &report,
            shape,
            &[SelectionNode::leaf("c"), SelectionNode::leaf("name")],
        );
        assert_eq!(leaf_strings(&out.tree), vec![("name", Some("r"))]);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind(), ErrorKind::UnknownField);
        assert_eq!(out.errors[0].path.to_string(), "c");
        assert!(out.errors[0].message.contains("\"c\""));
        assert!(out.errors[0].message.contains("\"Report\""));
    }

    #[test]
    fn test_per_variant_selection_uses_resolved_branch_only() {
        let reg = registry();
        let shape = reg.lookup_object("Event").unwrap();

        let out = project(&reg, &report_event(), shape, &[payload_selection()]);
        assert!(out.errors.is_empty());
        let payload = out.tree["payload"].as_object().unwrap();
        assert_eq!(
            leaf_strings(payload),
            vec![("id", Some("2")), ("name", Some("This is a report"))]
        );
        assert!(payload.get("title").is_none());
    }

    #[test]
    fn test_missing_variant_branch_is_empty_object() {
        let reg = registry();
        let shape = reg.lookup_object("Event").unwrap();
        let only_documents = SelectionNode::variants(
            "payload",
            [("Document", vec![SelectionNode::leaf("title")])],
        );

        let out = project(&reg, &report_event(), shape, &[only_documents]);
        assert!(out.errors.is_empty());
        assert_eq!(out.tree["payload"], ResultValue::Object(ResultMap::new()));
    }

    #[test]
    fn test_missing_variant_branch_strict() {
        let reg = registry();
        let shape = reg.lookup_object("Event").unwrap();
        let config = EngineConfig { strict_variant_selection: true, ..EngineConfig::default() };
        let only_documents = SelectionNode::variants(
            "payload",
            [("Document", vec![SelectionNode::leaf("title")])],
        );

        let mut projector = Projector::new(&reg, &config);
        let tree = projector.project_object(&report_event(), shape, &[only_documents]);
        let errors = projector.finish();

        assert!(tree["payload"].is_null());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ErrorKind::InvalidSelection);
        assert_eq!(errors[0].path.to_string(), "payload");
    }

    #[test]
    fn test_unresolved_variant_nulls_subtree() {
        let reg = registry();
        let shape = reg.lookup_object("Event").unwrap();
        let event = Object::new("Event")
            .with_field("id", "9")
            .with_field("payload", Object::new("Memo").with_field("id", "9"));

        let out = project(&reg, &event, shape, &[SelectionNode::leaf("id"), payload_selection()]);
        assert_eq!(out.tree["id"], ResultValue::from("9"));
        assert!(out.tree["payload"].is_null());
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind(), ErrorKind::UnresolvedUnionVariant);
        assert!(out.errors[0].message.contains("Memo"));
        assert!(out.errors[0].message.contains("Payload"));
    }

    #[test]
    fn test_absent_scalar_is_null_not_error() {
        let reg = registry();
        let shape = reg.lookup_object("Document").unwrap();
        let doc = Object::new("Document").with_field("title", "untitled");

        let out = project(&reg, &doc, shape, &[SelectionNode::leaf("id"), SelectionNode::leaf("title")]);
        assert!(out.errors.is_empty());
        assert!(out.tree["id"].is_null());
        assert_eq!(out.tree["title"], ResultValue::from("untitled"));
    }

    #[test]
    fn test_list_of_unions_preserves_order_and_paths() {
        let reg = registry();
        let shape = reg.lookup_object("Event").unwrap();
        let event = Object::new("Event").with_field(
            "attachments",
            vec![
                Value::from(Object::new("Report").with_field("id", "r1")),
                Value::from(Object::new("Memo")),
                Value::from(Object::new("Document").with_field("id", "d1")),
            ],
        );
        let selection = SelectionNode::variants(
            "attachments",
            [
                ("Document", vec![SelectionNode::leaf("id")]),
                ("Report", vec![SelectionNode::leaf("id")]),
            ],
        );

        let out = project(&reg, &event, shape, &[selection]);
        let items = out.tree["attachments"].as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].get("id"), Some(&ResultValue::from("r1")));
        assert!(items[1].is_null());
        assert_eq!(items[2].get("id"), Some(&ResultValue::from("d1")));
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].path.to_string(), "attachments[1]");
    }

    #[test]
    fn test_typename_and_alias() {
        let reg = registry();
        let shape = reg.lookup_object("Event").unwrap();
        let selection = SelectionNode::variants(
            "payload",
            [(
                "Report",
                vec![
                    SelectionNode::leaf(TYPENAME_FIELD),
                    SelectionNode::leaf("name").with_alias("label"),
                ],
            )],
        )
        .with_alias("body");

        let out = project(&reg, &report_event(), shape, &[selection]);
        assert!(out.errors.is_empty());
        let body = out.tree["body"].as_object().unwrap();
        assert_eq!(
            leaf_strings(body),
            vec![("__typename", Some("Report")), ("label", Some("This is a report"))]
        );
    }

    #[test]
    fn test_selection_kind_mismatch() {
        let reg = registry();
        let shape = reg.lookup_object("Event").unwrap();

        let out = project(
            &reg,
            &report_event(),
            shape,
            &[
                SelectionNode::leaf("payload"),
                SelectionNode::fields("name", [SelectionNode::leaf("x")]),
            ],
        );
        assert!(out.tree["payload"].is_null());
        assert!(out.tree["name"].is_null());
        assert_eq!(
            out.errors.iter().map(FieldError::kind).collect::<Vec<_>>(),
            vec![ErrorKind::InvalidSelection, ErrorKind::InvalidSelection]
        );
    }

    #[test]
    fn test_unknown_variant_key_reported_but_projection_continues() {
        let reg = registry();
        let shape = reg.lookup_object("Event").unwrap();
        let selection = SelectionNode::variants(
            "payload",
            [
                ("Memo", vec![SelectionNode::leaf("id")]),
                ("Report", vec![SelectionNode::leaf("id")]),
            ],
        );

        let out = project(&reg, &report_event(), shape, &[selection]);
        assert_eq!(out.tree["payload"].get("id"), Some(&ResultValue::from("2")));
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind(), ErrorKind::InvalidSelection);
    }

    #[test]
    fn test_empty_selection_on_composite_fields() {
        let reg = registry();
        let shape = reg.lookup_object("Event").unwrap();
        let event = report_event().with_field("origin", Object::new("Document").with_field("id", "1"));

        let out = project(
            &reg,
            &event,
            shape,
            &[
                SelectionNode::fields("origin", Vec::<SelectionNode>::new()),
                SelectionNode {
                    name: "payload".into(),
                    alias: None,
                    selection: Selection::Variants(Default::default()),
                },
                SelectionNode::leaf("id"),
            ],
        );
        assert!(out.tree["origin"].is_null());
        assert!(out.tree["payload"].is_null());
        assert_eq!(out.tree["id"], ResultValue::from("2"));
        assert_eq!(
            out.errors.iter().map(FieldError::kind).collect::<Vec<_>>(),
            vec![ErrorKind::InvalidSelection, ErrorKind::InvalidSelection]
        );
        assert_eq!(out.errors[0].path.to_string(), "origin");
        assert_eq!(out.errors[1].path.to_string(), "payload");
    }

    #[test]
    fn test_empty_branch_inside_variants_is_legal() {
        let reg = registry();
        let shape = reg.lookup_object("Event").unwrap();
        let selection = SelectionNode::variants(
            "payload",
            [("Report", Vec::<SelectionNode>::new()), ("Document", vec![SelectionNode::leaf("id")])],
        );

        let out = project(&reg, &report_event(), shape, &[selection]);
        assert!(out.errors.is_empty());
        assert_eq!(out.tree["payload"], ResultValue::Object(ResultMap::new()));
    }

    #[test]
    fn test_unknown_variant_key_reported_once_per_selection() {
        let reg = registry();
        let shape = reg.lookup_object("Event").unwrap();
        let config = EngineConfig::default();
        let document_event = Object::new("Event")
            .with_field("id", "1")
            .with_field("payload", Object::new("Document").with_field("id", "1"));
        let nodes = [SelectionNode::variants(
            "payload",
            [
                ("Memo", vec![SelectionNode::leaf("id")]),
                ("Report", vec![SelectionNode::leaf("id")]),
            ],
        )];

        let mut projector = Projector::new(&reg, &config);
        for (idx, event) in [document_event, report_event()].iter().enumerate() {
            projector.path.push_index(idx);
            projector.project_object(event, shape, &nodes);
            projector.path.pop();
        }
        let errors = projector.finish();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ErrorKind::InvalidSelection);
        assert!(errors[0].message.contains("\"Memo\""));
        assert_eq!(errors[0].path.to_string(), "[0].payload");
    }

    #[test]
    fn test_nested_shape_with_wrong_discriminator() {
        let reg = registry();
        let shape = reg.lookup_object("Event").unwrap();
        let event = Object::new("Event").with_field("origin", Object::new("Report"));

        let out = project(
            &reg,
            &event,
            shape,
            &[SelectionNode::fields("origin", [SelectionNode::leaf("id")])],
        );
        assert!(out.tree["origin"].is_null());
        assert_eq!(out.errors[0].kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_scalar_coercion() {
        assert_eq!(coerce_scalar(ScalarKind::Id, &Value::from(7)), Some(ResultValue::from("7")));
        assert_eq!(coerce_scalar(ScalarKind::Float, &Value::from(2)), Some(ResultValue::Float(2.0)));
        assert_eq!(coerce_scalar(ScalarKind::Int, &Value::from("7")), None);
        assert_eq!(coerce_scalar(ScalarKind::Boolean, &Value::from(true)), Some(ResultValue::Bool(true)));
    }
}
