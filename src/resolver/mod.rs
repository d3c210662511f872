//! Union resolution: which member shape is this value?
//!
//! Every object carries its shape name as an explicit discriminator. The
//! resolver compares it exactly against the union's members, in registration
//! order, and takes the first hit. There is no fallback member: a value that
//! matches nothing is an error, because silently dropping a payload would
//! look like an empty result.

use crate::model::Value;
use crate::schema::{Shape, ShapeRegistry, UnionShape};
use crate::{Error, Result};

/// Exposes the runtime marker that identifies a value's concrete shape.
pub trait Discriminator {
    /// Shape name, or `None` if the value is not an object.
    fn discriminator(&self) -> Option<&str>;

    /// What to report when resolution fails.
    fn observed_shape(&self) -> &str;
}

impl Discriminator for Value {
    fn discriminator(&self) -> Option<&str> {
        self.as_object().map(|obj| obj.shape())
    }

    fn observed_shape(&self) -> &str {
        self.discriminator().unwrap_or_else(|| self.type_name())
    }
}

/// Resolve `value` to the member of `union` it concretely is.
pub fn resolve_variant<'r, V>(registry: &'r ShapeRegistry, union: &UnionShape, value: &V) -> Result<&'r Shape>
where
    V: Discriminator + ?Sized,
{
    let unresolved = || Error::UnresolvedUnionVariant {
        union: union.name.clone(),
        observed: value.observed_shape().to_owned(),
    };

    let tag = value.discriminator().ok_or_else(unresolved)?;
    let member = union
        .members
        .iter()
        .find(|m| m.as_str() == tag)
        .ok_or_else(unresolved)?;

    tracing::trace!(union = %union.name, variant = %member, "resolved union variant");
    registry.lookup_object(member)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Object;
    use crate::schema::ScalarKind;
    use proptest::prelude::*;

    fn registry() -> (ShapeRegistry, UnionShape) {
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
        let union = UnionShape::new("Payload").member("Document").member("Report");
        reg.register(union.clone().into()).unwrap();
        reg.validate().unwrap();
        (reg, union)
    }

    #[test]
    fn test_resolves_each_member() {
        let (reg, union) = registry();
        let doc = Value::from(Object::new("Document").with_field("id", "1"));
        let report = Value::from(Object::new("Report").with_field("id", "2"));

        assert_eq!(resolve_variant(&reg, &union, &doc).unwrap().name, "Document");
        assert_eq!(resolve_variant(&reg, &union, &report).unwrap().name, "Report");
    }

    #[test]
    fn test_unmatched_shape_is_an_error() {
        let (reg, union) = registry();
        let memo = Value::from(Object::new("Memo"));
        let err = resolve_variant(&reg, &union, &memo).unwrap_err();
        assert!(matches!(
            err,
            Error::UnresolvedUnionVariant { union, observed } if union == "Payload" && observed == "Memo"
        ));
    }

    #[test]
    fn test_non_object_reports_type_name() {
        let (reg, union) = registry();
        let err = resolve_variant(&reg, &union, &Value::from("Document")).unwrap_err();
        assert!(matches!(
            err,
            Error::UnresolvedUnionVariant { observed, .. } if observed == "STRING"
        ));
    }

    #[test]
    fn test_match_is_exact() {
        let (reg, union) = registry();
        let lower = Value::from(Object::new("document"));
        assert!(resolve_variant(&reg, &union, &lower).is_err());
    }

    proptest! {
        #[test]
        fn prop_resolution_is_deterministic(pick_report in any::<bool>(), repeats in 1usize..8) {
            let (reg, union) = registry();
            let shape = if pick_report { "Report" } else { "Document" };
            let value = Value::from(Object::new(shape));
            for _ in 0..repeats {
                prop_assert_eq!(&resolve_variant(&reg, &union, &value).unwrap().name, shape);
            }
        }

        #[test]
        fn prop_foreign_shapes_never_resolve(tag in "[A-Za-z]{1,12}") {
            prop_assume!(tag != "Document" && tag != "Report");
            let (reg, union) = registry();
            let value = Value::from(Object::new(tag.clone()));
            let is_unresolved = matches!(
                resolve_variant(&reg, &union, &value),
                Err(Error::UnresolvedUnionVariant { observed, .. }) if observed == tag
            );
            prop_assert!(is_unresolved);
        }
    }
}
