//! Whole-graph annotation removal.

use tessera_core::annotation::strip_top_level_annotations;
use tessera_core::{ExprArena, ExprRef, Result};

use crate::transform::transform;

/// Removes every annotation node from `root`.
///
/// Types that only annotations supplied are lost: a stripped leaf has an
/// unknown type again, and nodes above it are re-inferred accordingly.
///
/// # Errors
///
/// Propagates errors from re-interning, e.g. an operator whose constraints
/// reject the types visible after stripping.
pub fn strip_annotations(arena: &ExprArena, root: &ExprRef) -> Result<ExprRef> {
    transform(arena, root, |node| Ok(strip_top_level_annotations(node)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::annotation::{is_annotation, with_name, with_qtype};
    use tessera_core::{post_order, BackendOperator, InferenceRule, Signature};
    use tessera_types::QType;

    #[test]
    fn test_strip_nested_annotations() {
        let arena = ExprArena::new();
        let add = BackendOperator::new(
            "add",
            Signature::parse("x, y").unwrap(),
            InferenceRule::SameAsArg(0),
        )
        .into_operator();

        let x = with_qtype(&arena, &arena.leaf("x"), QType::int32()).unwrap();
        let x = with_name(&arena, &x, "input").unwrap();
        let sum = arena.call(&add, [x, arena.leaf("y")]).unwrap();
        let root = with_name(&arena, &sum, "sum").unwrap();
        assert_eq!(root.qtype(), Some(&QType::int32()));

        let stripped = strip_annotations(&arena, &root).unwrap();
        assert!(post_order(&stripped).iter().all(|node| !is_annotation(node)));
        assert_eq!(stripped, arena.call(&add, [arena.leaf("x"), arena.leaf("y")]).unwrap());
        assert_eq!(stripped.qtype(), None);
    }

    #[test]
    fn test_strip_without_annotations_is_identity() {
        let arena = ExprArena::new();
        let x = arena.leaf("x");
        assert!(strip_annotations(&arena, &x).unwrap().ptr_eq(&x));
    }
}
