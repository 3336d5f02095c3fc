//! Property-based tests for transformations and lowering.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{deep_transform, to_lowest, transform, TransformConfig};
    use tessera_core::{
        BackendOperator, ExprArena, ExprRef, InferenceRule, LambdaOperator, OperatorRef, Signature,
    };

    fn add() -> OperatorRef {
        BackendOperator::new("p.add", Signature::parse("x, y").unwrap(), InferenceRule::SameAsArg(0))
            .into_operator()
    }

    /// `twice(x) = add(x, x)`
    fn twice(arena: &ExprArena, add: &OperatorRef) -> OperatorRef {
        let body = arena
            .call(add, [arena.placeholder("x"), arena.placeholder("x")])
            .unwrap();
        LambdaOperator::with_inferred_signature("p.twice", body)
            .unwrap()
            .into_operator()
    }

    /// Builds a chain of `depth` calls, choosing the lambda or its inlined
    /// body at each level according to `mask`.
    fn chain(arena: &ExprArena, add: &OperatorRef, twice: &OperatorRef, mask: &[bool]) -> ExprRef {
        let mut node = arena.leaf("seed");
        for &use_lambda in mask {
            node = if use_lambda {
                arena.call(twice, [node]).unwrap()
            } else {
                arena.call(add, [node.clone(), node]).unwrap()
            };
        }
        node
    }

    proptest! {
        #[test]
        fn identity_transforms_preserve_root(mask in prop::collection::vec(any::<bool>(), 0..12)) {
            let arena = ExprArena::new();
            let add = add();
            let twice = twice(&arena, &add);
            let root = chain(&arena, &add, &twice, &mask);

            prop_assert_eq!(transform(&arena, &root, |n| Ok(n.clone())).unwrap(), root.clone());
            let deep = deep_transform(&arena, &root, |n| Ok(n.clone()), &TransformConfig::default());
            prop_assert_eq!(deep.unwrap(), root);
        }

        #[test]
        fn lowering_matches_inlined_build(mask in prop::collection::vec(any::<bool>(), 0..12)) {
            let arena = ExprArena::new();
            let add = add();
            let twice = twice(&arena, &add);

            let mixed = chain(&arena, &add, &twice, &mask);
            let inlined = chain(&arena, &add, &twice, &vec![false; mask.len()]);
            prop_assert_eq!(to_lowest(&arena, &mixed).unwrap(), inlined.clone());
            // Lowering is idempotent.
            prop_assert!(to_lowest(&arena, &inlined).unwrap().ptr_eq(&inlined));
        }
    }
}
