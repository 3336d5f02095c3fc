//! Property-based tests for interning, traversal and substitution.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rustc_hash::{FxHashMap, FxHashSet};
    use std::collections::HashMap;

    use crate::{
        node_count, post_order, sub_by_fingerprint, sub_leaves, BackendOperator, ExprArena, ExprRef,
        InferenceRule, OperatorRef, Signature,
    };

    /// A build step: `(operator choice, left operand, right operand)`, where
    /// operands index into the nodes built so far.
    type Step = (u8, usize, usize);

    fn steps() -> impl Strategy<Value = Vec<Step>> {
        prop::collection::vec((0u8..3, any::<usize>(), any::<usize>()), 1..24)
    }

    fn ops() -> Vec<OperatorRef> {
        let binary = Signature::parse("x, y").unwrap();
        vec![
            BackendOperator::new("p.first", binary.clone(), InferenceRule::SameAsArg(0)).into_operator(),
            BackendOperator::new("p.second", binary, InferenceRule::SameAsArg(1)).into_operator(),
            BackendOperator::new("p.neg", Signature::parse("x").unwrap(), InferenceRule::SameAsArg(0))
                .into_operator(),
        ]
    }

    fn build(arena: &ExprArena, ops: &[OperatorRef], steps: &[Step]) -> ExprRef {
        let mut pool = vec![
            arena.leaf("a"),
            arena.leaf("b"),
            arena.literal(1i64),
            arena.placeholder("p"),
        ];
        for &(choice, left, right) in steps {
            let op = &ops[usize::from(choice)];
            let l = pool[left % pool.len()].clone();
            let r = pool[right % pool.len()].clone();
            let node = if op.signature().len() == 1 {
                arena.call(op, [l]).unwrap()
            } else {
                arena.call(op, [l, r]).unwrap()
            };
            pool.push(node);
        }
        pool.pop().unwrap()
    }

    proptest! {
        #[test]
        fn interning_is_canonical(steps in steps()) {
            let ops = ops();
            let arena = ExprArena::new();
            let first = build(&arena, &ops, &steps);
            let len = arena.len();
            let second = build(&arena, &ops, &steps);
            prop_assert!(first.ptr_eq(&second));
            prop_assert_eq!(arena.len(), len);

            let other = ExprArena::new();
            prop_assert_eq!(build(&other, &ops, &steps).fingerprint(), first.fingerprint());
        }

        #[test]
        fn post_order_is_topological(steps in steps()) {
            let ops = ops();
            let arena = ExprArena::new();
            let root = build(&arena, &ops, &steps);
            let order = post_order(&root);

            let mut seen = FxHashSet::default();
            for node in &order {
                for dep in node.deps() {
                    prop_assert!(seen.contains(&dep.fingerprint()));
                }
                prop_assert!(seen.insert(node.fingerprint()));
            }
            prop_assert_eq!(order.last(), Some(&root));
            prop_assert_eq!(order.len(), node_count(&root));
        }

        #[test]
        fn empty_substitution_is_identity(steps in steps()) {
            let ops = ops();
            let arena = ExprArena::new();
            let root = build(&arena, &ops, &steps);
            let result = sub_by_fingerprint(&arena, &root, &FxHashMap::default()).unwrap();
            prop_assert_eq!(result.fingerprint(), root.fingerprint());
        }

        #[test]
        fn leaf_substitution_matches_rebuild(steps in steps()) {
            let ops = ops();
            let arena = ExprArena::new();
            let root = build(&arena, &ops, &steps);

            // Renaming leaf `a` to `c` equals building with `c` from the start.
            let mut mapping = HashMap::new();
            mapping.insert("a".to_string(), arena.leaf("c"));
            let renamed = sub_leaves(&arena, &root, &mapping).unwrap();

            let mut back = HashMap::new();
            back.insert("c".to_string(), arena.leaf("a"));
            prop_assert_eq!(sub_leaves(&arena, &renamed, &back).unwrap(), root);
        }
    }

    #[test]
    fn concurrent_interning_converges() {
        use rayon::prelude::*;

        let ops = ops();
        let arena = ExprArena::new();
        let steps: Vec<Step> = (0..32).map(|i| ((i % 3) as u8, i * 7, i * 13 + 1)).collect();

        let roots: Vec<ExprRef> = (0..64)
            .into_par_iter()
            .map(|_| build(&arena, &ops, &steps))
            .collect();
        assert!(roots.iter().all(|root| root.ptr_eq(&roots[0])));
    }
}
