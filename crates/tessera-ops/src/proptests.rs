//! Property-based tests for constant folding.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tessera_core::annotation::with_qtype;
    use tessera_core::ExprArena;
    use tessera_types::{QType, TypedValue};

    use crate::math::{add, multiply, neg};

    proptest! {
        #[test]
        fn add_folds_like_checked_add(a in any::<i32>(), b in any::<i32>()) {
            let arena = ExprArena::new();
            let result = arena.call(&add(&arena).unwrap(), [arena.literal(a), arena.literal(b)]);
            let result = result.unwrap();
            match a.checked_add(b) {
                Some(sum) => prop_assert_eq!(result.qvalue(), Some(&TypedValue::from(sum))),
                None => prop_assert_eq!(result.qvalue(), None),
            }
        }

        #[test]
        fn multiply_folds_like_checked_mul(a in any::<i64>(), b in any::<i64>()) {
            let arena = ExprArena::new();
            let result = arena.call(&multiply(&arena).unwrap(), [arena.literal(a), arena.literal(b)]);
            let result = result.unwrap();
            match a.checked_mul(b) {
                Some(product) => prop_assert_eq!(result.qvalue(), Some(&TypedValue::from(product))),
                None => prop_assert_eq!(result.qvalue(), None),
            }
        }

        #[test]
        fn literal_operands_type_like_typed_leaf(a in any::<i32>(), b in any::<i32>()) {
            let arena = ExprArena::new();
            let add = add(&arena).unwrap();
            let x = with_qtype(&arena, &arena.leaf("x"), QType::int32()).unwrap();
            let constant = arena.call(&add, [arena.literal(a), arena.literal(b)]).unwrap();
            let open = arena.call(&add, [x, arena.literal(b)]).unwrap();
            prop_assert_eq!(constant.qtype(), open.qtype());
        }

        #[test]
        fn double_negation_is_identity(a in -1_000_000i64..1_000_000) {
            let arena = ExprArena::new();
            let neg = neg(&arena).unwrap();
            let once = arena.call(&neg, [arena.literal(a)]).unwrap();
            let twice = arena.call(&neg, [once]).unwrap();
            prop_assert_eq!(twice.qvalue(), Some(&TypedValue::from(a)));
        }
    }
}
