//! Property-based round-trip tests.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tessera_core::annotation::with_qtype;
    use tessera_core::{ExprArena, ExprRef, OperatorRegistry};
    use tessera_ops::{math, register_standard_operators};
    use tessera_types::QType;

    use crate::{encode, from_json, to_json, Decoder, ValueDecoderRegistry};

    /// `(use subtraction, left operand, right operand)`; operands index into
    /// the nodes built so far.
    type Step = (bool, usize, usize);

    fn build(arena: &ExprArena, registry: &OperatorRegistry, seeds: &[i64], steps: &[Step]) -> ExprRef {
        let add = registry.get(math::ADD).unwrap();
        let sub = registry.get(math::SUBTRACT).unwrap();
        let mut pool = vec![with_qtype(arena, &arena.leaf("x"), QType::int64()).unwrap()];
        pool.extend(seeds.iter().map(|&seed| arena.literal(seed)));
        for &(subtract, left, right) in steps {
            let op = if subtract { &sub } else { &add };
            let l = pool[left % pool.len()].clone();
            let r = pool[right % pool.len()].clone();
            pool.push(arena.call(op, [l, r]).unwrap());
        }
        pool.pop().unwrap()
    }

    proptest! {
        #[test]
        fn json_round_trip_preserves_fingerprint(
            seeds in prop::collection::vec(-1000i64..1000, 0..4),
            steps in prop::collection::vec((any::<bool>(), any::<usize>(), any::<usize>()), 0..16),
        ) {
            let arena = ExprArena::new();
            let registry = OperatorRegistry::new();
            register_standard_operators(&registry, &arena).unwrap();
            let root = build(&arena, &registry, &seeds, &steps);

            let json = to_json(&encode(&root)).unwrap();
            let values = ValueDecoderRegistry::with_standard_types();
            let target = ExprArena::new();
            let decoded = Decoder::new(&registry, &values)
                .decode(&target, &from_json(&json).unwrap())
                .unwrap();

            prop_assert_eq!(decoded.fingerprint(), root.fingerprint());
            prop_assert_eq!(decoded.attr(), root.attr());
        }
    }
}
