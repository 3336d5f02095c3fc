//! Property-based tests for fingerprints and values.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{Fingerprint, FingerprintHasher, QType, TypedValue};

    proptest! {
        #[test]
        fn value_equality_matches_payload(a in any::<i64>(), b in any::<i64>()) {
            prop_assert_eq!(TypedValue::from(a) == TypedValue::from(b), a == b);
        }

        #[test]
        fn text_fingerprint_is_deterministic(text in ".{0,32}") {
            let a = TypedValue::from(text.as_str());
            let b = TypedValue::from(text.clone());
            prop_assert_eq!(a.fingerprint(), b.fingerprint());
        }

        #[test]
        fn hex_form_roundtrips(raw in any::<u128>()) {
            let fp = Fingerprint::from_u128(raw);
            prop_assert_eq!(Fingerprint::from_hex(&fp.to_hex()), Some(fp));
        }

        #[test]
        fn string_sequences_do_not_alias(a in "[a-c]{0,4}", b in "[a-c]{0,4}", c in "[a-c]{0,4}") {
            // ("a", "b" + "c") and ("a" + "b", "c") only collide when equal.
            let left = FingerprintHasher::new("seq").combine_str(&a).combine_str(&format!("{b}{c}")).finish();
            let right = FingerprintHasher::new("seq").combine_str(&format!("{a}{b}")).combine_str(&c).finish();
            prop_assert_eq!(left == right, b.is_empty());
        }

        #[test]
        fn qtype_equality_matches_name(a in "[A-Z]{1,6}", b in "[A-Z]{1,6}") {
            prop_assert_eq!(QType::new(a.clone()) == QType::new(b.clone()), a == b);
        }
    }
}
