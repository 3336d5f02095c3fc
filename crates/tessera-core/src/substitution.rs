//! Shallow substitution.
//!
//! Every substitution walks the DAG top-down. A matched node is replaced
//! wholesale: neither the original subtree nor the replacement is scanned
//! further, so an enclosing match always wins over a match inside it.
//! Unmatched nodes are rebuilt from their substituted dependencies and
//! re-interned; a node whose dependencies did not change is returned as is.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tessera_types::Fingerprint;

use crate::annotation::read_name_annotation;
use crate::arena::ExprArena;
use crate::error::Result;
use crate::handle::ExprRef;
use crate::traversal::pre_and_post_order_traverse;

fn substitute<F>(arena: &ExprArena, root: &ExprRef, mut lookup: F) -> Result<ExprRef>
where
    F: FnMut(&ExprRef) -> Option<ExprRef>,
{
    pre_and_post_order_traverse(
        root,
        |node| Ok(lookup(node)),
        |node, deps: &[ExprRef]| arena.with_new_deps(node, deps),
    )
}

/// Replaces nodes by fingerprint.
///
/// # Errors
///
/// Propagates inference failures of rebuilt nodes.
pub fn sub_by_fingerprint<S: BuildHasher>(
    arena: &ExprArena,
    root: &ExprRef,
    mapping: &HashMap<Fingerprint, ExprRef, S>,
) -> Result<ExprRef> {
    if mapping.is_empty() {
        return Ok(root.clone());
    }
    substitute(arena, root, |node| mapping.get(&node.fingerprint()).cloned())
}

/// Replaces leaves by key. Leaves missing from `mapping` are kept.
///
/// # Errors
///
/// Propagates inference failures of rebuilt nodes.
pub fn sub_leaves<S: BuildHasher>(
    arena: &ExprArena,
    root: &ExprRef,
    mapping: &HashMap<String, ExprRef, S>,
) -> Result<ExprRef> {
    if mapping.is_empty() {
        return Ok(root.clone());
    }
    substitute(arena, root, |node| {
        node.leaf_key().and_then(|key| mapping.get(key)).cloned()
    })
}

/// Replaces placeholders by key. Placeholders missing from `mapping` are
/// kept.
///
/// # Errors
///
/// Propagates inference failures of rebuilt nodes.
pub fn sub_placeholders<S: BuildHasher>(
    arena: &ExprArena,
    root: &ExprRef,
    mapping: &HashMap<String, ExprRef, S>,
) -> Result<ExprRef> {
    if mapping.is_empty() {
        return Ok(root.clone());
    }
    substitute(arena, root, |node| {
        node.placeholder_key().and_then(|key| mapping.get(key)).cloned()
    })
}

/// Replaces name-annotated nodes by their annotation.
///
/// The whole `annotation.name(expr, name)` node is replaced, annotation
/// included.
///
/// # Errors
///
/// Propagates inference failures of rebuilt nodes.
pub fn sub_by_name<S: BuildHasher>(
    arena: &ExprArena,
    root: &ExprRef,
    mapping: &HashMap<String, ExprRef, S>,
) -> Result<ExprRef> {
    if mapping.is_empty() {
        return Ok(root.clone());
    }
    substitute(arena, root, |node| {
        read_name_annotation(node).and_then(|name| mapping.get(&name)).cloned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::with_name;
    use crate::operator::{BackendOperator, InferenceRule, OperatorRef, Signature};
    use rustc_hash::FxHashMap;

    fn pair() -> OperatorRef {
        BackendOperator::new("pair", Signature::parse("x, y").unwrap(), InferenceRule::SameAsArg(0))
            .into_operator()
    }

    #[test]
    fn test_empty_mapping_is_noop() {
        let arena = ExprArena::new();
        let expr = arena.call(&pair(), [arena.leaf("a"), arena.leaf("b")]).unwrap();
        let result = sub_by_fingerprint(&arena, &expr, &FxHashMap::default()).unwrap();
        assert!(result.ptr_eq(&expr));
    }

    #[test]
    fn test_every_occurrence_is_replaced() {
        let arena = ExprArena::new();
        let op = pair();
        let a = arena.leaf("a");
        let b = arena.leaf("b");
        let expr = arena.call(&op, [a.clone(), a.clone()]).unwrap();

        let mut mapping = FxHashMap::default();
        mapping.insert(a.fingerprint(), b.clone());
        let result = sub_by_fingerprint(&arena, &expr, &mapping).unwrap();
        assert_eq!(result, arena.call(&op, [b.clone(), b]).unwrap());
    }

    #[test]
    fn test_outer_match_wins() {
        let arena = ExprArena::new();
        let a = arena.leaf("a");
        let expr = arena.call(&pair(), [a.clone(), a.clone()]).unwrap();
        let c = arena.leaf("c");

        let mut mapping = FxHashMap::default();
        mapping.insert(a.fingerprint(), arena.leaf("b"));
        mapping.insert(expr.fingerprint(), c.clone());
        assert_eq!(sub_by_fingerprint(&arena, &expr, &mapping).unwrap(), c);
    }

    #[test]
    fn test_replacement_is_not_rescanned() {
        let arena = ExprArena::new();
        let a = arena.leaf("a");
        let b = arena.leaf("b");

        let mut mapping = FxHashMap::default();
        mapping.insert(a.fingerprint(), b.clone());
        mapping.insert(b.fingerprint(), arena.leaf("c"));
        assert_eq!(sub_by_fingerprint(&arena, &a, &mapping).unwrap(), b);
    }

    #[test]
    fn test_sub_leaves_and_placeholders() {
        let arena = ExprArena::new();
        let op = pair();
        let expr = arena.call(&op, [arena.leaf("x"), arena.placeholder("x")]).unwrap();
        let one = arena.literal(1i64);

        let mut mapping = HashMap::new();
        mapping.insert("x".to_string(), one.clone());
        mapping.insert("missing".to_string(), one.clone());

        let leaves = sub_leaves(&arena, &expr, &mapping).unwrap();
        assert_eq!(leaves, arena.call(&op, [one.clone(), arena.placeholder("x")]).unwrap());

        let placeholders = sub_placeholders(&arena, &expr, &mapping).unwrap();
        assert_eq!(placeholders, arena.call(&op, [arena.leaf("x"), one]).unwrap());
    }

    #[test]
    fn test_sub_by_name() {
        let arena = ExprArena::new();
        let op = pair();
        let tagged = with_name(&arena, &arena.leaf("x"), "input").unwrap();
        let expr = arena.call(&op, [tagged, arena.leaf("y")]).unwrap();
        let z = arena.leaf("z");

        let mut mapping = HashMap::new();
        mapping.insert("input".to_string(), z.clone());
        let result = sub_by_name(&arena, &expr, &mapping).unwrap();
        assert_eq!(result, arena.call(&op, [z, arena.leaf("y")]).unwrap());
    }
}
