//! Iterative traversals over expression DAGs.
//!
//! All traversals use an explicit stack, so stack usage does not grow with
//! expression depth. Shared subexpressions are visited once per traversal;
//! results are cached by fingerprint.

use rustc_hash::{FxHashMap, FxHashSet};
use tessera_types::Fingerprint;

use crate::handle::ExprRef;

/// Returns every node reachable from `root` exactly once, dependencies
/// before dependents.
///
/// The order is deterministic: dependencies are explored left to right.
#[must_use]
pub fn post_order(root: &ExprRef) -> Vec<ExprRef> {
    let mut visited: FxHashSet<Fingerprint> = FxHashSet::default();
    let mut order = Vec::new();
    let mut stack: Vec<(ExprRef, usize)> = vec![(root.clone(), 0)];
    visited.insert(root.fingerprint());

    while let Some((node, next)) = stack.last_mut() {
        if let Some(dep) = node.deps().get(*next).cloned() {
            *next += 1;
            if visited.insert(dep.fingerprint()) {
                stack.push((dep, 0));
            }
        } else if let Some((node, _)) = stack.pop() {
            order.push(node);
        }
    }
    order
}

/// Folds the DAG bottom-up.
///
/// `visitor(node, dep_results)` is called once per distinct node, after all
/// of its dependencies; `dep_results` holds one entry per dependency in
/// order, so a dependency listed twice contributes its cached result twice.
///
/// # Errors
///
/// Stops at the first visitor error and returns it.
pub fn post_order_traverse<R, E, F>(root: &ExprRef, mut visitor: F) -> Result<R, E>
where
    R: Clone,
    F: FnMut(&ExprRef, &[R]) -> Result<R, E>,
{
    let mut cache: FxHashMap<Fingerprint, R> = FxHashMap::default();
    let mut args: Vec<R> = Vec::new();
    for node in post_order(root) {
        args.clear();
        args.extend(node.deps().iter().map(|dep| cache[&dep.fingerprint()].clone()));
        let result = visitor(&node, &args)?;
        cache.insert(node.fingerprint(), result);
    }
    // `post_order` ends with the root, so its result is always cached.
    Ok(cache
        .remove(&root.fingerprint())
        .expect("post-order always visits the root"))
}

/// Folds the DAG with a pre-order hook that may prune subtrees.
///
/// For each node, `pre(node)` runs first. If it returns `Some(r)`, `r` is
/// the node's result: its dependencies are not traversed through this node
/// and `post` is not called for it. Otherwise the dependencies are
/// traversed left to right and `post(node, dep_results)` runs once all of
/// them have completed.
///
/// Each distinct node is handled once; a later reference reuses its result.
///
/// # Errors
///
/// Stops at the first error from either hook.
pub fn pre_and_post_order_traverse<R, E, Pre, Post>(
    root: &ExprRef,
    mut pre: Pre,
    mut post: Post,
) -> Result<R, E>
where
    R: Clone,
    Pre: FnMut(&ExprRef) -> Result<Option<R>, E>,
    Post: FnMut(&ExprRef, &[R]) -> Result<R, E>,
{
    struct Frame<R> {
        node: ExprRef,
        next: usize,
        results: Vec<R>,
    }

    if let Some(result) = pre(root)? {
        return Ok(result);
    }

    let mut cache: FxHashMap<Fingerprint, R> = FxHashMap::default();
    let mut stack = vec![Frame {
        node: root.clone(),
        next: 0,
        results: Vec::with_capacity(root.deps().len()),
    }];

    loop {
        // Only the root frame's completion empties the stack, and that returns.
        let frame = stack.last_mut().expect("stack holds the root until it completes");
        if let Some(dep) = frame.node.deps().get(frame.next).cloned() {
            frame.next += 1;
            if let Some(result) = cache.get(&dep.fingerprint()) {
                frame.results.push(result.clone());
            } else if let Some(result) = pre(&dep)? {
                cache.insert(dep.fingerprint(), result.clone());
                frame.results.push(result);
            } else {
                let results = Vec::with_capacity(dep.deps().len());
                stack.push(Frame {
                    node: dep,
                    next: 0,
                    results,
                });
            }
            continue;
        }

        // `frame` above was borrowed from this same non-empty stack.
        let Some(Frame { node, results, .. }) = stack.pop() else {
            unreachable!("the loop returns when the root frame completes");
        };
        let result = post(&node, &results)?;
        match stack.last_mut() {
            Some(parent) => {
                cache.insert(node.fingerprint(), result.clone());
                parent.results.push(result);
            }
            None => return Ok(result),
        }
    }
}

/// Returns the sorted, deduplicated keys of all leaves under `root`.
#[must_use]
pub fn get_leaf_keys(root: &ExprRef) -> Vec<String> {
    let mut keys: Vec<String> = post_order(root)
        .iter()
        .filter_map(|node| node.leaf_key().map(str::to_string))
        .collect();
    keys.sort();
    keys
}

/// Returns the sorted, deduplicated keys of all placeholders under `root`.
#[must_use]
pub fn get_placeholder_keys(root: &ExprRef) -> Vec<String> {
    let mut keys: Vec<String> = post_order(root)
        .iter()
        .filter_map(|node| node.placeholder_key().map(str::to_string))
        .collect();
    keys.sort();
    keys
}

/// Number of distinct nodes reachable from `root`.
#[must_use]
pub fn node_count(root: &ExprRef) -> usize {
    post_order(root).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ExprArena;
    use crate::operator::{BackendOperator, InferenceRule, OperatorRef, Signature};
    use std::convert::Infallible;

    fn op(name: &str, arity: &str) -> OperatorRef {
        BackendOperator::new(name, Signature::parse(arity).unwrap(), InferenceRule::SameAsArg(0))
            .into_operator()
    }

    /// `A = a(B, C)`, `B = b(D)`, `C = c(D)`, `D = leaf`.
    fn diamond(arena: &ExprArena) -> (ExprRef, ExprRef) {
        let d = arena.leaf("d");
        let b = arena.call(&op("b", "x"), [d.clone()]).unwrap();
        let c = arena.call(&op("c", "x"), [d.clone()]).unwrap();
        let a = arena.call(&op("a", "x, y"), [b, c]).unwrap();
        (a, d)
    }

    #[test]
    fn test_post_order_children_first() {
        let arena = ExprArena::new();
        let (a, d) = diamond(&arena);
        let order = post_order(&a);
        let names: Vec<String> = order.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["L.d", "b(L.d)", "c(L.d)", "a(b(L.d), c(L.d))"]);
        assert_eq!(order[0], d);
    }

    #[test]
    fn test_shared_node_visited_once() {
        let arena = ExprArena::new();
        let (a, d) = diamond(&arena);

        let mut visits_of_d = 0;
        let leaves = post_order_traverse(&a, |node, deps: &[usize]| {
            if *node == d {
                visits_of_d += 1;
            }
            Ok::<_, Infallible>(if node.is_leaf() { 1 } else { deps.iter().sum() })
        })
        .unwrap();

        assert_eq!(visits_of_d, 1);
        // Both parents of `d` observe its cached result.
        assert_eq!(leaves, 2);
    }

    #[test]
    fn test_pruning() {
        let arena = ExprArena::new();
        let x = arena.leaf("x");
        let y = arena.leaf("y");
        let pruned = arena.call(&op("p", "x"), [x.clone()]).unwrap();
        let kept = arena.call(&op("k", "x"), [y.clone()]).unwrap();
        let root = arena.call(&op("r", "x, y"), [pruned.clone(), kept]).unwrap();

        let mut pre_visits = Vec::new();
        let mut post_visits = Vec::new();
        let result = pre_and_post_order_traverse(
            &root,
            |node| {
                pre_visits.push(node.to_string());
                Ok::<_, Infallible>((*node == pruned).then(|| "pruned".to_string()))
            },
            |node, deps: &[String]| {
                post_visits.push(node.to_string());
                Ok(format!("{}[{}]", node.op().map_or("leaf", |op| op.display_name()), deps.join(",")))
            },
        )
        .unwrap();

        assert_eq!(result, "r[pruned,k[leaf[]]]");
        assert!(!pre_visits.contains(&"L.x".to_string()));
        assert!(!post_visits.contains(&pruned.to_string()));
        assert_eq!(pre_visits[0], root.to_string());
        assert_eq!(post_visits.last(), Some(&root.to_string()));
    }

    #[test]
    fn test_pruned_root() {
        let arena = ExprArena::new();
        let x = arena.leaf("x");
        let result = pre_and_post_order_traverse(
            &x,
            |_| Ok::<_, Infallible>(Some(7)),
            |_, _: &[i32]| unreachable!(),
        )
        .unwrap();
        assert_eq!(result, 7);
    }

    #[test]
    fn test_key_helpers() {
        let arena = ExprArena::new();
        let pair = op("pair", "x, y");
        let inner = arena.call(&pair, [arena.leaf("b"), arena.placeholder("p")]).unwrap();
        let root = arena.call(&pair, [inner, arena.leaf("a")]).unwrap();

        assert_eq!(get_leaf_keys(&root), vec!["a", "b"]);
        assert_eq!(get_placeholder_keys(&root), vec!["p"]);
        assert_eq!(node_count(&root), 5);
    }

    #[test]
    fn test_long_chain() {
        let arena = ExprArena::new();
        let wrap = op("wrap", "x");
        let mut expr = arena.leaf("x");
        for _ in 0..2_000 {
            expr = arena.call(&wrap, [expr]).unwrap();
        }
        assert_eq!(node_count(&expr), 2_001);
        assert_eq!(post_order(&expr).last(), Some(&expr));
    }
}
