//! Bottom-up graph transformations.

use rustc_hash::FxHashMap;
use tessera_core::{post_order_traverse, ExprArena, ExprError, ExprRef, Result};
use tessera_types::Fingerprint;
use tracing::trace;

/// Configuration for deep transformations.
#[derive(Clone, Debug)]
pub struct TransformConfig {
    /// Maximum number of nodes the transformation function may be applied
    /// to before giving up.
    pub processed_node_limit: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            processed_node_limit: 10_000_000,
        }
    }
}

impl TransformConfig {
    /// Sets the processed node limit.
    #[must_use]
    pub fn with_processed_node_limit(mut self, limit: usize) -> Self {
        self.processed_node_limit = limit;
        self
    }
}

/// Rebuilds `root` bottom-up, applying `f` to every node once.
///
/// `f` sees each node with its dependencies already transformed. Nodes
/// returned by `f` are not transformed again.
///
/// # Errors
///
/// Propagates errors from `f` and from re-interning rebuilt nodes.
pub fn transform<F>(arena: &ExprArena, root: &ExprRef, mut f: F) -> Result<ExprRef>
where
    F: FnMut(&ExprRef) -> Result<ExprRef>,
{
    post_order_traverse(root, |node, deps: &[ExprRef]| {
        let rebuilt = arena.with_new_deps(node, deps)?;
        f(&rebuilt)
    })
}

enum Frame {
    Visit { node: ExprRef, expanded: bool },
    Alias { from: Fingerprint, to: ExprRef },
}

/// Applies `f` bottom-up until a fixed point.
///
/// Unlike [`transform`], any new node returned by `f` is itself deep
/// transformed, dependencies first, so the result contains no node on which
/// `f` would make further progress.
///
/// # Errors
///
/// [`ExprError::LimitExceeded`] when `f` has been applied to more than
/// `config.processed_node_limit` nodes, which also catches transformations
/// that never converge. Propagates errors from `f`.
pub fn deep_transform<F>(
    arena: &ExprArena,
    root: &ExprRef,
    mut f: F,
    config: &TransformConfig,
) -> Result<ExprRef>
where
    F: FnMut(&ExprRef) -> Result<ExprRef>,
{
    // Maps a node to its fully transformed form.
    let mut done: FxHashMap<Fingerprint, ExprRef> = FxHashMap::default();
    let mut stack = vec![Frame::Visit {
        node: root.clone(),
        expanded: false,
    }];
    let mut processed = 0usize;

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Alias { from, to } => {
                let result = done[&to.fingerprint()].clone();
                done.insert(from, result);
            }
            Frame::Visit { node, expanded: false } => {
                if done.contains_key(&node.fingerprint()) {
                    continue;
                }
                let pending: Vec<ExprRef> = node
                    .deps()
                    .iter()
                    .rev()
                    .filter(|dep| !done.contains_key(&dep.fingerprint()))
                    .cloned()
                    .collect();
                stack.push(Frame::Visit {
                    node,
                    expanded: true,
                });
                stack.extend(pending.into_iter().map(|dep| Frame::Visit {
                    node: dep,
                    expanded: false,
                }));
            }
            Frame::Visit { node, expanded: true } => {
                if done.contains_key(&node.fingerprint()) {
                    continue;
                }
                let deps: Vec<ExprRef> = node
                    .deps()
                    .iter()
                    .map(|dep| done[&dep.fingerprint()].clone())
                    .collect();
                let rebuilt = arena.with_new_deps(&node, &deps)?;

                processed += 1;
                if processed > config.processed_node_limit {
                    return Err(ExprError::LimitExceeded {
                        limit: config.processed_node_limit,
                    });
                }
                let transformed = f(&rebuilt)?;

                if transformed.fingerprint() == rebuilt.fingerprint() {
                    done.insert(node.fingerprint(), rebuilt);
                } else if let Some(result) = done.get(&transformed.fingerprint()).cloned() {
                    done.insert(node.fingerprint(), result);
                } else {
                    stack.push(Frame::Alias {
                        from: node.fingerprint(),
                        to: transformed.clone(),
                    });
                    stack.push(Frame::Visit {
                        node: transformed,
                        expanded: false,
                    });
                }
            }
        }
    }

    trace!(processed, "deep transform finished");
    Ok(done[&root.fingerprint()].clone())
}
