//! Shared expression handles.
//!
//! An [`ExprRef`] is a reference-counted pointer to an interned node. Many
//! parents may hold the same handle; the intern table keeps one strong
//! reference per node for the lifetime of the arena.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::expr::{ExprNode, NodeDescriptor};
use crate::traversal::post_order_traverse;

/// A handle to an interned expression node.
///
/// Equality and hashing use the node fingerprint, so two handles are equal
/// exactly when they denote structurally identical expressions. Within one
/// arena equal handles also point to the same allocation
/// (see [`ExprRef::ptr_eq`]).
#[derive(Clone)]
pub struct ExprRef(Arc<ExprNode>);

impl ExprRef {
    /// Wraps a freshly built node. Only the intern table creates handles.
    pub(crate) fn new(node: ExprNode) -> Self {
        Self(Arc::new(node))
    }

    /// Returns true if both handles point to the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &ExprRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of strong references, the intern table's included.
    pub(crate) fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl Deref for ExprRef {
    type Target = ExprNode;

    fn deref(&self) -> &ExprNode {
        &self.0
    }
}

impl PartialEq for ExprRef {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint() == other.fingerprint()
    }
}

impl Eq for ExprRef {}

impl Hash for ExprRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint().hash(state);
    }
}

impl fmt::Debug for ExprRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.fingerprint().to_hex();
        write!(f, "Expr({}: {})", &hex[..8], self)
    }
}

impl fmt::Display for ExprRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = post_order_traverse(self, |node, deps: &[String]| {
            Ok::<_, fmt::Error>(match node.descriptor() {
                NodeDescriptor::Literal(value) => value.repr(),
                NodeDescriptor::Leaf(key) => format!("L.{key}"),
                NodeDescriptor::Placeholder(key) => format!("P.{key}"),
                NodeDescriptor::Operator { op, .. } => {
                    format!("{}({})", op.display_name(), deps.join(", "))
                }
            })
        })?;
        f.write_str(&text)
    }
}
