//! The expression arena: interning plus attribute inference.
//!
//! Every expression is built through an [`ExprArena`]. Interning computes
//! the node's fingerprint, returns the existing node when the structure is
//! already known, and otherwise infers the node's attribute and stores it.
//! A node whose inference fails is never stored.

use tessera_types::{Fingerprint, TypedValue};
use tracing::{debug, trace};

use crate::binding::bind_op;
use crate::error::Result;
use crate::expr::{Attribute, DepList, ExprNode, NodeDescriptor};
use crate::handle::ExprRef;
use crate::intern::InternTable;
use crate::operator::OperatorRef;

/// Configuration for an expression arena.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Number of nodes to pre-allocate room for.
    pub initial_capacity: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
        }
    }
}

impl ArenaConfig {
    /// Sets the initial capacity.
    #[must_use]
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }
}

/// The owner of all interned expression nodes of a session.
///
/// The arena is `Send + Sync`; concurrent construction of the same structure
/// from several threads yields one canonical node. Handles created by one
/// arena may be used as dependencies in another, but pointer identity is
/// only canonical per arena.
#[derive(Debug, Default)]
pub struct ExprArena {
    table: InternTable,
    config: ArenaConfig,
}

impl ExprArena {
    /// Creates a new empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::default())
    }

    /// Creates an arena with the given configuration.
    #[must_use]
    pub fn with_config(config: ArenaConfig) -> Self {
        Self {
            table: InternTable::with_capacity(config.initial_capacity),
            config,
        }
    }

    /// Returns the arena configuration.
    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Interns a node, returning its canonical handle.
    ///
    /// # Errors
    ///
    /// Propagates attribute inference failures of operator nodes
    /// (constraint violations, type errors, unresolvable dispatch). The
    /// rejected node is not stored.
    pub fn intern(&self, descriptor: NodeDescriptor) -> Result<ExprRef> {
        let fingerprint = descriptor.fingerprint();
        if let Some(existing) = self.table.get(fingerprint) {
            return Ok(existing);
        }

        // Inference is pure, so it runs outside the table lock. A racing
        // thread may infer the same node; the first insert wins.
        let attr = match &descriptor {
            NodeDescriptor::Literal(value) => Attribute::from_value(value.clone()),
            NodeDescriptor::Leaf(_) | NodeDescriptor::Placeholder(_) => Attribute::default(),
            NodeDescriptor::Operator { op, deps } => {
                let inputs: Vec<Attribute> = deps.iter().map(|dep| dep.attr().clone()).collect();
                op.infer_attr(&inputs)?
            }
        };
        Ok(self.store(descriptor, fingerprint, attr))
    }

    fn store(&self, descriptor: NodeDescriptor, fingerprint: Fingerprint, attr: Attribute) -> ExprRef {
        let kind = descriptor.kind();
        let (handle, inserted) = self
            .table
            .insert(ExprNode::new(descriptor, fingerprint, attr));
        if inserted {
            trace!(%fingerprint, ?kind, qtype = ?handle.qtype(), "interned node");
        }
        handle
    }

    // === Convenience constructors ===

    /// Creates a literal expression.
    pub fn literal(&self, value: impl Into<TypedValue>) -> ExprRef {
        let value = value.into();
        let descriptor = NodeDescriptor::Literal(value.clone());
        let fingerprint = descriptor.fingerprint();
        match self.table.get(fingerprint) {
            Some(existing) => existing,
            None => self.store(descriptor, fingerprint, Attribute::from_value(value)),
        }
    }

    /// Creates a leaf expression.
    pub fn leaf(&self, key: impl Into<String>) -> ExprRef {
        self.untyped(NodeDescriptor::Leaf(key.into()))
    }

    /// Creates a placeholder expression.
    pub fn placeholder(&self, key: impl Into<String>) -> ExprRef {
        self.untyped(NodeDescriptor::Placeholder(key.into()))
    }

    fn untyped(&self, descriptor: NodeDescriptor) -> ExprRef {
        let fingerprint = descriptor.fingerprint();
        match self.table.get(fingerprint) {
            Some(existing) => existing,
            None => self.store(descriptor, fingerprint, Attribute::default()),
        }
    }

    /// Applies an operator to dependencies, checking arity first.
    ///
    /// # Errors
    ///
    /// See [`bind_op`].
    pub fn call(
        &self,
        op: &OperatorRef,
        deps: impl IntoIterator<Item = ExprRef>,
    ) -> Result<ExprRef> {
        bind_op(self, op, deps)
    }

    /// Rebuilds an operator node with new dependencies.
    ///
    /// Returns `node` itself when the dependencies are unchanged or when
    /// `node` is not an operator node.
    ///
    /// # Errors
    ///
    /// Propagates inference failures of the rebuilt node.
    pub fn with_new_deps(&self, node: &ExprRef, deps: &[ExprRef]) -> Result<ExprRef> {
        let Some(op) = node.op() else {
            return Ok(node.clone());
        };
        let unchanged = node.deps().len() == deps.len()
            && node
                .deps()
                .iter()
                .zip(deps)
                .all(|(old, new)| old.fingerprint() == new.fingerprint());
        if unchanged {
            return Ok(node.clone());
        }
        self.intern(NodeDescriptor::Operator {
            op: op.clone(),
            deps: deps.iter().cloned().collect::<DepList>(),
        })
    }

    // === Table access ===

    /// Gets an interned node by fingerprint.
    #[must_use]
    pub fn get(&self, fingerprint: Fingerprint) -> Option<ExprRef> {
        self.table.get(fingerprint)
    }

    /// Returns true if a node with this fingerprint is interned.
    #[must_use]
    pub fn contains(&self, fingerprint: Fingerprint) -> bool {
        self.table.get(fingerprint).is_some()
    }

    /// Returns the number of interned nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Releases nodes no longer referenced outside the arena.
    pub fn evict_unreferenced(&self) -> usize {
        let evicted = self.table.evict_unreferenced();
        debug!(evicted, remaining = self.table.len(), "evicted unreferenced nodes");
        evicted
    }
}
