//! Hash-consing table keyed by fingerprint.
//!
//! This module provides the interning infrastructure that ensures
//! structural uniqueness of expressions: every fingerprint maps to exactly
//! one canonical [`ExprRef`].

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tessera_types::Fingerprint;

use crate::expr::ExprNode;
use crate::handle::ExprRef;

/// A thread-safe fingerprint → node table.
///
/// Lookups take a shared lock; inserts take an exclusive lock and keep the
/// first node inserted under a fingerprint, so racing inserts of the same
/// structure converge to one handle.
#[derive(Debug, Default)]
pub struct InternTable {
    map: RwLock<FxHashMap<Fingerprint, ExprRef>>,
}

impl InternTable {
    /// Creates a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut map = FxHashMap::default();
        map.reserve(capacity);
        Self {
            map: RwLock::new(map),
        }
    }

    /// Gets the node with the given fingerprint, if interned.
    #[must_use]
    pub fn get(&self, fingerprint: Fingerprint) -> Option<ExprRef> {
        self.map.read().get(&fingerprint).cloned()
    }

    /// Inserts a node unless its fingerprint is already present.
    ///
    /// Returns the canonical handle and whether `node` was the one stored.
    pub fn insert(&self, node: ExprNode) -> (ExprRef, bool) {
        let fingerprint = node.fingerprint();
        let mut map = self.map.write();
        if let Some(existing) = map.get(&fingerprint) {
            return (existing.clone(), false);
        }
        let handle = ExprRef::new(node);
        map.insert(fingerprint, handle.clone());
        (handle, true)
    }

    /// Drops every node referenced only by this table.
    ///
    /// Dropping a parent releases its dependencies, so this repeats until no
    /// more nodes can be released. Returns the number of evicted nodes.
    pub fn evict_unreferenced(&self) -> usize {
        let mut map = self.map.write();
        let mut evicted = 0;
        loop {
            let before = map.len();
            map.retain(|_, handle| handle.strong_count() > 1);
            let removed = before - map.len();
            if removed == 0 {
                return evicted;
            }
            evicted += removed;
        }
    }

    /// Returns the number of interned nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Returns true if no nodes have been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// Returns the fingerprints of all interned nodes, in no particular order.
    #[must_use]
    pub fn fingerprints(&self) -> Vec<Fingerprint> {
        self.map.read().keys().copied().collect()
    }
}
