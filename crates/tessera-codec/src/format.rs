//! The encoded form of an expression.
//!
//! An expression is stored as a node table in post-order: every node appears
//! once, after all of its dependencies, which it references by table index.
//! Each entry records the node's fingerprint so decoding can verify that it
//! rebuilt exactly the same structure.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tessera_core::{post_order, ExprKind, ExprRef};
use tessera_types::Fingerprint;
use tracing::debug;

use crate::error::{CodecError, Result};

/// Current encoding version.
pub const FORMAT_VERSION: u32 = 1;

/// One entry of the node table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodedNode {
    /// A literal; `payload` is the hex form of the value's encoded bytes.
    Literal {
        /// Node fingerprint, 32 hex digits.
        fingerprint: String,
        /// Name of the value's type.
        qtype: String,
        /// Hex-encoded payload bytes.
        payload: String,
    },
    /// A leaf.
    Leaf {
        /// Node fingerprint.
        fingerprint: String,
        /// Leaf key.
        key: String,
    },
    /// A placeholder.
    Placeholder {
        /// Node fingerprint.
        fingerprint: String,
        /// Placeholder key.
        key: String,
    },
    /// An operator application.
    Operator {
        /// Node fingerprint.
        fingerprint: String,
        /// Operator display name.
        name: String,
        /// Operator fingerprint.
        operator_fingerprint: String,
        /// Table indices of the dependencies, in order.
        deps: Vec<usize>,
    },
}

impl EncodedNode {
    /// The recorded node fingerprint, as stored.
    #[must_use]
    pub fn fingerprint_text(&self) -> &str {
        match self {
            EncodedNode::Literal { fingerprint, .. }
            | EncodedNode::Leaf { fingerprint, .. }
            | EncodedNode::Placeholder { fingerprint, .. }
            | EncodedNode::Operator { fingerprint, .. } => fingerprint,
        }
    }
}

/// An encoded expression graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedExpr {
    /// Encoding version, see [`FORMAT_VERSION`].
    pub format_version: u32,
    /// Node table in post-order.
    pub nodes: Vec<EncodedNode>,
    /// Index of the root node.
    pub root: usize,
}

/// Encodes the graph reachable from `root`.
#[must_use]
pub fn encode(root: &ExprRef) -> EncodedExpr {
    let order = post_order(root);
    let mut index: FxHashMap<Fingerprint, usize> = FxHashMap::default();
    let mut nodes = Vec::with_capacity(order.len());

    for node in &order {
        let structure = node.structure();
        let fingerprint = node.fingerprint().to_hex();
        let encoded = match (structure.kind, structure.key, structure.op_token, structure.literal) {
            (ExprKind::Literal, _, _, Some(literal)) => EncodedNode::Literal {
                fingerprint,
                qtype: literal.qtype,
                payload: hex::encode(literal.bytes),
            },
            (ExprKind::Leaf, Some(key), _, _) => EncodedNode::Leaf { fingerprint, key },
            (ExprKind::Placeholder, Some(key), _, _) => EncodedNode::Placeholder { fingerprint, key },
            (ExprKind::Operator, _, Some(token), _) => EncodedNode::Operator {
                fingerprint,
                name: token.name,
                operator_fingerprint: token.fingerprint.to_hex(),
                deps: structure
                    .dep_fingerprints
                    .iter()
                    .map(|dep| index[dep])
                    .collect(),
            },
            (kind, ..) => unreachable!("node structure of kind {kind:?} is inconsistent"),
        };
        index.insert(node.fingerprint(), nodes.len());
        nodes.push(encoded);
    }

    debug!(nodes = nodes.len(), root = %root.fingerprint(), "encoded expression");
    EncodedExpr {
        format_version: FORMAT_VERSION,
        root: nodes.len() - 1,
        nodes,
    }
}

/// Serializes an encoded expression as JSON.
///
/// # Errors
///
/// [`CodecError::Json`] if serialization fails.
pub fn to_json(encoded: &EncodedExpr) -> Result<String> {
    Ok(serde_json::to_string(encoded)?)
}

/// Parses an encoded expression from JSON.
///
/// # Errors
///
/// [`CodecError::Json`] for invalid JSON or a shape that does not match
/// [`EncodedExpr`].
pub fn from_json(text: &str) -> Result<EncodedExpr> {
    Ok(serde_json::from_str(text)?)
}

pub(crate) fn parse_fingerprint(text: &str) -> Result<Fingerprint> {
    Fingerprint::from_hex(text)
        .ok_or_else(|| CodecError::Malformed(format!("invalid fingerprint '{text}'")))
}
