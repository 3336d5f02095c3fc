//! Expression node types.
//!
//! This module defines the nodes stored in the intern table, the attribute
//! cached on every node, and the descriptor a node is interned from.

use smallvec::SmallVec;
use tessera_types::{Fingerprint, FingerprintHasher, QType, TypedValue};

use crate::handle::ExprRef;
use crate::operator::OperatorRef;

/// Ordered dependency list of an operator node.
pub type DepList = SmallVec<[ExprRef; 4]>;

/// The four node variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// A constant of fixed type.
    Literal,
    /// An external input identified by name.
    Leaf,
    /// A slot inside a reusable operator body.
    Placeholder,
    /// An operator applied to dependencies.
    Operator,
}

/// The inferred `(type, optional constant)` pair of a node.
///
/// `qtype == None` means "not determined yet". `qvalue == Some(v)` means the
/// node is provably the constant `v`; in that case `qtype` is `v`'s type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attribute {
    qtype: Option<QType>,
    qvalue: Option<TypedValue>,
}

impl Attribute {
    /// An attribute with an optional type and no constant.
    #[must_use]
    pub fn new(qtype: Option<QType>) -> Self {
        Self {
            qtype,
            qvalue: None,
        }
    }

    /// An attribute with a known type.
    #[must_use]
    pub fn from_qtype(qtype: QType) -> Self {
        Self::new(Some(qtype))
    }

    /// An attribute for a known constant.
    #[must_use]
    pub fn from_value(value: TypedValue) -> Self {
        Self {
            qtype: Some(value.qtype().clone()),
            qvalue: Some(value),
        }
    }

    /// The inferred type, if determined.
    #[must_use]
    pub fn qtype(&self) -> Option<&QType> {
        self.qtype.as_ref()
    }

    /// The constant value, if known.
    #[must_use]
    pub fn qvalue(&self) -> Option<&TypedValue> {
        self.qvalue.as_ref()
    }

    /// Returns true if neither type nor value is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.qtype.is_none() && self.qvalue.is_none()
    }
}

/// Structural description of a node, before interning.
#[derive(Clone, Debug)]
pub enum NodeDescriptor {
    /// A literal value.
    Literal(TypedValue),
    /// A named external input.
    Leaf(String),
    /// A named body slot.
    Placeholder(String),
    /// An operator application.
    Operator {
        /// The operator.
        op: OperatorRef,
        /// Ordered dependencies.
        deps: DepList,
    },
}

impl NodeDescriptor {
    /// Computes the fingerprint of the node this descriptor interns to.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        match self {
            NodeDescriptor::Literal(value) => FingerprintHasher::new("literal")
                .combine_fingerprint(value.fingerprint())
                .finish(),
            NodeDescriptor::Leaf(key) => FingerprintHasher::new("leaf").combine_str(key).finish(),
            NodeDescriptor::Placeholder(key) => FingerprintHasher::new("placeholder")
                .combine_str(key)
                .finish(),
            NodeDescriptor::Operator { op, deps } => {
                let mut hasher = FingerprintHasher::new("operator");
                hasher
                    .combine_fingerprint(op.fingerprint())
                    .combine_usize(deps.len());
                for dep in deps {
                    hasher.combine_fingerprint(dep.fingerprint());
                }
                hasher.finish()
            }
        }
    }

    /// The variant tag.
    #[must_use]
    pub fn kind(&self) -> ExprKind {
        match self {
            NodeDescriptor::Literal(_) => ExprKind::Literal,
            NodeDescriptor::Leaf(_) => ExprKind::Leaf,
            NodeDescriptor::Placeholder(_) => ExprKind::Placeholder,
            NodeDescriptor::Operator { .. } => ExprKind::Operator,
        }
    }
}

/// Identity token of an operator at the serialization boundary.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperatorToken {
    /// Display name, used to resolve the operator in a registry.
    pub name: String,
    /// Operator fingerprint, used to verify the resolution.
    pub fingerprint: Fingerprint,
}

/// Literal payload at the serialization boundary.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LiteralPayload {
    /// Name of the value's type.
    pub qtype: String,
    /// Encoded payload bytes.
    pub bytes: Vec<u8>,
}

/// Everything an external codec needs to rebuild a node with `intern`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeStructure {
    /// Variant tag.
    pub kind: ExprKind,
    /// Leaf or placeholder key.
    pub key: Option<String>,
    /// Operator identity, for operator nodes.
    pub op_token: Option<OperatorToken>,
    /// Ordered dependency fingerprints.
    pub dep_fingerprints: Vec<Fingerprint>,
    /// Literal payload, for literal nodes.
    pub literal: Option<LiteralPayload>,
}

/// An interned expression node.
///
/// Nodes are immutable. The fingerprint and the attribute are computed once,
/// when the node is first interned, and never recomputed: registering a new
/// operator version later does not re-infer existing nodes.
#[derive(Debug)]
pub struct ExprNode {
    descriptor: NodeDescriptor,
    fingerprint: Fingerprint,
    attr: Attribute,
}

impl ExprNode {
    pub(crate) fn new(descriptor: NodeDescriptor, fingerprint: Fingerprint, attr: Attribute) -> Self {
        Self {
            descriptor,
            fingerprint,
            attr,
        }
    }

    /// The structural description of this node.
    #[must_use]
    pub fn descriptor(&self) -> &NodeDescriptor {
        &self.descriptor
    }

    /// The variant tag.
    #[must_use]
    pub fn kind(&self) -> ExprKind {
        self.descriptor.kind()
    }

    /// The node's fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// The node's attribute.
    #[must_use]
    pub fn attr(&self) -> &Attribute {
        &self.attr
    }

    /// The node's type, if determined.
    #[must_use]
    pub fn qtype(&self) -> Option<&QType> {
        self.attr.qtype()
    }

    /// The node's constant value, if known.
    #[must_use]
    pub fn qvalue(&self) -> Option<&TypedValue> {
        self.attr.qvalue()
    }

    /// The dependencies; empty for non-operator nodes.
    #[must_use]
    pub fn deps(&self) -> &[ExprRef] {
        match &self.descriptor {
            NodeDescriptor::Operator { deps, .. } => deps.as_slice(),
            _ => &[],
        }
    }

    /// The operator, for operator nodes.
    #[must_use]
    pub fn op(&self) -> Option<&OperatorRef> {
        match &self.descriptor {
            NodeDescriptor::Operator { op, .. } => Some(op),
            _ => None,
        }
    }

    /// The literal value, for literal nodes.
    #[must_use]
    pub fn literal(&self) -> Option<&TypedValue> {
        match &self.descriptor {
            NodeDescriptor::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// The key, for leaf nodes.
    #[must_use]
    pub fn leaf_key(&self) -> Option<&str> {
        match &self.descriptor {
            NodeDescriptor::Leaf(key) => Some(key),
            _ => None,
        }
    }

    /// The key, for placeholder nodes.
    #[must_use]
    pub fn placeholder_key(&self) -> Option<&str> {
        match &self.descriptor {
            NodeDescriptor::Placeholder(key) => Some(key),
            _ => None,
        }
    }

    /// Returns true for literal nodes.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.kind() == ExprKind::Literal
    }

    /// Returns true for leaf nodes.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.kind() == ExprKind::Leaf
    }

    /// Returns true for placeholder nodes.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.kind() == ExprKind::Placeholder
    }

    /// Returns true for operator nodes.
    #[must_use]
    pub fn is_op(&self) -> bool {
        self.kind() == ExprKind::Operator
    }

    /// The serialization-boundary tuple for this node.
    #[must_use]
    pub fn structure(&self) -> NodeStructure {
        let (key, op_token, literal) = match &self.descriptor {
            NodeDescriptor::Literal(value) => (
                None,
                None,
                Some(LiteralPayload {
                    qtype: value.qtype().name().to_string(),
                    bytes: value.encode(),
                }),
            ),
            NodeDescriptor::Leaf(key) | NodeDescriptor::Placeholder(key) => {
                (Some(key.clone()), None, None)
            }
            NodeDescriptor::Operator { op, .. } => (None, Some(op.token()), None),
        };
        NodeStructure {
            kind: self.kind(),
            key,
            op_token,
            dep_fingerprints: self.deps().iter().map(|dep| dep.fingerprint()).collect(),
            literal,
        }
    }
}
