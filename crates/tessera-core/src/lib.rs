//! # tessera-core
//!
//! Core expression engine for Tessera.
//!
//! This crate provides:
//! - Content-addressed expression nodes with hash-consing
//! - Operators (backend, lambda, dispatch), signatures and argument binding
//! - Incremental attribute (type and constant) inference
//! - Iterative traversals and shallow substitution
//!
//! ## Design Principles
//!
//! - **Hash-Consing**: every structurally unique expression is stored once;
//!   equality is an O(1) fingerprint comparison
//! - **Immutable Nodes**: attributes are inferred once, when a node is
//!   interned, and never recomputed
//! - **Fail Closed**: a node whose inference fails is never interned
//! - **Explicit Registries**: operators are resolved through a registry
//!   passed by the caller
//!
//! ## Example
//!
//! ```
//! use tessera_core::{ExprArena, annotation};
//! use tessera_types::QType;
//!
//! let arena = ExprArena::new();
//! let x = annotation::with_qtype(&arena, &arena.leaf("x"), QType::int32()).unwrap();
//! assert_eq!(x.qtype(), Some(&QType::int32()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod annotation;
pub mod arena;
pub mod binding;
pub mod error;
pub mod expr;
pub mod handle;
pub mod inference;
pub mod intern;
pub mod operator;
pub mod registry;
pub mod substitution;
pub mod traversal;

#[cfg(test)]
mod proptests;

pub use arena::{ArenaConfig, ExprArena};
pub use binding::{bind_by_name, bind_op, bind_op_with_kwargs};
pub use error::{BindError, ExprError, Result};
pub use expr::{
    Attribute, DepList, ExprKind, ExprNode, LiteralPayload, NodeDescriptor, NodeStructure,
    OperatorToken,
};
pub use handle::ExprRef;
pub use inference::infer_attr_with_bindings;
pub use operator::{
    BackendOperator, DispatchCase, DispatchOperator, InferenceRule, LambdaOperator, Operator,
    OperatorRef, Parameter, ParameterKind, QTypeConstraint, Signature,
};
pub use registry::OperatorRegistry;
pub use substitution::{sub_by_fingerprint, sub_by_name, sub_leaves, sub_placeholders};
pub use traversal::{
    get_leaf_keys, get_placeholder_keys, node_count, post_order, post_order_traverse,
    pre_and_post_order_traverse,
};
