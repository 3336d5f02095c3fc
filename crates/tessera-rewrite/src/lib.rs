//! # tessera-rewrite
//!
//! Graph rewriting for Tessera expressions.
//!
//! This crate provides:
//! - Bottom-up transformations, single pass and to a fixed point
//! - Lowering of lambda and dispatch operators to backend operators
//! - Whole-graph annotation stripping
//! - Re-exports of the substitution family from `tessera-core`
//!
//! ## Termination
//!
//! Fixed-point transformations count every node they process and fail with
//! `ExprError::LimitExceeded` once the configured limit is passed, so a
//! rewrite that never converges reports an error instead of looping.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod annotations;
pub mod lowering;
pub mod transform;

#[cfg(test)]
mod proptests;

pub use annotations::strip_annotations;
pub use lowering::{to_lower_node, to_lowest, to_lowest_with_config};
pub use tessera_core::substitution::{sub_by_fingerprint, sub_by_name, sub_leaves, sub_placeholders};
pub use transform::{deep_transform, transform, TransformConfig};
