//! # tessera-ops
//!
//! A small standard operator library for Tessera.
//!
//! This crate provides:
//! - Type predicates (`qtype.*`) used by constraints and dispatch conditions
//! - Boolean logic (`core.not`, `core.and`, `core.or`)
//! - Checked scalar arithmetic (`math.*`) with constant folding
//! - Composite operators: the `math.square` lambda and the `core.invert`
//!   dispatch
//!
//! ## Example
//!
//! ```
//! use tessera_core::{bind_by_name, ExprArena, OperatorRegistry};
//! use tessera_ops::register_standard_operators;
//!
//! let arena = ExprArena::new();
//! let registry = OperatorRegistry::new();
//! register_standard_operators(&registry, &arena).unwrap();
//!
//! let two = bind_by_name(&registry, &arena, "math.add", [arena.literal(1i32), arena.literal(1i32)]).unwrap();
//! assert_eq!(two.to_string(), "math.add(int32{1}, int32{1})");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod composite;
pub mod logic;
pub mod math;
pub mod qtype;
pub mod standard;

#[cfg(test)]
mod proptests;

pub use standard::{register_standard_operators, standard_operators};
