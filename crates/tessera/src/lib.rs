//! # Tessera
//!
//! An expression graph engine: typed computation graphs that are built
//! incrementally, deduplicated by content, type-checked as they are built,
//! rewritten, and lowered to primitive operators.
//!
//! ## Features
//!
//! - **Hash-Consing**: structurally equal expressions share one node and
//!   compare in O(1) by fingerprint
//! - **Incremental Inference**: every node carries its type and, when
//!   provable, its constant value from the moment it is built
//! - **Operators**: primitive backend operators, lambdas over placeholders,
//!   and type-directed dispatch
//! - **Rewriting**: substitution, fixed-point transforms and lowering
//! - **Codec**: a verified serialization round trip
//!
//! ## Quick Start
//!
//! ```
//! use tessera::prelude::*;
//!
//! let arena = ExprArena::new();
//! let registry = OperatorRegistry::new();
//! register_standard_operators(&registry, &arena).unwrap();
//!
//! let x = with_qtype(&arena, &arena.leaf("x"), QType::int64()).unwrap();
//! let squared = bind_by_name(&registry, &arena, "math.square", [x]).unwrap();
//! assert_eq!(squared.qtype(), Some(&QType::int64()));
//!
//! let lowered = to_lowest(&arena, &squared).unwrap();
//! assert_eq!(lowered.op().map(|op| op.display_name()), Some("math.multiply"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use tracing_subscriber::{fmt, EnvFilter};

pub use tessera_codec as codec;
pub use tessera_core as core;
pub use tessera_ops as ops;
pub use tessera_rewrite as rewrite;
pub use tessera_types as types;

/// Installs a `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` overrides the default filter. Calling this more than once is
/// harmless: later calls leave the first subscriber in place.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tessera_core=info,tessera_rewrite=info"));

    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tessera_codec::{encode, from_json, to_json, Decoder, ValueDecoderRegistry};
    pub use tessera_core::annotation::{read_name_annotation, with_name, with_qtype};
    pub use tessera_core::{
        bind_by_name, bind_op, post_order, BackendOperator, DispatchCase, DispatchOperator,
        ExprArena, ExprError, ExprRef, InferenceRule, LambdaOperator, OperatorRef,
        OperatorRegistry, Signature,
    };
    pub use tessera_ops::register_standard_operators;
    pub use tessera_rewrite::{
        strip_annotations, sub_by_fingerprint, sub_by_name, sub_leaves, sub_placeholders,
        to_lowest, transform,
    };
    pub use tessera_types::{Fingerprint, QType, TypedValue};
}
