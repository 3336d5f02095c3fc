//! # tessera-codec
//!
//! Reference serialization codec for Tessera expression graphs.
//!
//! This crate provides:
//! - `encode`: a post-order node table built from the serialization
//!   boundary tuple of every node
//! - JSON transport through `serde_json`
//! - `Decoder`: rebuilds a graph against an operator registry and a
//!   value-decoder registry, verifying every fingerprint
//!
//! Fingerprints are only stable within one build of the engine, so an
//! encoding is meant to be decoded by the same build that produced it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod decode;
pub mod error;
pub mod format;
pub mod values;

#[cfg(test)]
mod proptests;

pub use decode::Decoder;
pub use error::{CodecError, Result};
pub use format::{encode, from_json, to_json, EncodedExpr, EncodedNode, FORMAT_VERSION};
pub use values::{ValueDecoder, ValueDecoderRegistry};
