//! # tessera-types
//!
//! Leaf vocabulary for the Tessera expression engine.
//!
//! This crate provides:
//! - 128-bit content fingerprints (`Fingerprint`, `FingerprintHasher`)
//! - Opaque type tokens (`QType`) and typed values (`TypedValue`)
//! - A generic named registry implementing the shared override policy
//!
//! ## Fingerprint Stability
//!
//! Fingerprints are stable within one build of this crate and are not
//! promised to be stable across versions. See [`fingerprint`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod fingerprint;
pub mod qtype;
pub mod registry;
pub mod value;

#[cfg(test)]
mod proptests;

pub use fingerprint::{Fingerprint, FingerprintHasher};
pub use qtype::QType;
pub use registry::{NamedRegistry, RegistrationOptions, RegistryError};
pub use value::{TypedValue, ValuePayload};
