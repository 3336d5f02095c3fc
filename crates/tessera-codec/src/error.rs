//! Codec errors.

use tessera_core::ExprError;
use tessera_types::Fingerprint;
use thiserror::Error;

/// Errors raised while encoding or decoding expressions.
#[derive(Debug, Error)]
pub enum CodecError {
    /// An operator or value type named by the encoding is not registered.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// A resolved operator or a rebuilt node does not have the recorded
    /// fingerprint.
    #[error("fingerprint mismatch for {subject}: recorded {expected}, got {found}")]
    FingerprintMismatch {
        /// What was being checked (operator name or node index).
        subject: String,
        /// Fingerprint stored in the encoding.
        expected: Fingerprint,
        /// Fingerprint of what the decoder produced.
        found: Fingerprint,
    },

    /// The encoding is structurally invalid.
    #[error("malformed encoding: {0}")]
    Malformed(String),

    /// JSON (de)serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Rebuilding a node failed.
    #[error(transparent)]
    Expr(#[from] ExprError),
}

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
