//! Content-derived 128-bit fingerprints.
//!
//! Fingerprints identify expression nodes, operators, types and values by
//! their content. They are computed with keyed BLAKE3 and truncated to 128
//! bits, which keeps accidental collisions cryptographically negligible.
//!
//! ## Stability
//!
//! The BLAKE3 key is derived from the crate version. Equal structures always
//! hash equal within one build, so fingerprints are safe as map keys and as
//! identity tokens inside a process. They are NOT stable across versions of
//! this crate: anything persisted by fingerprint must be re-fingerprinted
//! after an upgrade.

use std::fmt;
use std::sync::OnceLock;

/// Context string for deriving the fingerprint key.
const KEY_CONTEXT: &str = "tessera expression engine 2024-06 fingerprint key";

/// A fixed-width, content-derived identifier.
///
/// Two fingerprints are equal if and only if the content they were derived
/// from is structurally identical (up to negligible collision probability).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(u128);

impl Fingerprint {
    /// Creates a fingerprint from its raw 128-bit value.
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    /// Returns the raw 128-bit value.
    #[must_use]
    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// Renders the fingerprint as 32 lowercase hex digits.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:032x}", self.0)
    }

    /// Parses a fingerprint from its 32-digit hex form.
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        if text.len() != 32 {
            return None;
        }
        u128::from_str_radix(text, 16).ok().map(Self)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:032x})", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

fn fingerprint_key() -> &'static [u8; 32] {
    static KEY: OnceLock<[u8; 32]> = OnceLock::new();
    KEY.get_or_init(|| blake3::derive_key(KEY_CONTEXT, env!("CARGO_PKG_VERSION").as_bytes()))
}

/// Incremental fingerprint builder.
///
/// Every `combine_*` call is length-prefixed or fixed-width, so two different
/// sequences of calls cannot produce the same byte stream by concatenation.
/// The salt passed to [`FingerprintHasher::new`] separates domains (nodes,
/// operators, values, ...).
#[derive(Clone)]
pub struct FingerprintHasher {
    hasher: blake3::Hasher,
}

impl FingerprintHasher {
    /// Starts a new fingerprint in the given domain.
    #[must_use]
    pub fn new(salt: &str) -> Self {
        let mut this = Self {
            hasher: blake3::Hasher::new_keyed(fingerprint_key()),
        };
        this.combine_str(salt);
        this
    }

    /// Mixes a length-prefixed byte string.
    pub fn combine_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update(&(bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
        self
    }

    /// Mixes a length-prefixed UTF-8 string.
    pub fn combine_str(&mut self, text: &str) -> &mut Self {
        self.combine_bytes(text.as_bytes())
    }

    /// Mixes a 64-bit unsigned integer.
    pub fn combine_u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    /// Mixes a `usize` (always widened to 64 bits).
    pub fn combine_usize(&mut self, value: usize) -> &mut Self {
        self.combine_u64(value as u64)
    }

    /// Mixes a boolean.
    pub fn combine_bool(&mut self, value: bool) -> &mut Self {
        self.hasher.update(&[u8::from(value)]);
        self
    }

    /// Mixes another fingerprint.
    pub fn combine_fingerprint(&mut self, fingerprint: Fingerprint) -> &mut Self {
        self.hasher.update(&fingerprint.0.to_le_bytes());
        self
    }

    /// Finalizes the fingerprint. The hasher may keep being extended.
    #[must_use]
    pub fn finish(&self) -> Fingerprint {
        let hash = self.hasher.finalize();
        let mut head = [0u8; 16];
        head.copy_from_slice(&hash.as_bytes()[..16]);
        Fingerprint(u128::from_le_bytes(head))
    }
}

impl fmt::Debug for FingerprintHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FingerprintHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = FingerprintHasher::new("leaf").combine_str("x").finish();
        let b = FingerprintHasher::new("leaf").combine_str("x").finish();
        assert_eq!(a, b);
    }

    #[test]
    fn test_salt_separates_domains() {
        let leaf = FingerprintHasher::new("leaf").combine_str("x").finish();
        let placeholder = FingerprintHasher::new("placeholder").combine_str("x").finish();
        assert_ne!(leaf, placeholder);
    }

    #[test]
    fn test_length_prefix_prevents_aliasing() {
        let ab_c = FingerprintHasher::new("t")
            .combine_str("ab")
            .combine_str("c")
            .finish();
        let a_bc = FingerprintHasher::new("t")
            .combine_str("a")
            .combine_str("bc")
            .finish();
        assert_ne!(ab_c, a_bc);
    }

    #[test]
    fn test_hex_roundtrip() {
        let fp = FingerprintHasher::new("hex").combine_u64(42).finish();
        let text = fp.to_hex();
        assert_eq!(text.len(), 32);
        assert_eq!(Fingerprint::from_hex(&text), Some(fp));
        assert_eq!(Fingerprint::from_hex("abc"), None);
        assert_eq!(format!("{fp}"), text);
    }
}
