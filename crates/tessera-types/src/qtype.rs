//! Type tokens.
//!
//! A [`QType`] is an opaque, equality-comparable type identifier. The engine
//! never interprets a type beyond equality; which types are compatible is
//! decided by operator inference rules.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::fingerprint::{Fingerprint, FingerprintHasher};

/// A type token identified by name.
///
/// Cloning is a reference-count bump. Equality and hashing go through the
/// fingerprint of the name.
#[derive(Clone)]
pub struct QType(Arc<QTypeData>);

struct QTypeData {
    name: String,
    fingerprint: Fingerprint,
}

impl QType {
    /// Creates a type token with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let fingerprint = FingerprintHasher::new("qtype").combine_str(&name).finish();
        Self(Arc::new(QTypeData { name, fingerprint }))
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the fingerprint of this type.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.0.fingerprint
    }
}

macro_rules! standard_qtypes {
    ($($(#[$meta:meta])* $method:ident => $name:literal),* $(,)?) => {
        impl QType {
            $(
                $(#[$meta])*
                #[must_use]
                pub fn $method() -> QType {
                    static CELL: OnceLock<QType> = OnceLock::new();
                    CELL.get_or_init(|| QType::new($name)).clone()
                }
            )*
        }

        /// Names of all standard types.
        pub const STANDARD_QTYPE_NAMES: &[&str] = &[$($name),*];
    };
}

standard_qtypes! {
    /// The unit type (a single value).
    unit => "UNIT",
    /// Booleans.
    boolean => "BOOLEAN",
    /// 32-bit signed integers.
    int32 => "INT32",
    /// 64-bit signed integers.
    int64 => "INT64",
    /// 32-bit floats.
    float32 => "FLOAT32",
    /// 64-bit floats.
    float64 => "FLOAT64",
    /// UTF-8 text.
    text => "TEXT",
    /// The type of types.
    qtype => "QTYPE",
}

impl PartialEq for QType {
    fn eq(&self, other: &Self) -> bool {
        self.0.fingerprint == other.0.fingerprint
    }
}

impl Eq for QType {}

impl Hash for QType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.fingerprint.hash(state);
    }
}

impl fmt::Debug for QType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QType({})", self.0.name)
    }
}

impl fmt::Display for QType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}
