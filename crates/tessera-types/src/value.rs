//! Opaque typed values.
//!
//! The engine treats values as opaque: it only needs a type, equality and a
//! stable hash. Operator fold functions look inside a value through
//! [`TypedValue::downcast_ref`].

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::fingerprint::{Fingerprint, FingerprintHasher};
use crate::qtype::QType;

/// The payload of a [`TypedValue`].
///
/// Implementations must feed every byte that distinguishes two payloads into
/// `fingerprint_into`, because value equality is fingerprint equality.
pub trait ValuePayload: Any + fmt::Debug + Send + Sync {
    /// Mixes the payload content into a fingerprint.
    fn fingerprint_into(&self, hasher: &mut FingerprintHasher);

    /// Byte form used by codecs.
    fn encode(&self) -> Vec<u8>;

    /// Human-readable representation.
    fn repr(&self) -> String;

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;
}

/// A value of a known type.
#[derive(Clone)]
pub struct TypedValue {
    qtype: QType,
    payload: Arc<dyn ValuePayload>,
    fingerprint: Fingerprint,
}

impl TypedValue {
    /// Wraps a payload with its type.
    pub fn new<P: ValuePayload>(qtype: QType, payload: P) -> Self {
        let mut hasher = FingerprintHasher::new("value");
        hasher.combine_fingerprint(qtype.fingerprint());
        payload.fingerprint_into(&mut hasher);
        Self {
            fingerprint: hasher.finish(),
            qtype,
            payload: Arc::new(payload),
        }
    }

    /// Returns the value's type.
    #[must_use]
    pub fn qtype(&self) -> &QType {
        &self.qtype
    }

    /// Returns the value's fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Returns the payload.
    #[must_use]
    pub fn payload(&self) -> &dyn ValuePayload {
        self.payload.as_ref()
    }

    /// Returns the payload as `T` if it has that Rust type.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.as_any().downcast_ref::<T>()
    }

    /// Byte form of the payload.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        self.payload.encode()
    }

    /// Human-readable representation of the payload.
    #[must_use]
    pub fn repr(&self) -> String {
        self.payload.repr()
    }

    /// Returns the boolean payload, if this is a `BOOLEAN`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if self.qtype == QType::boolean() {
            self.downcast_ref::<bool>().copied()
        } else {
            None
        }
    }

    /// Returns the type payload, if this is a `QTYPE` value.
    #[must_use]
    pub fn as_qtype(&self) -> Option<&QType> {
        if self.qtype == QType::qtype() {
            self.downcast_ref::<QType>()
        } else {
            None
        }
    }

    /// Returns the text payload, if this is a `TEXT` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if self.qtype == QType::text() {
            self.downcast_ref::<String>().map(String::as_str)
        } else {
            None
        }
    }
}

impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl Eq for TypedValue {}

impl Hash for TypedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint.hash(state);
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedValue({}: {})", self.payload.repr(), self.qtype)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.payload.repr())
    }
}

macro_rules! numeric_payload {
    ($($ty:ty => $qtype:ident, |$v:ident| $repr:expr);* $(;)?) => {
        $(
            impl ValuePayload for $ty {
                fn fingerprint_into(&self, hasher: &mut FingerprintHasher) {
                    hasher.combine_bytes(&self.to_le_bytes());
                }

                fn encode(&self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }

                fn repr(&self) -> String {
                    let $v = self;
                    $repr
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }

            impl From<$ty> for TypedValue {
                fn from(value: $ty) -> Self {
                    TypedValue::new(QType::$qtype(), value)
                }
            }
        )*
    };
}

// Floats hash their bit pattern, so `0.0` and `-0.0` are distinct values and
// a NaN equals itself.
numeric_payload! {
    i32 => int32, |v| format!("int32{{{v}}}");
    i64 => int64, |v| v.to_string();
    f32 => float32, |v| format!("float32{{{v:?}}}");
    f64 => float64, |v| format!("{v:?}");
}

impl ValuePayload for bool {
    fn fingerprint_into(&self, hasher: &mut FingerprintHasher) {
        hasher.combine_bool(*self);
    }

    fn encode(&self) -> Vec<u8> {
        vec![u8::from(*self)]
    }

    fn repr(&self) -> String {
        self.to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ValuePayload for String {
    fn fingerprint_into(&self, hasher: &mut FingerprintHasher) {
        hasher.combine_str(self);
    }

    fn encode(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn repr(&self) -> String {
        format!("{self:?}")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ValuePayload for () {
    fn fingerprint_into(&self, _hasher: &mut FingerprintHasher) {}

    fn encode(&self) -> Vec<u8> {
        Vec::new()
    }

    fn repr(&self) -> String {
        "unit".to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ValuePayload for QType {
    fn fingerprint_into(&self, hasher: &mut FingerprintHasher) {
        hasher.combine_fingerprint(self.fingerprint());
    }

    fn encode(&self) -> Vec<u8> {
        self.name().as_bytes().to_vec()
    }

    fn repr(&self) -> String {
        self.name().to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::new(QType::boolean(), value)
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        TypedValue::new(QType::text(), value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::new(QType::text(), value.to_string())
    }
}

impl From<()> for TypedValue {
    fn from((): ()) -> Self {
        TypedValue::new(QType::unit(), ())
    }
}

impl From<QType> for TypedValue {
    fn from(value: QType) -> Self {
        TypedValue::new(QType::qtype(), value)
    }
}
