//! Decoders for literal payloads, keyed by type name.

use std::fmt;
use std::sync::Arc;

use tessera_types::{
    NamedRegistry, QType, RegistrationOptions, RegistryError, TypedValue,
};

/// Turns payload bytes back into a value.
#[derive(Clone)]
pub struct ValueDecoder(Arc<dyn Fn(&[u8]) -> std::result::Result<TypedValue, String> + Send + Sync>);

impl ValueDecoder {
    /// Wraps a decoding function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[u8]) -> std::result::Result<TypedValue, String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Decodes `bytes`.
    ///
    /// # Errors
    ///
    /// Whatever the wrapped function reports for malformed bytes.
    pub fn decode(&self, bytes: &[u8]) -> std::result::Result<TypedValue, String> {
        (self.0)(bytes)
    }
}

impl fmt::Debug for ValueDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueDecoder")
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> std::result::Result<[u8; N], String> {
    bytes
        .try_into()
        .map_err(|_| format!("expected {N} bytes, got {}", bytes.len()))
}

fn utf8(bytes: &[u8]) -> std::result::Result<&str, String> {
    std::str::from_utf8(bytes).map_err(|err| err.to_string())
}

/// Type name → [`ValueDecoder`], under the shared registry policy.
#[derive(Debug)]
pub struct ValueDecoderRegistry {
    inner: NamedRegistry<ValueDecoder>,
}

impl Default for ValueDecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueDecoderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: NamedRegistry::new("value decoder"),
        }
    }

    /// Creates a registry with decoders for every standard type.
    ///
    /// The standard decoders are singletons.
    #[must_use]
    pub fn with_standard_types() -> Self {
        let registry = Self::new();
        let standard: [(QType, ValueDecoder); 8] = [
            (QType::unit(), ValueDecoder::new(|bytes| match bytes {
                [] => Ok(TypedValue::from(())),
                _ => Err(format!("expected 0 bytes, got {}", bytes.len())),
            })),
            (QType::boolean(), ValueDecoder::new(|bytes| match bytes {
                [0] => Ok(TypedValue::from(false)),
                [1] => Ok(TypedValue::from(true)),
                _ => Err("invalid BOOLEAN payload".to_string()),
            })),
            (QType::int32(), ValueDecoder::new(|bytes| Ok(i32::from_le_bytes(fixed(bytes)?).into()))),
            (QType::int64(), ValueDecoder::new(|bytes| Ok(i64::from_le_bytes(fixed(bytes)?).into()))),
            (QType::float32(), ValueDecoder::new(|bytes| Ok(f32::from_le_bytes(fixed(bytes)?).into()))),
            (QType::float64(), ValueDecoder::new(|bytes| Ok(f64::from_le_bytes(fixed(bytes)?).into()))),
            (QType::text(), ValueDecoder::new(|bytes| Ok(utf8(bytes)?.into()))),
            (QType::qtype(), ValueDecoder::new(|bytes| Ok(QType::new(utf8(bytes)?).into()))),
        ];
        for (qtype, decoder) in standard {
            // The registry is fresh and the standard type names are distinct.
            registry
                .register_with(qtype.name(), decoder, RegistrationOptions::singleton())
                .expect("standard decoders register into an empty registry");
        }
        registry
    }

    /// Registers a decoder for the type named `qtype`.
    ///
    /// # Errors
    ///
    /// See [`NamedRegistry::register`].
    pub fn register(&self, qtype: &str, decoder: ValueDecoder) -> std::result::Result<(), RegistryError> {
        self.inner.register(qtype, decoder)
    }

    /// Registers a decoder with explicit options.
    ///
    /// # Errors
    ///
    /// See [`NamedRegistry::register_with`].
    pub fn register_with(
        &self,
        qtype: &str,
        decoder: ValueDecoder,
        options: RegistrationOptions,
    ) -> std::result::Result<(), RegistryError> {
        self.inner.register_with(qtype, decoder, options)
    }

    /// The newest decoder for `qtype`.
    #[must_use]
    pub fn lookup(&self, qtype: &str) -> Option<ValueDecoder> {
        self.inner.lookup(qtype)
    }

    /// Returns true if a decoder is registered for `qtype`.
    #[must_use]
    pub fn contains(&self, qtype: &str) -> bool {
        self.inner.contains(qtype)
    }
}
