//! The operator registry.

use std::sync::OnceLock;

use tessera_types::{Fingerprint, NamedRegistry, RegistrationOptions, RegistryError};

use crate::error::{ExprError, Result};
use crate::operator::OperatorRef;

/// Name → operator resolution.
///
/// Registration is append-only and follows the shared override policy of
/// [`NamedRegistry`]: shadowing a name requires
/// [`RegistrationOptions::allow_override`], and names first registered as
/// non-overridable can never be shadowed.
///
/// Nodes keep the operator they were built with. Shadowing a name affects
/// later lookups only; existing nodes are not re-inferred.
#[derive(Debug)]
pub struct OperatorRegistry {
    inner: NamedRegistry<OperatorRef>,
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: NamedRegistry::new("operator"),
        }
    }

    /// The process-wide default registry.
    ///
    /// It is created empty on first use and lives until the process exits;
    /// it is never reset. Code that needs isolation (tests, independent
    /// sessions) should create its own registry instead.
    pub fn global() -> &'static OperatorRegistry {
        static GLOBAL: OnceLock<OperatorRegistry> = OnceLock::new();
        GLOBAL.get_or_init(OperatorRegistry::new)
    }

    /// Registers an operator under its display name.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AlreadyRegistered`] if the name is taken.
    pub fn register(&self, op: OperatorRef) -> std::result::Result<(), RegistryError> {
        self.inner.register(op.display_name().to_string(), op)
    }

    /// Registers an operator with explicit options.
    ///
    /// # Errors
    ///
    /// See [`NamedRegistry::register_with`].
    pub fn register_with(
        &self,
        op: OperatorRef,
        options: RegistrationOptions,
    ) -> std::result::Result<(), RegistryError> {
        self.inner
            .register_with(op.display_name().to_string(), op, options)
    }

    /// The newest operator registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<OperatorRef> {
        self.inner.lookup(name)
    }

    /// Like [`OperatorRegistry::lookup`], reporting a missing name as an
    /// error.
    ///
    /// # Errors
    ///
    /// [`ExprError::Lookup`] if nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<OperatorRef> {
        self.lookup(name)
            .ok_or_else(|| ExprError::Lookup(format!("operator '{name}' is not registered")))
    }

    /// Finds the version of `name` with the given fingerprint.
    #[must_use]
    pub fn find_version(&self, name: &str, fingerprint: Fingerprint) -> Option<OperatorRef> {
        self.inner
            .history(name)
            .into_iter()
            .rev()
            .find(|op| op.fingerprint() == fingerprint)
    }

    /// Every version registered under `name`, oldest first.
    #[must_use]
    pub fn history(&self, name: &str) -> Vec<OperatorRef> {
        self.inner.history(name)
    }

    /// Whether `name` may be shadowed, or `None` if unregistered.
    #[must_use]
    pub fn is_overridable(&self, name: &str) -> Option<bool> {
        self.inner.is_overridable(name)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    /// Registered names in first-registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.inner.names()
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ExprArena;
    use crate::operator::{BackendOperator, InferenceRule, Signature};
    use tessera_types::QType;

    fn fixed(qtype: QType) -> OperatorRef {
        BackendOperator::new("test.op", Signature::parse("x").unwrap(), InferenceRule::Fixed(qtype))
            .into_operator()
    }

    #[test]
    fn test_shadowing_keeps_history() {
        let registry = OperatorRegistry::new();
        let v1 = fixed(QType::int32());
        let v2 = BackendOperator::new("test.op", Signature::parse("x, y").unwrap(), InferenceRule::SameAsArg(0))
            .into_operator();

        registry.register(v1.clone()).unwrap();
        assert!(matches!(
            registry.register(v2.clone()),
            Err(RegistryError::AlreadyRegistered { .. })
        ));
        registry
            .register_with(v2.clone(), RegistrationOptions::overriding())
            .unwrap();

        assert_eq!(registry.lookup("test.op").map(|op| op.fingerprint()), Some(v2.fingerprint()));
        assert_eq!(registry.history("test.op").len(), 2);
        assert_eq!(
            registry
                .find_version("test.op", v1.fingerprint())
                .map(|op| op.fingerprint()),
            Some(v1.fingerprint())
        );
    }

    #[test]
    fn test_existing_nodes_keep_their_operator() {
        let arena = ExprArena::new();
        let registry = OperatorRegistry::new();
        registry.register(fixed(QType::int32())).unwrap();

        let node = arena
            .call(&registry.get("test.op").unwrap(), [arena.leaf("x")])
            .unwrap();

        let replacement = BackendOperator::new("test.op", Signature::parse("x").unwrap(), InferenceRule::SameAsArg(0))
            .with_doc("v2")
            .into_operator();
        registry
            .register_with(replacement, RegistrationOptions::overriding())
            .unwrap();

        assert_eq!(node.qtype(), Some(&QType::int32()));
    }

    #[test]
    fn test_singleton() {
        let registry = OperatorRegistry::new();
        registry
            .register_with(fixed(QType::unit()), RegistrationOptions::singleton())
            .unwrap();
        let err = registry
            .register_with(fixed(QType::text()), RegistrationOptions::overriding())
            .unwrap_err();
        assert!(matches!(err, RegistryError::SingletonViolation { .. }));
        assert_eq!(registry.is_overridable("test.op"), Some(false));
    }

    #[test]
    fn test_get_reports_lookup_error() {
        let registry = OperatorRegistry::new();
        assert!(matches!(registry.get("nope"), Err(ExprError::Lookup(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(OperatorRegistry::global(), OperatorRegistry::global()));
    }
}
