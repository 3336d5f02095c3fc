//! Named registries with a uniform override policy.
//!
//! Every registry in Tessera (operators, value decoders) shares one policy:
//!
//! - Registration is append-only. Shadowing a name pushes a new version; the
//!   previous versions stay reachable through [`NamedRegistry::history`].
//! - Each name carries an `overridable` flag fixed by its first registration.
//! - Re-registering an overridable name requires `allow_override`.
//! - Re-registering a non-overridable name always fails with
//!   [`RegistryError::SingletonViolation`].

use indexmap::IndexMap;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by registries.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The name is taken and the registration did not ask to override it.
    #[error("{kind} '{name}' is already registered")]
    AlreadyRegistered {
        /// Registry kind (e.g. "operator").
        kind: &'static str,
        /// The contested name.
        name: String,
    },

    /// The name was first registered as non-overridable.
    #[error("{kind} '{name}' is non-overridable and cannot be shadowed")]
    SingletonViolation {
        /// Registry kind.
        kind: &'static str,
        /// The contested name.
        name: String,
    },

    /// No entry under this name.
    #[error("{kind} '{name}' is not registered")]
    NotFound {
        /// Registry kind.
        kind: &'static str,
        /// The missing name.
        name: String,
    },
}

/// How a registration treats an existing entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrationOptions {
    /// Shadow an existing overridable entry instead of failing.
    pub allow_override: bool,
    /// Whether later registrations may shadow this one. Only consulted on
    /// the first registration of a name.
    pub overridable: bool,
}

impl Default for RegistrationOptions {
    fn default() -> Self {
        Self {
            allow_override: false,
            overridable: true,
        }
    }
}

impl RegistrationOptions {
    /// Options that shadow an existing overridable entry.
    #[must_use]
    pub fn overriding() -> Self {
        Self {
            allow_override: true,
            overridable: true,
        }
    }

    /// Options for an entry that may never be shadowed.
    #[must_use]
    pub fn singleton() -> Self {
        Self {
            allow_override: false,
            overridable: false,
        }
    }
}

#[derive(Debug)]
struct Entry<T> {
    versions: Vec<T>,
    overridable: bool,
}

/// A thread-safe name → item registry.
#[derive(Debug)]
pub struct NamedRegistry<T> {
    kind: &'static str,
    entries: RwLock<IndexMap<String, Entry<T>>>,
}

impl<T: Clone> NamedRegistry<T> {
    /// Creates an empty registry. `kind` names the items in error messages.
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: RwLock::new(IndexMap::new()),
        }
    }

    /// Registers a new name with default options.
    ///
    /// # Errors
    ///
    /// Fails if the name is already registered.
    pub fn register(&self, name: impl Into<String>, item: T) -> Result<(), RegistryError> {
        self.register_with(name, item, RegistrationOptions::default())
    }

    /// Registers `item` under `name` following `options`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::SingletonViolation`] if the existing entry is
    /// non-overridable, [`RegistryError::AlreadyRegistered`] if it exists and
    /// `allow_override` is not set.
    pub fn register_with(
        &self,
        name: impl Into<String>,
        item: T,
        options: RegistrationOptions,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let mut entries = self.entries.write();
        match entries.get_mut(&name) {
            None => {
                debug!(kind = self.kind, name = %name, overridable = options.overridable, "registered");
                entries.insert(
                    name,
                    Entry {
                        versions: vec![item],
                        overridable: options.overridable,
                    },
                );
                Ok(())
            }
            Some(entry) if !entry.overridable => Err(RegistryError::SingletonViolation {
                kind: self.kind,
                name,
            }),
            Some(_) if !options.allow_override => Err(RegistryError::AlreadyRegistered {
                kind: self.kind,
                name,
            }),
            Some(entry) => {
                entry.versions.push(item);
                warn!(kind = self.kind, name = %name, version = entry.versions.len(), "shadowed registry entry");
                Ok(())
            }
        }
    }

    /// Returns the newest version registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<T> {
        self.entries
            .read()
            .get(name)
            .and_then(|entry| entry.versions.last().cloned())
    }

    /// Like [`NamedRegistry::lookup`] but reports a missing name as an error.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<T, RegistryError> {
        self.lookup(name).ok_or_else(|| RegistryError::NotFound {
            kind: self.kind,
            name: name.to_string(),
        })
    }

    /// Returns every version registered under `name`, oldest first.
    #[must_use]
    pub fn history(&self, name: &str) -> Vec<T> {
        self.entries
            .read()
            .get(name)
            .map(|entry| entry.versions.clone())
            .unwrap_or_default()
    }

    /// Returns whether `name` may be shadowed, or `None` if unregistered.
    #[must_use]
    pub fn is_overridable(&self, name: &str) -> Option<bool> {
        self.entries.read().get(name).map(|entry| entry.overridable)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Returns the registered names in first-registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Returns the number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let registry = NamedRegistry::new("item");
        registry.register("a", 1).unwrap();
        registry.register("b", 2).unwrap();

        assert_eq!(registry.lookup("a"), Some(1));
        assert_eq!(registry.lookup("missing"), None);
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_requires_override() {
        let registry = NamedRegistry::new("item");
        registry.register("a", 1).unwrap();

        let err = registry.register("a", 2).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered { .. }));
        assert_eq!(registry.lookup("a"), Some(1));

        registry
            .register_with("a", 2, RegistrationOptions::overriding())
            .unwrap();
        assert_eq!(registry.lookup("a"), Some(2));
        assert_eq!(registry.history("a"), vec![1, 2]);
    }

    #[test]
    fn test_singleton_cannot_be_shadowed() {
        let registry = NamedRegistry::new("item");
        registry
            .register_with("s", 1, RegistrationOptions::singleton())
            .unwrap();

        let err = registry
            .register_with("s", 2, RegistrationOptions::overriding())
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::SingletonViolation {
                kind: "item",
                name: "s".to_string()
            }
        );
        assert_eq!(registry.lookup("s"), Some(1));
        assert_eq!(registry.is_overridable("s"), Some(false));
    }

    #[test]
    fn test_not_found() {
        let registry: NamedRegistry<i32> = NamedRegistry::new("item");
        let err = registry.get("x").unwrap_err();
        assert_eq!(err.to_string(), "item 'x' is not registered");
        assert!(registry.is_empty());
    }
}
