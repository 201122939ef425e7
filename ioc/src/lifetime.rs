//! Service lifetimes and the descriptors returned by introspection.

use crate::core::ServiceKey;
use std::fmt;

/// How instances of a binding are created and shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceLifetime {
  /// One instance per container, created on first resolution and shared by
  /// every resolver until the container is dropped.
  #[default]
  Singleton,
  /// A fresh instance for every resolve call, owned solely by the caller.
  Transient,
  /// One instance per scope. Resolving a scoped binding on the root
  /// container fails.
  Scoped,
}

impl ServiceLifetime {
  pub fn as_str(&self) -> &'static str {
    match self {
      ServiceLifetime::Singleton => "singleton",
      ServiceLifetime::Transient => "transient",
      ServiceLifetime::Scoped => "scoped",
    }
  }
}

impl fmt::Display for ServiceLifetime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

/// A point-in-time copy of one binding's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
  /// The binding's key. Compares equal to `ServiceKey::of::<I>()` (or
  /// `ServiceKey::named::<I>(name)`) for the interface it was registered as.
  pub key: ServiceKey,
  /// Fully qualified name of the interface type, for display only. Not
  /// guaranteed unique; use `key` to identify the binding.
  pub type_name: &'static str,
  /// Binding name, for named registrations.
  pub name: Option<String>,
  pub lifetime: ServiceLifetime,
  /// Whether a singleton instance has been committed.
  pub is_instantiated: bool,
}
