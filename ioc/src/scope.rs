//! Scopes: short-lived views over a root container with their own cache for
//! scoped instances.

use crate::audit::SourceLocation;
use crate::container::Container;
use crate::core::{Instance, Registration, ServiceKey};
use crate::error::Result;
use crate::lifetime::ServiceDescriptor;
use crate::provider::ServiceProvider;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::collections::HashMap;

type ScopedInstances = RefCell<HashMap<ServiceKey, Instance>>;

/// What the resolution engine needs from a scope: where to cache scoped
/// instances and which provider to hand to transient and scoped factories.
pub(crate) struct ScopeContext<'a> {
  pub(crate) provider: &'a dyn ServiceProvider,
  pub(crate) cache: &'a ScopedInstances,
}

/// A child view of a [`Container`] that caches scoped instances.
///
/// Registrations, singletons and transients are all delegated to the root
/// container. Only scoped instances live here: each `Scope` builds its own
/// instance of a scoped binding on first resolution and returns that same
/// instance afterwards. Scopes created from a scope are siblings rooted at the
/// same container, not nested children.
///
/// The scope holds its lock for an entire resolution, so two threads resolving
/// the same scoped key through one scope never both build it. The lock is
/// reentrant: factories resolved through a scope receive the scope itself and
/// may resolve further scoped services from it on the same thread.
///
/// Dropping a scope releases its cached references; instances shared
/// elsewhere live on.
pub struct Scope<'c> {
  root: &'c Container,
  instances: ReentrantMutex<ScopedInstances>,
}

impl<'c> Scope<'c> {
  pub(crate) fn new(root: &'c Container) -> Self {
    Self {
      root,
      instances: ReentrantMutex::new(RefCell::new(HashMap::new())),
    }
  }

  /// The container this scope was created from.
  pub fn parent(&self) -> &'c Container {
    self.root
  }

  /// Creates a sibling scope rooted at the same container.
  pub fn create_scope(&self) -> Scope<'c> {
    Scope::new(self.root)
  }

  /// Drops this scope's cached instances. Bindings are not touched.
  pub fn clear(&self) {
    // Instances are released after the lock, their drops may resolve again.
    let mut drained: Vec<Instance> = Vec::new();
    {
      let instances = self.instances.lock();
      drained.extend(instances.borrow_mut().drain().map(|(_, instance)| instance));
    }
    tracing::debug!(container = %self.root.name(), count = drained.len(), "scope cleared");
  }

  /// Number of scoped instances currently cached by this scope.
  pub fn cached_count(&self) -> usize {
    self.instances.lock().borrow().len()
  }

  /// Bindings of the root container; a scope holds none of its own.
  pub fn registered_services(&self) -> Vec<ServiceDescriptor> {
    self.root.registered_services()
  }
}

impl ServiceProvider for Scope<'_> {
  fn resolve_erased(&self, key: &ServiceKey) -> Result<Instance> {
    let instances = self.instances.lock();
    let context = ScopeContext {
      provider: self,
      cache: &*instances,
    };
    self.root.resolve_in(key, Some(&context))
  }

  fn register_erased(
    &self,
    key: ServiceKey,
    registration: Registration,
    location: SourceLocation,
  ) -> Result<()> {
    self.root.register_erased(key, registration, location)
  }

  fn unregister_erased(&self, key: &ServiceKey, location: SourceLocation) -> Result<()> {
    self.root.unregister_erased(key, location)
  }

  fn contains_key(&self, key: &ServiceKey) -> bool {
    self.root.contains_key(key)
  }

  fn registered_services(&self) -> Vec<ServiceDescriptor> {
    self.root.registered_services()
  }

  fn create_scope(&self) -> Scope<'_> {
    Scope::new(self.root)
  }

  fn root(&self) -> &Container {
    self.root
  }
}
