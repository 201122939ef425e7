//! Service keys, bindings and the per-thread resolution stack.

use crate::error::{ContainerError, Result};
use crate::lifetime::ServiceLifetime;
use crate::provider::ServiceProvider;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased service instance.
///
/// The payload is always an `Arc<I>` for the interface `I` named by the key it
/// was produced for. Only the typed layer in [`crate::provider`] downcasts it.
#[doc(hidden)]
pub type Instance = Arc<dyn Any + Send + Sync>;

/// The error type factories hand back to the container. Any `std::error::Error`
/// converts into it with `?`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A type-erased factory. Cloned out of the registry so it can run unlocked.
#[doc(hidden)]
pub type Factory =
  Arc<dyn Fn(&dyn ServiceProvider) -> std::result::Result<Instance, BoxError> + Send + Sync>;

/// Identifies one binding: the interface type plus an optional name.
///
/// Equality and hashing only consider the type identity and the name; the
/// type name is carried for diagnostics.
#[derive(Clone)]
pub struct ServiceKey {
  type_id: TypeId,
  type_name: &'static str,
  name: Option<Arc<str>>,
}

impl ServiceKey {
  pub fn of<I: ?Sized + Any>() -> Self {
    Self {
      type_id: TypeId::of::<I>(),
      type_name: std::any::type_name::<I>(),
      name: None,
    }
  }

  pub fn named<I: ?Sized + Any>(name: &str) -> Self {
    Self {
      type_id: TypeId::of::<I>(),
      type_name: std::any::type_name::<I>(),
      name: Some(Arc::from(name)),
    }
  }

  pub fn type_id(&self) -> TypeId {
    self.type_id
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }
}

impl PartialEq for ServiceKey {
  fn eq(&self, other: &Self) -> bool {
    self.type_id == other.type_id && self.name == other.name
  }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.type_id.hash(state);
    self.name.hash(state);
  }
}

impl fmt::Display for ServiceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "{}[{}]", self.type_name, name),
      None => f.write_str(self.type_name),
    }
  }
}

impl fmt::Debug for ServiceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "Key({}, Name({}))", self.type_name, name),
      None => write!(f, "Key({})", self.type_name),
    }
  }
}

/// What a register call hands to the entry store.
#[doc(hidden)]
pub enum Registration {
  Factory {
    factory: Factory,
    lifetime: ServiceLifetime,
  },
  Instance(Instance),
}

/// Registration metadata for one key, owned by the container's entry store.
pub(crate) struct Binding {
  /// Generation id, unique per container. A singleton built for a binding is
  /// only committed if the binding still carries the same id.
  pub(crate) id: u64,
  pub(crate) key: ServiceKey,
  pub(crate) factory: Factory,
  pub(crate) lifetime: ServiceLifetime,
  pub(crate) instance: Option<Instance>,
}

impl Binding {
  pub(crate) fn from_factory(
    id: u64,
    key: ServiceKey,
    factory: Factory,
    lifetime: ServiceLifetime,
  ) -> Self {
    Self {
      id,
      key,
      factory,
      lifetime,
      instance: None,
    }
  }

  /// A singleton whose cache is already populated. Its factory only hands back
  /// the same instance and is never reached through resolution.
  pub(crate) fn from_instance(id: u64, key: ServiceKey, instance: Instance) -> Self {
    let cached = instance.clone();
    Self {
      id,
      key,
      factory: Arc::new(move |_: &dyn ServiceProvider| Ok(cached.clone())),
      lifetime: ServiceLifetime::Singleton,
      instance: Some(instance),
    }
  }

  pub(crate) fn is_instantiated(&self) -> bool {
    self.instance.is_some()
  }
}

thread_local! {
  // Keys currently under construction on this thread, in entry order. Each
  // entry is tagged with the id of the root container that owns the key, so
  // unrelated containers never see each other's in-flight keys.
  static RESOLVING_STACK: RefCell<Vec<(u64, ServiceKey)>> = const { RefCell::new(Vec::new()) };
}

/// An RAII guard that detects circular dependencies.
///
/// Entering pushes the key onto the thread-local resolution stack, or fails
/// with [`ContainerError::CircularDependency`] if the key is already there.
/// Dropping the guard pops the key again, on every exit path including unwind.
pub(crate) struct ResolutionGuard {
  container_id: u64,
  key: ServiceKey,
}

impl ResolutionGuard {
  pub(crate) fn enter(container_id: u64, key: &ServiceKey) -> Result<Self> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      let in_flight = stack
        .iter()
        .any(|(id, k)| *id == container_id && k == key);

      if in_flight {
        let mut chain: Vec<String> = stack
          .iter()
          .filter(|(id, _)| *id == container_id)
          .map(|(_, k)| k.to_string())
          .collect();
        chain.push(key.to_string());
        return Err(ContainerError::CircularDependency { chain });
      }

      stack.push((container_id, key.clone()));
      tracing::trace!(service = %key, depth = stack.len(), "resolution stack push");
      Ok(())
    })?;

    Ok(Self {
      container_id,
      key: key.clone(),
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(pos) = stack
        .iter()
        .rposition(|(id, k)| *id == self.container_id && *k == self.key)
      {
        stack.remove(pos);
      }
      tracing::trace!(service = %self.key, depth = stack.len(), "resolution stack pop");
    });
  }
}

/// Number of keys in flight on the calling thread. Used by tests to prove the
/// stack unwinds completely.
#[cfg(test)]
pub(crate) fn resolving_depth() -> usize {
  RESOLVING_STACK.with(|stack| stack.borrow().len())
}
