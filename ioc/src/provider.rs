//! The service provider traits shared by [`Container`] and [`Scope`].
//!
//! [`ServiceProvider`] is the object-safe, type-erased surface. Factories
//! receive it as `&dyn ServiceProvider` so they can resolve their own
//! dependencies. [`ServiceProviderExt`] layers the typed API on top of it and is
//! implemented for every provider, including `dyn ServiceProvider`.

use crate::audit::SourceLocation;
use crate::container::Container;
use crate::core::{BoxError, Factory, Instance, Registration, ServiceKey};
use crate::error::{ContainerError, Result};
use crate::lifetime::{ServiceDescriptor, ServiceLifetime};
use crate::scope::Scope;
use std::sync::Arc;

/// The type-erased container surface.
///
/// The `*_erased` methods are the plumbing behind [`ServiceProviderExt`]; use
/// the typed methods instead.
pub trait ServiceProvider {
  #[doc(hidden)]
  fn resolve_erased(&self, key: &ServiceKey) -> Result<Instance>;

  #[doc(hidden)]
  fn register_erased(
    &self,
    key: ServiceKey,
    registration: Registration,
    location: SourceLocation,
  ) -> Result<()>;

  #[doc(hidden)]
  fn unregister_erased(&self, key: &ServiceKey, location: SourceLocation) -> Result<()>;

  /// Whether a binding exists for `key`.
  fn contains_key(&self, key: &ServiceKey) -> bool;

  /// A point-in-time copy of every binding's metadata, sorted by type name.
  fn registered_services(&self) -> Vec<ServiceDescriptor>;

  /// Creates a scope rooted at the top-level container.
  fn create_scope(&self) -> Scope<'_>;

  /// The top-level container this provider resolves against.
  fn root(&self) -> &Container;
}

/// Converts a shared implementation into a shared interface handle.
///
/// Every type implements `Implements<Self>`. Trait-object bindings are declared
/// with [`implements!`](crate::implements).
pub trait Implements<I: ?Sized> {
  fn into_interface(self: Arc<Self>) -> Arc<I>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
  fn into_interface(self: Arc<Self>) -> Arc<T> {
    self
  }
}

fn erase_factory<I, F>(factory: F) -> Factory
where
  I: ?Sized + Send + Sync + 'static,
  F: Fn(&dyn ServiceProvider) -> std::result::Result<Arc<I>, BoxError> + Send + Sync + 'static,
{
  Arc::new(move |provider: &dyn ServiceProvider| {
    factory(provider).map(|service| Arc::new(service) as Instance)
  })
}

fn downcast<I: ?Sized + Send + Sync + 'static>(key: &ServiceKey, instance: Instance) -> Result<Arc<I>> {
  instance
    .downcast_ref::<Arc<I>>()
    .cloned()
    .ok_or_else(|| ContainerError::TypeMismatch {
      service: key.to_string(),
    })
}

/// The typed container API.
///
/// Mutating methods capture their call site for the audit trail.
pub trait ServiceProviderExt: ServiceProvider {
  /// Binds `Impl::default()` to the interface `I`.
  #[track_caller]
  fn register_type<I, Impl>(&self, lifetime: ServiceLifetime) -> Result<()>
  where
    I: ?Sized + Send + Sync + 'static,
    Impl: Implements<I> + Default + Send + Sync + 'static,
  {
    let factory =
      erase_factory::<I, _>(|_| Ok(<Impl as Implements<I>>::into_interface(Arc::new(Impl::default()))));
    self.register_erased(
      ServiceKey::of::<I>(),
      Registration::Factory { factory, lifetime },
      SourceLocation::caller(),
    )
  }

  /// Binds an existing instance to `I` as a singleton.
  #[track_caller]
  fn register_instance<I>(&self, instance: Arc<I>) -> Result<()>
  where
    I: ?Sized + Send + Sync + 'static,
  {
    self.register_erased(
      ServiceKey::of::<I>(),
      Registration::Instance(Arc::new(instance)),
      SourceLocation::caller(),
    )
  }

  #[track_caller]
  fn register_instance_named<I>(&self, name: &str, instance: Arc<I>) -> Result<()>
  where
    I: ?Sized + Send + Sync + 'static,
  {
    self.register_erased(
      ServiceKey::named::<I>(name),
      Registration::Instance(Arc::new(instance)),
      SourceLocation::caller(),
    )
  }

  /// Binds a factory to `I`. The factory may resolve other services through
  /// the provider it is handed.
  #[track_caller]
  fn register_factory<I, F>(&self, factory: F, lifetime: ServiceLifetime) -> Result<()>
  where
    I: ?Sized + Send + Sync + 'static,
    F: Fn(&dyn ServiceProvider) -> std::result::Result<Arc<I>, BoxError> + Send + Sync + 'static,
  {
    self.register_erased(
      ServiceKey::of::<I>(),
      Registration::Factory {
        factory: erase_factory(factory),
        lifetime,
      },
      SourceLocation::caller(),
    )
  }

  #[track_caller]
  fn register_factory_named<I, F>(
    &self,
    name: &str,
    factory: F,
    lifetime: ServiceLifetime,
  ) -> Result<()>
  where
    I: ?Sized + Send + Sync + 'static,
    F: Fn(&dyn ServiceProvider) -> std::result::Result<Arc<I>, BoxError> + Send + Sync + 'static,
  {
    self.register_erased(
      ServiceKey::named::<I>(name),
      Registration::Factory {
        factory: erase_factory(factory),
        lifetime,
      },
      SourceLocation::caller(),
    )
  }

  /// Binds an infallible factory that needs no container access.
  #[track_caller]
  fn register_simple_factory<I, F>(&self, factory: F, lifetime: ServiceLifetime) -> Result<()>
  where
    I: ?Sized + Send + Sync + 'static,
    F: Fn() -> Arc<I> + Send + Sync + 'static,
  {
    self.register_erased(
      ServiceKey::of::<I>(),
      Registration::Factory {
        factory: erase_factory::<I, _>(move |_| Ok(factory())),
        lifetime,
      },
      SourceLocation::caller(),
    )
  }

  fn resolve<I>(&self) -> Result<Arc<I>>
  where
    I: ?Sized + Send + Sync + 'static,
  {
    let key = ServiceKey::of::<I>();
    let instance = self.resolve_erased(&key)?;
    downcast(&key, instance)
  }

  fn resolve_named<I>(&self, name: &str) -> Result<Arc<I>>
  where
    I: ?Sized + Send + Sync + 'static,
  {
    let key = ServiceKey::named::<I>(name);
    let instance = self.resolve_erased(&key)?;
    downcast(&key, instance)
  }

  /// Resolves an optional dependency; any failure yields `None`.
  fn resolve_or_null<I>(&self) -> Option<Arc<I>>
  where
    I: ?Sized + Send + Sync + 'static,
  {
    self.resolve::<I>().ok()
  }

  fn is_registered<I>(&self) -> bool
  where
    I: ?Sized + Send + Sync + 'static,
  {
    self.contains_key(&ServiceKey::of::<I>())
  }

  fn is_registered_named<I>(&self, name: &str) -> bool
  where
    I: ?Sized + Send + Sync + 'static,
  {
    self.contains_key(&ServiceKey::named::<I>(name))
  }

  #[track_caller]
  fn unregister<I>(&self) -> Result<()>
  where
    I: ?Sized + Send + Sync + 'static,
  {
    self.unregister_erased(&ServiceKey::of::<I>(), SourceLocation::caller())
  }

  #[track_caller]
  fn unregister_named<I>(&self, name: &str) -> Result<()>
  where
    I: ?Sized + Send + Sync + 'static,
  {
    self.unregister_erased(&ServiceKey::named::<I>(name), SourceLocation::caller())
  }
}

impl<P: ServiceProvider + ?Sized> ServiceProviderExt for P {}
