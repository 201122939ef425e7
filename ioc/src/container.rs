//! The main `Container` struct: entry store, freeze control and resolution engine.

use crate::audit::{audit_log, AuditSink, RegistryAction, RegistryEvent, SourceLocation};
use crate::config::{ContainerConfig, FrozenClearPolicy};
use crate::core::{Binding, BoxError, Factory, Instance, Registration, ResolutionGuard, ServiceKey};
use crate::error::{ContainerError, Result};
use crate::lifetime::{ServiceDescriptor, ServiceLifetime};
use crate::provider::ServiceProvider;
use crate::scope::{Scope, ScopeContext};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

const FROZEN_REASON: &str = "Container is frozen";

/// How a freshly built singleton fared when it was handed back to its binding.
enum SingletonCommit {
  /// Cached as the binding's instance.
  Won,
  /// Another thread committed first; carries the instance that won.
  Lost(Instance),
  /// The binding was unregistered or replaced while the factory ran.
  Stale,
}

/// The service container.
///
/// Holds the bindings for all services, keyed by interface type. It is
/// thread-safe: registration and resolution may happen concurrently from any
/// number of threads, and factories may call back into the container.
///
/// The registry lock is never held while a factory runs. As a consequence a
/// singleton factory may run more than once when several threads resolve a
/// cold singleton at the same time; only the first committed instance is ever
/// handed out.
pub struct Container {
  id: u64,
  config: ContainerConfig,
  bindings: RwLock<HashMap<ServiceKey, Binding>>,
  frozen: AtomicBool,
  next_binding_id: AtomicU64,
  audit: Arc<dyn AuditSink>,
}

impl Default for Container {
  fn default() -> Self {
    Self::new()
  }
}

impl Container {
  /// Creates an empty container with default configuration that reports to
  /// the process-wide audit log.
  pub fn new() -> Self {
    Self::with_config(ContainerConfig::default())
  }

  pub fn with_config(config: ContainerConfig) -> Self {
    Self::with_audit_sink(config, audit_log().clone())
  }

  /// Creates a container that reports registry mutations to `sink` instead of
  /// the process-wide audit log.
  pub fn with_audit_sink(config: ContainerConfig, sink: Arc<dyn AuditSink>) -> Self {
    Self {
      id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
      config,
      bindings: RwLock::new(HashMap::new()),
      frozen: AtomicBool::new(false),
      next_binding_id: AtomicU64::new(1),
      audit: sink,
    }
  }

  pub fn name(&self) -> &str {
    &self.config.name
  }

  pub fn config(&self) -> &ContainerConfig {
    &self.config
  }

  /// Creates a new scope over this container.
  pub fn create_scope(&self) -> Scope<'_> {
    Scope::new(self)
  }

  /// A point-in-time copy of every binding's metadata, sorted by type name.
  /// Later registrations or resolutions do not show up in the returned list.
  pub fn registered_services(&self) -> Vec<ServiceDescriptor> {
    let mut services: Vec<ServiceDescriptor> = self
      .bindings
      .read()
      .values()
      .map(|binding| ServiceDescriptor {
        key: binding.key.clone(),
        type_name: binding.key.type_name(),
        name: binding.key.name().map(str::to_owned),
        lifetime: binding.lifetime,
        is_instantiated: binding.is_instantiated(),
      })
      .collect();
    services.sort_by(|a, b| (a.type_name, &a.name).cmp(&(b.type_name, &b.name)));
    services
  }

  // --- Freeze ---

  /// Forbids any further registry mutation. Resolution keeps working.
  ///
  /// One-way and idempotent.
  #[track_caller]
  pub fn freeze(&self) {
    let location = SourceLocation::caller();
    let was_frozen = self.frozen.swap(true, Ordering::AcqRel);
    if !was_frozen {
      tracing::info!(container = %self.config.name, "service container frozen");
    }
    self.record(RegistryEvent::succeeded(
      RegistryAction::FreezeServiceContainer,
      "",
      location,
    ));
  }

  pub fn is_frozen(&self) -> bool {
    self.frozen.load(Ordering::Acquire)
  }

  /// Removes every binding.
  ///
  /// On a frozen container this fails with `Frozen`, or does nothing and
  /// succeeds under [`FrozenClearPolicy::Ignore`]. Either way the blocked
  /// attempt is audited.
  #[track_caller]
  pub fn clear(&self) -> Result<()> {
    let location = SourceLocation::caller();

    let removed = {
      let mut bindings = self.bindings.write();
      if self.is_frozen() {
        None
      } else {
        Some(std::mem::take(&mut *bindings))
      }
    };

    match removed {
      Some(removed) => {
        tracing::info!(container = %self.config.name, count = removed.len(), "cleared all services");
        self.record(RegistryEvent::succeeded(RegistryAction::ClearServices, "", location));
        // Cached singletons are released here, outside the registry lock.
        drop(removed);
        Ok(())
      }
      None => {
        tracing::warn!(
          container = %self.config.name,
          %location,
          policy = ?self.config.frozen_clear,
          "clear refused: container is frozen"
        );
        self.record(RegistryEvent::failed(
          RegistryAction::ClearServices,
          "",
          location,
          FROZEN_REASON,
        ));
        match self.config.frozen_clear {
          FrozenClearPolicy::Reject => Err(ContainerError::Frozen {
            operation: "clear services",
          }),
          FrozenClearPolicy::Ignore => Ok(()),
        }
      }
    }
  }

  fn record(&self, event: RegistryEvent) {
    if self.config.audit.enabled {
      self.audit.record(event);
    }
  }

  // --- Resolution engine ---

  /// Resolves `key`, optionally on behalf of a scope.
  ///
  /// Without a scope, scoped bindings fail with `ScopedFromRoot`.
  pub(crate) fn resolve_in(&self, key: &ServiceKey, scope: Option<&ScopeContext<'_>>) -> Result<Instance> {
    let _guard = ResolutionGuard::enter(self.id, key)?;

    let (binding_id, factory, lifetime) = {
      let bindings = self.bindings.read();
      let binding = bindings
        .get(key)
        .ok_or_else(|| ContainerError::not_registered(key))?;

      if let Some(instance) = &binding.instance {
        return Ok(instance.clone());
      }
      (binding.id, binding.factory.clone(), binding.lifetime)
    };

    match lifetime {
      ServiceLifetime::Singleton => self.resolve_singleton(key, binding_id, &factory),
      ServiceLifetime::Transient => {
        let provider: &dyn ServiceProvider = match scope {
          Some(scope) => scope.provider,
          None => self,
        };
        self.invoke_factory(key, &factory, provider)
      }
      ServiceLifetime::Scoped => {
        let scope = scope.ok_or_else(|| ContainerError::ScopedFromRoot {
          service: key.to_string(),
        })?;

        let cached = scope.cache.borrow().get(key).cloned();
        if let Some(instance) = cached {
          return Ok(instance);
        }

        let instance = self.invoke_factory(key, &factory, scope.provider)?;
        let instance = scope
          .cache
          .borrow_mut()
          .entry(key.clone())
          .or_insert(instance)
          .clone();
        tracing::debug!(container = %self.config.name, service = %key, "cached scoped instance");
        Ok(instance)
      }
    }
  }

  fn resolve_singleton(&self, key: &ServiceKey, binding_id: u64, factory: &Factory) -> Result<Instance> {
    // Singletons are always built against the root container so they can
    // never capture a scoped instance.
    let instance = self.invoke_factory(key, factory, self)?;

    let outcome = {
      let mut bindings = self.bindings.write();
      match bindings.get_mut(key) {
        Some(binding) if binding.id == binding_id => match &binding.instance {
          Some(existing) => SingletonCommit::Lost(existing.clone()),
          None => {
            binding.instance = Some(instance.clone());
            SingletonCommit::Won
          }
        },
        _ => SingletonCommit::Stale,
      }
    };

    match outcome {
      SingletonCommit::Won => {
        tracing::debug!(container = %self.config.name, service = %key, "singleton committed");
        Ok(instance)
      }
      SingletonCommit::Lost(existing) => {
        tracing::debug!(
          container = %self.config.name,
          service = %key,
          "singleton committed by another thread; discarding local instance"
        );
        Ok(existing)
      }
      SingletonCommit::Stale => {
        tracing::warn!(
          container = %self.config.name,
          service = %key,
          "binding changed while its singleton was being built; instance not cached"
        );
        Ok(instance)
      }
    }
  }

  fn invoke_factory(
    &self,
    key: &ServiceKey,
    factory: &Factory,
    provider: &dyn ServiceProvider,
  ) -> Result<Instance> {
    tracing::debug!(container = %self.config.name, service = %key, "invoking factory");

    match panic::catch_unwind(AssertUnwindSafe(|| factory(provider))) {
      Ok(Ok(instance)) => Ok(instance),
      Ok(Err(err)) => Err(factory_failure(key, err)),
      Err(payload) => {
        let message = panic_message(payload.as_ref());
        tracing::warn!(container = %self.config.name, service = %key, %message, "factory panicked");
        Err(ContainerError::FactoryError {
          service: key.to_string(),
          message: format!("factory panicked: {message}"),
          source: None,
        })
      }
    }
  }
}

/// Wraps a factory's error. A cycle reported by a nested resolution is passed
/// through untouched so callers see the chain.
fn factory_failure(key: &ServiceKey, err: BoxError) -> ContainerError {
  match err.downcast::<ContainerError>() {
    Ok(inner) => match *inner {
      cycle @ ContainerError::CircularDependency { .. } => cycle,
      other => ContainerError::FactoryError {
        service: key.to_string(),
        message: other.to_string(),
        source: Some(Box::new(other)),
      },
    },
    Err(err) => ContainerError::FactoryError {
      service: key.to_string(),
      message: err.to_string(),
      source: Some(err),
    },
  }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "unknown panic payload".to_string()
  }
}

impl ServiceProvider for Container {
  fn resolve_erased(&self, key: &ServiceKey) -> Result<Instance> {
    self.resolve_in(key, None)
  }

  fn register_erased(
    &self,
    key: ServiceKey,
    registration: Registration,
    location: SourceLocation,
  ) -> Result<()> {
    let target = key.to_string();

    let outcome = {
      let mut bindings = self.bindings.write();
      if self.is_frozen() {
        Err(ContainerError::Frozen {
          operation: "register service",
        })
      } else if bindings.contains_key(&key) {
        Err(ContainerError::AlreadyRegistered {
          service: target.clone(),
        })
      } else {
        let id = self.next_binding_id.fetch_add(1, Ordering::Relaxed);
        let binding = match registration {
          Registration::Factory { factory, lifetime } => {
            Binding::from_factory(id, key.clone(), factory, lifetime)
          }
          Registration::Instance(instance) => Binding::from_instance(id, key.clone(), instance),
        };
        let lifetime = binding.lifetime;
        bindings.insert(key, binding);
        Ok(lifetime)
      }
    };

    match outcome {
      Ok(lifetime) => {
        tracing::info!(
          container = %self.config.name,
          service = %target,
          %lifetime,
          %location,
          "service registered"
        );
        self.record(RegistryEvent::succeeded(
          RegistryAction::RegisterService,
          target,
          location,
        ));
        Ok(())
      }
      Err(err) => {
        let reason = match &err {
          ContainerError::Frozen { .. } => FROZEN_REASON,
          _ => "Service already registered",
        };
        tracing::warn!(
          container = %self.config.name,
          service = %target,
          %location,
          reason,
          "service registration refused"
        );
        self.record(RegistryEvent::failed(
          RegistryAction::RegisterService,
          target,
          location,
          reason,
        ));
        Err(err)
      }
    }
  }

  fn unregister_erased(&self, key: &ServiceKey, location: SourceLocation) -> Result<()> {
    let target = key.to_string();

    let outcome = {
      let mut bindings = self.bindings.write();
      if self.is_frozen() {
        Err(ContainerError::Frozen {
          operation: "unregister service",
        })
      } else {
        bindings
          .remove(key)
          .ok_or_else(|| ContainerError::not_registered(&target))
      }
    };

    match outcome {
      Ok(removed) => {
        drop(removed);
        tracing::info!(container = %self.config.name, service = %target, %location, "service unregistered");
        self.record(RegistryEvent::succeeded(
          RegistryAction::UnregisterService,
          target,
          location,
        ));
        Ok(())
      }
      Err(err) => {
        let reason = match &err {
          ContainerError::Frozen { .. } => FROZEN_REASON,
          _ => "Service not registered",
        };
        tracing::warn!(
          container = %self.config.name,
          service = %target,
          %location,
          reason,
          "service unregistration refused"
        );
        self.record(RegistryEvent::failed(
          RegistryAction::UnregisterService,
          target,
          location,
          reason,
        ));
        Err(err)
      }
    }
  }

  fn contains_key(&self, key: &ServiceKey) -> bool {
    self.bindings.read().contains_key(key)
  }

  fn registered_services(&self) -> Vec<ServiceDescriptor> {
    Container::registered_services(self)
  }

  fn create_scope(&self) -> Scope<'_> {
    Scope::new(self)
  }

  fn root(&self) -> &Container {
    self
  }
}
