use thiserror::Error;

/// Numeric error codes reported through [`ContainerError::code`].
pub mod codes {
  /// The registry was frozen when a mutation was attempted.
  pub const REGISTRY_FROZEN: i32 = -11;
  pub const SERVICE_NOT_REGISTERED: i32 = -100;
  pub const CIRCULAR_DEPENDENCY: i32 = -101;
  pub const ALREADY_REGISTERED: i32 = -102;
  pub const FACTORY_ERROR: i32 = -103;
  pub const TYPE_MISMATCH: i32 = -104;
  pub const SCOPED_FROM_ROOT: i32 = -105;
}

/// Module name attached to every container error.
pub const MODULE: &str = "di::container";

/// The error type for all fallible container operations.
#[derive(Debug, Error)]
pub enum ContainerError {
  #[error("Service not registered: {service}")]
  ServiceNotRegistered { service: String },

  #[error("Service already registered: {service}")]
  AlreadyRegistered { service: String },

  #[error("Circular dependency detected: {}", chain.join(" -> "))]
  CircularDependency { chain: Vec<String> },

  #[error("Factory for '{service}' failed: {message}")]
  FactoryError {
    service: String,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
  },

  #[error("Cannot resolve scoped service '{service}' from the root container; use create_scope()")]
  ScopedFromRoot { service: String },

  #[error("Cannot {operation}: container is frozen")]
  Frozen { operation: &'static str },

  #[error("Resolved instance for '{service}' does not have the requested type")]
  TypeMismatch { service: String },
}

impl ContainerError {
  /// The numeric code of this error, see [`codes`].
  pub fn code(&self) -> i32 {
    match self {
      ContainerError::ServiceNotRegistered { .. } => codes::SERVICE_NOT_REGISTERED,
      ContainerError::AlreadyRegistered { .. } => codes::ALREADY_REGISTERED,
      ContainerError::CircularDependency { .. } => codes::CIRCULAR_DEPENDENCY,
      ContainerError::FactoryError { .. } => codes::FACTORY_ERROR,
      ContainerError::ScopedFromRoot { .. } => codes::SCOPED_FROM_ROOT,
      ContainerError::Frozen { .. } => codes::REGISTRY_FROZEN,
      ContainerError::TypeMismatch { .. } => codes::TYPE_MISMATCH,
    }
  }

  /// The module that raised the error.
  pub fn module(&self) -> &'static str {
    MODULE
  }

  /// Extra diagnostic detail, where the variant carries any.
  pub fn details(&self) -> Option<String> {
    match self {
      ContainerError::CircularDependency { chain } => Some(format!("chain: {}", chain.join(" -> "))),
      ContainerError::FactoryError {
        source: Some(source),
        ..
      } => Some(format!("source: {source}")),
      _ => None,
    }
  }

  pub(crate) fn not_registered(service: impl ToString) -> Self {
    ContainerError::ServiceNotRegistered {
      service: service.to_string(),
    }
  }
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = ContainerError> = std::result::Result<T, E>;

/// Errors raised while loading a [`crate::ContainerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read configuration file: {0}")]
  Read(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  Parse(String),
}
