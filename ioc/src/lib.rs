//! # Common IoC
//!
//! A thread-safe service container for binding interfaces to implementations.
//!
//! Services are registered against an interface type (a concrete type or a
//! `dyn Trait`) with a [`ServiceLifetime`], and resolved on demand as `Arc`
//! handles. Factories receive the container and may resolve their own
//! dependencies; circular chains are detected per thread and reported as
//! errors instead of hanging.
//!
//! ## Core Concepts
//!
//! - **Container**: the registry of bindings. Create your own with
//!   [`Container::new`], or use the process-wide one from [`global()`].
//! - **Lifetimes**: singleton (one per container), transient (fresh per
//!   resolve) and scoped (one per [`Scope`]).
//! - **Scopes**: created with `create_scope()`, they cache scoped instances
//!   and delegate everything else to the root container.
//! - **Freeze**: [`Container::freeze`] locks the registry against further
//!   mutation while resolution keeps working. Every mutation attempt is
//!   recorded in the [`audit`] trail.
//!
//! ## Quick Start
//!
//! ```
//! use common_ioc::{Container, ServiceLifetime, ServiceProviderExt};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct EnglishGreeter {
//!     message: Arc<String>,
//! }
//!
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self) -> String {
//!         self.message.to_string()
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_instance(Arc::new(String::from("Hello, World!"))).unwrap();
//!
//! // The factory resolves its own dependency through the provider it is given.
//! container
//!     .register_factory::<dyn Greeter, _>(
//!         |sp| {
//!             let message = sp.resolve::<String>()?;
//!             Ok(Arc::new(EnglishGreeter { message }) as Arc<dyn Greeter>)
//!         },
//!         ServiceLifetime::Singleton,
//!     )
//!     .unwrap();
//!
//! let greeter = container.resolve::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "Hello, World!");
//! ```

pub mod audit;
mod config;
mod container;
mod core;
mod error;
mod global;
mod lifetime;
mod macros;
mod provider;
mod scope;

pub use audit::{audit_log, AuditLog, AuditSink, RegistryAction, RegistryEvent, SourceLocation};
pub use config::{AuditConfig, ContainerConfig, FrozenClearPolicy};
pub use container::Container;
pub use crate::core::{BoxError, ServiceKey};
pub use error::{codes, ConfigError, ContainerError, Result};
pub use global::global;
pub use lifetime::{ServiceDescriptor, ServiceLifetime};
pub use provider::{Implements, ServiceProvider, ServiceProviderExt};
pub use scope::Scope;
