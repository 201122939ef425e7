//! The global container instance and access function.

use crate::container::Container;
use once_cell::sync::Lazy;

// The one and only global container instance.
// It will be created on its first access in a thread-safe manner.
static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(Container::default);

/// Provides a reference to the global container instance.
///
/// This is the only process-wide container. Prefer passing a `&Container` (or
/// `&dyn ServiceProvider`) explicitly where you can; use the global one for
/// the application's default registry, typically populated at start-up and
/// then frozen.
///
/// # Examples
///
/// ```
/// use common_ioc::{global, ServiceProviderExt};
/// use std::sync::Arc;
///
/// struct Banner(&'static str);
///
/// global().register_instance(Arc::new(Banner("hello"))).unwrap();
/// assert_eq!(global().resolve::<Banner>().unwrap().0, "hello");
/// ```
pub fn global() -> &'static Container {
  &GLOBAL_CONTAINER
}
