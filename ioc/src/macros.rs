//! Public macros for ergonomic service resolution and trait binding.

/// Resolves a required service from the given provider.
///
/// The provider may be a `&Container`, a `&Scope` or the `&dyn ServiceProvider`
/// a factory receives.
///
/// # Panics
///
/// Panics if the service cannot be resolved. Inside a factory the panic is
/// caught by the container and reported as a factory error.
///
/// # Examples
///
/// ```
/// use common_ioc::{resolve_from, Container, ServiceLifetime, ServiceProviderExt};
/// use std::sync::Arc;
///
/// struct Config { url: &'static str }
/// struct Database { url: &'static str }
///
/// let container = Container::new();
/// container.register_instance(Arc::new(Config { url: "postgres://db" })).unwrap();
/// container
///   .register_factory::<Database, _>(
///     |sp| Ok(Arc::new(Database { url: resolve_from!(sp, Config).url })),
///     ServiceLifetime::Singleton,
///   )
///   .unwrap();
///
/// assert_eq!(resolve_from!(&container, Database).url, "postgres://db");
/// ```
#[macro_export]
macro_rules! resolve_from {
    // resolve_from!(provider, trait MyTrait); `:ident` so the macro can build `dyn MyTrait`.
    ($provider:expr, trait $trait_ident:ident) => {
        $crate::ServiceProviderExt::resolve::<dyn $trait_ident>($provider).unwrap_or_else(|err| {
            panic!(
                "Failed to resolve required trait service: {}: {}",
                std::any::type_name::<dyn $trait_ident>(),
                err
            )
        })
    };

    // resolve_from!(provider, trait MyTrait, "name")
    ($provider:expr, trait $trait_ident:ident, $name:expr) => {
        $crate::ServiceProviderExt::resolve_named::<dyn $trait_ident>($provider, $name)
            .unwrap_or_else(|err| {
                panic!(
                    "Failed to resolve required trait service with name '{}': {}: {}",
                    $name,
                    std::any::type_name::<dyn $trait_ident>(),
                    err
                )
            })
    };

    // resolve_from!(provider, MyService)
    ($provider:expr, $type:ty) => {
        $crate::ServiceProviderExt::resolve::<$type>($provider).unwrap_or_else(|err| {
            panic!(
                "Failed to resolve required service: {}: {}",
                std::any::type_name::<$type>(),
                err
            )
        })
    };

    // resolve_from!(provider, MyService, "name")
    ($provider:expr, $type:ty, $name:expr) => {
        $crate::ServiceProviderExt::resolve_named::<$type>($provider, $name).unwrap_or_else(|err| {
            panic!(
                "Failed to resolve required service with name '{}': {}: {}",
                $name,
                std::any::type_name::<$type>(),
                err
            )
        })
    };
}

/// Resolves an optional service from the given provider, yielding an `Option`.
#[macro_export]
macro_rules! maybe_resolve_from {
    ($provider:expr, trait $trait_ident:ident) => {
        $crate::ServiceProviderExt::resolve::<dyn $trait_ident>($provider).ok()
    };
    ($provider:expr, trait $trait_ident:ident, $name:expr) => {
        $crate::ServiceProviderExt::resolve_named::<dyn $trait_ident>($provider, $name).ok()
    };
    ($provider:expr, $type:ty) => {
        $crate::ServiceProviderExt::resolve::<$type>($provider).ok()
    };
    ($provider:expr, $type:ty, $name:expr) => {
        $crate::ServiceProviderExt::resolve_named::<$type>($provider, $name).ok()
    };
}

/// Resolves a required service from the global container.
///
/// # Panics
///
/// Panics if the service cannot be resolved. For a non-panicking version, use
/// [`maybe_resolve!`] or `global().resolve::<T>()`.
///
/// # Examples
///
/// ```
/// use common_ioc::{global, resolve, ServiceLifetime, ServiceProviderExt};
/// use std::sync::Arc;
///
/// struct Motd(String);
///
/// global()
///   .register_simple_factory(|| Arc::new(Motd("hello".to_string())), ServiceLifetime::Singleton)
///   .unwrap();
///
/// let motd = resolve!(Motd);
/// assert_eq!(motd.0, "hello");
/// ```
///
/// ```
/// use common_ioc::{global, resolve, ServiceProviderExt};
/// use std::sync::Arc;
///
/// trait Notifier: Send + Sync { fn channel(&self) -> &'static str; }
/// struct SlackNotifier;
/// impl Notifier for SlackNotifier { fn channel(&self) -> &'static str { "#ops" } }
///
/// global().register_instance_named::<dyn Notifier>("ops", Arc::new(SlackNotifier)).unwrap();
///
/// let notifier = resolve!(trait Notifier, "ops");
/// assert_eq!(notifier.channel(), "#ops");
/// ```
#[macro_export]
macro_rules! resolve {
    (trait $trait_ident:ident) => {
        $crate::resolve_from!($crate::global(), trait $trait_ident)
    };
    (trait $trait_ident:ident, $name:expr) => {
        $crate::resolve_from!($crate::global(), trait $trait_ident, $name)
    };
    ($type:ty) => {
        $crate::resolve_from!($crate::global(), $type)
    };
    ($type:ty, $name:expr) => {
        $crate::resolve_from!($crate::global(), $type, $name)
    };
}

/// Resolves an optional service from the global container, yielding an
/// `Option`.
#[macro_export]
macro_rules! maybe_resolve {
    (trait $trait_ident:ident) => {
        $crate::maybe_resolve_from!($crate::global(), trait $trait_ident)
    };
    (trait $trait_ident:ident, $name:expr) => {
        $crate::maybe_resolve_from!($crate::global(), trait $trait_ident, $name)
    };
    ($type:ty) => {
        $crate::maybe_resolve_from!($crate::global(), $type)
    };
    ($type:ty, $name:expr) => {
        $crate::maybe_resolve_from!($crate::global(), $type, $name)
    };
}

/// Declares that a concrete type can be handed out as one or more trait
/// objects, which lets it be bound with `register_type`.
///
/// # Examples
///
/// ```
/// use common_ioc::{implements, Container, ServiceLifetime, ServiceProviderExt};
///
/// trait Clock: Send + Sync { fn now(&self) -> u64; }
///
/// #[derive(Default)]
/// struct FixedClock;
/// impl Clock for FixedClock { fn now(&self) -> u64 { 42 } }
///
/// implements!(FixedClock => dyn Clock);
///
/// let container = Container::new();
/// container.register_type::<dyn Clock, FixedClock>(ServiceLifetime::Singleton).unwrap();
/// assert_eq!(container.resolve::<dyn Clock>().unwrap().now(), 42);
/// ```
#[macro_export]
macro_rules! implements {
    ($impl_ty:ty => $($iface:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$iface> for $impl_ty {
                fn into_interface(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$iface> {
                    self
                }
            }
        )+
    };
}
