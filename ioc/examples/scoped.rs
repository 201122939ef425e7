use common_ioc::{Container, ContainerError, ServiceLifetime, ServiceProviderExt};
use std::sync::{
  atomic::{AtomicU64, Ordering},
  Arc,
};

// One unit of work per request.
struct UnitOfWork {
  request_id: u64,
}

// Depends on the unit of work of the request it serves.
struct OrderHandler {
  uow: Arc<UnitOfWork>,
}

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

fn main() -> common_ioc::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let container = Container::new();
  container.register_simple_factory(
    || {
      Arc::new(UnitOfWork {
        request_id: NEXT_REQUEST.fetch_add(1, Ordering::SeqCst),
      })
    },
    ServiceLifetime::Scoped,
  )?;
  container.register_factory::<OrderHandler, _>(
    |sp| {
      Ok(Arc::new(OrderHandler {
        uow: sp.resolve::<UnitOfWork>()?,
      }))
    },
    ServiceLifetime::Transient,
  )?;
  container.freeze();

  for _ in 0..2 {
    let request = container.create_scope();
    let handler = request.resolve::<OrderHandler>()?;
    let uow = request.resolve::<UnitOfWork>()?;
    assert!(Arc::ptr_eq(&handler.uow, &uow));
    println!("handled request {}", uow.request_id);
  }

  // Scoped services only exist inside a scope.
  match container.resolve::<UnitOfWork>() {
    Err(err @ ContainerError::ScopedFromRoot { .. }) => println!("from root: {err}"),
    other => panic!("unexpected result: {:?}", other.map(|uow| uow.request_id)),
  }
  Ok(())
}
