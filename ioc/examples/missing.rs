use common_ioc::{global, maybe_resolve, resolve, ContainerError, ServiceProviderExt};
use std::panic;

struct UnregisteredService;

fn main() {
  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a service that was never registered...");

  let result = panic::catch_unwind(|| {
    // This line will panic!
    let _service = resolve!(UnregisteredService);
  });

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the non-panicking alternatives ---
  println!("\nNow, attempting to resolve using the fallible `resolve()` method...");

  match global().resolve::<UnregisteredService>() {
    Ok(_) => panic!("Should not have found the service!"),
    Err(err @ ContainerError::ServiceNotRegistered { .. }) => {
      println!("Correctly received an error: {} (code {})", err, err.code());
    }
    Err(other) => panic!("Unexpected error: {other}"),
  }

  assert!(maybe_resolve!(UnregisteredService).is_none());
  assert!(global().resolve_or_null::<UnregisteredService>().is_none());
  println!("Optional lookups returned `None`, as expected.");
}
