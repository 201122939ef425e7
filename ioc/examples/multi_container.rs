use common_ioc::{global, Container, ServiceProviderExt};
use std::sync::Arc;

// A function that configures dependencies and runs some logic.
// By accepting a `&Container`, it can be tested with a controlled environment.
fn process_data(container: &Container) -> common_ioc::Result<String> {
  // Register a data source ONLY within this container.
  container.register_instance(Arc::new("test data".to_string()))?;

  let data = container.resolve::<String>()?;
  Ok(format!("Processed: {}", data.to_uppercase()))
}

fn main() -> common_ioc::Result<()> {
  // --- Test Scenario with a Local Container ---
  println!("--- Running with a local container ---");
  let test_container = Container::new();
  let result = process_data(&test_container)?;

  println!("Result: {}", result);
  assert_eq!(result, "Processed: TEST DATA");

  // --- Verify Isolation ---
  // The service registered in `test_container` does not exist in the global container.
  assert!(
    global().resolve_or_null::<String>().is_none(),
    "Dependency should not have leaked into the global container!"
  );

  println!("\nVerified that the local container is isolated from the global one.");
  Ok(())
}
