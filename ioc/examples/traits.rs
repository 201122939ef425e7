use common_ioc::{global, implements, resolve, resolve_from, ServiceLifetime, ServiceProviderExt};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
#[derive(Default)]
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// Lets `register_type` hand out `ConsoleLogger` as `dyn Logger`.
implements!(ConsoleLogger => dyn Logger);

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() -> common_ioc::Result<()> {
  // --- Registration ---

  // Bind the concrete ConsoleLogger to the `dyn Logger` interface.
  global().register_type::<dyn Logger, ConsoleLogger>(ServiceLifetime::Singleton)?;

  // The ReportService factory resolves its own dependency through the
  // provider it is handed. ReportService never creates its logger.
  global().register_factory::<ReportService, _>(
    |sp| {
      Ok(Arc::new(ReportService {
        logger: resolve_from!(sp, trait Logger),
      }))
    },
    ServiceLifetime::Singleton,
  )?;

  // Nothing else may be registered from here on.
  global().freeze();

  // --- Resolution and Usage ---
  println!("Resolving the high-level service...");
  let report_service = resolve!(ReportService);

  println!("Using the service...");
  report_service.generate_report();
  Ok(())
}
