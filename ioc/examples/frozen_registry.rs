use common_ioc::{
  AuditLog, Container, ContainerConfig, RegistryAction, ServiceLifetime, ServiceProviderExt,
};
use std::sync::Arc;

struct Settings {
  port: u16,
}

const CONFIG: &str = r#"
name: app
frozen_clear: reject
audit:
  enabled: true
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
    .init();

  let config = ContainerConfig::from_yaml_str(CONFIG)?;
  let audit = Arc::new(AuditLog::new());
  let container = Container::with_audit_sink(config, audit.clone());

  container.register_simple_factory(|| Arc::new(Settings { port: 8080 }), ServiceLifetime::Singleton)?;
  container.freeze();

  // Reads keep working.
  println!("port = {}", container.resolve::<Settings>()?.port);

  // Writes are refused and recorded.
  if let Err(err) = container.register_instance(Arc::new(Settings { port: 9090 })) {
    println!("late registration refused: {err} (code {})", err.code());
  }
  if let Err(err) = container.clear() {
    println!("clear refused: {err}");
  }

  for event in audit.events() {
    println!(
      "{} {} {:<24} {:<12} success={} reason={}",
      event.timestamp.to_rfc3339(),
      event.location,
      event.action,
      event.target_name,
      event.success,
      event.reason.as_deref().unwrap_or("-"),
    );
  }
  assert_eq!(
    audit.events_by_action(RegistryAction::FreezeServiceContainer).len(),
    1
  );
  Ok(())
}
