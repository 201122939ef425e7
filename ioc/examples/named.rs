use common_ioc::{global, resolve, ServiceProviderExt};
use std::sync::Arc;

// --- Abstraction and Implementations ---
trait MessageSender: Send + Sync {
  fn send(&self, to: &str, message: &str) -> String;
}

struct EmailSender;
impl MessageSender for EmailSender {
  fn send(&self, to: &str, message: &str) -> String {
    format!("Sending email to {}: '{}'", to, message)
  }
}

struct SmsSender;
impl MessageSender for SmsSender {
  fn send(&self, to: &str, message: &str) -> String {
    format!("Sending SMS to {}: '{}'", to, message)
  }
}

fn main() -> common_ioc::Result<()> {
  // --- Registration ---
  // Register both implementations under the same interface with unique names.
  global().register_instance_named::<dyn MessageSender>("email", Arc::new(EmailSender))?;
  global().register_instance_named::<dyn MessageSender>("sms", Arc::new(SmsSender))?;

  // --- Resolution ---
  // Choose the implementation at the point of resolution.
  let email_notifier = resolve!(trait MessageSender, "email");
  let sms_notifier = resolve!(trait MessageSender, "sms");

  let result1 = email_notifier.send("test@example.com", "Hello!");
  let result2 = sms_notifier.send("+123456789", "Hello!");

  println!("{}", result1);
  println!("{}", result2);

  assert!(result1.contains("email"));
  assert!(result2.contains("SMS"));

  for service in global().registered_services() {
    println!(
      "registered: {} [{}] ({})",
      service.type_name,
      service.name.as_deref().unwrap_or("-"),
      service.lifetime
    );
  }
  Ok(())
}
