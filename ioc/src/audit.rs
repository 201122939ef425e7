//! Audit trail for registry mutations.
//!
//! Every attempt to change a container's bindings (register, unregister,
//! clear, freeze) is reported to an [`AuditSink`], whether it succeeds or is
//! blocked. The default sink is the process-wide [`audit_log()`], an
//! append-only [`AuditLog`]. Each event is also mirrored to `tracing` under
//! the `common_ioc::audit` target.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The kind of registry mutation an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryAction {
  RegisterService,
  UnregisterService,
  ClearServices,
  FreezeServiceContainer,
}

impl RegistryAction {
  pub fn as_str(&self) -> &'static str {
    match self {
      RegistryAction::RegisterService => "register_service",
      RegistryAction::UnregisterService => "unregister_service",
      RegistryAction::ClearServices => "clear_services",
      RegistryAction::FreezeServiceContainer => "freeze_service_container",
    }
  }
}

impl fmt::Display for RegistryAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}

/// Where in user code a mutation was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
  pub file: &'static str,
  pub line: u32,
  pub column: u32,
}

impl SourceLocation {
  /// Captures the location of the caller of the enclosing `#[track_caller]`
  /// function chain.
  #[track_caller]
  pub fn caller() -> Self {
    Location::caller().into()
  }
}

impl From<&'static Location<'static>> for SourceLocation {
  fn from(location: &'static Location<'static>) -> Self {
    Self {
      file: location.file(),
      line: location.line(),
      column: location.column(),
    }
  }
}

impl fmt::Display for SourceLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}:{}", self.file, self.line, self.column)
  }
}

/// One recorded registry mutation attempt.
#[derive(Debug, Clone)]
pub struct RegistryEvent {
  pub action: RegistryAction,
  /// The service the action targeted. Empty for clear and freeze.
  pub target_name: String,
  pub location: SourceLocation,
  pub timestamp: DateTime<Utc>,
  pub success: bool,
  /// Why the action was refused, for failed attempts.
  pub reason: Option<String>,
}

impl RegistryEvent {
  pub fn succeeded(
    action: RegistryAction,
    target_name: impl Into<String>,
    location: SourceLocation,
  ) -> Self {
    Self {
      action,
      target_name: target_name.into(),
      location,
      timestamp: Utc::now(),
      success: true,
      reason: None,
    }
  }

  pub fn failed(
    action: RegistryAction,
    target_name: impl Into<String>,
    location: SourceLocation,
    reason: impl Into<String>,
  ) -> Self {
    Self {
      action,
      target_name: target_name.into(),
      location,
      timestamp: Utc::now(),
      success: false,
      reason: Some(reason.into()),
    }
  }
}

/// Accepts audit events. Implementations must be append-only.
pub trait AuditSink: Send + Sync {
  fn record(&self, event: RegistryEvent);
}

/// A thread-safe, append-only, in-memory audit log.
pub struct AuditLog {
  events: Mutex<Vec<RegistryEvent>>,
  enabled: AtomicBool,
}

impl Default for AuditLog {
  fn default() -> Self {
    Self {
      events: Mutex::new(Vec::new()),
      enabled: AtomicBool::new(true),
    }
  }
}

impl AuditLog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns a copy of every recorded event, oldest first.
  pub fn events(&self) -> Vec<RegistryEvent> {
    self.events.lock().clone()
  }

  pub fn events_by_action(&self, action: RegistryAction) -> Vec<RegistryEvent> {
    self
      .events
      .lock()
      .iter()
      .filter(|e| e.action == action)
      .cloned()
      .collect()
  }

  /// Returns the events whose timestamp falls within `[start, end]`.
  pub fn events_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<RegistryEvent> {
    self
      .events
      .lock()
      .iter()
      .filter(|e| e.timestamp >= start && e.timestamp <= end)
      .cloned()
      .collect()
  }

  pub fn event_count(&self) -> usize {
    self.events.lock().len()
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled.load(Ordering::Acquire)
  }

  /// Turns recording on or off. Disabling is itself logged as a warning.
  pub fn set_enabled(&self, enabled: bool) {
    if !enabled {
      tracing::warn!(target: "common_ioc::audit", "registry audit logging disabled");
    }
    self.enabled.store(enabled, Ordering::Release);
  }

  /// Removes all recorded events. Destroys the audit history.
  pub fn clear(&self) {
    tracing::warn!(target: "common_ioc::audit", "registry audit log cleared");
    self.events.lock().clear();
  }
}

impl AuditSink for AuditLog {
  fn record(&self, event: RegistryEvent) {
    if !self.is_enabled() {
      return;
    }

    if event.success {
      tracing::info!(
        target: "common_ioc::audit",
        action = %event.action,
        service = %event.target_name,
        location = %event.location,
        "registry mutation"
      );
    } else {
      tracing::warn!(
        target: "common_ioc::audit",
        action = %event.action,
        service = %event.target_name,
        location = %event.location,
        reason = event.reason.as_deref().unwrap_or(""),
        "registry mutation blocked"
      );
    }

    self.events.lock().push(event);
  }
}

// The process-wide audit log, shared by every container that does not bring
// its own sink.
static AUDIT_LOG: Lazy<Arc<AuditLog>> = Lazy::new(|| Arc::new(AuditLog::new()));

/// Provides the process-wide audit log.
pub fn audit_log() -> &'static Arc<AuditLog> {
  &AUDIT_LOG
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use std::thread;

  fn location() -> SourceLocation {
    SourceLocation::caller()
  }

  #[test]
  fn action_display_honours_width() {
    assert_eq!(
      format!("{:<18}|", RegistryAction::ClearServices),
      "clear_services    |"
    );
    assert_eq!(RegistryAction::RegisterService.to_string(), "register_service");
  }

  #[test]
  fn records_success_and_failure() {
    let log = AuditLog::new();
    log.record(RegistryEvent::succeeded(
      RegistryAction::RegisterService,
      "Logger",
      location(),
    ));
    log.record(RegistryEvent::failed(
      RegistryAction::UnregisterService,
      "Logger",
      location(),
      "Container is frozen",
    ));

    let events = log.events();
    assert_eq!(events.len(), 2);
    assert!(events[0].success);
    assert_eq!(events[1].reason.as_deref(), Some("Container is frozen"));
    assert!(events[1].location.file.ends_with("audit.rs"));
  }

  #[test]
  fn filters_by_action() {
    let log = AuditLog::new();
    for action in [
      RegistryAction::RegisterService,
      RegistryAction::FreezeServiceContainer,
      RegistryAction::RegisterService,
    ] {
      log.record(RegistryEvent::succeeded(action, "", location()));
    }

    assert_eq!(log.events_by_action(RegistryAction::RegisterService).len(), 2);
    assert_eq!(log.events_by_action(RegistryAction::ClearServices).len(), 0);
  }

  #[test]
  fn filters_by_time_range() {
    let log = AuditLog::new();
    let start = Utc::now();
    log.record(RegistryEvent::succeeded(RegistryAction::ClearServices, "", location()));
    let end = Utc::now();

    assert_eq!(log.events_in_range(start, end).len(), 1);
    assert!(log
      .events_in_range(end + chrono::Duration::seconds(1), end + chrono::Duration::seconds(2))
      .is_empty());
  }

  #[test]
  fn disabled_log_drops_events() {
    let log = AuditLog::new();
    log.set_enabled(false);
    log.record(RegistryEvent::succeeded(RegistryAction::RegisterService, "A", location()));
    assert_eq!(log.event_count(), 0);

    log.set_enabled(true);
    log.record(RegistryEvent::succeeded(RegistryAction::RegisterService, "A", location()));
    assert_eq!(log.event_count(), 1);
  }

  #[test]
  fn concurrent_recording_keeps_every_event() {
    let log = AuditLog::new();
    thread::scope(|s| {
      for _ in 0..8 {
        s.spawn(|| {
          for _ in 0..50 {
            log.record(RegistryEvent::succeeded(
              RegistryAction::RegisterService,
              "Worker",
              SourceLocation::caller(),
            ));
          }
        });
      }
    });
    assert_eq!(log.event_count(), 400);
  }

  #[test]
  fn action_names() {
    assert_eq!(RegistryAction::RegisterService.to_string(), "register_service");
    assert_eq!(
      RegistryAction::FreezeServiceContainer.to_string(),
      "freeze_service_container"
    );
  }
}
