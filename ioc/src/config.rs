//! Container configuration, loadable from YAML.
//!
//! ```yaml
//! name: app
//! frozen_clear: reject   # or: ignore
//! audit:
//!   enabled: true
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// What `clear()` does once a container is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrozenClearPolicy {
  /// Fail with `Frozen`, like every other mutator.
  #[default]
  Reject,
  /// Leave the bindings untouched and report success.
  Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
  /// Report registry mutations to the container's audit sink.
  #[serde(default = "default_true")]
  pub enabled: bool,
}

impl Default for AuditConfig {
  fn default() -> Self {
    Self { enabled: true }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerConfig {
  /// Label attached to this container's log records.
  #[serde(default = "default_name")]
  pub name: String,
  #[serde(default)]
  pub frozen_clear: FrozenClearPolicy,
  #[serde(default)]
  pub audit: AuditConfig,
}

fn default_name() -> String {
  "root".to_string()
}

fn default_true() -> bool {
  true
}

impl Default for ContainerConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      frozen_clear: FrozenClearPolicy::default(),
      audit: AuditConfig::default(),
    }
  }
}

impl ContainerConfig {
  pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
    serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
  }

  pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Self::from_yaml_str(&contents)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use std::io::Write;

  #[test]
  fn empty_document_uses_defaults() {
    let config = ContainerConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, ContainerConfig::default());
    assert_eq!(config.frozen_clear, FrozenClearPolicy::Reject);
    assert!(config.audit.enabled);
  }

  #[test]
  fn parses_all_fields() {
    let yaml = r#"
name: billing
frozen_clear: ignore
audit:
  enabled: false
"#;
    let config = ContainerConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(
      config,
      ContainerConfig {
        name: "billing".to_string(),
        frozen_clear: FrozenClearPolicy::Ignore,
        audit: AuditConfig { enabled: false },
      }
    );
  }

  #[test]
  fn rejects_unknown_fields() {
    let err = ContainerConfig::from_yaml_str("nmae: typo").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
  }

  #[test]
  fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name: from_file").unwrap();
    let config = ContainerConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.name, "from_file");
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let err = ContainerConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::Read(_)));
  }
}
