//! Checker configuration: enablement and severity overrides.
//!
//! Every checker runs at its default severity unless overridden:
//!
//! ```yaml
//! checkers:
//!   empty_nodes: off
//!   page_grouping: warning
//! ```

use crate::error::ConfigError;
use crate::registry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use taglint_fixes::Severity;

/// Configured severity for one checker. `Off` disables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckerSeverity {
    Off,
    Info,
    Warning,
    Error,
}

/// Overall checker configuration. The default runs every registered
/// checker at its built-in severity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub checkers: HashMap<String, CheckerSeverity>,
}

impl CheckConfig {
    /// The recommended configuration: every registered checker enabled at
    /// its built-in severity.
    #[must_use]
    pub fn recommended() -> Self {
        Self::default()
    }

    /// Validate configured checker names against the registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = registry::all_checker_ids();
        let unknown: Vec<&str> = self
            .checkers
            .keys()
            .map(String::as_str)
            .filter(|name| !valid.contains(name))
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }
        Err(ConfigError::UnknownCheckers {
            names: unknown.join(", "),
            valid: valid
                .iter()
                .map(|name| format!("  - {name}"))
                .collect::<Vec<_>>()
                .join("\n"),
        })
    }

    /// True unless the checker is explicitly turned off.
    #[must_use]
    pub fn is_enabled(&self, checker: &str) -> bool {
        !matches!(self.checkers.get(checker), Some(CheckerSeverity::Off))
    }

    /// Configured severity for a checker's issues, if overridden.
    #[must_use]
    pub fn severity_override(&self, checker: &str) -> Option<Severity> {
        match self.checkers.get(checker)? {
            CheckerSeverity::Off => None,
            CheckerSeverity::Info => Some(Severity::Info),
            CheckerSeverity::Warning => Some(Severity::Warning),
            CheckerSeverity::Error => Some(Severity::Error),
        }
    }

    /// Disable one checker.
    #[must_use]
    pub fn without(mut self, checker: impl Into<String>) -> Self {
        self.checkers.insert(checker.into(), CheckerSeverity::Off);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers;

    #[test]
    fn default_enables_all_checkers() {
        let config = CheckConfig::default();
        for id in registry::all_checker_ids() {
            assert!(config.is_enabled(id), "{id} should default to enabled");
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn off_disables_a_checker() {
        let config = CheckConfig::default().without(checkers::EMPTY_NODES);
        assert!(!config.is_enabled(checkers::EMPTY_NODES));
        assert!(config.is_enabled(checkers::SCHEMA_VALIDATION));
    }

    #[test]
    fn yaml_config_round_trip() {
        let yaml = r"
checkers:
  empty_nodes: off
  page_grouping: warning
";
        let config: CheckConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.is_enabled(checkers::EMPTY_NODES));
        assert_eq!(
            config.severity_override(checkers::PAGE_GROUPING),
            Some(Severity::Warning)
        );
        assert_eq!(config.severity_override(checkers::SCHEMA_VALIDATION), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_config_is_accepted_too() {
        let json = r#"{ "checkers": { "role_map": "error" } }"#;
        let config: CheckConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.severity_override(checkers::ROLE_MAP),
            Some(Severity::Error)
        );
    }

    #[test]
    fn unknown_checker_name_is_rejected() {
        let yaml = r"
checkers:
  not_a_checker: warning
";
        let config: CheckConfig = serde_yaml::from_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("not_a_checker"));
        assert!(message.contains(checkers::SCHEMA_VALIDATION));
    }
}
