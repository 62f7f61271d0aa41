//! Configuration loading for the inventory CLI.

use anyhow::{Context, Result};
use inv_core::ingest::DEFAULT_IMPORT_ACTOR;
use inv_core::LedgerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provenance ledger settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Import settings.
    #[serde(default)]
    pub import: ImportConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LogSettings,
}

impl AppConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Saves configuration to a YAML file.
    #[allow(dead_code)]
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Returns warnings about settings that have no effect or are invalid.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.ledger.chained && !self.ledger.enabled {
            warnings.push("ledger.chained is set but the ledger is disabled".to_string());
        }
        if self.import.track_changes && !self.ledger.enabled {
            warnings.push(
                "import.track_changes is set but the ledger is disabled; no changes will be recorded"
                    .to_string(),
            );
        }
        if self.import.actor.trim().is_empty() {
            warnings.push("import.actor is empty".to_string());
        }
        if self.import.timeout_secs == Some(0) {
            warnings.push("import.timeout_secs is 0; every import will time out".to_string());
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            warnings.push(format!(
                "logging.level '{}' is not a valid level; using info",
                self.logging.level
            ));
        }

        warnings
    }
}

/// Import settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Actor recorded on change records created by imports.
    #[serde(default = "default_actor")]
    pub actor: String,

    /// Whether imports record a change per stored resource.
    #[serde(default)]
    pub track_changes: bool,

    /// Import deadline in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_actor() -> String {
    DEFAULT_IMPORT_ACTOR.to_string()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            actor: default_actor(),
            track_changes: false,
            timeout_secs: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON log lines.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LogSettings {
    /// Parsed log level, falling back to info.
    pub fn level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
ledger:
  enabled: true
  chained: true
import:
  actor: nightly-sync
  track_changes: true
  timeout_secs: 120
logging:
  level: debug
  json: true
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert!(config.ledger.enabled);
        assert!(config.ledger.chained);
        assert_eq!(config.import.actor, "nightly-sync");
        assert!(config.import.track_changes);
        assert_eq!(config.import.timeout_secs, Some(120));
        assert_eq!(config.logging.level(), tracing::Level::DEBUG);
        assert!(config.logging.json);
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "ledger:\n  enabled: true\n").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert!(config.ledger.enabled);
        assert!(!config.ledger.chained);
        assert_eq!(config.import, ImportConfig::default());
        assert_eq!(config.import.actor, DEFAULT_IMPORT_ACTOR);
        assert_eq!(config.logging.level(), tracing::Level::INFO);
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::load(Path::new("/nonexistent/inventory.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "ledger: [not, a, map]").unwrap();

        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_save_and_reload() {
        let file = NamedTempFile::new().unwrap();
        let mut config = AppConfig::default();
        config.ledger = LedgerConfig::enabled();
        config.import.timeout_secs = Some(30);

        config.save(file.path()).unwrap();
        let reloaded = AppConfig::load(file.path()).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_warnings() {
        let mut config = AppConfig::default();
        config.ledger.chained = true;
        config.import.track_changes = true;
        config.import.timeout_secs = Some(0);
        config.logging.level = "loud".to_string();

        let warnings = config.warnings();
        assert_eq!(warnings.len(), 4);
        assert_eq!(config.logging.level(), tracing::Level::INFO);
    }
}
