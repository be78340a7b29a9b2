//! Configuration system
//!
//! Provides centralized configuration management with:
//! - Config file loading (optional)
//! - Environment variable overrides
//! - Runtime defaults
//! - Validation
//!
//! Command-line flags are applied on top of the loaded value by `main`.

use crate::duration::{Thresholds, DEFAULT_ERROR_MINUTES, DEFAULT_WARNING_MINUTES};
use crate::reconciler::{DuplicatePolicy, ReportMode};
use crate::report::ColorChoice;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Latency thresholds
    pub thresholds: ThresholdsConfig,

    /// Report output configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub warning_minutes: u32,
    pub error_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub mode: ReportMode,
    pub duplicates: DuplicatePolicy,
    pub color: ColorChoice,
    pub json: bool,
    pub line_numbers: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
            directory: PathBuf::from("logs"),
        }
    }
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            warning_minutes: DEFAULT_WARNING_MINUTES,
            error_minutes: DEFAULT_ERROR_MINUTES,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            mode: ReportMode::Final,
            duplicates: DuplicatePolicy::Overwrite,
            color: ColorChoice::Auto,
            json: false,
            line_numbers: true,
        }
    }
}

impl ThresholdsConfig {
    pub fn to_thresholds(&self) -> Thresholds {
        Thresholds::new(self.warning_minutes, self.error_minutes)
    }
}

impl Config {
    /// Load configuration from file, environment, and defaults
    ///
    /// An explicit path must exist; otherwise the first of the default
    /// locations that exists is used. The result is not validated, so that
    /// command-line overrides can still be applied; call [`Config::validate`]
    /// once they are.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                info!(config_file = %path.display(), "Loading configuration from file");
                Self::load_from_file(path)?
            }
            None => match Self::default_paths().into_iter().find(|p| p.exists()) {
                Some(path) => {
                    info!(config_file = %path.display(), "Loading configuration from file");
                    Self::load_from_file(&path)?
                }
                None => Config::default(),
            },
        };

        config.apply_env_overrides()?;

        Ok(config)
    }

    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("joblog.toml"), PathBuf::from(".joblog.toml")];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("joblog").join("config.toml"));
        }
        paths
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }
        if let Ok(val) = env::var("JOBLOG_LOG_DIR") {
            self.logging.directory = PathBuf::from(val);
        }

        // Threshold overrides
        if let Ok(val) = env::var("JOBLOG_WARNING_MINUTES") {
            self.thresholds.warning_minutes =
                val.parse().context("Invalid JOBLOG_WARNING_MINUTES")?;
        }
        if let Ok(val) = env::var("JOBLOG_ERROR_MINUTES") {
            self.thresholds.error_minutes = val.parse().context("Invalid JOBLOG_ERROR_MINUTES")?;
        }

        // Report overrides
        if let Ok(val) = env::var("JOBLOG_REPORT_MODE") {
            self.report.mode = parse_value_enum(&val).context("Invalid JOBLOG_REPORT_MODE")?;
        }
        if let Ok(val) = env::var("JOBLOG_DUPLICATES") {
            self.report.duplicates =
                parse_value_enum(&val).context("Invalid JOBLOG_DUPLICATES")?;
        }
        if let Ok(val) = env::var("JOBLOG_COLOR") {
            self.report.color = parse_value_enum(&val).context("Invalid JOBLOG_COLOR")?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.thresholds.warning_minutes == 0 {
            return Err(anyhow::anyhow!("Warning threshold must be greater than 0"));
        }

        if self.thresholds.warning_minutes >= self.thresholds.error_minutes {
            return Err(anyhow::anyhow!(
                "Warning threshold ({} minutes) must be below error threshold ({} minutes)",
                self.thresholds.warning_minutes,
                self.thresholds.error_minutes
            ));
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => return Err(anyhow::anyhow!("Unknown log format: {}", other)),
        }

        match self.logging.output.as_str() {
            "console" => {}
            "file" | "both" => {
                if !self.logging.directory.exists() {
                    fs::create_dir_all(&self.logging.directory)
                        .context("Failed to create log directory")?;
                }
            }
            other => return Err(anyhow::anyhow!("Unknown log output: {}", other)),
        }

        Ok(())
    }
}

fn parse_value_enum<T: clap::ValueEnum>(value: &str) -> Result<T> {
    T::from_str(value, true).map_err(|e| anyhow::anyhow!(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.thresholds.warning_minutes, 5);
        assert_eq!(config.thresholds.error_minutes, 10);
        assert_eq!(config.report.mode, ReportMode::Final);
        assert!(config.report.line_numbers);
    }

    #[test]
    fn test_env_override() {
        env::set_var("JOBLOG_REPORT_MODE", "incremental");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.report.mode, ReportMode::Incremental);
        env::remove_var("JOBLOG_REPORT_MODE");
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.thresholds.warning_minutes = 10;
        assert!(config.validate().is_err());

        config = Config::default();
        config.thresholds.warning_minutes = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.logging.output = "syslog".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [thresholds]
            error_minutes = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.thresholds.error_minutes, 30);
        assert_eq!(config.thresholds.warning_minutes, 5);
        assert_eq!(config.report, ReportConfig::default());
    }
}
