//! Configuration management for crawl-export
//!
//! This module handles loading and validating configuration from:
//! - A configuration file (TOML format)
//! - Command-line arguments (applied by the `cli` module)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::connection::OpenRequest;
use crate::error::{ConfigError, Result};
use crate::record::Projection;

/// Scroll cursor time-to-live requested on open and on every advance
pub const SCROLL_TTL: Duration = Duration::from_secs(30);

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Export configuration
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cluster connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Cluster host name
    #[serde(default = "default_host")]
    pub host: String,

    /// Cluster HTTP port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Number of hits requested per scroll page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Document type searched within the index
    #[serde(default = "default_record_type")]
    pub record_type: String,

    /// Output format (tsv, jsonl)
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format options
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `url<TAB>publishDate` line per record
    #[default]
    Tsv,

    /// One JSON object per line
    Jsonl,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_page_size() -> u32 {
    1000
}

fn default_record_type() -> String {
    "article".to_string()
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            record_type: default_record_type(),
            format: OutputFormat::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Explicit config path, or `None` for the default location
    ///
    /// An explicit path must exist. The default location is optional and
    /// falls back to built-in defaults when absent.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(ConfigError::FileNotFound(explicit.display().to_string()).into());
                }
                explicit.to_path_buf()
            }
            None => {
                let default = Self::default_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".crawl-export")
            .join("config.toml")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.connection.host.trim().is_empty() {
            return Err(ConfigError::MissingField("connection.host".to_string()).into());
        }
        if self.export.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "export.page_size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.export.record_type.trim().is_empty() {
            return Err(ConfigError::MissingField("export.record_type".to_string()).into());
        }
        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Everything one export run needs, resolved from config and arguments
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub host: String,
    pub port: u16,
    pub index: String,
    pub record_type: String,
    pub page_size: u32,
    pub projection: Projection,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub progress: bool,
}

impl ExportSettings {
    /// Request that opens the scroll for these settings
    pub fn open_request(&self) -> OpenRequest {
        OpenRequest {
            index: self.index.clone(),
            record_type: self.record_type.clone(),
            page_size: self.page_size,
            projection: self.projection.clone(),
            ttl: SCROLL_TTL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.connection.host, "localhost");
        assert_eq!(config.connection.port, 9200);
        assert_eq!(config.export.page_size, 1000);
        assert_eq!(config.export.record_type, "article");
        assert_eq!(config.export.format, OutputFormat::Tsv);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [connection]
            host = "es.internal"

            [export]
            format = "jsonl"
            "#,
        )
        .unwrap();
        assert_eq!(config.connection.host, "es.internal");
        assert_eq!(config.connection.port, 9200);
        assert_eq!(config.export.format, OutputFormat::Jsonl);
        assert_eq!(config.export.page_size, 1000);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[export]\npage_size = \"many\"").unwrap_err();
        assert!(matches!(err, ExportError::Config(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load_from_file(Some(Path::new("/nonexistent/crawl-export.toml")))
            .unwrap_err();
        assert!(matches!(err, ExportError::Config(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let path = std::env::temp_dir().join("crawl_export_config_test.toml");
        std::fs::write(&path, "[export]\npage_size = 250\n").unwrap();

        let config = Config::load_from_file(Some(&path)).unwrap();
        assert_eq!(config.export.page_size, 250);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.export.page_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ExportError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_open_request_uses_fixed_ttl() {
        let settings = ExportSettings {
            host: "localhost".to_string(),
            port: 9200,
            index: "crawl".to_string(),
            record_type: "article".to_string(),
            page_size: 50,
            projection: Projection::default(),
            format: OutputFormat::Tsv,
            output: None,
            progress: false,
        };
        let request = settings.open_request();
        assert_eq!(request.ttl, Duration::from_secs(30));
        assert_eq!(request.page_size, 50);
        assert_eq!(request.index, "crawl");
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
    }
}
