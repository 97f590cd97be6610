//! Service configuration.
//!
//! Deployment profiles (slow/fast tick, rolling or daily retention) are
//! expressed as independent settings rather than separate builds:
//! `capture.interval_secs` and `storage.retention` can be combined freely.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use hygrolog_store::RetentionPolicy;

/// Service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Serial device settings.
    pub serial: SerialConfig,
    /// Capture loop settings.
    pub capture: CaptureConfig,
    /// Storage settings.
    pub storage: StorageConfig,
    /// Git sync settings.
    pub sync: SyncConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Server bind address is valid (host:port format)
    /// - Serial port name is not empty and baud rate is non-zero
    /// - Capture interval is within reasonable bounds (10s - 1 day)
    /// - Storage caps are non-zero
    /// - Sync, when enabled, names a repository directory
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.serial.validate());
        errors.extend(self.capture.validate());
        errors.extend(self.storage.validate());
        errors.extend(self.sync.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:5001").
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5001".to_string(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: "bind address cannot be empty".to_string(),
            });
            return errors;
        }

        let parts: Vec<&str> = self.bind.rsplitn(2, ':').collect();
        if parts.len() != 2 {
            errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: format!(
                    "invalid bind address '{}': expected format 'host:port'",
                    self.bind
                ),
            });
        } else {
            match parts[0].parse::<u16>() {
                Ok(0) => errors.push(ValidationError {
                    field: "server.bind".to_string(),
                    message: "port cannot be 0".to_string(),
                }),
                Err(_) => errors.push(ValidationError {
                    field: "server.bind".to_string(),
                    message: format!("invalid port '{}': must be a number 1-65535", parts[0]),
                }),
                Ok(_) => {}
            }
        }

        errors
    }
}

/// Serial device configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial port name (e.g., "/dev/ttyUSB0").
    pub port: String,
    /// Baud rate.
    pub baud: u32,
    /// Per-line read timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud: 9600,
            read_timeout_secs: 2,
        }
    }
}

impl SerialConfig {
    /// The read timeout as a [`Duration`].
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Validate serial configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.port.is_empty() {
            errors.push(ValidationError {
                field: "serial.port".to_string(),
                message: "serial port cannot be empty".to_string(),
            });
        }
        if self.baud == 0 {
            errors.push(ValidationError {
                field: "serial.baud".to_string(),
                message: "baud rate cannot be 0".to_string(),
            });
        }
        if self.read_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "serial.read_timeout_secs".to_string(),
                message: "read timeout cannot be 0".to_string(),
            });
        }

        errors
    }
}

/// Minimum capture interval in seconds.
pub const MIN_CAPTURE_INTERVAL: u64 = 10;
/// Maximum capture interval in seconds (1 day).
pub const MAX_CAPTURE_INTERVAL: u64 = 86_400;

/// Capture loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Seconds between capture ticks (1800 for the half-hourly profile,
    /// 60 for the fast profile).
    pub interval_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1800,
        }
    }
}

impl CaptureConfig {
    /// The tick interval as a [`Duration`].
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate capture configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.interval_secs < MIN_CAPTURE_INTERVAL {
            errors.push(ValidationError {
                field: "capture.interval_secs".to_string(),
                message: format!(
                    "capture interval {} is too short (minimum {} seconds)",
                    self.interval_secs, MIN_CAPTURE_INTERVAL
                ),
            });
        } else if self.interval_secs > MAX_CAPTURE_INTERVAL {
            errors.push(ValidationError {
                field: "capture.interval_secs".to_string(),
                message: format!(
                    "capture interval {} is too long (maximum {} seconds / 1 day)",
                    self.interval_secs, MAX_CAPTURE_INTERVAL
                ),
            });
        }

        errors
    }
}

/// History retention variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Retention {
    /// Rolling window of the most recent readings.
    Rolling,
    /// Rotate each finished day into a statistics record.
    Daily,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the data files.
    pub data_dir: PathBuf,
    /// Retention policy for the history file.
    pub retention: Retention,
    /// Rolling history cap (used by the rolling policy).
    pub history_cap: usize,
    /// Daily statistics cap (used by the daily policy).
    pub stats_cap: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: hygrolog_store::default_data_dir(),
            retention: Retention::Rolling,
            history_cap: hygrolog_store::DEFAULT_HISTORY_CAP,
            stats_cap: hygrolog_store::DEFAULT_STATS_CAP,
        }
    }
}

impl StorageConfig {
    /// The configured [`RetentionPolicy`].
    #[must_use]
    pub fn policy(&self) -> RetentionPolicy {
        match self.retention {
            Retention::Rolling => RetentionPolicy::RollingWindow {
                cap: self.history_cap,
            },
            Retention::Daily => RetentionPolicy::DailyRotate {
                stats_cap: self.stats_cap,
            },
        }
    }

    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.data_dir.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.data_dir".to_string(),
                message: "data directory cannot be empty".to_string(),
            });
        }
        if self.history_cap == 0 {
            errors.push(ValidationError {
                field: "storage.history_cap".to_string(),
                message: "history cap cannot be 0".to_string(),
            });
        }
        if self.stats_cap == 0 {
            errors.push(ValidationError {
                field: "storage.stats_cap".to_string(),
                message: "stats cap cannot be 0".to_string(),
            });
        }

        errors
    }
}

/// Git sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Whether to commit and push the data files after persistence.
    pub enabled: bool,
    /// The git repository containing the data directory.
    pub repo_dir: Option<PathBuf>,
    /// Remote to push to.
    pub remote: String,
    /// Branch to push.
    pub branch: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            repo_dir: None,
            remote: "origin".to_string(),
            branch: "main".to_string(),
        }
    }
}

impl SyncConfig {
    /// Validate sync configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.enabled && self.repo_dir.is_none() {
            errors.push(ValidationError {
                field: "sync.repo_dir".to_string(),
                message: "sync is enabled but no repository directory is set".to_string(),
            });
        }
        if self.enabled && self.remote.is_empty() {
            errors.push(ValidationError {
                field: "sync.remote".to_string(),
                message: "remote cannot be empty".to_string(),
            });
        }
        if self.enabled && self.branch.is_empty() {
            errors.push(ValidationError {
                field: "sync.branch".to_string(),
                message: "branch cannot be empty".to_string(),
            });
        }

        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `server.bind`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hygrolog")
        .join("service.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:5001");
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud, 9600);
        assert_eq!(config.capture.interval_secs, 1800);
        assert_eq!(config.storage.retention, Retention::Rolling);
        assert!(!config.sync.enabled);
    }

    #[test]
    fn test_default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retention_policy_mapping() {
        let mut storage = StorageConfig::default();
        assert_eq!(
            storage.policy(),
            RetentionPolicy::RollingWindow { cap: 1000 }
        );

        storage.retention = Retention::Daily;
        storage.stats_cap = 100;
        assert_eq!(
            storage.policy(),
            RetentionPolicy::DailyRotate { stats_cap: 100 }
        );
    }

    #[test]
    fn test_config_full_toml() {
        let toml = r#"
            [server]
            bind = "0.0.0.0:5001"

            [serial]
            port = "/dev/ttyACM0"
            baud = 115200
            read_timeout_secs = 1

            [capture]
            interval_secs = 60

            [storage]
            data_dir = "/home/pi/web-server/docs"
            retention = "daily"
            stats_cap = 365

            [sync]
            enabled = true
            repo_dir = "/home/pi/web-server"
            remote = "origin"
            branch = "main"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:5001");
        assert_eq!(config.serial.port, "/dev/ttyACM0");
        assert_eq!(config.serial.baud, 115200);
        assert_eq!(config.capture.interval_secs, 60);
        assert_eq!(config.storage.retention, Retention::Daily);
        assert!(config.sync.enabled);
        assert_eq!(
            config.sync.repo_dir,
            Some(PathBuf::from("/home/pi/web-server"))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("service.toml");

        let mut config = Config::default();
        config.server.bind = "0.0.0.0:9090".to_string();
        config.capture.interval_secs = 60;

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();

        assert_eq!(loaded.server.bind, "0.0.0.0:9090");
        assert_eq!(loaded.capture.interval_secs, 60);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "this is not valid { toml").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_server_bind_validation() {
        let valid = ServerConfig {
            bind: "127.0.0.1:5001".to_string(),
        };
        assert!(valid.validate().is_empty());

        let empty = ServerConfig {
            bind: String::new(),
        };
        let errors = empty.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("cannot be empty"));

        let no_port = ServerConfig {
            bind: "127.0.0.1".to_string(),
        };
        let errors = no_port.validate();
        assert!(errors[0].message.contains("host:port"));

        let port_zero = ServerConfig {
            bind: "127.0.0.1:0".to_string(),
        };
        let errors = port_zero.validate();
        assert!(errors[0].message.contains("cannot be 0"));

        let bad_port = ServerConfig {
            bind: "127.0.0.1:abc".to_string(),
        };
        let errors = bad_port.validate();
        assert!(errors[0].message.contains("must be a number"));
    }

    #[test]
    fn test_capture_interval_validation() {
        let too_short = CaptureConfig { interval_secs: 5 };
        let errors = too_short.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("too short"));

        let too_long = CaptureConfig {
            interval_secs: 100_000,
        };
        let errors = too_long.validate();
        assert!(errors[0].message.contains("too long"));

        let fast_profile = CaptureConfig { interval_secs: 60 };
        assert!(fast_profile.validate().is_empty());
    }

    #[test]
    fn test_sync_validation_requires_repo_dir() {
        let sync = SyncConfig {
            enabled: true,
            ..SyncConfig::default()
        };
        let errors = sync.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("repo_dir"));

        let disabled = SyncConfig::default();
        assert!(disabled.validate().is_empty());
    }

    #[test]
    fn test_storage_validation() {
        let mut storage = StorageConfig::default();
        storage.history_cap = 0;
        let errors = storage.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.contains("history_cap"));
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError {
            field: "server.bind".to_string(),
            message: "invalid port".to_string(),
        };
        assert_eq!(format!("{}", error), "server.bind: invalid port");
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("hygrolog/service.toml"));
    }
}
