//! Host configuration loaded from TOML
//!
//! ```toml
//! log_level = "info"
//!
//! [pms5003]
//! serial_port = "/dev/ttyAMA0"
//! gpio_chip = "/dev/gpiochip0"
//! reset_pin = 27
//! enable_pin = 22
//! settle_ms = 100
//! read_timeout_ms = 5000
//! ```
//!
//! Every key is optional; missing keys take the Enviro+ wiring defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use enviro_core::config::{ConfigError as AcquisitionConfigError, Pms5003Config};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Serial device the PMS5003 is wired to on an Enviro+
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyAMA0";

/// GPIO chip carrying the header pins
pub const DEFAULT_GPIO_CHIP: &str = "/dev/gpiochip0";

/// BCM GPIO27
pub const DEFAULT_RESET_PIN: u32 = 27;

/// BCM GPIO22
pub const DEFAULT_ENABLE_PIN: u32 = 22;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("[pms5003] {0}")]
    Acquisition(AcquisitionConfigError),

    #[error("[pms5003] {0} must not be empty")]
    Empty(&'static str),

    #[error("[pms5003] reset_pin and enable_pin are both {0}")]
    SharedPin(u32),

    #[error("log_level {level:?}: {reason}")]
    LogLevel { level: String, reason: String },
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// `tracing` filter directive, e.g. `info` or `enviro_host=debug`
    pub log_level: String,
    pub pms5003: SensorConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
            pms5003: SensorConfig::default(),
        }
    }
}

/// Where the PMS5003 is wired and how to drive it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub serial_port: String,
    pub gpio_chip: String,
    /// Line offset on `gpio_chip`
    pub reset_pin: u32,
    /// Line offset on `gpio_chip`
    pub enable_pin: u32,
    #[serde(flatten)]
    pub acquisition: Pms5003Config,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            serial_port: String::from(DEFAULT_SERIAL_PORT),
            gpio_chip: String::from(DEFAULT_GPIO_CHIP),
            reset_pin: DEFAULT_RESET_PIN,
            enable_pin: DEFAULT_ENABLE_PIN,
            acquisition: Pms5003Config::default(),
        }
    }
}

impl SensorConfig {
    /// Check the sensor section, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serial_port.trim().is_empty() {
            return Err(ConfigError::Empty("serial_port"));
        }
        if self.gpio_chip.trim().is_empty() {
            return Err(ConfigError::Empty("gpio_chip"));
        }
        if self.reset_pin == self.enable_pin {
            return Err(ConfigError::SharedPin(self.reset_pin));
        }
        self.acquisition
            .validate()
            .map_err(ConfigError::Acquisition)
    }
}

impl HostConfig {
    /// Read and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: HostConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.env_filter()?;
        self.pms5003.validate()
    }

    /// Log filter built from `log_level`
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        EnvFilter::try_new(&self.log_level).map_err(|e| ConfigError::LogLevel {
            level: self.log_level.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = HostConfig::from_toml_str("").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.pms5003.serial_port, "/dev/ttyAMA0");
        assert_eq!(config.pms5003.reset_pin, 27);
        assert_eq!(config.pms5003.enable_pin, 22);
        assert_eq!(config.pms5003.acquisition.settle_ms, 100);
        assert_eq!(config.pms5003.acquisition.read_timeout_ms, None);
    }

    #[test]
    fn test_full_file() {
        let config = HostConfig::from_toml_str(
            r#"
            log_level = "enviro_host=debug"

            [pms5003]
            serial_port = "/dev/ttyS0"
            gpio_chip = "/dev/gpiochip4"
            reset_pin = 5
            enable_pin = 6
            settle_ms = 250
            read_timeout_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "enviro_host=debug");
        assert_eq!(config.pms5003.serial_port, "/dev/ttyS0");
        assert_eq!(config.pms5003.gpio_chip, "/dev/gpiochip4");
        assert_eq!(config.pms5003.reset_pin, 5);
        assert_eq!(config.pms5003.enable_pin, 6);
        assert_eq!(config.pms5003.acquisition.settle_ms, 250);
        assert_eq!(config.pms5003.acquisition.read_timeout_ms, Some(5000));
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = HostConfig::from_toml_str("[pms5003]\nsettle_ms = 50\n").unwrap();
        assert_eq!(config.pms5003.acquisition.settle_ms, 50);
        assert_eq!(config.pms5003.serial_port, DEFAULT_SERIAL_PORT);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_zero_settle_rejected() {
        let err = HostConfig::from_toml_str("[pms5003]\nsettle_ms = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Acquisition(AcquisitionConfigError::SettleTooShort)
        ));
    }

    #[test]
    fn test_short_timeout_rejected() {
        let err = HostConfig::from_toml_str("[pms5003]\nread_timeout_ms = 500\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Acquisition(AcquisitionConfigError::TimeoutTooShort { timeout_ms: 500 })
        ));
    }

    #[test]
    fn test_shared_pin_rejected() {
        let err =
            HostConfig::from_toml_str("[pms5003]\nreset_pin = 4\nenable_pin = 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::SharedPin(4)));
    }

    #[test]
    fn test_empty_port_rejected() {
        let err = HostConfig::from_toml_str("[pms5003]\nserial_port = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Empty("serial_port")));
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let err = HostConfig::from_toml_str("log_level = \"enviro=loud\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::LogLevel { .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let err = HostConfig::from_toml_str("[pms5003\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_wrong_type() {
        let err = HostConfig::from_toml_str("[pms5003]\nreset_pin = \"GPIO27\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = HostConfig::load("/nonexistent/enviro.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
