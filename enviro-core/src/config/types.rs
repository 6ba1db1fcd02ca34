//! Configuration type definitions

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default time the reset line is held low
pub const DEFAULT_SETTLE_MS: u32 = 100;

/// Longest accepted reset hold time
pub const MAX_SETTLE_MS: u32 = 5_000;

/// Shortest accepted read deadline
///
/// The sensor may pause up to 2.3 s between frames once readings are
/// stable, so anything shorter would reset a healthy sensor.
pub const MIN_READ_TIMEOUT_MS: u32 = 3_000;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Reset hold time is zero
    SettleTooShort,
    /// Reset hold time exceeds [`MAX_SETTLE_MS`]
    SettleTooLong { settle_ms: u32 },
    /// Read deadline is below [`MIN_READ_TIMEOUT_MS`]
    TimeoutTooShort { timeout_ms: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SettleTooShort => f.write_str("settle_ms must be at least 1"),
            ConfigError::SettleTooLong { settle_ms } => write!(
                f,
                "settle_ms {} exceeds the maximum of {}",
                settle_ms, MAX_SETTLE_MS
            ),
            ConfigError::TimeoutTooShort { timeout_ms } => write!(
                f,
                "read_timeout_ms {} is below the minimum of {}",
                timeout_ms, MIN_READ_TIMEOUT_MS
            ),
        }
    }
}

/// PMS5003 acquisition settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Pms5003Config {
    /// How long the reset line is held low (ms)
    pub settle_ms: u32,
    /// Serial read deadline (ms); `None` blocks forever on a silent line
    pub read_timeout_ms: Option<u32>,
}

impl Default for Pms5003Config {
    fn default() -> Self {
        Self {
            settle_ms: DEFAULT_SETTLE_MS,
            read_timeout_ms: None,
        }
    }
}

impl Pms5003Config {
    /// Check the settings, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settle_ms == 0 {
            return Err(ConfigError::SettleTooShort);
        }
        if self.settle_ms > MAX_SETTLE_MS {
            return Err(ConfigError::SettleTooLong {
                settle_ms: self.settle_ms,
            });
        }
        if let Some(timeout_ms) = self.read_timeout_ms {
            if timeout_ms < MIN_READ_TIMEOUT_MS {
                return Err(ConfigError::TimeoutTooShort { timeout_ms });
            }
        }
        Ok(())
    }

    /// Return a validated copy
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate().map(|()| self)
    }
}
