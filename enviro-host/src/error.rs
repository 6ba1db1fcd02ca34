//! Host runtime errors

use std::io;

use enviro_drivers::particulate::AcquisitionError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::gpio::PinError;
use crate::serial::SerialError;

/// Driver error as seen by the host runtime
pub type SessionError = AcquisitionError<SerialError, PinError>;

/// Errors from opening or running a sensor session
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot open serial port {port}: {source}")]
    SerialOpen {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("cannot open gpio chip {chip}: {source}")]
    GpioChip {
        chip: String,
        #[source]
        source: gpio_cdev::Error,
    },

    #[error("cannot request {line} line {offset} on {chip}: {source}")]
    Gpio {
        chip: String,
        line: &'static str,
        offset: u32,
        #[source]
        source: gpio_cdev::Error,
    },

    /// The driver refused to start or stopped with an error
    #[error("acquisition failed: {0}")]
    Session(SessionError),

    #[error("cannot spawn acquisition thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("acquisition thread panicked")]
    WorkerPanicked,
}

impl From<SessionError> for HostError {
    fn from(e: SessionError) -> Self {
        HostError::Session(e)
    }
}
