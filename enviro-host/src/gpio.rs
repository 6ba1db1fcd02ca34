//! Output lines through the GPIO character device

use embedded_hal::digital::{self, ErrorType, OutputPin};
use gpio_cdev::{Chip, LineHandle, LineRequestFlags};
use thiserror::Error;

/// Consumer label shown by `gpioinfo` for lines we hold
const CONSUMER: &str = "enviro";

/// Failure to drive a requested line
#[derive(Debug, Error)]
#[error("gpio line write failed: {0}")]
pub struct PinError(#[source] gpio_cdev::Error);

impl digital::Error for PinError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

/// One output line held for the life of the value
///
/// The kernel releases the line when the handle is dropped.
pub struct CdevLine {
    handle: LineHandle,
    offset: u32,
}

impl CdevLine {
    /// Request `offset` on `chip` as an output, driven high
    pub fn request(chip: &mut Chip, offset: u32) -> Result<Self, gpio_cdev::Error> {
        let handle = chip
            .get_line(offset)?
            .request(LineRequestFlags::OUTPUT, 1, CONSUMER)?;
        Ok(Self { handle, offset })
    }

    /// Line offset on its chip
    pub fn offset(&self) -> u32 {
        self.offset
    }
}

impl ErrorType for CdevLine {
    type Error = PinError;
}

impl OutputPin for CdevLine {
    fn set_low(&mut self) -> Result<(), PinError> {
        self.handle.set_value(0).map_err(PinError)
    }

    fn set_high(&mut self) -> Result<(), PinError> {
        self.handle.set_value(1).map_err(PinError)
    }
}
