//! PMS5003 control lines
//!
//! The module has two digital inputs: SET (enable, high = running, low =
//! sleep) and RESET (active low).

use embedded_hal::digital::OutputPin;

/// Enable and reset lines of one sensor module
pub struct ResetLines<P> {
    enable: P,
    reset: P,
    in_reset: bool,
}

impl<P: OutputPin> ResetLines<P> {
    /// Take ownership of the lines and bring the module up
    ///
    /// Drives enable high (running) and reset high (not in reset).
    pub fn new(mut enable: P, mut reset: P) -> Result<Self, P::Error> {
        enable.set_high()?;
        reset.set_high()?;
        Ok(Self {
            enable,
            reset,
            in_reset: false,
        })
    }

    /// Pull the reset line low
    pub fn hold_reset(&mut self) -> Result<(), P::Error> {
        self.reset.set_low()?;
        self.in_reset = true;
        Ok(())
    }

    /// Let the reset line go high again
    pub fn release_reset(&mut self) -> Result<(), P::Error> {
        self.reset.set_high()?;
        self.in_reset = false;
        Ok(())
    }

    /// Check if the module is currently held in reset
    pub fn is_in_reset(&self) -> bool {
        self.in_reset
    }

    /// Give the pins back as (enable, reset)
    pub fn into_pins(self) -> (P, P) {
        (self.enable, self.reset)
    }
}
