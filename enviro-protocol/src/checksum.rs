//! Frame checksum validation
//!
//! The PMS5003 has no per-byte parity, so the additive checksum is the only
//! integrity check on the line. A mismatch means line noise on one frame,
//! not a broken channel.

use crate::frame::{FrameError, Reading, BODY_LEN, CHECKED_LEN, EXPECTED_LENGTH, MAGIC};

/// Calculate the checksum the sensor would send for this body
///
/// Wrapping 16-bit sum of the marker bytes and the first 28 body bytes.
pub fn compute(body: &[u8; BODY_LEN]) -> u16 {
    MAGIC
        .iter()
        .chain(&body[..CHECKED_LEN])
        .fold(0u16, |sum, &byte| sum.wrapping_add(byte as u16))
}

/// Decode a body and accept it only if length and checksum both hold
///
/// The length check runs first, so a frame that fails both reports
/// [`FrameError::InvalidLength`].
pub fn validate(body: &[u8; BODY_LEN]) -> Result<Reading, FrameError> {
    let reading = Reading::from_body(body);

    if reading.length != EXPECTED_LENGTH {
        return Err(FrameError::InvalidLength {
            found: reading.length,
        });
    }

    let expected = compute(body);
    if reading.checksum != expected {
        return Err(FrameError::InvalidChecksum {
            expected,
            found: reading.checksum,
        });
    }

    Ok(reading)
}
