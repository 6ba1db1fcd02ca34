//! Frame encoding and decoding for the PMS5003 protocol.
//!
//! Frame format:
//! - MARKER (2 bytes): 0x42 0x4D ("BM")
//! - BODY (30 bytes): 15 big-endian u16 fields, see [`Reading`]
//!
//! The body is decoded all at once; there is no partial decode.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::checksum;

/// Frame start marker
pub const MAGIC: [u8; 2] = [0x42, 0x4D];

/// Body size in bytes (everything after the marker)
pub const BODY_LEN: usize = 30;

/// Complete frame size (MARKER + BODY)
pub const FRAME_LEN: usize = MAGIC.len() + BODY_LEN;

/// Body bytes covered by the checksum (all fields but the checksum itself)
pub const CHECKED_LEN: usize = BODY_LEN - 2;

/// Value the length field must carry
pub const EXPECTED_LENGTH: u16 = 28;

/// Number of u16 fields in the body
const FIELD_COUNT: usize = BODY_LEN / 2;

/// A complete on-wire frame, marker included
pub type RawFrame = [u8; FRAME_LEN];

/// Reasons a decoded frame is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Length field is not 28
    InvalidLength { found: u16 },
    /// Checksum field does not match the sum of the preceding bytes
    InvalidChecksum { expected: u16, found: u16 },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::InvalidLength { found } => {
                write!(f, "length field {} (want {})", found, EXPECTED_LENGTH)
            }
            FrameError::InvalidChecksum { expected, found } => {
                write!(f, "checksum {:#06x} (want {:#06x})", found, expected)
            }
        }
    }
}

/// One decoded PMS5003 frame
///
/// Mass concentrations are in µg/m³. "Standard" values are normalised to
/// standard particle density (CF=1), "environmental" values are computed
/// under atmospheric conditions. Particle counts are per 0.1 L of air and
/// cumulative: each bucket counts every particle above its diameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Frame length field (28 for a well-formed frame)
    pub length: u16,
    /// PM1.0, standard particle
    pub pm1_0_std: u16,
    /// PM2.5, standard particle
    pub pm2_5_std: u16,
    /// PM10, standard particle
    pub pm10_std: u16,
    /// PM1.0, atmospheric environment
    pub pm1_0_env: u16,
    /// PM2.5, atmospheric environment
    pub pm2_5_env: u16,
    /// PM10, atmospheric environment
    pub pm10_env: u16,
    /// Particles > 0.3 µm
    pub particles_0_3um: u16,
    /// Particles > 0.5 µm
    pub particles_0_5um: u16,
    /// Particles > 1.0 µm
    pub particles_1_0um: u16,
    /// Particles > 2.5 µm
    pub particles_2_5um: u16,
    /// Particles > 5.0 µm
    pub particles_5_0um: u16,
    /// Particles > 10 µm
    pub particles_10um: u16,
    /// Unused by the sensor
    pub unused: u16,
    /// Checksum as transmitted
    pub checksum: u16,
}

impl Reading {
    /// Decode the 30 bytes that follow the marker
    ///
    /// This does not validate anything; see [`checksum::validate`].
    pub fn from_body(body: &[u8; BODY_LEN]) -> Self {
        let mut fields = [0u16; FIELD_COUNT];
        for (field, pair) in fields.iter_mut().zip(body.chunks_exact(2)) {
            *field = u16::from_be_bytes([pair[0], pair[1]]);
        }
        Self::from_fields(fields)
    }

    /// Decode a full frame, marker included
    ///
    /// Returns `None` if the first two bytes are not the marker.
    pub fn from_frame(frame: &RawFrame) -> Option<Self> {
        let (marker, body) = frame.split_at(MAGIC.len());
        if marker != &MAGIC[..] {
            return None;
        }
        let body: &[u8; BODY_LEN] = body.try_into().ok()?;
        Some(Self::from_body(body))
    }

    /// Encode the body fields exactly as stored
    pub fn encode_body(&self) -> [u8; BODY_LEN] {
        let mut body = [0u8; BODY_LEN];
        for (pair, field) in body.chunks_exact_mut(2).zip(self.fields()) {
            pair.copy_from_slice(&field.to_be_bytes());
        }
        body
    }

    /// Encode a full frame, marker included, fields exactly as stored
    pub fn encode(&self) -> RawFrame {
        let mut frame = [0u8; FRAME_LEN];
        frame[..MAGIC.len()].copy_from_slice(&MAGIC);
        frame[MAGIC.len()..].copy_from_slice(&self.encode_body());
        frame
    }

    /// Set the length field to 28 and the checksum to match the contents
    ///
    /// Used to build frames the way the sensor would send them.
    pub fn sealed(mut self) -> Self {
        self.length = EXPECTED_LENGTH;
        self.checksum = checksum::compute(&self.encode_body());
        self
    }

    /// The six mass concentrations as (standard, environmental) pairs for
    /// PM1.0, PM2.5 and PM10
    pub fn mass_concentrations(&self) -> [(u16, u16); 3] {
        [
            (self.pm1_0_std, self.pm1_0_env),
            (self.pm2_5_std, self.pm2_5_env),
            (self.pm10_std, self.pm10_env),
        ]
    }

    /// The six cumulative particle counts, smallest diameter first
    pub fn particle_counts(&self) -> [u16; 6] {
        [
            self.particles_0_3um,
            self.particles_0_5um,
            self.particles_1_0um,
            self.particles_2_5um,
            self.particles_5_0um,
            self.particles_10um,
        ]
    }

    fn fields(&self) -> [u16; FIELD_COUNT] {
        [
            self.length,
            self.pm1_0_std,
            self.pm2_5_std,
            self.pm10_std,
            self.pm1_0_env,
            self.pm2_5_env,
            self.pm10_env,
            self.particles_0_3um,
            self.particles_0_5um,
            self.particles_1_0um,
            self.particles_2_5um,
            self.particles_5_0um,
            self.particles_10um,
            self.unused,
            self.checksum,
        ]
    }

    fn from_fields(f: [u16; FIELD_COUNT]) -> Self {
        Self {
            length: f[0],
            pm1_0_std: f[1],
            pm2_5_std: f[2],
            pm10_std: f[3],
            pm1_0_env: f[4],
            pm2_5_env: f[5],
            pm10_env: f[6],
            particles_0_3um: f[7],
            particles_0_5um: f[8],
            particles_1_0um: f[9],
            particles_2_5um: f[10],
            particles_5_0um: f[11],
            particles_10um: f[12],
            unused: f[13],
            checksum: f[14],
        }
    }
}
