//! PMS5003 Wire Protocol
//!
//! This crate defines the binary frames the Plantower PMS5003 particulate
//! sensor streams over its UART at 9600 baud. The sensor transmits
//! continuously and the stream carries no framing beyond a two-byte marker,
//! so a receiver has to find frame boundaries itself.
//!
//! # Frame Layout
//!
//! All multi-byte fields are big-endian `u16`:
//! ```text
//! ┌──────┬──────┬────────┬────────────────┬─────────────────┬────────┬──────────┐
//! │ 0x42 │ 0x4D │ LENGTH │ PM (std + env) │ PARTICLE COUNTS │ UNUSED │ CHECKSUM │
//! │ 1B   │ 1B   │ 2B =28 │ 6 × 2B         │ 6 × 2B          │ 2B     │ 2B       │
//! └──────┴──────┴────────┴────────────────┴─────────────────┴────────┴──────────┘
//! ```
//!
//! The checksum is the 16-bit wrapping sum of every byte before it,
//! marker included.

#![no_std]
#![deny(unsafe_code)]

pub mod checksum;
pub mod frame;
pub mod sync;

pub use checksum::{compute as compute_checksum, validate};
pub use frame::{
    FrameError, RawFrame, Reading, BODY_LEN, CHECKED_LEN, EXPECTED_LENGTH, FRAME_LEN, MAGIC,
};
pub use sync::MarkerScanner;
