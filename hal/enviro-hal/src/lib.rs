//! Enviro Hardware Abstraction Layer
//!
//! This crate defines the serial channel traits the acquisition drivers are
//! written against. A Linux runtime implements them on top of a tty device;
//! a microcontroller port would implement them on its UART peripheral.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Drivers (enviro-drivers, PMS5003)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  enviro-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  enviro-host (serialport on /dev/tty*)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Digital output lines and delays use the `embedded-hal` 1.0 traits
//! directly; only the serial side needs operations `embedded-hal` lacks
//! (discarding buffered bytes).
//!
//! # Traits
//!
//! - [`uart::UartRx`] - Blocking serial receive with buffer discard

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

// Re-export key traits at crate root for convenience
pub use uart::{DataBits, ErrorKind, Parity, ReadExactError, StopBits, UartConfig, UartRx};
