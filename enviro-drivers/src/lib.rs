//! Sensor driver implementations
//!
//! This crate drives the sensors attached to an Enviro board through the
//! traits in `enviro-hal` and `embedded-hal`:
//!
//! - Particulate matter (Plantower PMS5003 over UART)

#![no_std]
#![deny(unsafe_code)]

pub mod particulate;
