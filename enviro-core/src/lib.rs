//! Board-agnostic acquisition logic for Enviro sensors
//!
//! This crate contains the parts of the acquisition layer that do not
//! touch hardware:
//!
//! - State machine for the read/recover loop
//! - Frame sink capability (how readings leave the loop)
//! - Diagnostics for recoverable conditions
//! - Configuration types and their validation

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod state;
pub mod traits;
