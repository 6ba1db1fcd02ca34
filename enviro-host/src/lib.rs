//! Linux runtime for Enviro sensor acquisition
//!
//! Binds the board-agnostic PMS5003 driver to Linux devices:
//!
//! - [`serial::SerialChannel`] - tty device through `serialport`
//! - [`gpio::CdevLine`] - reset and enable lines through the GPIO
//!   character device
//! - [`delay::StdDelay`] - thread sleep
//!
//! [`session::open`] builds a driver session from a [`config::HostConfig`]
//! and [`session::spawn`] runs it on a worker thread, handing readings
//! back over a channel.
//!
//! ```no_run
//! use enviro_host::{config::HostConfig, session};
//!
//! # fn main() -> Result<(), enviro_host::HostError> {
//! let config = HostConfig::default();
//! enviro_host::init();
//! let handle = session::spawn(session::open(&config.pms5003)?)?;
//! for reading in handle.readings().iter().take(3) {
//!     println!("PM2.5 {} ug/m3", reading.pm2_5_env);
//! }
//! handle.stop();
//! handle.join()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod delay;
pub mod error;
pub mod gpio;
pub mod init;
pub mod serial;
pub mod session;

pub use error::HostError;
pub use init::{init, HostInfo};
