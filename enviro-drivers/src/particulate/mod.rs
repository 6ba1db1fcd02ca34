//! Particulate matter sensors

pub mod pms5003;
pub mod reset;

pub use pms5003::{AcquisitionError, Pms5003, Stats};
pub use reset::ResetLines;
