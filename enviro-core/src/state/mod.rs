//! State machine for frame acquisition
//!
//! Defines the authoritative behavior of the acquisition loop.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{FaultKind, State};
