//! Capability traits
//!
//! These traits define the interface between the acquisition loop and the
//! application embedding it.

pub mod sink;
pub mod stop;

pub use sink::{Diagnostic, FnSink, FrameSink, LastReading};
pub use stop::{RunForever, StopSignal};
