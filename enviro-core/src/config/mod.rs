//! Configuration types
//!
//! Board-agnostic acquisition settings, validated before a session opens.

pub mod types;

pub use types::*;
