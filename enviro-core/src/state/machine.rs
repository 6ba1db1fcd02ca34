//! State machine definition
//!
//! Every channel read and reset the acquisition loop performs is a
//! function of the current state and an event.

use super::events::Event;

/// Acquisition states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not acquiring; the initial and the stopped state
    Idle,
    /// Reset line held low, buffers being discarded
    Resetting,
    /// Scanning the stream for the frame marker
    Synchronizing,
    /// Reading the 30-byte body after the marker
    Decoding,
    /// Checking length and checksum
    Validating,
    /// Handing a valid reading to the consumer
    Emitting,
    /// Unrecoverable failure; the session must be reopened
    Fatal(FaultKind),
}

/// Types of unrecoverable failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Serial read failed while scanning for the marker
    ChannelFailed,
    /// Reset or enable line could not be driven
    PinFailed,
}

impl State {
    /// Check if this state reads from the serial channel
    pub fn reads_channel(&self) -> bool {
        matches!(self, State::Synchronizing | State::Decoding)
    }

    /// Check if this is a fatal state
    pub fn is_fatal(&self) -> bool {
        matches!(self, State::Fatal(_))
    }

    /// Check if the loop is between frames, where a stop request is honored
    pub fn is_between_frames(&self) -> bool {
        matches!(self, State::Idle | State::Synchronizing)
    }

    /// Process an event and return the next state
    ///
    /// This is the core state transition logic.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Fatal is terminal
            (Fatal(_), _) => self,
            (_, Fault(kind)) => Fatal(kind),

            // Stop is honored in any live state; the loop only asks between frames
            (_, Stop) => Idle,

            // Startup always begins with a hardware reset
            (Idle, Start) => Resetting,

            (Resetting, ResetComplete) => Synchronizing,

            (Synchronizing, MarkerFound) => Decoding,
            // Read deadline expired on a silent line
            (Synchronizing, ReadFailed) => Resetting,

            (Decoding, BodyRead) => Validating,
            (Decoding, ReadFailed) => Resetting,

            (Validating, FrameAccepted) => Emitting,
            // Noisy frame: keep listening, no reset
            (Validating, FrameRejected) => Synchronizing,

            (Emitting, Delivered) => Synchronizing,

            // Default: stay in current state
            _ => self,
        }
    }
}
