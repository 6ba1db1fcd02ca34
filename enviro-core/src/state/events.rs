//! Events that trigger state transitions

use super::machine::FaultKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Lifecycle events
    /// Owner started acquisition
    Start,
    /// Owner asked the loop to stop
    Stop,

    // Channel events
    /// Reset line released and buffers flushed
    ResetComplete,
    /// Frame marker seen in the stream
    MarkerFound,
    /// Full 30-byte body read after the marker
    BodyRead,
    /// Short read, read error or deadline expiry; the channel needs a reset
    ReadFailed,

    // Frame events
    /// Length and checksum both passed
    FrameAccepted,
    /// Length or checksum failed
    FrameRejected,
    /// Reading handed to the consumer
    Delivered,

    // Fatal events
    /// Unrecoverable failure
    Fault(FaultKind),
}

impl Event {
    /// Check if this event comes from the owner rather than the stream
    pub fn is_owner_event(&self) -> bool {
        matches!(self, Event::Start | Event::Stop)
    }

    /// Check if this event describes the outcome of one frame
    pub fn is_frame_event(&self) -> bool {
        matches!(
            self,
            Event::FrameAccepted | Event::FrameRejected | Event::Delivered
        )
    }

    /// Check if this event is fatal
    pub fn is_fault(&self) -> bool {
        matches!(self, Event::Fault(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_events() {
        assert!(Event::Start.is_owner_event());
        assert!(Event::Stop.is_owner_event());
        assert!(!Event::MarkerFound.is_owner_event());
    }

    #[test]
    fn test_frame_events() {
        assert!(Event::FrameAccepted.is_frame_event());
        assert!(Event::FrameRejected.is_frame_event());
        assert!(!Event::ReadFailed.is_frame_event());
    }

    #[test]
    fn test_fault_events() {
        assert!(Event::Fault(FaultKind::ChannelFailed).is_fault());
        assert!(!Event::ReadFailed.is_fault());
    }
}
