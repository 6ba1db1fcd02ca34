//! Frame synchronization
//!
//! The sensor streams frames back to back with no idle gaps we can rely
//! on, and a receiver may start listening mid-frame. Synchronization is a
//! byte-at-a-time search for the two-byte marker.

use crate::frame::MAGIC;

/// Searches a byte stream for the frame marker
///
/// Feed bytes one at a time. There is no limit on how many bytes may pass
/// before the marker shows up.
#[derive(Debug, Clone, Default)]
pub struct MarkerScanner {
    previous: Option<u8>,
    consumed: usize,
}

impl MarkerScanner {
    /// Create a scanner with no history
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous byte and the skip count
    pub fn reset(&mut self) {
        self.previous = None;
        self.consumed = 0;
    }

    /// Feed a single byte
    ///
    /// Returns `Some(skipped)` when this byte completes the marker, where
    /// `skipped` is the number of bytes that came before the marker since
    /// the last match. The scanner starts over after a match.
    pub fn feed(&mut self, byte: u8) -> Option<usize> {
        if self.previous == Some(MAGIC[0]) && byte == MAGIC[1] {
            let skipped = self.consumed - 1;
            self.reset();
            return Some(skipped);
        }

        self.previous = Some(byte);
        self.consumed = self.consumed.saturating_add(1);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(bytes: &[u8]) -> Option<(usize, usize)> {
        let mut scanner = MarkerScanner::new();
        bytes
            .iter()
            .enumerate()
            .find_map(|(i, &b)| scanner.feed(b).map(|skipped| (i, skipped)))
    }

    #[test]
    fn test_marker_at_start() {
        assert_eq!(scan(&[0x42, 0x4D, 0x00]), Some((1, 0)));
    }

    #[test]
    fn test_marker_after_garbage() {
        assert_eq!(scan(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x42, 0x4D]), Some((6, 5)));
    }

    #[test]
    fn test_repeated_first_byte() {
        assert_eq!(scan(&[0x42, 0x42, 0x42, 0x4D]), Some((3, 2)));
    }

    #[test]
    fn test_reversed_marker_not_matched() {
        assert_eq!(scan(&[0x4D, 0x42, 0x00, 0x4D]), None);
    }

    #[test]
    fn test_no_match_across_reset() {
        let mut scanner = MarkerScanner::new();
        assert_eq!(scanner.feed(0x42), None);
        scanner.reset();
        assert_eq!(scanner.feed(0x4D), None);
    }

    #[test]
    fn test_skip_count_saturates() {
        let mut scanner = MarkerScanner {
            previous: Some(0x00),
            consumed: usize::MAX,
        };
        assert_eq!(scanner.feed(0x42), None);
        assert_eq!(scanner.feed(0x4D), Some(usize::MAX - 1));
    }

    #[test]
    fn test_back_to_back_markers() {
        let mut scanner = MarkerScanner::new();
        let hits: [Option<usize>; 4] = [0x42, 0x4D, 0x42, 0x4D].map(|b| scanner.feed(b));
        assert_eq!(hits, [None, Some(0), None, Some(0)]);
    }
}
