//! Frame sink and diagnostic traits

use core::fmt;

use enviro_hal::ErrorKind;
use enviro_protocol::{FrameError, Reading};

/// Recoverable conditions seen by the acquisition loop
///
/// None of these stop acquisition. They are reported so the embedding
/// application can log or count them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic {
    /// Marker found after `skipped` non-frame bytes
    MarkerFound { skipped: usize },
    /// Frame discarded by the validator
    FrameRejected(FrameError),
    /// Stream ended after `read` of the 30 body bytes
    ShortRead { read: usize },
    /// Read deadline expired
    ReadTimeout,
    /// Serial read failed while reading a frame body
    ReadError(ErrorKind),
    /// Discarding serial buffers failed during a reset
    FlushFailed(ErrorKind),
    /// Reset sequence finished
    ResetPerformed,
}

impl Diagnostic {
    /// Check if this diagnostic was followed by a reset
    pub fn triggers_reset(&self) -> bool {
        matches!(
            self,
            Diagnostic::ShortRead { .. } | Diagnostic::ReadTimeout | Diagnostic::ReadError(_)
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MarkerFound { skipped } => {
                write!(f, "marker found after {} bytes", skipped)
            }
            Diagnostic::FrameRejected(e) => write!(f, "frame rejected: {}", e),
            Diagnostic::ShortRead { read } => write!(f, "short read: {} of 30 bytes", read),
            Diagnostic::ReadTimeout => f.write_str("read deadline expired"),
            Diagnostic::ReadError(kind) => write!(f, "read error: {:?}", kind),
            Diagnostic::FlushFailed(kind) => write!(f, "buffer discard failed: {:?}", kind),
            Diagnostic::ResetPerformed => f.write_str("sensor reset"),
        }
    }
}

/// Destination for validated readings
///
/// The acquisition loop calls [`deliver`](FrameSink::deliver) exactly once
/// per valid frame, in arrival order, from a single thread. Implementations
/// decide how the reading crosses to the consumer: a callback, a channel,
/// a cache.
pub trait FrameSink {
    /// Accept one validated reading
    fn deliver(&mut self, reading: Reading);

    /// Observe a recoverable condition
    ///
    /// The default implementation ignores it.
    fn diagnostic(&mut self, _event: Diagnostic) {}
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn deliver(&mut self, reading: Reading) {
        (**self).deliver(reading)
    }

    fn diagnostic(&mut self, event: Diagnostic) {
        (**self).diagnostic(event)
    }
}

/// Sink that calls a closure for every reading
pub struct FnSink<F>(pub F);

impl<F: FnMut(Reading)> FrameSink for FnSink<F> {
    fn deliver(&mut self, reading: Reading) {
        (self.0)(reading)
    }
}

/// Sink decorator that remembers the most recent reading
///
/// Forwards everything to the inner sink.
#[derive(Debug, Default)]
pub struct LastReading<S> {
    inner: S,
    last: Option<Reading>,
    delivered: u32,
}

impl<S> LastReading<S> {
    /// Wrap a sink
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            last: None,
            delivered: 0,
        }
    }

    /// The most recent reading, if any arrived yet
    pub fn last(&self) -> Option<&Reading> {
        self.last.as_ref()
    }

    /// Number of readings delivered so far (saturating)
    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    /// Access the wrapped sink
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap, returning the wrapped sink
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FrameSink> FrameSink for LastReading<S> {
    fn deliver(&mut self, reading: Reading) {
        self.last = Some(reading);
        self.delivered = self.delivered.saturating_add(1);
        self.inner.deliver(reading);
    }

    fn diagnostic(&mut self, event: Diagnostic) {
        self.inner.diagnostic(event);
    }
}

/// Sink that drops everything
impl FrameSink for () {
    fn deliver(&mut self, _reading: Reading) {}
}
