//! Plantower PMS5003 particulate matter sensor
//!
//! The sensor streams a 32-byte frame roughly once a second over a 9600
//! baud UART. There is no request/response: the driver listens, finds the
//! frame marker, reads the body, and checks it.
//!
//! # Recovery
//!
//! Two kinds of trouble are handled differently:
//!
//! - A frame that fails the length or checksum check is line noise on a
//!   healthy channel. It is dropped and the body bytes are scanned again for
//!   a marker, since the real frame may start inside the bad one.
//! - A short or failed body read means the channel itself is in a bad
//!   state. The module is reset (reset line low, buffers discarded, settle,
//!   reset line high) and synchronization starts over.
//!
//! A read error while scanning for the marker is fatal to the session
//! unless it is an expired read deadline, which is treated like a failed
//! body read.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Deque;

use enviro_core::config::{ConfigError, Pms5003Config};
use enviro_core::state::{Event, FaultKind, State};
use enviro_core::traits::{Diagnostic, FrameSink, StopSignal};
use enviro_hal::uart::Error as _;
use enviro_hal::{ErrorKind, ReadExactError, UartRx};
use enviro_protocol::{validate, MarkerScanner, Reading, BODY_LEN};

use super::reset::ResetLines;

/// Errors that end an acquisition session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquisitionError<U, P> {
    /// Configuration rejected at construction
    Config(ConfigError),
    /// Serial read failed while scanning for the marker
    Uart(ReadExactError<U>),
    /// Enable or reset line could not be driven
    Pin(P),
    /// The session already failed; open a new one
    Faulted(FaultKind),
}

impl<U: fmt::Debug, P: fmt::Debug> fmt::Display for AcquisitionError<U, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::Config(e) => write!(f, "invalid configuration: {}", e),
            AcquisitionError::Uart(e) => write!(f, "serial channel failed: {}", e),
            AcquisitionError::Pin(e) => write!(f, "control line failed: {:?}", e),
            AcquisitionError::Faulted(kind) => write!(f, "session already faulted: {:?}", kind),
        }
    }
}

/// Frame counters for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stats {
    /// Frames delivered to the sink
    pub frames: u32,
    /// Frames dropped by the validator
    pub rejected: u32,
    /// Reset sequences performed, the startup reset included
    pub resets: u32,
}

type SessionError<U, P> =
    AcquisitionError<<U as UartRx>::Error, <P as embedded_hal::digital::ErrorType>::Error>;

/// One open PMS5003 session
///
/// Owns the serial channel, both control lines and a delay source for as
/// long as it lives. Dropping it releases them.
pub struct Pms5003<U, P, D> {
    uart: U,
    lines: ResetLines<P>,
    delay: D,
    config: Pms5003Config,
    state: State,
    /// Body of the frame being decoded; overwritten every cycle
    body: [u8; BODY_LEN],
    /// Bytes of a rejected body still to be scanned before new channel data
    replay: Deque<u8, BODY_LEN>,
    stats: Stats,
}

impl<U, P, D> Pms5003<U, P, D>
where
    U: UartRx,
    P: OutputPin,
    D: DelayNs,
{
    /// Open a session
    ///
    /// Validates `config`, then drives enable and reset high. The serial
    /// channel is expected to be open at 9600 8N1 already.
    pub fn new(
        uart: U,
        enable: P,
        reset: P,
        delay: D,
        config: Pms5003Config,
    ) -> Result<Self, SessionError<U, P>> {
        let config = config.validated().map_err(AcquisitionError::Config)?;
        let lines = ResetLines::new(enable, reset).map_err(AcquisitionError::Pin)?;

        Ok(Self {
            uart,
            lines,
            delay,
            config,
            state: State::Idle,
            body: [0u8; BODY_LEN],
            replay: Deque::new(),
            stats: Stats::default(),
        })
    }

    /// Current acquisition state
    pub fn state(&self) -> State {
        self.state
    }

    /// Counters since the session opened
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Close the session, returning (uart, enable, reset, delay)
    pub fn release(self) -> (U, P, P, D) {
        let (enable, reset) = self.lines.into_pins();
        (self.uart, enable, reset, self.delay)
    }

    /// Run the acquisition loop
    ///
    /// Resets the module, then reads frames until `stop` is raised, handing
    /// each valid one to `sink` exactly once and in order. `stop` is checked
    /// between frames only. Returns `Ok(())` when stopped, or the error that
    /// made the session unusable.
    pub fn run<S, T>(&mut self, sink: &mut S, stop: &T) -> Result<(), SessionError<U, P>>
    where
        S: FrameSink + ?Sized,
        T: StopSignal + ?Sized,
    {
        if let State::Fatal(kind) = self.state {
            return Err(AcquisitionError::Faulted(kind));
        }

        let mut accepted: Option<Reading> = None;
        self.apply(Event::Start);

        loop {
            match self.state {
                State::Resetting => {
                    self.reset_module(sink)?;
                    self.apply(Event::ResetComplete);
                }
                State::Synchronizing => {
                    if stop.should_stop() {
                        self.apply(Event::Stop);
                        return Ok(());
                    }
                    match self.synchronize() {
                        Ok(skipped) => {
                            sink.diagnostic(Diagnostic::MarkerFound { skipped });
                            self.apply(Event::MarkerFound);
                        }
                        Err(e) if e.is_timeout() => {
                            sink.diagnostic(Diagnostic::ReadTimeout);
                            self.apply(Event::ReadFailed);
                        }
                        Err(e) => {
                            self.apply(Event::Fault(FaultKind::ChannelFailed));
                            return Err(AcquisitionError::Uart(e));
                        }
                    }
                }
                State::Decoding => match self.read_body() {
                    Ok(()) => self.apply(Event::BodyRead),
                    Err(e) => {
                        sink.diagnostic(read_failure(&e));
                        self.apply(Event::ReadFailed);
                    }
                },
                State::Validating => match validate(&self.body) {
                    Ok(reading) => {
                        accepted = Some(reading);
                        self.apply(Event::FrameAccepted);
                    }
                    Err(e) => {
                        self.stats.rejected = self.stats.rejected.saturating_add(1);
                        sink.diagnostic(Diagnostic::FrameRejected(e));
                        self.replay_body();
                        self.apply(Event::FrameRejected);
                    }
                },
                State::Emitting => {
                    if let Some(reading) = accepted.take() {
                        self.stats.frames = self.stats.frames.saturating_add(1);
                        sink.deliver(reading);
                    }
                    self.apply(Event::Delivered);
                }
                State::Idle => return Ok(()),
                State::Fatal(kind) => return Err(AcquisitionError::Faulted(kind)),
            }
        }
    }

    fn apply(&mut self, event: Event) {
        self.state = self.state.transition(event);
    }

    /// Reset line low, discard buffers, settle, reset line high
    fn reset_module<S>(&mut self, sink: &mut S) -> Result<(), SessionError<U, P>>
    where
        S: FrameSink + ?Sized,
    {
        // Anything queued for rescanning predates the reset
        self.replay.clear();

        if let Err(e) = self.lines.hold_reset() {
            self.apply(Event::Fault(FaultKind::PinFailed));
            return Err(AcquisitionError::Pin(e));
        }

        if let Err(e) = self.uart.discard_buffers() {
            sink.diagnostic(Diagnostic::FlushFailed(e.kind()));
        }
        self.delay.delay_ms(self.config.settle_ms);

        if let Err(e) = self.lines.release_reset() {
            self.apply(Event::Fault(FaultKind::PinFailed));
            return Err(AcquisitionError::Pin(e));
        }

        self.stats.resets = self.stats.resets.saturating_add(1);
        sink.diagnostic(Diagnostic::ResetPerformed);
        Ok(())
    }

    /// Consume bytes until the marker has been read
    ///
    /// Returns the number of bytes skipped before it.
    fn synchronize(&mut self) -> Result<usize, ReadExactError<U::Error>> {
        let mut scanner = MarkerScanner::new();
        loop {
            let byte = match self.replay.pop_front() {
                Some(byte) => byte,
                None => self.uart.read_byte()?,
            };
            if let Some(skipped) = scanner.feed(byte) {
                return Ok(skipped);
            }
        }
    }

    /// Fill the body buffer: leftover replay bytes first, then one bulk read
    fn read_body(&mut self) -> Result<(), ReadExactError<U::Error>> {
        let mut filled = 0;
        while filled < BODY_LEN {
            match self.replay.pop_front() {
                Some(byte) => {
                    self.body[filled] = byte;
                    filled += 1;
                }
                None => break,
            }
        }

        self.uart
            .read_exact(&mut self.body[filled..])
            .map_err(|e| match e {
                ReadExactError::UnexpectedEof { read } => ReadExactError::UnexpectedEof {
                    read: filled + read,
                },
                other => other,
            })
    }

    /// Queue the rejected body for another marker scan
    fn replay_body(&mut self) {
        self.replay.clear();
        for &byte in self.body.iter() {
            // Cannot fail: capacity is BODY_LEN and the queue was just cleared
            let _ = self.replay.push_back(byte);
        }
    }
}

fn read_failure<E: enviro_hal::uart::Error>(e: &ReadExactError<E>) -> Diagnostic {
    match e {
        ReadExactError::UnexpectedEof { read } => Diagnostic::ShortRead { read: *read },
        ReadExactError::Other(e) => match e.kind() {
            ErrorKind::TimedOut => Diagnostic::ReadTimeout,
            kind => Diagnostic::ReadError(kind),
        },
    }
}
