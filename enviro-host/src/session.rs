//! Sensor sessions on a worker thread
//!
//! [`open`] claims the serial port and both control lines, [`spawn`] moves
//! the session onto its own thread. Readings come back through an mpsc
//! channel in arrival order; recoverable conditions are logged with
//! `tracing` from the worker.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use enviro_core::traits::{Diagnostic, FrameSink};
use enviro_drivers::particulate::{AcquisitionError, Pms5003, Stats};
use enviro_hal::UartRx;
use enviro_protocol::Reading;
use gpio_cdev::Chip;
use tracing::{debug, error, info, trace, warn};

use crate::config::SensorConfig;
use crate::delay::StdDelay;
use crate::error::{HostError, SessionError};
use crate::gpio::CdevLine;
use crate::serial::SerialChannel;

/// A PMS5003 session on Linux devices
pub type Session = Pms5003<SerialChannel, CdevLine, StdDelay>;

/// Open a session as described by `config`
///
/// Runs host initialization if nobody has yet. Requests the enable and
/// reset lines (both driven high), then opens the serial port. Nothing is
/// read until the session runs.
pub fn open(config: &SensorConfig) -> Result<Session, HostError> {
    config.validate()?;

    let host = crate::init();
    if !host.has_gpio_chip(Path::new(&config.gpio_chip)) {
        warn!(chip = %config.gpio_chip, "gpio chip not found at startup");
    }

    let mut chip = Chip::new(&config.gpio_chip).map_err(|source| HostError::GpioChip {
        chip: config.gpio_chip.clone(),
        source,
    })?;
    let enable = request_line(&mut chip, config, "enable", config.enable_pin)?;
    let reset = request_line(&mut chip, config, "reset", config.reset_pin)?;

    let uart = SerialChannel::open(&config.serial_port, config.acquisition.read_timeout_ms)
        .map_err(|source| HostError::SerialOpen {
            port: config.serial_port.clone(),
            source,
        })?;

    let session = Pms5003::new(uart, enable, reset, StdDelay, config.acquisition)?;
    info!(
        port = %config.serial_port,
        reset = config.reset_pin,
        enable = config.enable_pin,
        "pms5003 session open"
    );
    Ok(session)
}

fn request_line(
    chip: &mut Chip,
    config: &SensorConfig,
    line: &'static str,
    offset: u32,
) -> Result<CdevLine, HostError> {
    CdevLine::request(chip, offset).map_err(|source| HostError::Gpio {
        chip: config.gpio_chip.clone(),
        line,
        offset,
        source,
    })
}

/// Sink that forwards readings over an mpsc channel
///
/// When the receiving side is gone there is nobody left to read for, so
/// the sink raises the stop flag and the loop ends at the next frame
/// boundary.
pub struct ChannelSink {
    tx: Sender<Reading>,
    stop: Arc<AtomicBool>,
}

impl ChannelSink {
    pub fn new(tx: Sender<Reading>, stop: Arc<AtomicBool>) -> Self {
        Self { tx, stop }
    }
}

impl FrameSink for ChannelSink {
    fn deliver(&mut self, reading: Reading) {
        trace!(
            pm1_0 = reading.pm1_0_env,
            pm2_5 = reading.pm2_5_env,
            pm10 = reading.pm10_env,
            "frame"
        );
        if self.tx.send(reading).is_err() && !self.stop.swap(true, Ordering::AcqRel) {
            info!("reading receiver dropped, stopping acquisition");
        }
    }

    fn diagnostic(&mut self, event: Diagnostic) {
        match event {
            Diagnostic::MarkerFound { skipped: 0 } => {}
            Diagnostic::MarkerFound { skipped } => debug!(skipped, "resynchronized"),
            Diagnostic::FrameRejected(e) => warn!(error = %e, "frame discarded"),
            Diagnostic::ResetPerformed => debug!("sensor reset"),
            Diagnostic::FlushFailed(kind) => warn!(?kind, "serial buffer discard failed"),
            event => warn!(%event, "read failed, resetting sensor"),
        }
    }
}

/// Owner's side of a running session
///
/// Dropping the handle asks the worker to stop but does not wait for it.
pub struct AcquisitionHandle<E = SessionError> {
    stop: Arc<AtomicBool>,
    readings: Receiver<Reading>,
    worker: Option<JoinHandle<Result<Stats, E>>>,
}

impl<E> AcquisitionHandle<E> {
    /// Ask the loop to stop after the current frame
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Check if a stop has been requested
    pub fn is_stopping(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Readings in arrival order
    ///
    /// The channel disconnects once the worker exits.
    pub fn readings(&self) -> &Receiver<Reading> {
        &self.readings
    }

    /// Check if the worker has exited
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stop and wait for the worker
    ///
    /// Returns `None` if the worker panicked.
    pub fn wait(mut self) -> Option<Result<Stats, E>> {
        self.stop();
        self.worker.take()?.join().ok()
    }

    /// Stop and wait for the worker, folding its outcome into [`HostError`]
    pub fn join(self) -> Result<Stats, HostError>
    where
        HostError: From<E>,
    {
        match self.wait() {
            Some(result) => result.map_err(HostError::from),
            None => Err(HostError::WorkerPanicked),
        }
    }
}

impl<E> Drop for AcquisitionHandle<E> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run `session` on a dedicated thread
pub fn spawn<U, P, D>(
    session: Pms5003<U, P, D>,
) -> Result<AcquisitionHandle<AcquisitionError<U::Error, P::Error>>, HostError>
where
    U: UartRx + Send + 'static,
    U::Error: Send + 'static,
    P: OutputPin + Send + 'static,
    P::Error: Send + 'static,
    D: DelayNs + Send + 'static,
{
    let (tx, readings) = mpsc::channel();
    let stop = Arc::new(AtomicBool::new(false));
    let sink = ChannelSink::new(tx, Arc::clone(&stop));
    let worker_stop = Arc::clone(&stop);

    let worker = thread::Builder::new()
        .name(String::from("pms5003"))
        .spawn(move || run_worker(session, sink, &worker_stop))
        .map_err(HostError::Spawn)?;

    Ok(AcquisitionHandle {
        stop,
        readings,
        worker: Some(worker),
    })
}

fn run_worker<U, P, D>(
    mut session: Pms5003<U, P, D>,
    mut sink: ChannelSink,
    stop: &AtomicBool,
) -> Result<Stats, AcquisitionError<U::Error, P::Error>>
where
    U: UartRx,
    P: OutputPin,
    D: DelayNs,
{
    info!("acquisition started");
    let result = session.run(&mut sink, stop);
    let stats = session.stats();
    // Closes the port and releases both lines
    drop(session);

    match &result {
        Ok(()) => info!(
            frames = stats.frames,
            rejected = stats.rejected,
            resets = stats.resets,
            "acquisition stopped"
        ),
        Err(e) => error!(error = %e, frames = stats.frames, "acquisition failed"),
    }
    result.map(|()| stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::time::Duration;

    use embedded_hal::digital::ErrorType;
    use enviro_core::config::Pms5003Config;
    use enviro_hal::uart::{Error, ErrorKind};
    use enviro_hal::ReadExactError;

    #[derive(Debug)]
    struct MemoryError;

    impl Error for MemoryError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Serial stream over a byte buffer, optionally repeating forever
    struct MemoryUart {
        data: Vec<u8>,
        pos: usize,
        repeat: bool,
    }

    impl UartRx for MemoryUart {
        type Error = MemoryError;

        fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, MemoryError> {
            if self.pos == self.data.len() && self.repeat {
                self.pos = 0;
            }
            let n = buf.len().min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }

        fn discard_buffers(&mut self) -> Result<(), MemoryError> {
            Ok(())
        }
    }

    struct NullPin;

    impl ErrorType for NullPin {
        type Error = Infallible;
    }

    impl OutputPin for NullPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    fn reading(pm2_5: u16) -> Reading {
        Reading {
            pm2_5_std: pm2_5,
            pm2_5_env: pm2_5,
            ..Reading::default()
        }
        .sealed()
    }

    fn session(data: Vec<u8>, repeat: bool) -> Pms5003<MemoryUart, NullPin, StdDelay> {
        let uart = MemoryUart {
            data,
            pos: 0,
            repeat,
        };
        let config = Pms5003Config {
            settle_ms: 1,
            read_timeout_ms: None,
        };
        Pms5003::new(uart, NullPin, NullPin, StdDelay, config).unwrap()
    }

    #[test]
    fn test_channel_sink_forwards_in_order() {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let mut sink = ChannelSink::new(tx, Arc::clone(&stop));

        sink.deliver(reading(1));
        sink.diagnostic(Diagnostic::ReadTimeout);
        sink.deliver(reading(2));

        let got: Vec<u16> = rx.try_iter().map(|r| r.pm2_5_env).collect();
        assert_eq!(got, vec![1, 2]);
        assert!(!stop.load(Ordering::Acquire));
    }

    #[test]
    fn test_channel_sink_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let mut sink = ChannelSink::new(tx, Arc::clone(&stop));
        drop(rx);

        sink.deliver(reading(1));
        assert!(stop.load(Ordering::Acquire));
    }

    #[test]
    fn test_worker_delivers_then_fails_at_end_of_stream() {
        let mut data = Vec::new();
        for pm in [10u16, 20, 30] {
            data.extend_from_slice(&reading(pm).encode());
        }
        let handle = spawn(session(data, false)).unwrap();

        let got: Vec<u16> = handle.readings().iter().map(|r| r.pm2_5_env).collect();
        assert_eq!(got, vec![10, 20, 30]);

        let outcome = handle.wait().unwrap();
        assert!(matches!(
            outcome,
            Err(AcquisitionError::Uart(ReadExactError::UnexpectedEof { read: 0 }))
        ));
    }

    #[test]
    fn test_worker_stops_on_request() {
        let data = reading(7).encode().to_vec();
        let handle = spawn(session(data, true)).unwrap();

        for _ in 0..3 {
            let r = handle
                .readings()
                .recv_timeout(Duration::from_secs(5))
                .unwrap();
            assert_eq!(r, reading(7));
        }
        handle.stop();
        assert!(handle.is_stopping());

        let stats = handle.wait().unwrap().unwrap();
        assert!(stats.frames >= 3);
        assert_eq!(stats.resets, 1);
        assert_eq!(stats.rejected, 0);
    }
}
