//! Serial channel over a Linux tty device

use std::io::{self, Read};
use std::time::Duration;

use enviro_hal::uart::{self, ErrorKind, UartConfig, UartRx};
use serialport::{ClearBuffer, FlowControl, SerialPort};
use thiserror::Error;

/// Port timeout used when no read deadline is configured
///
/// Expiries are swallowed so reads block until data arrives.
const IDLE_POLL: Duration = Duration::from_secs(1);

/// I/O error from the tty device
#[derive(Debug, Error)]
#[error(transparent)]
pub struct SerialError(#[from] io::Error);

impl SerialError {
    /// The underlying I/O error
    pub fn io(&self) -> &io::Error {
        &self.0
    }
}

impl From<serialport::Error> for SerialError {
    fn from(e: serialport::Error) -> Self {
        SerialError(e.into())
    }
}

impl uart::Error for SerialError {
    fn kind(&self) -> ErrorKind {
        classify(self.0.kind())
    }
}

fn classify(kind: io::ErrorKind) -> ErrorKind {
    match kind {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ErrorKind::TimedOut,
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::NotFound => ErrorKind::Closed,
        _ => ErrorKind::Other,
    }
}

/// Receive side of a tty configured for the PMS5003
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
    deadline: Option<Duration>,
}

impl SerialChannel {
    /// Open `path` at 9600 8N1
    ///
    /// With `read_timeout_ms` set, a read that sees no byte for that long
    /// fails with [`ErrorKind::TimedOut`]. Without it reads block forever.
    pub fn open(path: &str, read_timeout_ms: Option<u32>) -> Result<Self, serialport::Error> {
        let config = UartConfig::pms5003();
        let port = serialport::new(path, config.baudrate)
            .data_bits(data_bits(config.data_bits))
            .parity(parity(config.parity))
            .stop_bits(stop_bits(config.stop_bits))
            .flow_control(FlowControl::None)
            .open()?;

        let deadline = read_timeout_ms.map(|ms| Duration::from_millis(u64::from(ms)));
        Self::from_port(port, deadline)
    }

    /// Wrap an already open port, applying the read deadline
    pub fn from_port(
        mut port: Box<dyn SerialPort>,
        deadline: Option<Duration>,
    ) -> Result<Self, serialport::Error> {
        port.set_timeout(deadline.unwrap_or(IDLE_POLL))?;
        Ok(Self { port, deadline })
    }

    /// Device name, if the port has one
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl UartRx for SerialChannel {
    type Error = SerialError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        loop {
            match self.port.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if self.deadline.is_none() && classify(e.kind()) == ErrorKind::TimedOut => {
                    continue
                }
                Err(e) => return Err(SerialError(e)),
            }
        }
    }

    fn discard_buffers(&mut self) -> Result<(), SerialError> {
        self.port.clear(ClearBuffer::All)?;
        Ok(())
    }
}

fn data_bits(bits: uart::DataBits) -> serialport::DataBits {
    match bits {
        uart::DataBits::Seven => serialport::DataBits::Seven,
        uart::DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn parity(parity: uart::Parity) -> serialport::Parity {
    match parity {
        uart::Parity::None => serialport::Parity::None,
        uart::Parity::Even => serialport::Parity::Even,
        uart::Parity::Odd => serialport::Parity::Odd,
    }
}

fn stop_bits(bits: uart::StopBits) -> serialport::StopBits {
    match bits {
        uart::StopBits::One => serialport::StopBits::One,
        uart::StopBits::Two => serialport::StopBits::Two,
    }
}
