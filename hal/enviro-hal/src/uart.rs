//! UART serial communication abstractions
//!
//! Provides a blocking receive trait that can be implemented by
//! platform-specific serial backends.

use core::fmt;

/// Coarse classification of a serial error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// A read deadline expired before any byte arrived
    TimedOut,
    /// The device went away or the handle was closed
    Closed,
    /// Anything else (framing, overrun, OS error)
    Other,
}

/// Error type of a serial backend
pub trait Error: fmt::Debug {
    /// Classify this error
    fn kind(&self) -> ErrorKind;
}

/// Error returned by [`UartRx::read_exact`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadExactError<E> {
    /// The stream ended after `read` bytes
    UnexpectedEof { read: usize },
    /// The backend reported an error
    Other(E),
}

impl<E: Error> ReadExactError<E> {
    /// True if the backend gave up because its read deadline expired
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReadExactError::Other(e) if e.kind() == ErrorKind::TimedOut)
    }
}

impl<E: fmt::Debug> fmt::Display for ReadExactError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadExactError::UnexpectedEof { read } => {
                write!(f, "stream ended after {} bytes", read)
            }
            ReadExactError::Other(e) => write!(f, "serial error: {:?}", e),
        }
    }
}

/// UART receiver
///
/// Blocking trait for receiving data from a serial interface.
pub trait UartRx {
    /// Error type for receive operations
    type Error: Error;

    /// Read up to `buf.len()` bytes
    ///
    /// Blocks until at least one byte is available. Returns the number of
    /// bytes read, or `Ok(0)` once the stream has ended.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Discard buffered bytes in both directions
    ///
    /// Drops data received but not yet read and data written but not yet
    /// transmitted.
    fn discard_buffers(&mut self) -> Result<(), Self::Error>;

    /// Fill `buf` completely
    ///
    /// Fails with [`ReadExactError::UnexpectedEof`] if the stream ends first.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ReadExactError<Self::Error>> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read_blocking(&mut buf[filled..]) {
                Ok(0) => return Err(ReadExactError::UnexpectedEof { read: filled }),
                Ok(n) => filled += n,
                Err(e) => return Err(ReadExactError::Other(e)),
            }
        }
        Ok(())
    }

    /// Read a single byte from the UART
    fn read_byte(&mut self) -> Result<u8, ReadExactError<Self::Error>> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// Line settings of the PMS5003: 9600 8N1
    pub const fn pms5003() -> Self {
        Self {
            baudrate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
