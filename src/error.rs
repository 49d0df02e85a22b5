//! Our error types for the KSU client.

use thiserror::Error;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Custom error type for KSU communications.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    /// The serial device could not be opened.
    #[cfg(feature = "serialport")]
    #[error("Could not open serial device: {0}")]
    Connection(serialport::Error),
    #[error("Serial communication error")]
    SerialError(I),
    /// The reply to `id` was not four comma separated fields. Holds the raw line.
    #[error("Could not identify device, got {0:?}")]
    Identification(String),
    #[error("Received non-ASCII byte 0x{byte:02X}")]
    Decode { byte: u8 },
    #[error("Could not parse value from reply {0:?}")]
    ValueParse(String),
    #[error("Protocol error: {0}")]
    Protocol(ProtocolError),
    /// Nothing arrived before the read timeout where a line was required.
    #[error("Communication timeout")]
    Timeout,
    #[error("Reply line longer than {capacity} bytes")]
    BufferOverflow { capacity: usize },
    #[error("Value cannot be sent to the device: {0}")]
    InvalidCommand(String),
}

/// The device said something that doesn't fit the exchange in progress.
///
/// After any of these the stream position is unknown, so the channel should be
/// closed and reopened before further use.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("expected echo {expected:?}, got {received:?}")]
    EchoMismatch { expected: String, received: String },
    #[error("unexpected status line {0:?}")]
    UnexpectedStatusLine(String),
    #[error("status report exceeded {max} lines")]
    StatusTooLong { max: usize },
}

impl<I: embedded_io::Error> From<ProtocolError> for Error<I> {
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err)
    }
}
