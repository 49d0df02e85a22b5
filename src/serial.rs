//! Opening the KSU's serial device with the `serialport` crate.

use std::time::Duration;

use crate::{config::KsuConfig, error::Error, ksu::Ksu};

/// A `serialport` port, usable as an [embedded_io] interface.
pub struct SerialPort(Box<dyn serialport::SerialPort>);

/// Error type for [SerialPort] reads and writes.
#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::NotConnected => embedded_io::ErrorKind::NotConnected,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            // Some platforms report an expired read timeout as WouldBlock.
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                embedded_io::ErrorKind::TimedOut
            }
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            std::io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            std::io::ErrorKind::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for SerialPort {
    type Error = IoError;
}

impl embedded_io::Read for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for SerialPort {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

impl SerialPort {
    /// Open `path` (e.g. `/dev/ttyACM0` or `COM14`) with the baud rate and
    /// read timeout from `config`.
    pub fn open(path: &str, config: &KsuConfig) -> Result<Self, Error<IoError>> {
        let timeout = Duration::from_millis(config.read_timeout.to_millis().into());
        let port = serialport::new(path, config.baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|e| {
                log::warn!("Failed to open {path}: {e}");
                Error::<IoError>::Connection(e)
            })?;
        log::debug!("Opened {path} at {} baud", config.baud_rate);
        Ok(Self(port))
    }

    pub fn name(&self) -> Option<String> {
        self.0.name()
    }
}

impl Ksu<SerialPort> {
    /// Open the serial device at `path` and identify the KSU on it.
    pub fn connect(path: &str) -> Result<Self, Error<IoError>> {
        Self::connect_with_config(path, KsuConfig::default())
    }

    /// As [Self::connect], with explicit settings.
    pub fn connect_with_config(path: &str, config: KsuConfig) -> Result<Self, Error<IoError>> {
        let port = SerialPort::open(path, &config)?;
        Self::with_config(port, config)
    }
}
