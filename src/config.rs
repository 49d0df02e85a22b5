//! Connection and client settings.

use fugit::MillisDurationU32;

/// Baud rate the KSU's USB serial interface runs at.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Per-read timeout. A line that hasn't completed by then is returned as is.
pub const DEFAULT_READ_TIMEOUT: MillisDurationU32 = MillisDurationU32::millis(500);
/// The device reports a handful of parts with a few measurements each.
pub const DEFAULT_MAX_STATUS_LINES: usize = 64;

/// Settings for a [`Ksu`](crate::ksu::Ksu) client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KsuConfig {
    /// Only used when the client opens the serial port itself.
    pub baud_rate: u32,
    /// Only used when the client opens the serial port itself.
    pub read_timeout: MillisDurationU32,
    /// Most data lines accepted from one status report before giving up.
    pub max_status_lines: usize,
    /// Compare each echo line against the command that was sent.
    pub verify_echo: bool,
}

impl Default for KsuConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_status_lines: DEFAULT_MAX_STATUS_LINES,
            verify_echo: true,
        }
    }
}

impl KsuConfig {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: MillisDurationU32) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_max_status_lines(mut self, max_status_lines: usize) -> Self {
        self.max_status_lines = max_status_lines;
        self
    }

    pub fn with_verify_echo(mut self, verify_echo: bool) -> Self {
        self.verify_echo = verify_echo;
        self
    }
}
