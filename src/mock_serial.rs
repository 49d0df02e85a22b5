//! We use this mocking module in unit tests to emulate the KSU's serial port.
//!
//! Replies are scripted up front: the mock doesn't interpret what is written
//! to it, it just hands out the queued bytes and records everything written.

use std::{cell::Cell, rc::Rc};

const CAPACITY: usize = 1024;

/// Our mock type used to emulate a serial port.
pub struct MockSerial {
    /// Buffer to store data written to the mock serial port
    write_buffer: heapless::Vec<u8, CAPACITY>,
    /// Buffer containing pre-configured response data to be read
    read_buffer: heapless::Vec<u8, CAPACITY>,
    /// Current position in the read buffer
    read_position: usize,
    /// Flag to simulate write errors
    should_error_on_write: bool,
    /// Flag to simulate read errors
    should_error_on_read: bool,
    /// Set once the mock is dropped, if a test asked to watch for that
    dropped: Option<Rc<Cell<bool>>>,
}

impl Drop for MockSerial {
    fn drop(&mut self) {
        if let Some(dropped) = &self.dropped {
            dropped.set(true);
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MockSerialError {
    /// Nothing left to read, as a real port reports after its read timeout.
    Timeout,
    /// Simulated buffer overflow
    BufferOverflow,
    /// Generic simulated error for testing
    SimulatedError,
}

impl core::fmt::Display for MockSerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl core::error::Error for MockSerialError {}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::Timeout => embedded_io::ErrorKind::TimedOut,
            MockSerialError::BufferOverflow => embedded_io::ErrorKind::OutOfMemory,
            MockSerialError::SimulatedError => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }

        self.write_buffer
            .extend_from_slice(buf)
            .map_err(|_| MockSerialError::BufferOverflow)?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }

        if self.read_position >= self.read_buffer.len() {
            return Err(MockSerialError::Timeout);
        }

        let available_bytes = self.read_buffer.len() - self.read_position;
        let bytes_to_read = core::cmp::min(buf.len(), available_bytes);

        buf[..bytes_to_read].copy_from_slice(
            &self.read_buffer[self.read_position..self.read_position + bytes_to_read],
        );

        self.read_position += bytes_to_read;
        Ok(bytes_to_read)
    }
}

impl MockSerial {
    /// Create a new MockSerial instance with empty buffers
    pub fn new() -> Self {
        Self {
            write_buffer: heapless::Vec::new(),
            read_buffer: heapless::Vec::new(),
            read_position: 0,
            should_error_on_write: false,
            should_error_on_read: false,
            dropped: None,
        }
    }

    /// Create a mock which will answer with these lines, each `\n` terminated.
    pub fn with_lines(lines: &[&str]) -> Self {
        let mut mock = Self::new();
        mock.queue_lines(lines)
            .expect("scripted lines exceed mock capacity");
        mock
    }

    /// Replace the data that will be returned when read() is called
    pub fn set_read_data(&mut self, data: &[u8]) -> Result<(), MockSerialError> {
        self.read_buffer.clear();
        self.read_position = 0;
        self.read_buffer
            .extend_from_slice(data)
            .map_err(|_| MockSerialError::BufferOverflow)
    }

    /// Append lines to the data still waiting to be read.
    pub fn queue_lines(&mut self, lines: &[&str]) -> Result<(), MockSerialError> {
        for line in lines {
            self.read_buffer
                .extend_from_slice(line.as_bytes())
                .map_err(|_| MockSerialError::BufferOverflow)?;
            self.read_buffer
                .push(b'\n')
                .map_err(|_| MockSerialError::BufferOverflow)?;
        }
        Ok(())
    }

    /// Append raw bytes, e.g. a line the device never finished.
    pub fn queue_bytes(&mut self, data: &[u8]) -> Result<(), MockSerialError> {
        self.read_buffer
            .extend_from_slice(data)
            .map_err(|_| MockSerialError::BufferOverflow)
    }

    /// Returns a flag which turns true when this mock is dropped.
    pub fn track_drop(&mut self) -> Rc<Cell<bool>> {
        let dropped = Rc::new(Cell::new(false));
        self.dropped = Some(dropped.clone());
        dropped
    }

    /// Get a reference to the data that was written to this mock serial port
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// Number of scripted bytes not read yet.
    pub fn unread(&self) -> usize {
        self.read_buffer.len() - self.read_position
    }

    /// Configure whether write operations should fail with an error
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether read operations should fail with an error
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Error, Read, Write};

    #[test]
    fn test_new_mock_serial() {
        let mock = MockSerial::new();
        assert_eq!(mock.written_data().len(), 0);
        assert_eq!(mock.unread(), 0);
        assert!(!mock.should_error_on_write);
        assert!(!mock.should_error_on_read);
    }

    #[test]
    fn test_write_multiple_times() {
        let mut mock = MockSerial::new();
        mock.write(b"vset,").unwrap();
        mock.write(b"5\n").unwrap();
        assert_eq!(mock.written_data(), b"vset,5\n");
    }

    #[test]
    fn test_write_buffer_overflow() {
        let mut mock = MockSerial::new();
        let large_data = vec![0u8; CAPACITY + 1];

        let result = mock.write(&large_data);
        assert_eq!(result, Err(MockSerialError::BufferOverflow));
    }

    #[test]
    fn test_queued_lines_are_newline_terminated() {
        let mut mock = MockSerial::with_lines(&["id", "KSU,a,b,c"]);
        let mut buffer = [0u8; 32];
        let n = mock.read(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"id\nKSU,a,b,c\n");
    }

    #[test]
    fn test_queue_lines_appends() {
        let mut mock = MockSerial::with_lines(&["first"]);
        mock.queue_lines(&["second"]).unwrap();
        assert_eq!(mock.unread(), "first\nsecond\n".len());
    }

    #[test]
    fn test_queue_bytes_unterminated() {
        let mut mock = MockSerial::with_lines(&["vset"]);
        mock.queue_bytes(b"vset,12").unwrap();
        let mut buffer = [0u8; 32];
        let n = mock.read(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], b"vset\nvset,12");
    }

    #[test]
    fn test_track_drop() {
        let mut mock = MockSerial::new();
        let dropped = mock.track_drop();
        assert!(!dropped.get());
        drop(mock);
        assert!(dropped.get());
    }

    #[test]
    fn test_read_partial_data() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"Long response data").unwrap();

        let mut buffer = [0u8; 5];
        assert_eq!(mock.read(&mut buffer), Ok(5));
        assert_eq!(&buffer, b"Long ");
        assert_eq!(mock.unread(), 13);
    }

    #[test]
    fn test_read_timeout_after_data_exhausted() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"Hi").unwrap();

        let mut buffer = [0u8; 10];
        assert!(mock.read(&mut buffer).is_ok());

        let result = mock.read(&mut buffer);
        assert_eq!(result, Err(MockSerialError::Timeout));
        assert_eq!(
            MockSerialError::Timeout.kind(),
            embedded_io::ErrorKind::TimedOut
        );
    }

    #[test]
    fn test_error_flags_toggle() {
        let mut mock = MockSerial::new();

        mock.set_write_error(true);
        assert_eq!(mock.write(b"test"), Err(MockSerialError::SimulatedError));
        assert_eq!(mock.flush(), Err(MockSerialError::SimulatedError));
        assert!(mock.written_data().is_empty());

        mock.set_write_error(false);
        assert!(mock.write(b"test").is_ok());

        mock.set_read_data(b"data").unwrap();
        mock.set_read_error(true);

        let mut buffer = [0u8; 10];
        assert_eq!(mock.read(&mut buffer), Err(MockSerialError::SimulatedError));

        mock.set_read_error(false);
        assert!(mock.read(&mut buffer).is_ok());
    }
}
