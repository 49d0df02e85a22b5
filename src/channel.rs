//! Newline framed ASCII lines over a byte stream.

use embedded_io::{Error as _, ErrorKind};

use crate::error::{Error, Result};

/// Raw line I/O over any interface which implements [embedded_io::Read] & [embedded_io::Write].
///
/// Lines are read into a fixed `L` byte buffer, so a line (newline included)
/// longer than `L` is an error rather than an allocation.
///
/// The interface's own read timeout bounds every read: a read which reports
/// [ErrorKind::TimedOut] ends the line with whatever has arrived so far.
pub struct LineChannel<S: embedded_io::Read + embedded_io::Write, const L: usize = 128> {
    interface: S,
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> LineChannel<S, L> {
    pub fn new(interface: S) -> Self {
        Self { interface }
    }

    /// Write `content` (if any) followed by a single `\n`.
    pub fn write_line(&mut self, content: Option<&str>) -> Result<(), S::Error> {
        if let Some(content) = content {
            if let Some(bad) = content.chars().find(|c| !c.is_ascii() || *c == '\n' || *c == '\r') {
                return Err(Error::InvalidCommand(format!(
                    "{content:?} contains {bad:?}"
                )));
            }
            log::trace!("-> {content}");
            self.interface
                .write_all(content.as_bytes())
                .map_err(Error::SerialError)?;
        }
        self.interface
            .write_all(b"\n")
            .map_err(Error::SerialError)?;
        self.interface.flush().map_err(Error::SerialError)
    }

    /// Read up to and including the next `\n`.
    ///
    /// On timeout the partial (possibly empty) line is returned. A line with a
    /// non-ASCII byte or one that doesn't fit the buffer is still read to its
    /// end before the error is returned, so the next read starts on a fresh line.
    pub fn read_line(&mut self) -> Result<String, S::Error> {
        let mut buff: heapless::Vec<u8, L> = heapless::Vec::new();
        let mut failure: Option<Error<S::Error>> = None;
        let mut byte = [0u8; 1];

        loop {
            match self.interface.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    let b = byte[0];
                    if failure.is_none() {
                        if !b.is_ascii() {
                            failure = Some(Error::Decode { byte: b });
                        } else if buff.push(b).is_err() {
                            failure = Some(Error::BufferOverflow { capacity: L });
                        }
                    }
                    if b == b'\n' {
                        break;
                    }
                }
                Err(e) => match e.kind() {
                    ErrorKind::TimedOut => {
                        if !buff.is_empty() {
                            log::debug!("Read timed out mid-line after {} bytes", buff.len());
                        }
                        break;
                    }
                    ErrorKind::Interrupted => continue,
                    _ => return Err(Error::SerialError(e)),
                },
            }
        }

        if let Some(err) = failure {
            log::warn!("Discarding unreadable line: {err}");
            return Err(err);
        }

        // Every byte is ASCII at this point.
        let line: String = buff.iter().map(|&b| char::from(b)).collect();
        log::trace!("<- {}", line.trim_end());
        Ok(line)
    }

    /// The underlying interface.
    pub fn interface(&self) -> &S {
        &self.interface
    }

    /// Give back the underlying interface without closing it.
    pub fn into_inner(self) -> S {
        self.interface
    }

    /// Release the underlying interface.
    pub fn close(self) {
        drop(self.interface);
    }
}
