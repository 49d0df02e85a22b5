use crate::{
    channel::LineChannel,
    config::KsuConfig,
    error::{Error, ProtocolError, Result},
    status::{MeasurementValue, StatusLine, StatusRecord},
    types::{Command, Identity, State},
};

/// You can create a Ksu using any interface which implements [embedded_io::Read] & [embedded_io::Write].
///
/// Every operation is one blocking round trip: the command line is written, the
/// device echoes it back, then answers. Operations take `&mut self` because the
/// protocol can't tell interleaved replies apart; wrap the client in a `Mutex`
/// to share it, holding the lock for the whole call.
///
/// Set operations return the value the device confirmed, which may differ from
/// the one requested if the device clamped it.
pub struct Ksu<S: embedded_io::Read + embedded_io::Write, const L: usize = 128> {
    channel: LineChannel<S, L>,
    config: KsuConfig,
    identity: Identity,
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> Ksu<S, L> {
    /// Create a new Ksu on an open interface and check it's really a KSU.
    pub fn new(interface: S) -> Result<Self, S::Error> {
        Self::with_config(interface, KsuConfig::default())
    }

    /// As [Self::new], with explicit settings.
    ///
    /// If identification fails the interface is dropped before returning.
    pub fn with_config(interface: S, config: KsuConfig) -> Result<Self, S::Error> {
        let mut ksu = Self {
            channel: LineChannel::new(interface),
            config,
            identity: Identity::default(),
        };
        ksu.identity = ksu.identify()?;
        log::debug!("Connected to KSU {}", ksu.identity);
        Ok(ksu)
    }

    /// Anything but a clean `id` exchange, including silence, means this isn't a KSU.
    fn identify(&mut self) -> Result<Identity, S::Error> {
        let command = Command::Id.name();
        self.channel.write_line(Some(command))?;
        let echo = self.channel.read_line()?;
        if self.config.verify_echo && echo.trim() != command {
            log::warn!("Expected echo {command:?} while identifying, got {echo:?}");
            return Err(Error::Identification(echo));
        }

        let line = self.channel.read_line()?;
        // An empty or timed out line has no trailing newline.
        let identity = if line.ends_with('\n') {
            Identity::parse(line.trim())
        } else {
            None
        };
        identity.ok_or_else(|| {
            log::warn!("Could not identify device from {line:?}");
            Error::Identification(line)
        })
    }

    /// The identity fields the device reported when connecting.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn config(&self) -> &KsuConfig {
        &self.config
    }

    /// Set the output target voltage in volts. Returns the voltage the device accepted.
    pub fn set_voltage(&mut self, voltage_v: f32) -> Result<f32, S::Error> {
        let line = Command::Voltage.set_line(finite::<S::Error>(voltage_v)?);
        let reply = self.query_last_field(&line)?;
        parse_float(reply)
    }

    /// Get the output target voltage in volts.
    pub fn get_voltage(&mut self) -> Result<f32, S::Error> {
        let reply = self.query_last_field(Command::Voltage.name())?;
        parse_float(reply)
    }

    /// Set the output current limit in amps. Returns the limit the device accepted.
    pub fn set_current_limit(&mut self, current_a: f32) -> Result<f32, S::Error> {
        let line = Command::CurrentLimit.set_line(finite::<S::Error>(current_a)?);
        let reply = self.query_last_field(&line)?;
        parse_float(reply)
    }

    /// Get the output current limit in amps.
    pub fn get_current_limit(&mut self) -> Result<f32, S::Error> {
        let reply = self.query_last_field(Command::CurrentLimit.name())?;
        parse_float(reply)
    }

    /// Close/open the output relay.
    pub fn set_relay(&mut self, state: impl Into<State>) -> Result<bool, S::Error> {
        self.set_switch(Command::Relay, state.into())
    }

    pub fn get_relay(&mut self) -> Result<bool, S::Error> {
        self.get_switch(Command::Relay)
    }

    /// Enable/disable the output.
    pub fn set_output(&mut self, state: impl Into<State>) -> Result<bool, S::Error> {
        self.set_switch(Command::Output, state.into())
    }

    pub fn get_output(&mut self) -> Result<bool, S::Error> {
        self.get_switch(Command::Output)
    }

    /// Enable/disable the front panel key lock.
    pub fn set_lock(&mut self, state: impl Into<State>) -> Result<bool, S::Error> {
        self.set_switch(Command::Lock, state.into())
    }

    pub fn get_lock(&mut self) -> Result<bool, S::Error> {
        self.get_switch(Command::Lock)
    }

    /// Read every measurement the device reports.
    ///
    /// Any line other than a data line or the `end` terminator fails the query,
    /// as does a report longer than [KsuConfig::max_status_lines] or a line cut
    /// short by the read timeout. The stream is out of step after such an
    /// error; close and reconnect before continuing.
    pub fn get_status(&mut self) -> Result<StatusRecord, S::Error> {
        self.send(Command::Status.name())?;

        let mut status = StatusRecord::new();
        let mut data_lines = 0;
        loop {
            let raw = self.channel.read_line()?;
            if !raw.ends_with('\n') {
                log::warn!("Status report stopped after {data_lines} lines, got {raw:?}");
                return Err(Error::Timeout);
            }
            let line = raw.trim();

            match StatusLine::parse(line) {
                Some(StatusLine::End) => break,
                Some(StatusLine::Entry {
                    part,
                    measurement,
                    value,
                }) => {
                    data_lines += 1;
                    if data_lines > self.config.max_status_lines {
                        return Err(ProtocolError::StatusTooLong {
                            max: self.config.max_status_lines,
                        }
                        .into());
                    }
                    let value = MeasurementValue::coerce(measurement, value)
                        .ok_or_else(|| Error::<S::Error>::ValueParse(line.to_owned()))?;
                    status.insert(part, measurement, value);
                }
                None => {
                    return Err(ProtocolError::UnexpectedStatusLine(line.to_owned()).into());
                }
            }
        }

        log::debug!(
            "Status report: {} parts from {data_lines} lines",
            status.len()
        );
        Ok(status)
    }

    /// Release the serial interface.
    pub fn close(self) {
        self.channel.close();
    }

    /// Give back the interface without closing it.
    pub fn into_inner(self) -> S {
        self.channel.into_inner()
    }

    fn set_switch(&mut self, command: Command, state: State) -> Result<bool, S::Error> {
        let reply = self.query_last_field(&command.set_line(state.as_wire()))?;
        Ok(State::from_wire(&reply).into())
    }

    fn get_switch(&mut self, command: Command) -> Result<bool, S::Error> {
        let reply = self.query_last_field(command.name())?;
        Ok(State::from_wire(&reply).into())
    }

    /// Write a command line and consume its echo.
    fn send(&mut self, line: &str) -> Result<(), S::Error> {
        self.channel.write_line(Some(line))?;
        let echo = self.channel.read_line()?;
        if !self.config.verify_echo {
            return Ok(());
        }

        let echo = echo.trim();
        if echo.is_empty() {
            log::warn!("No echo for {line:?}");
            Err(Error::Timeout)
        } else if echo != line {
            log::warn!("Expected echo {line:?}, got {echo:?}");
            Err(ProtocolError::EchoMismatch {
                expected: line.to_owned(),
                received: echo.to_owned(),
            }
            .into())
        } else {
            Ok(())
        }
    }

    /// The scalar round trip: send, then keep the reply's last field.
    fn query_last_field(&mut self, line: &str) -> Result<String, S::Error> {
        self.send(line)?;
        let reply = self.channel.read_line()?;
        if !reply.ends_with('\n') {
            log::warn!("Reply to {line:?} cut short: {reply:?}");
            return Err(Error::Timeout);
        }
        let field = reply.rsplit(',').next().unwrap_or_default().trim();
        Ok(field.to_owned())
    }
}

fn finite<I: embedded_io::Error>(value: f32) -> Result<f32, I> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidCommand(format!("{value} is not a finite number")))
    }
}

fn parse_float<I: embedded_io::Error>(field: String) -> Result<f32, I> {
    field.parse().map_err(|_| Error::ValueParse(field))
}
