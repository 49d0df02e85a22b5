//! This module contains the command names and value types of the KSU line protocol.

use core::fmt::Display;

use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// Every command the KSU understands.
///
/// Sent bare it is a query; sent as `name,value` it is a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum Command {
    /// Identity record, queried once at connection time.
    #[strum(serialize = "id")]
    Id,
    /// Output target voltage in volts.
    #[strum(serialize = "vset")]
    Voltage,
    /// Output current limit in amps.
    #[strum(serialize = "iset")]
    CurrentLimit,
    #[strum(serialize = "relay")]
    Relay,
    #[strum(serialize = "output")]
    Output,
    /// Front panel key lock.
    #[strum(serialize = "lock")]
    Lock,
    /// Multi-line measurement report, terminated by an `end` line.
    #[strum(serialize = "status")]
    Status,
}

impl Command {
    /// The command name as written on the wire.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Build the `name,value` line that sets this command's value.
    pub fn set_line(self, value: impl Display) -> String {
        format!("{},{}", self.name(), value)
    }
}

/// Measurements with a known value type in a status report.
///
/// Anything else the device reports is kept as its raw string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Measurement {
    /// Output voltage.
    Vout,
    /// Output current.
    Iout,
    /// Temperature.
    Temp,
    /// Short circuit protection tripped.
    Scp,
    /// Over-current protection tripped.
    Ocp,
    /// Over-voltage protection tripped.
    Ovp,
}

impl Measurement {
    /// Whether this measurement is a protection flag rather than a reading.
    pub fn is_flag(self) -> bool {
        matches!(self, Measurement::Scp | Measurement::Ocp | Measurement::Ovp)
    }
}

/// Used to be less ambiguous about whether something is on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum State {
    /// Disabled.
    Off,
    /// Enabled.
    On,
}

impl State {
    /// The value as written on the wire.
    pub fn as_wire(self) -> &'static str {
        match self {
            State::Off => "off",
            State::On => "on",
        }
    }

    /// Interpret a reply field. Only an exact `on` counts as on.
    pub fn from_wire(field: &str) -> Self {
        State::from(field == "on")
    }
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

/// The four fields the device answers `id` with.
///
/// Only their count is checked; what they contain is up to the firmware.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Identity {
    fields: [String; 4],
}

impl Identity {
    /// Split an identity line, returning `None` unless it has exactly four fields.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split(',');
        let fields = [
            parts.next()?.to_owned(),
            parts.next()?.to_owned(),
            parts.next()?.to_owned(),
            parts.next()?.to_owned(),
        ];
        match parts.next() {
            Some(_) => None,
            None => Some(Self { fields }),
        }
    }

    pub fn fields(&self) -> &[String; 4] {
        &self.fields
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.fields.join(","))
    }
}
