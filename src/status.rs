//! Status report lines and the record they are assembled into.
//!
//! A `status` query answers with any number of data lines followed by a
//! terminator:
//!
//! ```text
//! 1,ina228,vout,5.0
//! 1,ina228,iout,0.5
//! 1,protect,scp,0
//! 1,end
//! ```
//!
//! The first field of every line carries no meaning for the host. Data lines
//! name a part (a rail or sub-circuit), a measurement and its value.

use core::str::FromStr;

use crate::types::Measurement;

/// One classified line of a status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine<'a> {
    Entry {
        part: &'a str,
        measurement: &'a str,
        value: &'a str,
    },
    End,
}

impl<'a> StatusLine<'a> {
    /// Classify an already trimmed line. Returns `None` for any other shape.
    pub fn parse(line: &'a str) -> Option<Self> {
        let fields: heapless::Vec<&str, 4> = {
            let mut fields = heapless::Vec::new();
            for field in line.split(',') {
                fields.push(field).ok()?;
            }
            fields
        };

        match *fields.as_slice() {
            [_, "end"] => Some(StatusLine::End),
            [_, part, measurement, value] => Some(StatusLine::Entry {
                part,
                measurement,
                value,
            }),
            _ => None,
        }
    }
}

/// A single measurement value, typed by its measurement name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum MeasurementValue {
    /// `vout`, `iout` and `temp`.
    Float(f32),
    /// `scp`, `ocp` and `ovp`.
    Flag(bool),
    /// Anything the client has no type for, untouched.
    Raw(String),
}

impl MeasurementValue {
    /// Type a raw value according to the measurement it belongs to.
    ///
    /// Returns `None` when a known measurement carries a value of the wrong type.
    pub fn coerce(measurement: &str, raw: &str) -> Option<Self> {
        match Measurement::from_str(measurement) {
            Ok(m) if m.is_flag() => parse_flag(raw).map(MeasurementValue::Flag),
            Ok(_) => raw.trim().parse().ok().map(MeasurementValue::Float),
            Err(_) => Some(MeasurementValue::Raw(raw.to_owned())),
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            MeasurementValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MeasurementValue::Flag(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            MeasurementValue::Raw(value) => Some(value),
            _ => None,
        }
    }
}

/// Protection flags are reported as `1`/`0`; `true`/`false` and `on`/`off`
/// are accepted as well, in any case.
fn parse_flag(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if ["1", "true", "on"].iter().any(|t| raw.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if ["0", "false", "off"].iter().any(|f| raw.eq_ignore_ascii_case(f)) {
        Some(false)
    } else {
        None
    }
}

/// The measurements reported for one part, in the order the device sent them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartStatus {
    name: String,
    measurements: Vec<(String, MeasurementValue)>,
}

impl PartStatus {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, measurement: &str) -> Option<&MeasurementValue> {
        self.measurements
            .iter()
            .find(|(name, _)| name == measurement)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MeasurementValue)> {
        self.measurements
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    fn insert(&mut self, measurement: &str, value: MeasurementValue) {
        match self.measurements.iter_mut().find(|(name, _)| name == measurement) {
            Some((_, slot)) => *slot = value,
            None => self.measurements.push((measurement.to_owned(), value)),
        }
    }
}

/// Everything one `status` query reported, grouped by part.
///
/// Parts appear in first-seen order. A measurement reported twice for the
/// same part keeps the later value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusRecord {
    parts: Vec<PartStatus>,
}

impl StatusRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, part: &str) -> Option<&PartStatus> {
        self.parts.iter().find(|p| p.name == part)
    }

    /// Shorthand for looking up one measurement of one part.
    pub fn value(&self, part: &str, measurement: &str) -> Option<&MeasurementValue> {
        self.get(part)?.get(measurement)
    }

    pub fn parts(&self) -> impl Iterator<Item = &PartStatus> {
        self.parts.iter()
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Store a value, creating the part on first encounter.
    pub fn insert(&mut self, part: &str, measurement: &str, value: MeasurementValue) {
        let index = match self.parts.iter().position(|p| p.name == part) {
            Some(index) => index,
            None => {
                self.parts.push(PartStatus {
                    name: part.to_owned(),
                    measurements: Vec::new(),
                });
                self.parts.len() - 1
            }
        };
        self.parts[index].insert(measurement, value);
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PartStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for StatusRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.parts.iter().map(|p| (p.name.as_str(), p)))
    }
}
