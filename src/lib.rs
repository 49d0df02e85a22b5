//! This crate provides an interface for communicating with and controlling the KSU benchtop power supply.
//!
//! The KSU speaks a line based ASCII protocol over its USB serial port. Every
//! command is a line; the device echoes it, then answers:
//!
//! ```text
//! -> vset,5
//! <- vset,5
//! <- vset,5.00
//! ```
//!
//! A bare name (`vset`) queries a value, `name,value` sets it. `status` is
//! answered with a multi-line report terminated by an `end` line, see
//! [status].
//!
//! The serial port should be configured like so:
//! * Baud rate: 115200
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//!
//! With the default `serialport` feature, [Ksu::connect] does this for you:
//!
//! ```no_run
//! use ksu::Ksu;
//!
//! let mut ksu = Ksu::connect("/dev/ttyACM0")?;
//! ksu.set_voltage(5.0)?;
//! ksu.set_current_limit(1.0)?;
//! ksu.set_output(true)?;
//!
//! let status = ksu.get_status()?;
//! println!("{:?}", status.value("ina228", "vout"));
//! # Ok::<(), ksu::error::Error<ksu::serial::IoError>>(())
//! ```
//!
//! Any other [embedded_io::Read] + [embedded_io::Write] interface works through [Ksu::new].

pub mod channel;
pub mod config;
pub mod error;
pub mod ksu;
#[cfg(feature = "serialport")]
pub mod serial;
pub mod status;
pub mod types;

pub use crate::{
    config::KsuConfig,
    error::{Error, ProtocolError},
    ksu::Ksu,
    status::{MeasurementValue, StatusRecord},
    types::State,
};

#[cfg(test)]
mod mock_serial;
