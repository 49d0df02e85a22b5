//! Command line control of a KSU.
//!
//! Each flag given without a value queries the setting, with a value it sets it
//! and prints what the device confirmed. `--status` prints one JSON object per
//! report.

use std::{error::Error, thread, time::Duration};

use clap::{CommandFactory, Parser, ValueEnum};
use ksu::{Ksu, State};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl From<Switch> for State {
    fn from(value: Switch) -> Self {
        match value {
            Switch::On => State::On,
            Switch::Off => State::Off,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ksu", about = "Control a KSU power supply over its serial port")]
struct Cli {
    /// Path to/name of serial device created by the KSU, e.g. /dev/ttyACM0 or COM14
    #[arg(short, long)]
    device: String,

    /// Query the target voltage, or set it to VOLTS
    #[arg(short, long, value_name = "VOLTS", num_args = 0..=1)]
    voltage: Option<Option<f32>>,

    /// Query the current limit, or set it to AMPS
    #[arg(short = 'i', long, value_name = "AMPS", num_args = 0..=1)]
    current_limit: Option<Option<f32>>,

    /// Query the output state, or switch it
    #[arg(short, long, num_args = 0..=1)]
    output: Option<Option<Switch>>,

    /// Query the relay state, or switch it
    #[arg(short, long, num_args = 0..=1)]
    relay: Option<Option<Switch>>,

    /// Query the key lock state, or switch it
    #[arg(short, long, num_args = 0..=1)]
    lock: Option<Option<Switch>>,

    /// Print status reports, COUNT times or until killed
    #[arg(short, long, value_name = "COUNT", num_args = 0..=1)]
    status: Option<Option<u64>>,

    /// Delay between status reports in seconds
    #[arg(short = 't', long, default_value_t = 1.0, value_parser = parse_interval)]
    status_interval: f64,
}

impl Cli {
    fn has_action(&self) -> bool {
        self.voltage.is_some()
            || self.current_limit.is_some()
            || self.output.is_some()
            || self.relay.is_some()
            || self.lock.is_some()
            || self.status.is_some()
    }
}

fn parse_interval(s: &str) -> Result<f64, String> {
    let seconds: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if seconds.is_finite() && seconds >= 0.0 && seconds <= u32::MAX as f64 {
        Ok(seconds)
    } else {
        Err(format!("{s} is not a usable number of seconds"))
    }
}

fn on_off(state: bool) -> &'static str {
    State::from(state).as_wire()
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !cli.has_action() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let mut ksu = Ksu::connect(&cli.device)?;

    match cli.voltage {
        Some(Some(volts)) => println!("{}", ksu.set_voltage(volts)?),
        Some(None) => println!("{}", ksu.get_voltage()?),
        None => {}
    }

    match cli.current_limit {
        Some(Some(amps)) => println!("{}", ksu.set_current_limit(amps)?),
        Some(None) => println!("{}", ksu.get_current_limit()?),
        None => {}
    }

    match cli.output {
        Some(Some(switch)) => println!("{}", on_off(ksu.set_output(switch)?)),
        Some(None) => println!("{}", on_off(ksu.get_output()?)),
        None => {}
    }

    match cli.relay {
        Some(Some(switch)) => println!("{}", on_off(ksu.set_relay(switch)?)),
        Some(None) => println!("{}", on_off(ksu.get_relay()?)),
        None => {}
    }

    match cli.lock {
        Some(Some(switch)) => println!("{}", on_off(ksu.set_lock(switch)?)),
        Some(None) => println!("{}", on_off(ksu.get_lock()?)),
        None => {}
    }

    if let Some(count) = cli.status {
        let interval = Duration::from_secs_f64(cli.status_interval);
        let mut i = 0;
        while count.is_none_or(|count| i < count) {
            if i != 0 {
                thread::sleep(interval);
            }
            println!("{}", serde_json::to_string(&ksu.get_status()?)?);
            i += 1;
        }
    }

    Ok(())
}
