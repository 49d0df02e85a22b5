use std::env;

use inquire::Select;
use ksu::{Ksu, MeasurementValue};

// Configuration constants - adjust these for your setup
const OUTPUT_VOLTAGE_V: f32 = 5.0;
const CURRENT_LIMIT_A: f32 = 1.0;
const POLL_INTERVAL_MS: u64 = 1000;
/// The part whose readings are printed.
const PART: &str = "ina228";

fn main() {
    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    println!("Using port: {}", port_name);

    let mut ksu = Ksu::connect(&port_name).expect("Failed to connect to KSU");
    println!("Connected to: {}", ksu.identity());

    let voltage = ksu.set_voltage(OUTPUT_VOLTAGE_V).unwrap();
    println!("Set output voltage to {}V", voltage);

    let current = ksu.set_current_limit(CURRENT_LIMIT_A).unwrap();
    println!("Set current limit to {}A", current);

    ksu.set_relay(true).unwrap();
    ksu.set_output(true).unwrap();
    println!("Output enabled");

    loop {
        let status = ksu.get_status().unwrap();
        let reading = |measurement| {
            status
                .value(PART, measurement)
                .and_then(MeasurementValue::as_f32)
                .unwrap_or(f32::NAN)
        };
        println!("V: {}, I: {}", reading("vout"), reading("iout"));

        std::thread::sleep(std::time::Duration::from_millis(POLL_INTERVAL_MS));
    }
}
