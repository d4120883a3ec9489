#![deny(clippy::unwrap_used)]

use clap::{arg, command, value_parser};
use std::io::ErrorKind;
use std::process::exit;
use std::{thread, time::Duration};
use tracing_subscriber::EnvFilter;

use u2000ctrl::measurement::Reading;
use u2000ctrl::proto::{ProtoError, Result};
use u2000ctrl::{
    DisplayUnit, Identity, NativeResourceManager, PowerSensor, SensorConfig, ZeroReference,
    DEFAULT_BAUDRATE, DEFAULT_RESOURCE,
};

fn main() {
    let matches = command!() // requires `cargo` feature
        .arg(
            arg!(
                -r --resource <RESOURCE> "VISA resource of the power sensor"
            )
            .env("U2000_RESOURCE")
            .default_value(DEFAULT_RESOURCE)
            .required(false),
        )
        .arg(arg!(
            -d --debug ... "Turn debugging information on"
        ))
        .arg(
            arg!(
                -b --baudrate <BAUDRATE> "Baudrate for serial resources"
            )
            .default_value(DEFAULT_BAUDRATE.to_string())
            .value_parser(value_parser!(u32)),
        )
        .arg(
            arg!(
                -t --timeout <MS> "Response timeout in milliseconds"
            )
            .default_value("5000")
            .value_parser(value_parser!(u64)),
        )
        .arg(
            arg!(
                --settle <SECONDS> "Time to wait for auto-zero to finish"
            )
            .default_value("5")
            .value_parser(value_parser!(u64)),
        )
        .subcommand(clap::Command::new("ident").about("Sensor identification"))
        .subcommand(
            clap::Command::new("measure")
                .about("Measure power")
                .arg(
                    arg!(-u --unit <UNIT> "Display unit, dBm or mW")
                        .default_value("dBm")
                        .value_parser(value_parser!(DisplayUnit)),
                )
                .arg(
                    arg!(-n --count <COUNT> "Number of readings, 0 runs until interrupted")
                        .default_value("1")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    arg!(-i --interval <MS> "Delay between readings in milliseconds")
                        .default_value("1000")
                        .value_parser(value_parser!(u64)),
                ),
        )
        .subcommand(
            clap::Command::new("calibrate").about("Auto-zero calibration").arg(
                arg!(<reference> "Zero reference, internal or external")
                    .value_parser(value_parser!(ZeroReference)),
            ),
        )
        .subcommand(
            clap::Command::new("unit")
                .about("Display unit")
                .arg(arg!(<unit> "Set display unit, dBm or mW").value_parser(value_parser!(DisplayUnit))),
        )
        .subcommand_required(true)
        .get_matches();

    init_logging(matches.get_count("debug"));

    let resource = matches
        .get_one::<String>("resource")
        .map(String::as_str)
        .unwrap_or(DEFAULT_RESOURCE);

    match handle_args(resource, &matches) {
        Ok(()) => {}
        Err(e) => {
            match e {
                ProtoError::Serial(err) => {
                    if err.kind() == tokio_serial::ErrorKind::NoDevice
                        || matches!(err.kind(), tokio_serial::ErrorKind::Io(ErrorKind::NotFound))
                    {
                        eprintln!("{}: File not found", resource);
                    } else {
                        eprintln!("I/O Error: {} [resource: {}]", err, resource);
                    }
                }
                ProtoError::Io(err) => {
                    if err.kind() == ErrorKind::NotFound {
                        eprintln!("{}: File not found", resource);
                    } else {
                        eprintln!("I/O Error: {} [resource: {}]", err, resource);
                    }
                }
                ProtoError::Connection { resource, reason } => {
                    eprintln!("Unable to connect to {}: {}", resource, reason);
                }
                ProtoError::Timeout(timeout) => {
                    eprintln!(
                        "Sensor did not respond within {} ms, is it connected and powered?",
                        timeout.as_millis()
                    );
                }
                ProtoError::Abort | ProtoError::Closed => {
                    eprintln!("Failed to communicate with sensor, aborting!");
                }
                ProtoError::InvalidArgument(msg) => {
                    eprintln!("{}", msg);
                }
                ProtoError::Parse { response, .. } => {
                    eprintln!(
                        "Received an unexpected response from sensor: {:?}, aborting!",
                        response
                    );
                }
            }
            exit(-1);
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_args(resource: &str, matches: &clap::ArgMatches) -> Result<()> {
    let baud_rate = matches
        .get_one::<u32>("baudrate")
        .unwrap_or(&DEFAULT_BAUDRATE);
    let defaults = SensorConfig::default();
    let config = defaults
        .with_command_timeout(
            matches
                .get_one::<u64>("timeout")
                .map(|ms| Duration::from_millis(*ms))
                .unwrap_or(defaults.command_timeout),
        )
        .with_settle_duration(
            matches
                .get_one::<u64>("settle")
                .map(|secs| Duration::from_secs(*secs))
                .unwrap_or(defaults.settle_duration),
        );

    let rm = NativeResourceManager::new()?.with_baud_rate(*baud_rate);
    let mut sensor = PowerSensor::with_manager(rm, resource, config)?;

    let result = sensor
        .identify()
        .map(|ident| eprintln!("Connected to: {}\n", ident))
        .and_then(|()| run(&mut sensor, matches));
    let closed = sensor.close();
    result.and(closed)
}

fn run(sensor: &mut PowerSensor, matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        // Sensor ID
        Some(("ident", _args)) => {
            let ident = sensor.identify()?;
            match ident.parse::<Identity>() {
                Ok(id) => {
                    println!("Manufacturer: {}", id.manufacturer);
                    println!("Model: {}", id.model);
                    println!("Serial: {}", id.serial);
                    println!("Firmware: {}", id.firmware);
                }
                Err(_) => println!("Identity: {}", ident),
            }
        }
        // Power measurement
        Some(("measure", args)) => {
            let unit = *args
                .get_one::<DisplayUnit>("unit")
                .unwrap_or(&DisplayUnit::Dbm);
            let count = *args.get_one::<u64>("count").unwrap_or(&1);
            let interval = Duration::from_millis(*args.get_one::<u64>("interval").unwrap_or(&1000));

            sensor.set_unit(unit)?;
            let mut taken = 0;
            loop {
                let reading = Reading::from_raw(sensor.measure_power()?, unit);
                println!("{}  {}", reading.pretty_ts(), reading);
                taken += 1;
                if count != 0 && taken >= count {
                    break;
                }
                thread::sleep(interval);
            }
        }
        // Auto-zero
        Some(("calibrate", args)) => {
            let reference = *args
                .get_one::<ZeroReference>("reference")
                .unwrap_or(&ZeroReference::Internal);
            eprintln!(
                "Running {} auto-zero, waiting {} s ...",
                reference,
                sensor.config().settle_duration.as_secs()
            );
            sensor.calibrate_zero(reference)?;
            match reference {
                ZeroReference::Internal => println!("Internal calibration completed."),
                ZeroReference::External => println!("External calibration completed."),
            }
        }
        // Display unit
        Some(("unit", args)) => {
            if let Some(unit) = args.get_one::<DisplayUnit>("unit") {
                sensor.set_unit(*unit)?;
                println!("OK");
            }
        }
        _ => {
            unreachable!("subcommand is required")
        }
    }

    Ok(())
}
