//!
//! This library provides control of Keysight U2000 series USB power sensors
//! over SCPI.
//!
//! <br>
//!
//! # Details
//!
//! - The driver talks to the sensor through a [`Session`] opened by a
//!   [`ResourceManager`]. The bundled [`NativeResourceManager`] handles serial
//!   ports and raw SCPI sockets; a VISA binding can implement the same traits
//!   for USBTMC access.
//!
//! - Basic setup and connection
//!
//!   ```no_run
//!   use u2000ctrl::{PowerSensor, DEFAULT_RESOURCE};
//!   fn main() -> u2000ctrl::Result<()> {
//!       let mut sensor = PowerSensor::new(DEFAULT_RESOURCE)?;
//!       eprintln!("Connected to: {}\n", sensor.identify()?);
//!       sensor.set_display_unit("dBm")?;
//!       println!("{} dBm", sensor.measure_power()?);
//!       sensor.close()
//!   }
//!   ```
//!
//! - Selecting `mW` makes the sensor report linear power in Watts. Use
//!   [`PowerSensor::read`] or [`Reading::from_raw`] to get milliwatts.
//!
//! - All calls block. Do not call the driver from inside an async runtime.
//!
//! # Supported devices
//!
//!  * Keysight U2000 series (U2000A/B/H, U2001A/B/H, U2002A/H, U2004A)
//!

pub mod device;
pub mod measurement;
pub mod proto;
pub mod session;
pub mod transport;

pub use device::{PowerSensor, SensorConfig};
pub use measurement::{Identity, Reading};
pub use proto::command::{DisplayUnit, ZeroReference};
pub use proto::{ProtoError, Result};
pub use session::{ResourceManager, Session};
pub use transport::NativeResourceManager;

#[cfg(unix)]
pub const DEFAULT_RESOURCE: &str = "ASRL/dev/ttyUSB0::INSTR";
#[cfg(windows)]
pub const DEFAULT_RESOURCE: &str = "ASRL1::INSTR";

/// Default Baudrate for serial resources.
pub const DEFAULT_BAUDRATE: u32 = 9600;
