use std::{thread, time::Duration};

use u2000ctrl::{DisplayUnit, PowerSensor, SensorConfig, DEFAULT_RESOURCE};

fn main() -> u2000ctrl::Result<()> {
    let mut sensor = PowerSensor::with_manager(
        u2000ctrl::NativeResourceManager::new()?,
        DEFAULT_RESOURCE,
        SensorConfig::default(),
    )?;

    // Zero against the internal reference before taking readings.
    sensor.calibrate_zero_internal()?;

    loop {
        // Each reading carries the unit it was scaled for.
        let reading = sensor.read(DisplayUnit::MilliWatt)?;
        println!("{}  {}", reading.pretty_ts(), reading);
        thread::sleep(Duration::from_millis(500));
    }
}
