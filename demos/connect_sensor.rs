use u2000ctrl::{PowerSensor, DEFAULT_RESOURCE};

fn main() -> u2000ctrl::Result<()> {
    let resource = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_RESOURCE.to_string());
    let mut sensor = PowerSensor::new(&resource)?;
    eprintln!("Connected to: {}\n", sensor.identify()?);
    sensor.close()
}
