use std::{fmt, str::FromStr};

use chrono::{DateTime, Local};

use crate::proto::{command::DisplayUnit, ProtoError};

/// A power reading prepared for presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub value: f64,
    pub unit: DisplayUnit,
    pub timestamp: DateTime<Local>,
}

impl Reading {
    /// Build a reading from a raw `MEASure?` value.
    ///
    /// Selecting mW makes the sensor report Watts, so the raw value is
    /// scaled by 1000. dBm values are taken as they are.
    pub fn from_raw(raw: f64, unit: DisplayUnit) -> Self {
        let value = match unit {
            DisplayUnit::Dbm => raw,
            DisplayUnit::MilliWatt => raw * 1000.0,
        };
        Self {
            value,
            unit,
            timestamp: Local::now(),
        }
    }

    pub fn pretty_ts(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} {}", self.value, self.unit)
    }
}

/// Fields of an `*IDN?` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub manufacturer: String,
    pub model: String,
    pub serial: String,
    pub firmware: String,
}

impl FromStr for Identity {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(',').map(str::trim).collect();
        match fields.as_slice() {
            [manufacturer, model, serial, firmware] => Ok(Self {
                manufacturer: manufacturer.to_string(),
                model: model.to_string(),
                serial: serial.to_string(),
                firmware: firmware.to_string(),
            }),
            _ => Err(ProtoError::InvalidArgument(format!(
                "Malformed identity string: {:?}",
                s
            ))),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.manufacturer, self.model, self.serial, self.firmware
        )
    }
}
