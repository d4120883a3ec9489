use std::{fmt, str::FromStr};

use super::ProtoError;

/// SCPI commands understood by the U2000 series.
///
/// The `Display` form is the exact text sent on the wire, without
/// the line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Identify,
    Measure,
    // Auto-zero
    ZeroType(ZeroReference),
    ZeroAutoOnce,
    // Display unit
    SetUnit(DisplayUnit),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Identify => f.write_str("*IDN?"),
            Command::Measure => f.write_str("MEASure?"),
            Command::ZeroType(ZeroReference::Internal) => {
                f.write_str("CALibration:ZERO:TYPE INTernal")
            }
            Command::ZeroType(ZeroReference::External) => {
                f.write_str("CALibration:ZERO:TYPE EXTernal")
            }
            Command::ZeroAutoOnce => f.write_str("CALibration:ZERO:AUTO ONCE"),
            Command::SetUnit(DisplayUnit::Dbm) => f.write_str("UNIT:POWer DBM"),
            // The sensor has no milliwatt unit, linear readings come back in Watts.
            Command::SetUnit(DisplayUnit::MilliWatt) => f.write_str("UNIT:POWer W"),
        }
    }
}

/// Reference used for auto-zero calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroReference {
    Internal,
    External,
}

impl fmt::Display for ZeroReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroReference::Internal => f.write_str("internal"),
            ZeroReference::External => f.write_str("external"),
        }
    }
}

impl FromStr for ZeroReference {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "internal" | "int" => Ok(ZeroReference::Internal),
            "external" | "ext" => Ok(ZeroReference::External),
            _ => Err(ProtoError::InvalidArgument(format!(
                "Invalid zero reference {:?}. Use 'internal' or 'external'.",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayUnit {
    Dbm,
    MilliWatt,
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayUnit::Dbm => f.write_str("dBm"),
            DisplayUnit::MilliWatt => f.write_str("mW"),
        }
    }
}

impl FromStr for DisplayUnit {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dbm" => Ok(DisplayUnit::Dbm),
            "mw" => Ok(DisplayUnit::MilliWatt),
            _ => Err(ProtoError::InvalidArgument(format!(
                "Invalid unit {:?}. Use 'mW' or 'dBm'.",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_strings() {
        assert_eq!(Command::Identify.to_string(), "*IDN?");
        assert_eq!(Command::Measure.to_string(), "MEASure?");
        assert_eq!(
            Command::ZeroType(ZeroReference::Internal).to_string(),
            "CALibration:ZERO:TYPE INTernal"
        );
        assert_eq!(
            Command::ZeroType(ZeroReference::External).to_string(),
            "CALibration:ZERO:TYPE EXTernal"
        );
        assert_eq!(Command::ZeroAutoOnce.to_string(), "CALibration:ZERO:AUTO ONCE");
        assert_eq!(Command::SetUnit(DisplayUnit::Dbm).to_string(), "UNIT:POWer DBM");
        assert_eq!(
            Command::SetUnit(DisplayUnit::MilliWatt).to_string(),
            "UNIT:POWer W"
        );
    }

    #[test]
    fn test_unit_case_insensitive() {
        for s in ["dBm", "dbm", "DBM"] {
            assert_eq!(s.parse::<DisplayUnit>().unwrap(), DisplayUnit::Dbm);
        }
        for s in ["mW", "mw", "MW"] {
            assert_eq!(s.parse::<DisplayUnit>().unwrap(), DisplayUnit::MilliWatt);
        }
    }

    #[test]
    fn test_unit_rejects_unknown() {
        for s in ["", "W", "dB", "kW", " dbm", "invalid"] {
            assert!(matches!(
                s.parse::<DisplayUnit>(),
                Err(ProtoError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_zero_reference() {
        assert_eq!(
            "Internal".parse::<ZeroReference>().unwrap(),
            ZeroReference::Internal
        );
        assert_eq!("EXT".parse::<ZeroReference>().unwrap(), ZeroReference::External);
        assert!("both".parse::<ZeroReference>().is_err());
    }
}
