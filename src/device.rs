use std::{thread, time::Duration};
use tracing::{debug, info};

use crate::measurement::Reading;
use crate::proto::{
    command::{Command, DisplayUnit, ZeroReference},
    ProtoError, Result,
};
use crate::session::{ResourceManager, Session};
use crate::transport::NativeResourceManager;

/// Timeouts and waits applied by [`PowerSensor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorConfig {
    /// Applied to the resource manager before the session is opened.
    pub management_timeout: Duration,
    /// Applied to the session right after it was opened.
    pub command_timeout: Duration,
    /// Time the sensor needs to finish an auto-zero run.
    pub settle_duration: Duration,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            management_timeout: Duration::from_millis(1000),
            command_timeout: Duration::from_millis(5000),
            settle_duration: Duration::from_secs(5),
        }
    }
}

impl SensorConfig {
    pub fn with_management_timeout(mut self, timeout: Duration) -> Self {
        self.management_timeout = timeout;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_settle_duration(mut self, duration: Duration) -> Self {
        self.settle_duration = duration;
        self
    }
}

/// Driver for a Keysight U2000 series USB power sensor.
///
/// Owns one session for its whole lifetime. All operations block until
/// the exchange with the sensor is complete. [`close`](Self::close)
/// consumes the driver, so no operation can follow it.
pub struct PowerSensor<M: ResourceManager = NativeResourceManager> {
    rm: M,
    session: M::Session,
    config: SensorConfig,
}

impl PowerSensor<NativeResourceManager> {
    /// Open `resource` with the native transports and default settings.
    pub fn new(resource: impl AsRef<str>) -> Result<Self> {
        Self::with_manager(NativeResourceManager::new()?, resource, SensorConfig::default())
    }
}

impl<M: ResourceManager> PowerSensor<M> {
    pub fn with_manager(mut rm: M, resource: impl AsRef<str>, config: SensorConfig) -> Result<Self> {
        rm.set_timeout(config.management_timeout);
        let mut session = rm.open_resource(resource.as_ref())?;
        session.set_timeout(config.command_timeout);
        info!(resource = resource.as_ref(), "connected to power sensor");

        Ok(Self {
            rm,
            session,
            config,
        })
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    fn send(&mut self, command: Command) -> Result<()> {
        debug!(%command, "write");
        self.session.write(&command.to_string())
    }

    fn query(&mut self, command: Command) -> Result<String> {
        debug!(%command, "query");
        let response = self.session.query(&command.to_string())?;
        Ok(response.trim().to_string())
    }

    /// Identity string, `<manufacturer>,<model>,<serial>,<firmware>`.
    pub fn identify(&mut self) -> Result<String> {
        self.query(Command::Identify)
    }

    /// One power reading in the unit last selected with
    /// [`set_display_unit`](Self::set_display_unit): dBm, or Watts
    /// after selecting mW.
    pub fn measure_power(&mut self) -> Result<f64> {
        let response = self.query(Command::Measure)?;
        response
            .parse::<f64>()
            .map_err(|source| ProtoError::Parse { response, source })
    }

    pub fn calibrate_zero_internal(&mut self) -> Result<()> {
        self.calibrate_zero(ZeroReference::Internal)
    }

    pub fn calibrate_zero_external(&mut self) -> Result<()> {
        self.calibrate_zero(ZeroReference::External)
    }

    /// Start an auto-zero run and wait the configured settle duration.
    ///
    /// The sensor reports nothing back, completion is assumed.
    pub fn calibrate_zero(&mut self, reference: ZeroReference) -> Result<()> {
        self.send(Command::ZeroType(reference))?;
        self.send(Command::ZeroAutoOnce)?;
        debug!(%reference, settle = ?self.config.settle_duration, "waiting for auto-zero");
        thread::sleep(self.config.settle_duration);
        info!(%reference, "auto-zero finished");
        Ok(())
    }

    /// Select the unit by name, `dBm` or `mW` in any case.
    pub fn set_display_unit(&mut self, unit: impl AsRef<str>) -> Result<()> {
        let unit = unit.as_ref().parse::<DisplayUnit>()?;
        self.set_unit(unit)
    }

    pub fn set_unit(&mut self, unit: DisplayUnit) -> Result<()> {
        self.send(Command::SetUnit(unit))
    }

    /// Select `unit`, take one measurement and scale it for presentation.
    pub fn read(&mut self, unit: DisplayUnit) -> Result<Reading> {
        self.set_unit(unit)?;
        let raw = self.measure_power()?;
        Ok(Reading::from_raw(raw, unit))
    }

    /// Close the session, then the resource manager.
    ///
    /// The manager is closed even if closing the session failed, the
    /// first error is returned.
    pub fn close(mut self) -> Result<()> {
        let session = self.session.close();
        let rm = self.rm.close();
        info!("power sensor disconnected");
        session.and(rm)
    }
}
