//! Transport seams used by [`PowerSensor`](crate::PowerSensor).
//!
//! A [`ResourceManager`] opens [`Session`]s from resource identifiers.
//! The crate ships a [`NativeResourceManager`](crate::transport::NativeResourceManager)
//! for serial ports and raw SCPI sockets; bindings to a vendor VISA
//! library can implement the same traits.

use std::time::Duration;

use crate::proto::Result;

/// A connected, bidirectional text-command channel to one instrument.
///
/// Exchanges are strictly request–reply: a session never has more
/// than one command in flight.
pub trait Session {
    /// Write `command` and block until one response line arrives.
    ///
    /// A timeout or I/O failure in the middle of an exchange leaves the
    /// channel out of step with the instrument. Implementations must then
    /// refuse further exchanges instead of handing a late reply to the
    /// next query.
    fn query(&mut self, command: &str) -> Result<String>;

    /// Write `command` without waiting for a response.
    fn write(&mut self, command: &str) -> Result<()>;

    fn timeout(&self) -> Duration;

    /// Upper bound for each following exchange.
    fn set_timeout(&mut self, timeout: Duration);

    fn close(&mut self) -> Result<()>;
}

pub trait ResourceManager {
    type Session: Session;

    fn timeout(&self) -> Duration;

    /// Management level timeout, applied while opening resources.
    fn set_timeout(&mut self, timeout: Duration);

    fn open_resource(&mut self, resource: &str) -> Result<Self::Session>;

    fn close(&mut self) -> Result<()>;
}
