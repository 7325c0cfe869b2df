//! Sensor transports and reading types
//!
//! The physical drivers (one-wire bus, AM2320 humidity sensor) live in the
//! board crate. The poller only talks to them through [`HumiditySensor`] and
//! [`ProbeBus`], so it can be driven by scripted buses in tests.

mod probe;

pub use probe::{Probe, ProbeConfig, ProbeName, ProbeStatus};

use heapless::Vec;

use crate::config::MAX_SCANNED_PROBES;

/// 64-bit one-wire ROM code of a DS18B20 probe
pub type ProbeAddress = [u8; 8];

/// Value the DS18B20 reports on power-on before any conversion completed
pub const PROBE_POWER_ON_CELSIUS: f32 = 85.0;

/// Readings below this are treated as a wiring fault (the driver reports
/// -127 for a probe that does not answer)
pub const PROBE_MIN_VALID_CELSIUS: f32 = -100.0;

/// Result of one humidity sensor read.
///
/// `status` is whatever the transport returned; the poller stores it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HumidityReading {
    pub temperature: f32,
    pub humidity: f32,
    pub status: u8,
}

/// Combined temperature/humidity sensor (AM2320 on the reference board).
pub trait HumiditySensor {
    fn read(&mut self) -> HumidityReading;
}

/// Shared one-wire bus with addressable temperature probes.
///
/// Calls block for the duration of the bus transaction.
pub trait ProbeBus {
    /// Start a conversion on `address` and return the measured temperature in
    /// degrees Celsius, uncorrected.
    fn read_temperature(&mut self, address: &ProbeAddress) -> f32;

    /// Enumerate the probes currently present on the bus.
    fn search(&mut self, found: &mut Vec<ProbeAddress, MAX_SCANNED_PROBES>);
}

/// A probe found by a bus search together with its current temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannedProbe {
    pub address: ProbeAddress,
    pub temperature: f32,
}
