use core::fmt::Write;

use super::{PROBE_MIN_VALID_CELSIUS, PROBE_POWER_ON_CELSIUS, ProbeAddress};
use crate::config::{
    DEFAULT_READ_ATTEMPTS, MAX_PROBE_CORRECTION, MAX_READ_ATTEMPTS, MIN_PROBE_CORRECTION,
};

/// Display name of a probe, at most two characters ("T1", "Bt", ...)
pub type ProbeName = heapless::String<2>;

/// Classification of the last probe read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeStatus {
    /// Valid reading
    Ok,
    /// Reading below -100 °C: wiring fault or probe not answering
    BelowRange,
    /// Reading exactly 85 °C: probe reset / disconnected during conversion
    Disconnected,
    /// Never read, or disabled with zero read attempts
    #[default]
    Unspecified,
}

impl ProbeStatus {
    /// Numeric code shown on screen and sent to telemetry.
    pub const fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::BelowRange => 1,
            Self::Disconnected => 2,
            Self::Unspecified => u8::MAX,
        }
    }

    /// Classify a corrected temperature.
    pub fn classify(corrected_celsius: f32) -> Self {
        if corrected_celsius < PROBE_MIN_VALID_CELSIUS {
            Self::BelowRange
        } else if corrected_celsius == PROBE_POWER_ON_CELSIUS {
            Self::Disconnected
        } else {
            Self::Ok
        }
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// User editable part of a probe
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    pub name: ProbeName,
    pub address: ProbeAddress,
    pub correction: f32,
    pub read_attempts: u8,
}

impl ProbeConfig {
    /// Default configuration of the probe at `index` ("T1", "T2", ...).
    pub fn default_for(index: usize) -> Self {
        let mut name = ProbeName::new();
        write!(name, "T{}", index + 1).ok();

        Self {
            name,
            address: [0; 8],
            correction: 0.0,
            read_attempts: DEFAULT_READ_ATTEMPTS,
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.name.clear();
        for ch in name.chars() {
            if self.name.push(ch).is_err() {
                break;
            }
        }
    }

    pub fn set_correction(&mut self, correction: f32) {
        self.correction = clamp_correction(correction);
    }

    pub fn set_read_attempts(&mut self, read_attempts: u8) {
        self.read_attempts = read_attempts.min(MAX_READ_ATTEMPTS);
    }
}

fn clamp_correction(correction: f32) -> f32 {
    if correction.is_nan() {
        return 0.0;
    }
    correction.clamp(MIN_PROBE_CORRECTION, MAX_PROBE_CORRECTION)
}

/// One DS18B20 probe: configuration plus the state of its last read.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub config: ProbeConfig,
    /// Last raw (uncorrected) temperature
    pub raw_temperature: f32,
    pub status: ProbeStatus,
}

impl Probe {
    pub fn new(index: usize) -> Self {
        Self {
            config: ProbeConfig::default_for(index),
            raw_temperature: 0.0,
            status: ProbeStatus::Unspecified,
        }
    }

    /// Last temperature with the calibration correction applied.
    pub fn temperature(&self) -> f32 {
        self.raw_temperature + self.config.correction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_order() {
        assert_eq!(ProbeStatus::classify(-127.0), ProbeStatus::BelowRange);
        assert_eq!(ProbeStatus::classify(85.0), ProbeStatus::Disconnected);
        assert_eq!(ProbeStatus::classify(-100.0), ProbeStatus::Ok);
        assert_eq!(ProbeStatus::classify(21.25), ProbeStatus::Ok);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ProbeStatus::Ok.code(), 0);
        assert_eq!(ProbeStatus::BelowRange.code(), 1);
        assert_eq!(ProbeStatus::Disconnected.code(), 2);
        assert_eq!(ProbeStatus::default(), ProbeStatus::Unspecified);
    }

    #[test]
    fn test_default_names() {
        assert_eq!(ProbeConfig::default_for(0).name.as_str(), "T1");
        assert_eq!(ProbeConfig::default_for(3).name.as_str(), "T4");
    }

    #[test]
    fn test_config_setters_clamp() {
        let mut config = ProbeConfig::default_for(0);
        config.set_correction(42.0);
        assert_eq!(config.correction, MAX_PROBE_CORRECTION);
        config.set_correction(f32::NAN);
        assert_eq!(config.correction, 0.0);
        config.set_read_attempts(9);
        assert_eq!(config.read_attempts, MAX_READ_ATTEMPTS);
        config.set_name("Boiler");
        assert_eq!(config.name.as_str(), "Bo");
    }

    #[test]
    fn test_temperature_applies_correction() {
        let mut probe = Probe::new(0);
        probe.raw_temperature = 20.0;
        probe.config.correction = -1.5;
        assert_eq!(probe.temperature(), 18.5);
    }
}
