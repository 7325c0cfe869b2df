//! Sensor poller
//!
//! Reads the home humidity/temperature sensor and every DS18B20 probe on a
//! fixed interval. Each probe has its own retry budget because probes sit on
//! cables of very different lengths; a reading that classifies as a fault is
//! retried until the budget runs out, a good reading stops the loop early.
//!
//! Bus transactions are blocking and run inside [`ModuleManager::tick`].

use heapless::Vec;
use log::{debug, info, warn};

use crate::config::{
    DEFAULT_READ_DATA_TIME, MAX_READ_DATA_TIME, MAX_SCANNED_PROBES, PROBE_COUNT,
};
use crate::remote::{ElementList, ElementType, ElementValue, RemoteElements, RemoteError, register};
use crate::sensors::{
    HumidityReading, HumiditySensor, Probe, ProbeAddress, ProbeBus, ProbeConfig, ProbeStatus,
    ScannedProbe,
};
use crate::storage::{Persistent, SettingKey, SettingsBuffer, SettingsError, indexed_key, key};
use crate::timing::{has_elapsed, secs_to_ms};

/// Status stored for the humidity sensor before its first read
pub const HUMIDITY_STATUS_UNSPECIFIED: u8 = u8::MAX;

/// Fields of the module manager that have a settings or remote key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleField {
    ReadDataTime,
    ProbeName,
    ProbeAddress,
    ProbeCorrection,
    ProbeReadAttempts,
    HomeTemperature,
    HomeHumidity,
    ProbeTemperature,
}

impl ModuleField {
    /// Key of this field; `index` selects the probe for per-probe fields.
    pub fn key(self, index: usize) -> SettingKey {
        match self {
            Self::ReadDataTime => key("SMrdt"),
            Self::ProbeName => indexed_key("SMDSn", index),
            Self::ProbeAddress => indexed_key("SMDSa", index),
            Self::ProbeCorrection => indexed_key("SMDSc", index),
            Self::ProbeReadAttempts => indexed_key("SMDSra", index),
            Self::HomeTemperature => key("HSt"),
            Self::HomeHumidity => key("HSh"),
            Self::ProbeTemperature => indexed_key("HSdst", index),
        }
    }
}

pub struct ModuleManager {
    humidity: HumidityReading,
    probes: [Probe; PROBE_COUNT],
    read_data_time: u8,
    /// Time of the last poll; `None` until the first poll after reset
    last_poll: Option<u32>,
    scan_requested: bool,
    scanned: Vec<ScannedProbe, MAX_SCANNED_PROBES>,
}

impl ModuleManager {
    pub fn new() -> Self {
        Self {
            humidity: HumidityReading {
                status: HUMIDITY_STATUS_UNSPECIFIED,
                ..HumidityReading::default()
            },
            probes: core::array::from_fn(Probe::new),
            read_data_time: DEFAULT_READ_DATA_TIME,
            last_poll: None,
            scan_requested: false,
            scanned: Vec::new(),
        }
    }

    /// Run the periodic poll if it is due, and any pending bus search.
    ///
    /// Returns `true` when the sensors were polled.
    pub fn tick<H, B>(&mut self, now: u32, humidity: &mut H, bus: &mut B) -> bool
    where
        H: HumiditySensor,
        B: ProbeBus,
    {
        if self.scan_requested {
            self.scan(bus);
        }

        if self.read_data_time == 0 {
            return false;
        }

        let due = match self.last_poll {
            None => true,
            Some(last) => has_elapsed(now, last, secs_to_ms(self.read_data_time as u32)),
        };

        if due {
            self.last_poll = Some(now);
            self.update_module_data(humidity, bus);
        }
        due
    }

    /// Read every sensor once, honoring each probe's retry budget.
    pub fn update_module_data<H, B>(&mut self, humidity: &mut H, bus: &mut B)
    where
        H: HumiditySensor,
        B: ProbeBus,
    {
        self.humidity = humidity.read();
        debug!(
            "Home sensor: {} C, {} %, status {}",
            self.humidity.temperature, self.humidity.humidity, self.humidity.status
        );

        for probe in self.probes.iter_mut() {
            Self::poll_probe(probe, bus);
        }
    }

    fn poll_probe<B: ProbeBus>(probe: &mut Probe, bus: &mut B) {
        let attempts = probe.config.read_attempts;
        if attempts == 0 {
            probe.status = ProbeStatus::Unspecified;
            return;
        }

        for attempt in 1..=attempts {
            probe.raw_temperature = bus.read_temperature(&probe.config.address);
            probe.status = ProbeStatus::classify(probe.temperature());

            if probe.status.is_ok() {
                break;
            }
            debug!(
                "Probe {} attempt {}/{} failed: status {}",
                probe.config.name.as_str(),
                attempt,
                attempts,
                probe.status.code()
            );
        }

        if !probe.status.is_ok() {
            warn!(
                "Probe {} faulted after {} attempts (status {})",
                probe.config.name.as_str(),
                attempts,
                probe.status.code()
            );
        }
    }

    fn scan<B: ProbeBus>(&mut self, bus: &mut B) {
        self.scan_requested = false;
        self.scanned.clear();

        let mut found = Vec::<ProbeAddress, MAX_SCANNED_PROBES>::new();
        bus.search(&mut found);

        for address in found {
            let temperature = bus.read_temperature(&address);
            // `found` has the same capacity as `scanned`
            self.scanned
                .push(ScannedProbe {
                    address,
                    temperature,
                })
                .ok();
        }
        info!("Probe bus search found {} devices", self.scanned.len());
    }

    /// Ask the next tick to enumerate the probe bus.
    pub fn request_scan(&mut self) {
        self.scan_requested = true;
        self.scanned.clear();
    }

    pub fn scan_pending(&self) -> bool {
        self.scan_requested
    }

    /// Results of the last completed bus search.
    pub fn scanned_probes(&self) -> &[ScannedProbe] {
        &self.scanned
    }

    pub fn read_data_time(&self) -> u8 {
        self.read_data_time
    }

    /// Seconds between polls, clamped to `0..=100`; 0 disables polling.
    pub fn set_read_data_time(&mut self, seconds: u8) {
        self.read_data_time = seconds.min(MAX_READ_DATA_TIME);
    }

    pub fn humidity_reading(&self) -> &HumidityReading {
        &self.humidity
    }

    pub fn home_temperature(&self) -> f32 {
        self.humidity.temperature
    }

    pub fn home_humidity(&self) -> f32 {
        self.humidity.humidity
    }

    pub fn home_status(&self) -> u8 {
        self.humidity.status
    }

    pub const fn probe_count(&self) -> usize {
        PROBE_COUNT
    }

    pub fn probe(&self, index: usize) -> Option<&Probe> {
        self.probes.get(index)
    }

    pub fn probe_name(&self, index: usize) -> Option<&str> {
        self.probe(index).map(|probe| probe.config.name.as_str())
    }

    pub fn probe_address(&self, index: usize) -> Option<&ProbeAddress> {
        self.probe(index).map(|probe| &probe.config.address)
    }

    pub fn probe_correction(&self, index: usize) -> f32 {
        self.probe(index).map_or(0.0, |probe| probe.config.correction)
    }

    pub fn probe_read_attempts(&self, index: usize) -> u8 {
        self.probe(index).map_or(0, |probe| probe.config.read_attempts)
    }

    /// Corrected temperature of the last read.
    pub fn probe_temperature(&self, index: usize) -> f32 {
        self.probe(index).map_or(0.0, Probe::temperature)
    }

    pub fn probe_status(&self, index: usize) -> ProbeStatus {
        self.probe(index)
            .map_or(ProbeStatus::Unspecified, |probe| probe.status)
    }

    /// Apply an edited probe configuration through the clamping setters.
    pub fn set_probe(&mut self, index: usize, config: &ProbeConfig) {
        self.set_probe_name(index, &config.name);
        self.set_probe_address(index, &config.address);
        self.set_probe_correction(index, config.correction);
        self.set_probe_read_attempts(index, config.read_attempts);
    }

    pub fn set_probe_name(&mut self, index: usize, name: &str) {
        if let Some(probe) = self.probes.get_mut(index) {
            probe.config.set_name(name);
        }
    }

    pub fn set_probe_address(&mut self, index: usize, address: &ProbeAddress) {
        if let Some(probe) = self.probes.get_mut(index) {
            probe.config.address = *address;
        }
    }

    pub fn set_probe_correction(&mut self, index: usize, correction: f32) {
        if let Some(probe) = self.probes.get_mut(index) {
            probe.config.set_correction(correction);
        }
    }

    pub fn set_probe_read_attempts(&mut self, index: usize, read_attempts: u8) {
        if let Some(probe) = self.probes.get_mut(index) {
            probe.config.set_read_attempts(read_attempts);
        }
    }
}

impl Default for ModuleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Persistent for ModuleManager {
    fn make_default(&mut self) {
        *self = Self::new();
    }

    fn write_settings<const N: usize>(
        &self,
        buffer: &mut SettingsBuffer<N>,
    ) -> Result<(), SettingsError> {
        buffer.set(&ModuleField::ReadDataTime.key(0), &self.read_data_time)?;

        for (index, probe) in self.probes.iter().enumerate() {
            let config = &probe.config;
            buffer.set(&ModuleField::ProbeName.key(index), &config.name)?;
            buffer.set(&ModuleField::ProbeAddress.key(index), &config.address)?;
            buffer.set(&ModuleField::ProbeCorrection.key(index), &config.correction)?;
            buffer.set(
                &ModuleField::ProbeReadAttempts.key(index),
                &config.read_attempts,
            )?;
        }
        Ok(())
    }

    fn read_settings<const N: usize>(&mut self, buffer: &SettingsBuffer<N>) {
        if let Some(seconds) = buffer.get::<u8>(&ModuleField::ReadDataTime.key(0)) {
            self.set_read_data_time(seconds);
        }

        for index in 0..PROBE_COUNT {
            if let Some(name) = buffer.get::<heapless::String<2>>(&ModuleField::ProbeName.key(index))
            {
                self.set_probe_name(index, &name);
            }
            if let Some(address) = buffer.get::<ProbeAddress>(&ModuleField::ProbeAddress.key(index))
            {
                self.set_probe_address(index, &address);
            }
            if let Some(correction) = buffer.get::<f32>(&ModuleField::ProbeCorrection.key(index)) {
                self.set_probe_correction(index, correction);
            }
            if let Some(attempts) = buffer.get::<u8>(&ModuleField::ProbeReadAttempts.key(index)) {
                self.set_probe_read_attempts(index, attempts);
            }
        }
    }
}

impl RemoteElements for ModuleManager {
    fn add_remote_elements(&self, list: &mut ElementList) -> Result<(), RemoteError> {
        register(
            list,
            "T home",
            ModuleField::HomeTemperature.key(0),
            ElementType::Float,
        )?;
        register(
            list,
            "H home",
            ModuleField::HomeHumidity.key(0),
            ElementType::Float,
        )?;

        for (index, probe) in self.probes.iter().enumerate() {
            register(
                list,
                probe.config.name.as_str(),
                ModuleField::ProbeTemperature.key(index),
                ElementType::Float,
            )?;
        }

        register(
            list,
            "P data time",
            ModuleField::ReadDataTime.key(0),
            ElementType::U8,
        )
    }

    fn read_element(&self, key: &str) -> Option<ElementValue> {
        if key == ModuleField::ReadDataTime.key(0).as_str() {
            return Some(ElementValue::U8(self.read_data_time));
        }
        if key == ModuleField::HomeTemperature.key(0).as_str() {
            return Some(ElementValue::Float(self.home_temperature()));
        }
        if key == ModuleField::HomeHumidity.key(0).as_str() {
            return Some(ElementValue::Float(self.home_humidity()));
        }

        (0..PROBE_COUNT)
            .find(|&index| key == ModuleField::ProbeTemperature.key(index).as_str())
            .map(|index| ElementValue::Float(self.probe_temperature(index)))
    }

    fn write_element(&mut self, key: &str, value: ElementValue) -> bool {
        match value {
            ElementValue::U8(seconds) if key == ModuleField::ReadDataTime.key(0).as_str() => {
                self.set_read_data_time(seconds);
                true
            }
            _ => false,
        }
    }
}
