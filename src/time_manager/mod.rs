//! Clock service
//!
//! Keeps wall-clock time on top of the millisecond counter, applies the
//! configured GMT offset and periodically re-syncs from the network when
//! NTP sync is enabled.

mod calendar;

pub use calendar::{DateTime, days_in_month, is_leap_year};

use log::{debug, info, warn};

use crate::config::{DEFAULT_GMT, DEFAULT_NTP_FLAG, MAX_GMT, MIN_GMT, NTP_SYNC_MINUTES};
use crate::remote::{ElementList, ElementType, ElementValue, RemoteElements, RemoteError, register};
use crate::storage::{Persistent, SettingKey, SettingsBuffer, SettingsError, key};
use crate::timing::{elapsed_ms, has_elapsed, mins_to_ms};

/// Network time provider (NTP client of the network manager).
pub trait TimeSource {
    /// Current unix time in seconds, or `None` when the network is not
    /// reachable.
    fn fetch_unix(&mut self) -> Option<u32>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStatus {
    /// Never set since boot
    Unset,
    /// Set by the user from the time settings window
    Manual,
    /// Set from the network
    Synced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    NtpFlag,
    Gmt,
}

impl TimeField {
    pub fn key(self) -> SettingKey {
        match self {
            Self::NtpFlag => key("STns"),
            Self::Gmt => key("STg"),
        }
    }
}

/// Unix time anchored to a point of the millisecond counter.
#[derive(Debug, Clone, Copy)]
struct SoftClock {
    unix: u32,
    anchor_ms: u32,
    status: ClockStatus,
}

impl SoftClock {
    const fn new() -> Self {
        Self {
            unix: 0,
            anchor_ms: 0,
            status: ClockStatus::Unset,
        }
    }

    fn unix(&self, now: u32) -> u32 {
        self.unix.wrapping_add(elapsed_ms(now, self.anchor_ms) / 1000)
    }

    fn set(&mut self, unix: u32, now: u32, status: ClockStatus) {
        self.unix = unix;
        self.anchor_ms = now;
        self.status = status;
    }

    /// Fold whole elapsed seconds into the anchor so the counter can wrap
    /// without losing time.
    fn refresh(&mut self, now: u32) {
        let seconds = elapsed_ms(now, self.anchor_ms) / 1000;
        self.unix = self.unix.wrapping_add(seconds);
        self.anchor_ms = self.anchor_ms.wrapping_add(seconds * 1000);
    }
}

pub struct TimeManager {
    ntp_flag: bool,
    gmt: i8,
    /// Time of the last successful sync; `None` until the first one
    last_sync: Option<u32>,
    clock: SoftClock,
}

impl TimeManager {
    pub fn new() -> Self {
        Self {
            ntp_flag: DEFAULT_NTP_FLAG,
            gmt: DEFAULT_GMT,
            last_sync: None,
            clock: SoftClock::new(),
        }
    }

    /// Advance the clock and sync from `source` when a sync is due.
    ///
    /// A failed sync is retried on the next tick. Returns `true` when the
    /// clock was set from the network.
    pub fn tick<S: TimeSource>(&mut self, now: u32, source: &mut S) -> bool {
        self.clock.refresh(now);

        if !self.ntp_flag {
            return false;
        }

        let due = match self.last_sync {
            None => true,
            Some(last) => has_elapsed(now, last, mins_to_ms(NTP_SYNC_MINUTES)),
        };
        if !due {
            return false;
        }

        match source.fetch_unix() {
            Some(unix) => {
                self.clock.set(unix, now, ClockStatus::Synced);
                self.last_sync = Some(now);
                info!("Clock synced from network: {}", unix);
                true
            }
            None => {
                debug!("Network time not available, retrying");
                false
            }
        }
    }

    pub fn status(&self) -> ClockStatus {
        self.clock.status
    }

    pub fn unix(&self, now: u32) -> u32 {
        self.clock.unix(now)
    }

    pub fn set_unix(&mut self, unix: u32, now: u32) {
        self.clock.set(unix, now, ClockStatus::Manual);
    }

    /// Local time with the GMT offset applied.
    pub fn time(&self, now: u32) -> DateTime {
        DateTime::from_unix(self.unix(now) as i64 + self.gmt_seconds())
    }

    /// Set the clock from a local date and time.
    pub fn set_time(&mut self, time: &DateTime, now: u32) {
        if !time.is_valid() {
            warn!("Ignoring invalid time {:?}", time);
            return;
        }
        let unix = (time.to_unix() - self.gmt_seconds()).clamp(0, u32::MAX as i64) as u32;
        self.set_unix(unix, now);
    }

    pub fn hour(&self, now: u32) -> u8 {
        self.time(now).hour
    }

    pub fn minute(&self, now: u32) -> u8 {
        self.time(now).minute
    }

    pub fn second(&self, now: u32) -> u8 {
        self.time(now).second
    }

    pub fn weekday(&self, now: u32) -> u8 {
        self.time(now).weekday
    }

    pub fn day(&self, now: u32) -> u8 {
        self.time(now).day
    }

    pub fn month(&self, now: u32) -> u8 {
        self.time(now).month
    }

    pub fn year(&self, now: u32) -> u16 {
        self.time(now).year
    }

    pub fn ntp_flag(&self) -> bool {
        self.ntp_flag
    }

    pub fn set_ntp_flag(&mut self, ntp_flag: bool) {
        if ntp_flag && !self.ntp_flag {
            // Sync as soon as the feature is turned back on
            self.last_sync = None;
        }
        self.ntp_flag = ntp_flag;
    }

    pub fn gmt(&self) -> i8 {
        self.gmt
    }

    /// GMT offset in hours, clamped to `-12..=14`.
    pub fn set_gmt(&mut self, gmt: i8) {
        self.gmt = gmt.clamp(MIN_GMT, MAX_GMT);
    }

    fn gmt_seconds(&self) -> i64 {
        self.gmt as i64 * 3600
    }
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Persistent for TimeManager {
    fn make_default(&mut self) {
        self.ntp_flag = DEFAULT_NTP_FLAG;
        self.gmt = DEFAULT_GMT;
        self.last_sync = None;
    }

    fn write_settings<const N: usize>(
        &self,
        buffer: &mut SettingsBuffer<N>,
    ) -> Result<(), SettingsError> {
        buffer.set(&TimeField::NtpFlag.key(), &self.ntp_flag)?;
        buffer.set(&TimeField::Gmt.key(), &self.gmt)
    }

    fn read_settings<const N: usize>(&mut self, buffer: &SettingsBuffer<N>) {
        if let Some(ntp_flag) = buffer.get::<bool>(&TimeField::NtpFlag.key()) {
            self.set_ntp_flag(ntp_flag);
        }
        if let Some(gmt) = buffer.get::<i8>(&TimeField::Gmt.key()) {
            self.set_gmt(gmt);
        }
    }
}

impl RemoteElements for TimeManager {
    fn add_remote_elements(&self, list: &mut ElementList) -> Result<(), RemoteError> {
        register(list, "P ntp sync", TimeField::NtpFlag.key(), ElementType::Bool)?;
        register(list, "P gmt", TimeField::Gmt.key(), ElementType::I8)
    }

    fn read_element(&self, key: &str) -> Option<ElementValue> {
        if key == TimeField::NtpFlag.key().as_str() {
            Some(ElementValue::Bool(self.ntp_flag))
        } else if key == TimeField::Gmt.key().as_str() {
            Some(ElementValue::I8(self.gmt))
        } else {
            None
        }
    }

    fn write_element(&mut self, key: &str, value: ElementValue) -> bool {
        match value {
            ElementValue::Bool(flag) if key == TimeField::NtpFlag.key().as_str() => {
                self.set_ntp_flag(flag);
                true
            }
            ElementValue::I8(gmt) if key == TimeField::Gmt.key().as_str() => {
                self.set_gmt(gmt);
                true
            }
            _ => false,
        }
    }
}
