//! Compiled-in defaults and limits
//!
//! These are the values every manager falls back to after `make_default()`
//! and whenever a key is missing from the persisted settings buffer.

// Display
pub const DEFAULT_DISPLAY_WORK_FLAG: bool = true;
pub const DEFAULT_DISPLAY_AUTO_RESET_FLAG: bool = true;
/// Seconds of inactivity before the backlight is turned off (0 = never)
pub const DEFAULT_BACKLIGHT_OFF_TIME: u8 = 10;
pub const DEFAULT_DISPLAY_FPS: u8 = 10;
pub const MIN_DISPLAY_FPS: u8 = 1;
/// Interval between forced reinitializations of the LCD controller
pub const DISPLAY_AUTO_RESET_MINUTES: u32 = 30;
/// How long a window title stays on screen before the window body is drawn
pub const TITLE_DELAY_MS: u16 = 800;

// Modules
/// Number of DS18B20 probes wired to the one-wire bus
pub const PROBE_COUNT: usize = 4;
/// Seconds between sensor polls (0 disables polling)
pub const DEFAULT_READ_DATA_TIME: u8 = 10;
pub const MAX_READ_DATA_TIME: u8 = 100;
pub const DEFAULT_READ_ATTEMPTS: u8 = 3;
pub const MAX_READ_ATTEMPTS: u8 = 5;
pub const MIN_PROBE_CORRECTION: f32 = -20.0;
pub const MAX_PROBE_CORRECTION: f32 = 20.0;
/// Maximum number of addresses kept from a bus search
pub const MAX_SCANNED_PROBES: usize = 8;

// Time
pub const DEFAULT_NTP_FLAG: bool = true;
pub const DEFAULT_GMT: i8 = 2;
pub const MIN_GMT: i8 = -12;
pub const MAX_GMT: i8 = 14;
/// Minutes between successful network time syncs
pub const NTP_SYNC_MINUTES: u32 = 60;

// Windows
/// Depth of the window stack (home -> settings -> sub-setting -> editor -> modal ...)
pub const MAX_WINDOW_DEPTH: usize = 8;
