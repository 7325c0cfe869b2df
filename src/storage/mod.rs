//! Settings persistence
//!
//! Every manager owns a disjoint key namespace (`SD*` display, `SM*` modules,
//! `ST*` time) inside one shared [`SettingsBuffer`]. Saving and loading are
//! done sequentially by the application, never while ticking.

pub mod keys;
pub mod settings_buffer;
pub mod value;

pub use keys::{SettingKey, indexed_key, key};
pub use settings_buffer::{SETTINGS_BUFFER_SIZE, SettingsBuffer, SettingsError};
pub use value::SettingValue;

/// A manager whose configuration is persisted in the settings buffer.
pub trait Persistent {
    /// Restore compiled-in defaults.
    fn make_default(&mut self);

    /// Append (or replace) every persisted field in `buffer`.
    fn write_settings<const N: usize>(
        &self,
        buffer: &mut SettingsBuffer<N>,
    ) -> Result<(), SettingsError>;

    /// Load every persisted field present in `buffer`.
    ///
    /// Missing or malformed keys leave the field at its current value, so an
    /// older buffer simply falls back to defaults for fields it never stored.
    fn read_settings<const N: usize>(&mut self, buffer: &SettingsBuffer<N>);
}
