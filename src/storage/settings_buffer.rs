//! Shared textual key/value settings buffer
//!
//! The buffer is a flat text region of `key=value` lines. It is the only
//! state that survives a reboot: the board code copies it to and from flash,
//! and every manager writes and reads its own key namespace into it.
//!
//! ```text
//! SDar=1
//! SDbot=10
//! SDf=10
//! SMrdt=10
//! SMDSn0=T1
//! SMDSa0=40,255,100,30,0,0,0,12
//! ```

use core::fmt::Write;
use core::ops::Range;

use log::warn;
use thiserror_no_std::Error;

use super::value::SettingValue;

/// Size of the persisted settings region in bytes
pub const SETTINGS_BUFFER_SIZE: usize = 1024;

/// Longest encoded value (a name, an 8 byte address, a float)
pub const MAX_VALUE_LEN: usize = 48;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    #[error("settings buffer is full")]
    BufferFull,
    #[error("invalid settings key")]
    InvalidKey,
    #[error("value cannot be stored in the settings buffer")]
    InvalidValue,
}

/// Textual `key=value` store with a fixed capacity of `N` bytes.
#[derive(Debug, Clone, Default)]
pub struct SettingsBuffer<const N: usize = SETTINGS_BUFFER_SIZE> {
    text: heapless::String<N>,
}

impl<const N: usize> SettingsBuffer<N> {
    pub fn new() -> Self {
        Self {
            text: heapless::String::new(),
        }
    }

    /// Load a buffer from previously persisted text.
    pub fn from_text(text: &str) -> Result<Self, SettingsError> {
        let mut buffer = Self::new();
        buffer
            .text
            .push_str(text)
            .map_err(|_| SettingsError::BufferFull)?;
        Ok(buffer)
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Iterate over every `(key, value)` pair in storage order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.text
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .filter_map(|line| line.split_once('='))
    }

    /// Raw text stored for `key`.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries()
            .find(|(entry_key, _)| *entry_key == key)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    /// Decode the value stored for `key`.
    pub fn get<V: SettingValue>(&self, key: &str) -> Option<V> {
        self.raw(key).and_then(V::decode)
    }

    /// Decode the value stored for `key` into `field`.
    ///
    /// The field keeps its current value when the key is absent or malformed.
    /// Returns whether the field was updated.
    pub fn get_into<V: SettingValue>(&self, key: &str, field: &mut V) -> bool {
        match self.get(key) {
            Some(value) => {
                *field = value;
                true
            }
            None => false,
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// On error the buffer is left untouched.
    pub fn set<V: SettingValue>(&mut self, key: &str, value: &V) -> Result<(), SettingsError> {
        if key.is_empty() || key.contains(['=', '\n', '\r']) {
            return Err(SettingsError::InvalidKey);
        }

        let mut encoded = heapless::String::<MAX_VALUE_LEN>::new();
        value
            .encode(&mut encoded)
            .map_err(|_| SettingsError::InvalidValue)?;
        if encoded.contains(['\n', '\r']) {
            return Err(SettingsError::InvalidValue);
        }

        let existing = self.line_range(key);
        let removed = existing.as_ref().map_or(0, |range| range.len());
        // An unterminated last line needs a newline before the new entry,
        // unless that line is the one being replaced
        let unterminated = !self.text.is_empty() && !self.text.ends_with('\n');
        let separator = unterminated
            && existing
                .as_ref()
                .is_none_or(|range| range.end != self.text.len());
        let required = self.text.len() - removed
            + usize::from(separator)
            + key.len()
            + 1
            + encoded.len()
            + 1;
        if required > N {
            warn!("Settings buffer full, cannot store {}", key);
            return Err(SettingsError::BufferFull);
        }

        if let Some(range) = existing {
            self.remove_range(range);
        }

        // Capacity was checked above
        if separator {
            self.text.push('\n').map_err(|_| SettingsError::BufferFull)?;
        }
        writeln!(self.text, "{}={}", key, encoded).map_err(|_| SettingsError::BufferFull)
    }

    /// Remove `key` from the buffer. Returns whether an entry was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.line_range(key) {
            Some(range) => {
                self.remove_range(range);
                true
            }
            None => false,
        }
    }

    /// Byte range of the line holding `key`, including its newline.
    fn line_range(&self, key: &str) -> Option<Range<usize>> {
        let mut start = 0;
        for line in self.text.split_inclusive('\n') {
            let end = start + line.len();
            let content = line.trim_end_matches(['\n', '\r']);
            if let Some((entry_key, _)) = content.split_once('=') {
                if entry_key == key {
                    return Some(start..end);
                }
            }
            start = end;
        }
        None
    }

    fn remove_range(&mut self, range: Range<usize>) {
        let mut rebuilt = heapless::String::<N>::new();
        // Removing bytes never exceeds the original capacity
        rebuilt.push_str(&self.text[..range.start]).ok();
        rebuilt.push_str(&self.text[range.end..]).ok();
        self.text = rebuilt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut buffer: SettingsBuffer<128> = SettingsBuffer::new();
        buffer.set("SDf", &25u8).unwrap();
        buffer.set("STg", &-3i8).unwrap();

        assert_eq!(buffer.get::<u8>("SDf"), Some(25));
        assert_eq!(buffer.get::<i8>("STg"), Some(-3));
        assert_eq!(buffer.as_str(), "SDf=25\nSTg=-3\n");
    }

    #[test]
    fn test_set_replaces_existing_key() {
        let mut buffer: SettingsBuffer<128> = SettingsBuffer::new();
        buffer.set("SDf", &25u8).unwrap();
        buffer.set("SDbot", &10u8).unwrap();
        buffer.set("SDf", &30u8).unwrap();

        assert_eq!(buffer.get::<u8>("SDf"), Some(30));
        assert_eq!(buffer.entries().count(), 2);
    }

    #[test]
    fn test_prefix_keys_do_not_match() {
        let mut buffer: SettingsBuffer<128> = SettingsBuffer::new();
        buffer.set("SMDSn10", &1u8).unwrap();

        assert_eq!(buffer.get::<u8>("SMDSn1"), None);
        buffer.set("SMDSn1", &2u8).unwrap();
        assert_eq!(buffer.get::<u8>("SMDSn10"), Some(1));
        assert_eq!(buffer.get::<u8>("SMDSn1"), Some(2));
    }

    #[test]
    fn test_missing_key_keeps_field() {
        let buffer: SettingsBuffer<64> = SettingsBuffer::new();
        let mut fps = 12u8;
        assert!(!buffer.get_into("SDf", &mut fps));
        assert_eq!(fps, 12);
    }

    #[test]
    fn test_malformed_value_keeps_field() {
        let buffer: SettingsBuffer<64> = SettingsBuffer::from_text("SDf=abc\n").unwrap();
        let mut fps = 12u8;
        assert!(!buffer.get_into("SDf", &mut fps));
        assert_eq!(fps, 12);
    }

    #[test]
    fn test_full_buffer_is_left_untouched() {
        let mut buffer: SettingsBuffer<16> = SettingsBuffer::new();
        buffer.set("SDf", &10u8).unwrap();
        let before = buffer.as_str().len();

        assert_eq!(
            buffer.set("SMDSa0", &[1u8, 2, 3, 4, 5, 6, 7, 8]),
            Err(SettingsError::BufferFull)
        );
        assert_eq!(buffer.len(), before);
        assert_eq!(buffer.get::<u8>("SDf"), Some(10));
    }

    #[test]
    fn test_replacing_frees_space_first() {
        // "SDf=10\n" is 7 bytes, exactly fills the buffer
        let mut buffer: SettingsBuffer<7> = SettingsBuffer::new();
        buffer.set("SDf", &10u8).unwrap();
        buffer.set("SDf", &20u8).unwrap();
        assert_eq!(buffer.get::<u8>("SDf"), Some(20));
    }

    #[test]
    fn test_invalid_keys_and_values() {
        let mut buffer: SettingsBuffer<64> = SettingsBuffer::new();
        assert_eq!(buffer.set("", &1u8), Err(SettingsError::InvalidKey));
        assert_eq!(buffer.set("a=b", &1u8), Err(SettingsError::InvalidKey));

        let mut name = heapless::String::<4>::new();
        name.push_str("a\nb").unwrap();
        assert_eq!(buffer.set("SMDSn0", &name), Err(SettingsError::InvalidValue));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut buffer: SettingsBuffer<64> = SettingsBuffer::new();
        buffer.set("STns", &true).unwrap();
        buffer.set("STg", &2i8).unwrap();

        assert!(buffer.remove("STns"));
        assert!(!buffer.remove("STns"));
        assert_eq!(buffer.as_str(), "STg=2\n");
    }

    #[test]
    fn test_tolerates_carriage_returns() {
        let buffer: SettingsBuffer<64> = SettingsBuffer::from_text("SDf=7\r\nSDbot=3\r\n").unwrap();
        assert_eq!(buffer.get::<u8>("SDf"), Some(7));
        assert_eq!(buffer.get::<u8>("SDbot"), Some(3));
    }

    #[test]
    fn test_append_after_unterminated_line() {
        let mut buffer: SettingsBuffer<64> = SettingsBuffer::from_text("SDf=10").unwrap();
        buffer.set("SDbot", &5u8).unwrap();

        assert_eq!(buffer.get::<u8>("SDf"), Some(10));
        assert_eq!(buffer.get::<u8>("SDbot"), Some(5));
        assert_eq!(buffer.as_str(), "SDf=10\nSDbot=5\n");
    }

    #[test]
    fn test_replace_unterminated_last_line() {
        let mut buffer: SettingsBuffer<64> = SettingsBuffer::from_text("SDar=1\nSDf=10").unwrap();
        buffer.set("SDf", &20u8).unwrap();
        assert_eq!(buffer.as_str(), "SDar=1\nSDf=20\n");

        let mut buffer: SettingsBuffer<64> = SettingsBuffer::from_text("SDf=10\nSDar=1").unwrap();
        buffer.set("SDf", &20u8).unwrap();
        assert_eq!(buffer.as_str(), "SDar=1\nSDf=20\n");
    }

    #[test]
    fn test_separator_counts_against_capacity() {
        // "SDf=10" + "\n" + "SDar=1\n" needs 14 bytes
        let mut buffer: SettingsBuffer<13> = SettingsBuffer::from_text("SDf=10").unwrap();
        assert_eq!(buffer.set("SDar", &true), Err(SettingsError::BufferFull));
        assert_eq!(buffer.as_str(), "SDf=10");
    }
}
