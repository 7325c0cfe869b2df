//! Settings key construction
//!
//! Each persisted field gets its key from exactly one function, shared by the
//! writer, the reader and the remote element registry. A typo therefore breaks
//! all three at once instead of silently degrading to "key not found".

use core::fmt::Write;

/// Longest key any manager produces (`SMDSra` + index)
pub const MAX_KEY_LEN: usize = 12;

pub type SettingKey = heapless::String<MAX_KEY_LEN>;

/// Build a key from a fixed name.
pub fn key(name: &str) -> SettingKey {
    let mut key = SettingKey::new();
    // Every caller passes a short literal
    key.push_str(name).ok();
    key
}

/// Build an indexed key such as `SMDSn0`.
pub fn indexed_key(prefix: &str, index: usize) -> SettingKey {
    let mut key = SettingKey::new();
    write!(key, "{}{}", prefix, index).ok();
    key
}
