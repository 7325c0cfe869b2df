//! Remote monitoring element registry
//!
//! The IoT binding (Blynk on the original board) renders and edits a flat list
//! of elements. Each manager registers its fields as
//! `(label, settings key, type)`; the binding then reads and writes the live
//! value through [`RemoteElements`] using the same key. The transport itself
//! lives outside this crate.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::storage::SettingKey;

/// Upper bound on elements registered by all managers together
pub const MAX_REMOTE_ELEMENTS: usize = 24;

pub const MAX_LABEL_LEN: usize = 16;

pub type ElementLabel = String<MAX_LABEL_LEN>;

pub type ElementList = Vec<RemoteElement, MAX_REMOTE_ELEMENTS>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteError {
    #[error("element list is full")]
    ListFull,
    #[error("failed to encode element value")]
    Encode,
    #[error("failed to decode element value")]
    Decode,
}

/// Primitive type of a registered field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Bool,
    U8,
    I8,
    Float,
}

/// Live value of a registered field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ElementValue {
    Bool(bool),
    U8(u8),
    I8(i8),
    Float(f32),
}

impl ElementValue {
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Bool(_) => ElementType::Bool,
            Self::U8(_) => ElementType::U8,
            Self::I8(_) => ElementType::I8,
            Self::Float(_) => ElementType::Float,
        }
    }

    /// Encode into the compact binary form exchanged with the binding.
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], RemoteError> {
        postcard::to_slice(self, buf).map_err(|_| RemoteError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, RemoteError> {
        postcard::from_bytes(bytes).map_err(|_| RemoteError::Decode)
    }
}

/// One field exposed to the remote binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteElement {
    pub label: ElementLabel,
    pub key: SettingKey,
    pub element_type: ElementType,
}

impl RemoteElement {
    pub fn new(label: &str, key: SettingKey, element_type: ElementType) -> Self {
        let mut element_label = ElementLabel::new();
        for ch in label.chars() {
            if element_label.push(ch).is_err() {
                break;
            }
        }

        Self {
            label: element_label,
            key,
            element_type,
        }
    }
}

/// Append an element, reporting a full list instead of dropping it silently.
pub fn register(
    list: &mut ElementList,
    label: &str,
    key: SettingKey,
    element_type: ElementType,
) -> Result<(), RemoteError> {
    list.push(RemoteElement::new(label, key, element_type))
        .map_err(|_| RemoteError::ListFull)
}

/// Implemented by every manager that exposes fields to the remote binding.
pub trait RemoteElements {
    /// Register this manager's elements.
    fn add_remote_elements(&self, list: &mut ElementList) -> Result<(), RemoteError>;

    /// Current value of the element registered under `key`.
    fn read_element(&self, key: &str) -> Option<ElementValue>;

    /// Apply a value from the binding. Values are clamped like any other
    /// setter input. Returns `false` for unknown keys, read-only elements and
    /// type mismatches.
    fn write_element(&mut self, key: &str, value: ElementValue) -> bool;
}
