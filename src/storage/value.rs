//! Textual encodings of settings values

use core::fmt::{self, Write};

/// A value that can be stored behind a key in the settings buffer.
///
/// `decode` returns `None` when the stored text is not a valid encoding; the
/// caller then keeps the field's current value.
pub trait SettingValue: Sized {
    fn encode<W: Write>(&self, out: &mut W) -> fmt::Result;

    fn decode(text: &str) -> Option<Self>;
}

impl SettingValue for bool {
    fn encode<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str(if *self { "1" } else { "0" })
    }

    fn decode(text: &str) -> Option<Self> {
        match text.trim() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        }
    }
}

macro_rules! impl_numeric_setting {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SettingValue for $ty {
                fn encode<W: Write>(&self, out: &mut W) -> fmt::Result {
                    write!(out, "{}", self)
                }

                fn decode(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }
            }
        )*
    };
}

// f32 uses the shortest representation that parses back to the same bits
impl_numeric_setting!(u8, i8, u16, i16, u32, i32, f32);

/// Fixed-size byte arrays are stored as comma separated decimal bytes.
impl<const N: usize> SettingValue for [u8; N] {
    fn encode<W: Write>(&self, out: &mut W) -> fmt::Result {
        for (i, byte) in self.iter().enumerate() {
            if i > 0 {
                out.write_char(',')?;
            }
            write!(out, "{}", byte)?;
        }
        Ok(())
    }

    fn decode(text: &str) -> Option<Self> {
        let mut bytes = [0u8; N];
        let mut parts = text.split(',');

        for slot in bytes.iter_mut() {
            *slot = parts.next()?.trim().parse().ok()?;
        }

        if parts.next().is_some() {
            return None;
        }

        Some(bytes)
    }
}

/// Short strings are stored raw. Text longer than the capacity is truncated
/// on decode, mirroring a fixed `char[N]` field.
impl<const N: usize> SettingValue for heapless::String<N> {
    fn encode<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str(self.as_str())
    }

    fn decode(text: &str) -> Option<Self> {
        let mut value = heapless::String::new();
        for ch in text.chars() {
            if value.push(ch).is_err() {
                break;
            }
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<V: SettingValue>(value: &V) -> heapless::String<64> {
        let mut out = heapless::String::new();
        value.encode(&mut out).unwrap();
        out
    }

    #[test]
    fn test_bool_encoding() {
        assert_eq!(encoded(&true).as_str(), "1");
        assert_eq!(bool::decode("0"), Some(false));
        assert_eq!(bool::decode("yes"), None);
    }

    #[test]
    fn test_float_is_bit_exact() {
        let value = -3.7f32;
        let text = encoded(&value);
        assert_eq!(f32::decode(&text).map(f32::to_bits), Some(value.to_bits()));
    }

    #[test]
    fn test_byte_array_requires_exact_length() {
        let address = [40u8, 255, 0, 7, 1, 2, 3, 4];
        let text = encoded(&address);
        assert_eq!(text.as_str(), "40,255,0,7,1,2,3,4");
        assert_eq!(<[u8; 8]>::decode(&text), Some(address));
        assert_eq!(<[u8; 8]>::decode("1,2,3"), None);
        assert_eq!(<[u8; 2]>::decode("1,2,3"), None);
        assert_eq!(<[u8; 2]>::decode("1,300"), None);
    }

    #[test]
    fn test_string_truncates_to_capacity() {
        let name = <heapless::String<2>>::decode("T12").unwrap();
        assert_eq!(name.as_str(), "T1");
    }

    #[test]
    fn test_out_of_range_integer_is_rejected() {
        assert_eq!(u8::decode("256"), None);
        assert_eq!(i8::decode("-5"), Some(-5));
    }
}
