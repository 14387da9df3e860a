//! Typed constant values and their canonical textual forms.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::{F32_ROUND_TRIP_DIGITS, F64_ROUND_TRIP_DIGITS, format_general};

/// Placeholder printed for a null pointer constant.
pub const NULL_POINTER_TOKEN: &str = "<null>";

/// An integer constant of a declared width and signedness.
///
/// `bits` keeps the full bit pattern as decoded. When `is_signed` is true the
/// value is the two's-complement interpretation of the low `size_bits` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntegerConstant {
    pub size_bits: u32,
    pub is_signed: bool,
    pub bits: u64,
}

impl IntegerConstant {
    pub fn new(size_bits: u32, is_signed: bool, bits: u64) -> Self {
        Self {
            size_bits,
            is_signed,
            bits,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        Self::new(64, true, value as u64)
    }

    pub fn from_u64(value: u64) -> Self {
        Self::new(64, false, value)
    }

    pub fn from_i32(value: i32) -> Self {
        Self::new(32, true, value as i64 as u64)
    }

    pub fn from_u32(value: u32) -> Self {
        Self::new(32, false, value.into())
    }

    pub fn from_i16(value: i16) -> Self {
        Self::new(16, true, value as i64 as u64)
    }

    pub fn from_u16(value: u16) -> Self {
        Self::new(16, false, value.into())
    }

    pub fn from_i8(value: i8) -> Self {
        Self::new(8, true, value as i64 as u64)
    }

    pub fn from_u8(value: u8) -> Self {
        Self::new(8, false, value.into())
    }

    /// Width used for interpretation; widths outside `1..=64` are treated as 64.
    fn width(&self) -> u32 {
        match self.size_bits {
            1..=64 => self.size_bits,
            _ => 64,
        }
    }

    /// The value sign-extended from `size_bits`.
    pub fn signed_value(&self) -> i64 {
        let shift = 64 - self.width();
        ((self.bits << shift) as i64) >> shift
    }

    /// The value truncated to `size_bits`.
    pub fn unsigned_value(&self) -> u64 {
        match self.width() {
            64 => self.bits,
            width => self.bits & ((1u64 << width) - 1),
        }
    }
}

impl fmt::Display for IntegerConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_signed {
            write!(f, "{}", self.signed_value())
        } else {
            write!(f, "{}", self.unsigned_value())
        }
    }
}

/// A compile-time constant in a form the emitter can print.
///
/// The set of variants is closed: anything the decoder cannot represent
/// becomes [`ConstantValue::Unsupported`] with a readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ConstantValue {
    Integer(IntegerConstant),
    Float32(f32),
    Float64(f64),
    String(String),
    NullPointer,
    Unsupported(String),
}

impl ConstantValue {
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Returns false for [`ConstantValue::Unsupported`].
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    pub fn as_integer(&self) -> Option<&IntegerConstant> {
        match self {
            Self::Integer(integer) => Some(integer),
            _ => None,
        }
    }

    /// The diagnostic carried by an unsupported constant.
    pub fn unsupported_message(&self) -> Option<&str> {
        match self {
            Self::Unsupported(message) => Some(message),
            _ => None,
        }
    }
}

impl From<IntegerConstant> for ConstantValue {
    fn from(value: IntegerConstant) -> Self {
        Self::Integer(value)
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(integer) => write!(f, "{integer}"),
            Self::Float32(value) => f.write_str(&format_general(
                f64::from(*value),
                F32_ROUND_TRIP_DIGITS,
            )),
            Self::Float64(value) => f.write_str(&format_general(*value, F64_ROUND_TRIP_DIGITS)),
            Self::String(text) => write!(f, "\"{}\"", text.replace('"', "\\\"")),
            Self::NullPointer => f.write_str(NULL_POINTER_TOKEN),
            Self::Unsupported(message) => f.write_str(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_sign_extension() {
        let value = IntegerConstant::new(32, true, 0xFFFF_FFFF);
        assert_eq!(value.signed_value(), -1);
        assert_eq!(value.to_string(), "-1");
    }

    #[test]
    fn test_unsigned_byte() {
        let value = IntegerConstant::new(8, false, 0xFF);
        assert_eq!(value.to_string(), "255");
    }

    #[test]
    fn test_unsigned_masks_to_width() {
        let value = IntegerConstant::new(16, false, 0xFFFF_FFFF_FFFF_0001);
        assert_eq!(value.unsigned_value(), 1);
    }

    #[test]
    fn test_signed_positive_stays_positive() {
        let value = IntegerConstant::new(16, true, 0x7FFF);
        assert_eq!(value.to_string(), "32767");
    }

    #[test]
    fn test_constructors_match_native_values() {
        assert_eq!(IntegerConstant::from_i8(-128).to_string(), "-128");
        assert_eq!(IntegerConstant::from_i32(-5).bits, u64::MAX - 4);
        assert_eq!(IntegerConstant::from_u64(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(IntegerConstant::from_i64(i64::MIN).to_string(), "-9223372036854775808");
        assert_eq!(IntegerConstant::from_u16(65535).size_bits, 16);
    }

    #[test]
    fn test_odd_widths() {
        assert_eq!(IntegerConstant::new(1, true, 1).to_string(), "-1");
        assert_eq!(IntegerConstant::new(0, true, u64::MAX).to_string(), "-1");
        assert_eq!(IntegerConstant::new(128, false, 7).to_string(), "7");
    }

    #[test]
    fn test_string_escapes_quotes() {
        let value = ConstantValue::String("say \"hi\"".into());
        assert_eq!(value.to_string(), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_floats_print_round_trip() {
        assert_eq!(ConstantValue::Float64(1.5).to_string(), "1.5");
        assert_eq!(ConstantValue::Float32(0.1).to_string(), "0.100000001");
        let printed = ConstantValue::Float64(0.3).to_string();
        assert_eq!(printed.parse::<f64>().unwrap(), 0.3);
    }

    #[test]
    fn test_null_and_unsupported() {
        assert_eq!(ConstantValue::NullPointer.to_string(), "<null>");
        let unsupported = ConstantValue::unsupported("Unsupported Vector constant");
        assert_eq!(unsupported.to_string(), "Unsupported Vector constant");
        assert!(!unsupported.is_supported());
        assert_eq!(
            unsupported.unsupported_message(),
            Some("Unsupported Vector constant")
        );
    }
}
