//! Raw constant records as handed over by the native AST front end.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification of a native constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawConstantKind {
    /// The front end could not classify the value; `sub_kind` holds a [`ForeignValueKind`].
    Unknown,
    NullPointer,
    UnsignedInteger,
    SignedInteger,
    FloatingPoint,
    String,
    /// A kind tag this crate does not know about.
    Other(u32),
}

impl RawConstantKind {
    /// Map the front end's numeric kind tag.
    pub fn from_raw(tag: u32) -> Self {
        match tag {
            0 => Self::Unknown,
            1 => Self::NullPointer,
            2 => Self::UnsignedInteger,
            3 => Self::SignedInteger,
            4 => Self::FloatingPoint,
            5 => Self::String,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for RawConstantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::NullPointer => write!(f, "NullPointer"),
            Self::UnsignedInteger => write!(f, "UnsignedInteger"),
            Self::SignedInteger => write!(f, "SignedInteger"),
            Self::FloatingPoint => write!(f, "FloatingPoint"),
            Self::String => write!(f, "String"),
            Self::Other(tag) => write!(f, "Other({tag})"),
        }
    }
}

/// Value kinds of the native evaluator, reported for constants it could not classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignValueKind {
    None,
    Indeterminate,
    Int,
    Float,
    FixedPoint,
    ComplexInt,
    ComplexFloat,
    LValue,
    Vector,
    Array,
    Struct,
    Union,
    MemberPointer,
    AddrLabelDiff,
}

impl ForeignValueKind {
    const ALL: [Self; 14] = [
        Self::None,
        Self::Indeterminate,
        Self::Int,
        Self::Float,
        Self::FixedPoint,
        Self::ComplexInt,
        Self::ComplexFloat,
        Self::LValue,
        Self::Vector,
        Self::Array,
        Self::Struct,
        Self::Union,
        Self::MemberPointer,
        Self::AddrLabelDiff,
    ];

    pub fn from_raw(tag: u32) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Indeterminate => "Indeterminate",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::FixedPoint => "FixedPoint",
            Self::ComplexInt => "ComplexInt",
            Self::ComplexFloat => "ComplexFloat",
            Self::LValue => "LValue",
            Self::Vector => "Vector",
            Self::Array => "Array",
            Self::Struct => "Struct",
            Self::Union => "Union",
            Self::MemberPointer => "MemberPointer",
            Self::AddrLabelDiff => "AddrLabelDiff",
        }
    }
}

/// Text encoding of a string constant, selected by the record's sub-kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringEncoding {
    Ascii,
    Utf8,
    Utf16,
    Utf32,
    /// `wchar_t` text; its width depends on the target, see [`DecodeOptions`].
    Wide,
}

impl StringEncoding {
    /// Set on sub-kinds of strings declared with `wchar_t`; irrelevant for decoding.
    pub const WIDE_CHAR_BIT: u32 = 0x80;

    pub fn from_raw(tag: u32) -> Option<Self> {
        match tag & !Self::WIDE_CHAR_BIT {
            0 => Some(Self::Ascii),
            1 => Some(Self::Utf8),
            2 => Some(Self::Utf16),
            3 => Some(Self::Utf32),
            4 => Some(Self::Wide),
            _ => None,
        }
    }
}

/// Width of `wchar_t` on the platform the bindings are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WideCharWidth {
    Bits16,
    #[default]
    Bits32,
}

/// Target facts the decoder cannot infer from the record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecodeOptions {
    #[serde(default)]
    pub wide_char: WideCharWidth,
}

impl DecodeOptions {
    /// Options for targets with a 16-bit `wchar_t` (Windows).
    pub fn windows() -> Self {
        Self {
            wide_char: WideCharWidth::Bits16,
        }
    }

    /// Options for targets with a 32-bit `wchar_t` (Linux, macOS).
    pub fn unix() -> Self {
        Self {
            wide_char: WideCharWidth::Bits32,
        }
    }
}

/// The value part of a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawPayload<'a> {
    /// The literal bits of a scalar value.
    Bits(u64),
    /// A length-prefixed buffer: a little-endian `u64` byte count followed by the bytes.
    Buffer(&'a [u8]),
}

/// A compile-time constant exactly as extracted from the native AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawConstant<'a> {
    pub kind: RawConstantKind,
    /// Bit width for numbers, encoding tag for strings, foreign kind for unknown values.
    pub sub_kind: u32,
    pub payload: RawPayload<'a>,
}

impl<'a> RawConstant<'a> {
    pub fn new(kind: RawConstantKind, sub_kind: u32, payload: RawPayload<'a>) -> Self {
        Self {
            kind,
            sub_kind,
            payload,
        }
    }

    /// A scalar record carrying literal bits.
    pub fn scalar(kind: RawConstantKind, sub_kind: u32, bits: u64) -> Self {
        Self::new(kind, sub_kind, RawPayload::Bits(bits))
    }

    /// A string record whose payload is a length-prefixed buffer.
    pub fn string(encoding_tag: u32, buffer: &'a [u8]) -> Self {
        Self::new(RawConstantKind::String, encoding_tag, RawPayload::Buffer(buffer))
    }
}

/// Build a length-prefixed buffer for `bytes`, the layout [`RawPayload::Buffer`] expects.
pub fn length_prefixed(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 8);
    out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    out.extend_from_slice(bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_raw() {
        assert_eq!(RawConstantKind::from_raw(3), RawConstantKind::SignedInteger);
        assert_eq!(RawConstantKind::from_raw(42), RawConstantKind::Other(42));
        assert_eq!(RawConstantKind::Other(42).to_string(), "Other(42)");
    }

    #[test]
    fn test_foreign_kind_names() {
        assert_eq!(ForeignValueKind::from_raw(8), Some(ForeignValueKind::Vector));
        assert_eq!(ForeignValueKind::Vector.name(), "Vector");
        assert_eq!(ForeignValueKind::from_raw(14), None);
    }

    #[test]
    fn test_string_encoding_strips_wide_bit() {
        assert_eq!(StringEncoding::from_raw(2), Some(StringEncoding::Utf16));
        assert_eq!(
            StringEncoding::from_raw(2 | StringEncoding::WIDE_CHAR_BIT),
            Some(StringEncoding::Utf16)
        );
        assert_eq!(StringEncoding::from_raw(9), None);
    }

    #[test]
    fn test_length_prefixed() {
        assert_eq!(
            length_prefixed(b"ab"),
            vec![2, 0, 0, 0, 0, 0, 0, 0, b'a', b'b']
        );
    }
}
