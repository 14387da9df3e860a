//! Decoding raw native constants into [`ConstantValue`].

use std::char::REPLACEMENT_CHARACTER;

use tracing::debug;

use crate::{
    ConstantValue, DecodeOptions, ForeignValueKind, IntegerConstant, RawConstant,
    RawConstantKind, RawPayload, StringEncoding, WideCharWidth,
};

/// Decode a raw record. Never fails: anything that cannot be represented
/// comes back as [`ConstantValue::Unsupported`].
pub fn decode(raw: &RawConstant<'_>, options: &DecodeOptions) -> ConstantValue {
    let value = decode_inner(raw, options);
    if let ConstantValue::Unsupported(message) = &value {
        debug!(kind = %raw.kind, sub_kind = raw.sub_kind, %message, "constant decoded as unsupported");
    }
    value
}

impl RawConstant<'_> {
    /// Shorthand for [`decode`].
    pub fn decode(&self, options: &DecodeOptions) -> ConstantValue {
        decode(self, options)
    }
}

fn decode_inner(raw: &RawConstant<'_>, options: &DecodeOptions) -> ConstantValue {
    match raw.kind {
        RawConstantKind::Unknown => match ForeignValueKind::from_raw(raw.sub_kind) {
            Some(foreign) => ConstantValue::unsupported(format!(
                "Unsupported {} constant",
                foreign.name()
            )),
            None => ConstantValue::unsupported(format!(
                "Unsupported constant of unknown foreign kind {}",
                raw.sub_kind
            )),
        },
        RawConstantKind::NullPointer => ConstantValue::NullPointer,
        RawConstantKind::UnsignedInteger | RawConstantKind::SignedInteger => {
            let RawPayload::Bits(bits) = raw.payload else {
                return expected_bits(raw.kind);
            };
            ConstantValue::Integer(IntegerConstant::new(
                raw.sub_kind,
                raw.kind == RawConstantKind::SignedInteger,
                bits,
            ))
        }
        RawConstantKind::FloatingPoint => {
            let RawPayload::Bits(bits) = raw.payload else {
                return expected_bits(raw.kind);
            };
            match raw.sub_kind {
                32 => ConstantValue::Float32(f32::from_bits(bits as u32)),
                64 => ConstantValue::Float64(f64::from_bits(bits)),
                width => ConstantValue::unsupported(format!(
                    "Unsupported {width} bit floating point constant"
                )),
            }
        }
        RawConstantKind::String => {
            let RawPayload::Buffer(buffer) = raw.payload else {
                return ConstantValue::unsupported(
                    "Unsupported String constant: expected a byte buffer payload",
                );
            };
            let Some(encoding) = StringEncoding::from_raw(raw.sub_kind) else {
                return ConstantValue::unsupported(format!(
                    "Unsupported string encoding {}",
                    raw.sub_kind
                ));
            };
            match split_length_prefixed(buffer) {
                Ok(bytes) => ConstantValue::String(decode_text(bytes, encoding, options)),
                Err(message) => ConstantValue::Unsupported(message),
            }
        }
        RawConstantKind::Other(_) => {
            ConstantValue::unsupported(format!("Unsupported constant kind {}", raw.kind))
        }
    }
}

fn expected_bits(kind: RawConstantKind) -> ConstantValue {
    ConstantValue::unsupported(format!(
        "Unsupported {kind} constant: expected a literal bit payload"
    ))
}

fn split_length_prefixed(buffer: &[u8]) -> Result<&[u8], String> {
    let Some((header, rest)) = buffer.split_first_chunk::<8>() else {
        return Err(format!(
            "Unsupported string constant: buffer of {} bytes has no length prefix",
            buffer.len()
        ));
    };
    let declared = u64::from_le_bytes(*header);
    match usize::try_from(declared) {
        Ok(len) if len <= rest.len() => Ok(&rest[..len]),
        _ => Err(format!(
            "Unsupported string constant: declared {declared} bytes but only {} are present",
            rest.len()
        )),
    }
}

fn decode_text(bytes: &[u8], encoding: StringEncoding, options: &DecodeOptions) -> String {
    match encoding {
        StringEncoding::Ascii => bytes
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { '?' })
            .collect(),
        StringEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        StringEncoding::Utf16 => decode_utf16_le(bytes),
        StringEncoding::Utf32 => decode_utf32_le(bytes),
        StringEncoding::Wide => match options.wide_char {
            WideCharWidth::Bits16 => decode_utf16_le(bytes),
            WideCharWidth::Bits32 => decode_utf32_le(bytes),
        },
    }
}

fn decode_utf16_le(bytes: &[u8]) -> String {
    let chunks = bytes.chunks_exact(2);
    let trailing = !chunks.remainder().is_empty();
    let units = chunks.map(|pair| u16::from_le_bytes([pair[0], pair[1]]));

    let mut text: String = char::decode_utf16(units)
        .map(|c| c.unwrap_or(REPLACEMENT_CHARACTER))
        .collect();
    if trailing {
        text.push(REPLACEMENT_CHARACTER);
    }
    text
}

fn decode_utf32_le(bytes: &[u8]) -> String {
    let chunks = bytes.chunks_exact(4);
    let trailing = !chunks.remainder().is_empty();

    let mut text: String = chunks
        .map(|quad| {
            char::from_u32(u32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]))
                .unwrap_or(REPLACEMENT_CHARACTER)
        })
        .collect();
    if trailing {
        text.push(REPLACEMENT_CHARACTER);
    }
    text
}
