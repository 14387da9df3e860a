//! Text encodings and line-ending conventions for generated files.

use serde::{Deserialize, Serialize};

/// Character encoding used when a generated file is flushed to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    /// UTF-8 without a byte order mark.
    #[default]
    Utf8,
    /// UTF-8 preceded by `EF BB BF`.
    Utf8Bom,
    /// UTF-16 little-endian preceded by `FF FE`.
    Utf16Le,
}

impl TextEncoding {
    /// Encode `text` into bytes, including the byte order mark if the encoding has one.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf8Bom => {
                let mut out = Vec::with_capacity(text.len() + 3);
                out.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
                out.extend_from_slice(text.as_bytes());
                out
            }
            Self::Utf16Le => {
                let mut out = Vec::with_capacity(text.len() * 2 + 2);
                out.extend_from_slice(&[0xFF, 0xFE]);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                out
            }
        }
    }
}

/// Line terminator written for every `\n` in the buffered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }

    /// Rewrite the `\n` terminators in `text` to this convention.
    ///
    /// Text is buffered with bare `\n`; a `\r\n` already present is left alone.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Lf => text.to_string(),
            Self::Crlf => {
                let mut out = String::with_capacity(text.len() + text.len() / 16);
                let mut prev = '\0';
                for c in text.chars() {
                    if c == '\n' && prev != '\r' {
                        out.push('\r');
                    }
                    out.push(c);
                    prev = c;
                }
                out
            }
        }
    }
}

/// How buffered text is turned into bytes on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileFormat {
    #[serde(default)]
    pub encoding: TextEncoding,
    #[serde(default)]
    pub line_ending: LineEnding,
}

impl FileFormat {
    pub fn new(encoding: TextEncoding, line_ending: LineEnding) -> Self {
        Self {
            encoding,
            line_ending,
        }
    }

    /// Apply the line ending and encoding to `text`.
    pub fn render(&self, text: &str) -> Vec<u8> {
        self.encoding.encode(&self.line_ending.apply(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        assert_eq!(TextEncoding::Utf8.encode("hi"), b"hi".to_vec());
    }

    #[test]
    fn test_utf8_bom() {
        assert_eq!(
            TextEncoding::Utf8Bom.encode("A"),
            vec![0xEF, 0xBB, 0xBF, b'A']
        );
    }

    #[test]
    fn test_utf16_le() {
        assert_eq!(
            TextEncoding::Utf16Le.encode("Hi"),
            vec![0xFF, 0xFE, b'H', 0, b'i', 0]
        );
    }

    #[test]
    fn test_crlf() {
        assert_eq!(LineEnding::Crlf.apply("a\nb\r\nc\n"), "a\r\nb\r\nc\r\n");
        assert_eq!(LineEnding::Lf.apply("a\nb\n"), "a\nb\n");
    }

    #[test]
    fn test_file_format_render() {
        let format = FileFormat::new(TextEncoding::Utf8Bom, LineEnding::Crlf);
        assert_eq!(format.render("a\n"), vec![0xEF, 0xBB, 0xBF, b'a', b'\r', b'\n']);
    }

    #[test]
    fn test_deserialize_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            encoding: TextEncoding,
            line_ending: LineEnding,
        }

        let parsed: Wrapper =
            toml::from_str("encoding = \"utf16-le\"\nline_ending = \"crlf\"").unwrap();
        assert_eq!(parsed.encoding, TextEncoding::Utf16Le);
        assert_eq!(parsed.line_ending, LineEnding::Crlf);
    }
}
