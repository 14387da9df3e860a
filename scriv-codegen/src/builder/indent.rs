//! Indentation configuration for generated files.

use serde::{Deserialize, Serialize};

/// Indentation style for generated code.
///
/// In TOML this is written as `indent = { spaces = 2 }` or `indent = "tab"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Indent {
    /// Spaces with the specified width (e.g., 2 or 4).
    Spaces(u8),
    /// Tab character.
    Tab,
}

impl Indent {
    /// 4-space indentation (C, C++, C#).
    pub const FOUR_SPACES: Self = Self::Spaces(4);

    /// 2-space indentation.
    pub const TWO_SPACES: Self = Self::Spaces(2);

    /// Tab indentation.
    pub const TAB: Self = Self::Tab;

    /// Number of characters one level occupies.
    pub fn width(&self) -> usize {
        match self {
            Self::Spaces(n) => usize::from(*n),
            Self::Tab => 1,
        }
    }

    /// Append `levels` levels of indentation to `out`.
    pub fn push_levels(&self, out: &mut String, levels: usize) {
        let (c, count) = match self {
            Self::Spaces(n) => (' ', usize::from(*n) * levels),
            Self::Tab => ('\t', levels),
        };
        out.extend(std::iter::repeat_n(c, count));
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::FOUR_SPACES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(indent: Indent, n: usize) -> String {
        let mut out = String::new();
        indent.push_levels(&mut out, n);
        out
    }

    #[test]
    fn test_push_levels() {
        assert_eq!(levels(Indent::Spaces(2), 1), "  ");
        assert_eq!(levels(Indent::Spaces(4), 2), "        ");
        assert_eq!(levels(Indent::Spaces(3), 2), "      ");
        assert_eq!(levels(Indent::Tab, 3), "\t\t\t");
        assert_eq!(levels(Indent::Tab, 0), "");
    }

    #[test]
    fn test_width() {
        assert_eq!(Indent::FOUR_SPACES.width(), 4);
        assert_eq!(Indent::TAB.width(), 1);
    }

    #[test]
    fn test_default() {
        assert_eq!(Indent::default(), Indent::Spaces(4));
    }

    #[test]
    fn test_toml_forms() {
        #[derive(Deserialize)]
        struct Holder {
            indent: Indent,
        }

        let tab: Holder = toml::from_str("indent = \"tab\"").unwrap();
        assert_eq!(tab.indent, Indent::Tab);

        let spaces: Holder = toml::from_str("indent = { spaces = 2 }").unwrap();
        assert_eq!(spaces.indent, Indent::Spaces(2));
    }
}
