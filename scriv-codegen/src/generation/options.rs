//! Output session configuration.

use std::path::{Path, PathBuf};

use scrivener_core::{Error, FileFormat, LineEnding, Result, TextEncoding};
use serde::{Deserialize, Serialize};

use crate::builder::{Indent, WriterSettings};

/// Configuration of an [`OutputSession`](super::OutputSession).
///
/// Every field has a default, so a TOML document only needs the keys it
/// changes:
///
/// ```toml
/// base_output_directory = "generated"
/// generated_file_header = "This file was generated. Do not edit."
/// auto_rename_conflicting_files = true
/// line_ending = "crlf"
/// indent = { spaces = 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionOptions {
    pub base_output_directory: PathBuf,
    /// Banner written at the top of every file; may span several lines.
    pub generated_file_header: Option<String>,
    /// Rename `Name.ext` to `Name_0.ext`, `Name_1.ext`, ... instead of failing
    /// when a path is opened twice in one session.
    pub auto_rename_conflicting_files: bool,
    /// Record every written file in `FilesWritten.txt`.
    pub write_file_log: bool,
    /// Delete files the previous session logged but this one did not write.
    pub clean_stale_output: bool,
    pub encoding: TextEncoding,
    pub line_ending: LineEnding,
    pub indent: Indent,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            base_output_directory: PathBuf::from("."),
            generated_file_header: None,
            auto_rename_conflicting_files: false,
            write_file_log: true,
            clean_stale_output: true,
            encoding: TextEncoding::default(),
            line_ending: LineEnding::default(),
            indent: Indent::default(),
        }
    }
}

impl SessionOptions {
    /// Options writing into `base_output_directory`, everything else default.
    pub fn new(base_output_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_output_directory: base_output_directory.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.generated_file_header = Some(header.into());
        self
    }

    pub fn with_auto_rename(mut self, enabled: bool) -> Self {
        self.auto_rename_conflicting_files = enabled;
        self
    }

    /// Parse options from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::from_toml_str_with_filename(content, "scrivener.toml")
    }

    /// Parse options from TOML text, naming `filename` in diagnostics.
    pub fn from_toml_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e, content, filename))
    }

    /// Load options from a TOML file.
    ///
    /// A relative `base_output_directory` is resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut options =
            Self::from_toml_str_with_filename(&content, &path.display().to_string())?;

        if options.base_output_directory.is_relative() {
            if let Some(dir) = path.parent() {
                options.base_output_directory = dir.join(&options.base_output_directory);
            }
        }
        Ok(options)
    }

    /// Settings handed to every writer the session opens.
    pub fn writer_settings(&self) -> WriterSettings {
        WriterSettings {
            header: self.generated_file_header.clone(),
            indent: self.indent,
            format: FileFormat::new(self.encoding, self.line_ending),
        }
    }
}
