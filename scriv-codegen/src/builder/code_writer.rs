//! The character-level writer every generated file goes through.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use scrivener_core::{Error, FileFormat, OutputFile, Result, paths};
use tracing::{debug, error, warn};

use super::{Dialect, Indent, scope::ScopeFrame};

/// Per-file settings a writer is created with.
///
/// An [`OutputSession`](crate::generation::OutputSession) derives these from
/// its options; standalone writers can build them directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriterSettings {
    /// Banner written at the top of the file, one comment line per line of text.
    pub header: Option<String>,
    pub indent: Indent,
    pub format: FileFormat,
}

impl WriterSettings {
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }
}

/// Buffered, indentation-aware writer bound to one output file.
///
/// The file is reserved and locked as soon as the writer is created. All text
/// is buffered until [`CodeWriter::finish`], which writes the header, the
/// dialect's preamble and the body in one pass and releases the lock.
///
/// # Example
///
/// ```no_run
/// use scrivener_codegen::builder::{CLikeCodeWriter, WriterSettings};
///
/// # fn main() -> scrivener_core::Result<()> {
/// let mut w = CLikeCodeWriter::create("out/main.c", WriterSettings::default())?;
/// w.write_line("int main(void)")?;
/// w.block(|w| w.write_line("return 0;"))?;
/// w.finish()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CodeWriter<D: Dialect> {
    pub(super) dialect: D,
    output: OutputFile,
    directory: PathBuf,
    settings: WriterSettings,
    buffer: String,
    pub(super) indent_level: usize,
    pub(super) prefix: Option<String>,
    on_new_line: bool,
    no_separation_needed: bool,
    finished: bool,
    pub(super) scopes: Vec<ScopeFrame>,
    pub(super) next_scope_id: u64,
}

impl<D: Dialect + Default> CodeWriter<D> {
    /// Reserve `path` and create a writer with the dialect's default state.
    pub fn create(path: impl Into<PathBuf>, settings: WriterSettings) -> Result<Self> {
        Self::with_dialect(path, settings, D::default())
    }
}

impl<D: Dialect> CodeWriter<D> {
    /// Reserve `path` and create a writer using `dialect`.
    ///
    /// Fails with [`Error::PathLocked`] if another writer holds the path.
    pub fn with_dialect(
        path: impl Into<PathBuf>,
        settings: WriterSettings,
        dialect: D,
    ) -> Result<Self> {
        let path = path.into();
        let cwd = std::env::current_dir().map_err(|e| Error::io(&path, e))?;
        let absolute = paths::absolutize(&cwd, &path);
        let directory = absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone());

        let output = OutputFile::reserve(path)?;
        debug!(path = %output.path().display(), kind = D::KIND, "opened code writer");

        Ok(Self {
            dialect,
            output,
            directory,
            settings,
            buffer: String::new(),
            indent_level: 0,
            prefix: None,
            on_new_line: true,
            no_separation_needed: true,
            finished: false,
            scopes: Vec::new(),
            next_scope_id: 0,
        })
    }

    /// Get the output path this writer is bound to.
    pub fn path(&self) -> &Path {
        self.output.path()
    }

    /// Absolute directory containing the output file.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    pub fn dialect_mut(&mut self) -> &mut D {
        &mut self.dialect
    }

    pub fn settings(&self) -> &WriterSettings {
        &self.settings
    }

    /// Get the current indentation level.
    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    /// The active line prefix, if a prefix scope is open.
    pub fn line_prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Number of explicitly opened scopes that are still open.
    pub fn open_scopes(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns true when nothing has been written on the current line yet.
    pub fn is_on_new_line(&self) -> bool {
        self.on_new_line
    }

    /// Get the buffered body. Empty once the writer is finished.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    // =========================================================================
    // Writing
    // =========================================================================

    /// Append `text`, indenting every line that receives content.
    pub fn write(&mut self, text: &str) -> Result<()> {
        self.ensure_writable()?;
        for c in text.chars() {
            self.push_char(c);
        }
        Ok(())
    }

    /// Append a single character.
    pub fn write_char(&mut self, c: char) -> Result<()> {
        self.ensure_writable()?;
        self.push_char(c);
        Ok(())
    }

    /// Append `text` followed by a newline.
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.write(text)?;
        self.push_char('\n');
        Ok(())
    }

    /// Append an empty line. Blank lines never carry indentation.
    pub fn blank_line(&mut self) -> Result<()> {
        self.write_char('\n')
    }

    /// Support for `write!` and `writeln!`.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        match args.as_str() {
            Some(text) => self.write(text),
            None => self.write(&args.to_string()),
        }
    }

    /// Write one line at column zero regardless of the current indentation.
    pub fn write_line_left_adjusted(&mut self, text: &str) -> Result<()> {
        self.require_empty_line("write a left-adjusted line")?;

        let saved = std::mem::replace(&mut self.indent_level, 0);
        let result = self.write_line(text);
        self.indent_level = saved;
        result
    }

    /// Write one line with a single extra level of indentation.
    pub fn write_line_indented(&mut self, text: &str) -> Result<()> {
        self.require_empty_line("write an indented line")?;

        self.indent_level += 1;
        let result = self.write_line(text);
        self.indent_level -= 1;
        result
    }

    /// Suppress the blank line the next [`ensure_separation`](Self::ensure_separation) would emit.
    pub fn no_separation_needed_before_next_line(&mut self) {
        self.no_separation_needed = true;
    }

    /// Emit one blank line unless separation was already provided or suppressed.
    pub fn ensure_separation(&mut self) -> Result<()> {
        self.ensure_writable()?;
        if self.no_separation_needed {
            return Ok(());
        }

        self.push_char('\n');
        self.no_separation_needed = true;
        Ok(())
    }

    // =========================================================================
    // Finishing
    // =========================================================================

    /// Write header, preamble and body to disk and release the file.
    ///
    /// Fails if called twice or while scopes are still open.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Err(Error::AlreadyFinished {
                path: self.path().to_path_buf(),
            });
        }

        D::before_finish(self)?;

        if self.indent_level > 0 || !self.scopes.is_empty() {
            return Err(Error::UnclosedScopes {
                path: self.path().to_path_buf(),
                depth: self.scopes.len().max(self.indent_level),
            });
        }

        let text = self.render();
        self.finished = true;
        self.buffer = String::new();

        self.output.commit(&text, &self.settings.format)?;
        Ok(())
    }

    /// Assemble the complete file text without consuming the buffer.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.buffer.len() + 256);

        if let Some(header) = &self.settings.header {
            let marker = self.dialect.comment_marker();
            for line in header.lines() {
                out.push_str(marker);
                out.push_str(line);
                out.push('\n');
            }
        }

        self.dialect.write_preamble(&mut out, &self.directory);
        out.push_str(&self.buffer);
        out
    }

    // =========================================================================
    // Internals
    // =========================================================================

    pub(super) fn ensure_writable(&self) -> Result<()> {
        if self.finished {
            return Err(Error::WriteAfterFinish);
        }
        Ok(())
    }

    fn require_empty_line(&self, operation: &'static str) -> Result<()> {
        self.ensure_writable()?;
        if !self.on_new_line {
            return Err(Error::LineNotEmpty { operation });
        }
        Ok(())
    }

    fn push_char(&mut self, c: char) {
        self.no_separation_needed = false;

        if self.on_new_line && c != '\r' && c != '\n' {
            self.on_new_line = false;
            self.settings
                .indent
                .push_levels(&mut self.buffer, self.indent_level);
            if let Some(prefix) = &self.prefix {
                self.buffer.push_str(prefix);
            }
        }

        self.buffer.push(c);

        if c == '\n' {
            self.on_new_line = true;
        }
    }
}

impl<D: Dialect> Drop for CodeWriter<D> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        warn!(
            path = %self.path().display(),
            "code writer dropped without finish(); finalizing"
        );
        if let Err(err) = self.finish() {
            error!(path = %self.path().display(), error = %err, "failed to finalize dropped code writer");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::builder::PlainText;

    fn writer(temp: &TempDir) -> CodeWriter<PlainText> {
        CodeWriter::create(temp.path().join("out.txt"), WriterSettings::default()).unwrap()
    }

    #[test]
    fn test_hello_world() {
        let temp = TempDir::new().unwrap();
        let mut w = writer(&temp);
        w.write_line("Hello, world!").unwrap();
        w.finish().unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("out.txt")).unwrap(),
            "Hello, world!\n"
        );
    }

    #[test]
    fn test_char_by_char_matches_str() {
        let temp = TempDir::new().unwrap();
        let mut w = writer(&temp);
        for c in "Hello, world!".chars() {
            w.write_char(c).unwrap();
        }
        assert_eq!(w.as_str(), "Hello, world!");
    }

    #[test]
    fn test_write_macros() {
        let temp = TempDir::new().unwrap();
        let mut w = writer(&temp);
        let name = "x";
        write!(w, "int {name}").unwrap();
        writeln!(w, " = {};", 42).unwrap();
        assert_eq!(w.as_str(), "int x = 42;\n");
    }

    #[test]
    fn test_blank_lines_are_not_indented() {
        let temp = TempDir::new().unwrap();
        let mut w = writer(&temp);
        w.indent(|w| {
            w.write_line("a")?;
            w.blank_line()?;
            w.write("\r\n")?;
            w.write_line("b")
        })
        .unwrap();
        assert_eq!(w.as_str(), "    a\n\n\r\n    b\n");
    }

    #[test]
    fn test_left_adjusted_requires_empty_line() {
        let temp = TempDir::new().unwrap();
        let mut w = writer(&temp);
        w.write("partial").unwrap();

        let err = w.write_line_left_adjusted("#pragma once").unwrap_err();
        assert!(matches!(err, Error::LineNotEmpty { .. }));
        let err = w.write_line_indented("x").unwrap_err();
        assert!(matches!(err, Error::LineNotEmpty { .. }));
    }

    #[test]
    fn test_line_indented() {
        let temp = TempDir::new().unwrap();
        let mut w = writer(&temp);
        w.write_line("if (x)").unwrap();
        w.write_line_indented("return;").unwrap();
        w.write_line("done();").unwrap();
        assert_eq!(w.as_str(), "if (x)\n    return;\ndone();\n");
        assert_eq!(w.indent_level(), 0);
    }

    #[test]
    fn test_ensure_separation() {
        let temp = TempDir::new().unwrap();
        let mut w = writer(&temp);

        // Nothing written yet: no leading blank line.
        w.ensure_separation().unwrap();
        w.write_line("a").unwrap();
        w.ensure_separation().unwrap();
        w.ensure_separation().unwrap();
        w.write_line("b").unwrap();
        w.no_separation_needed_before_next_line();
        w.ensure_separation().unwrap();
        w.write_line("c").unwrap();

        assert_eq!(w.as_str(), "a\n\nb\nc\n");
    }

    #[test]
    fn test_finish_twice_fails() {
        let temp = TempDir::new().unwrap();
        let mut w = writer(&temp);
        w.finish().unwrap();

        assert!(matches!(w.finish().unwrap_err(), Error::AlreadyFinished { .. }));
        assert!(matches!(w.write("x").unwrap_err(), Error::WriteAfterFinish));
        assert!(matches!(w.write_char('x').unwrap_err(), Error::WriteAfterFinish));
        assert!(w.ensure_separation().is_err());
    }

    #[test]
    fn test_header_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.txt");
        let settings = WriterSettings::default().with_header("GENERATED\nFILE");
        let mut w =
            CodeWriter::with_dialect(&path, settings, PlainText::with_marker("HEADER: ")).unwrap();
        w.write_line("Hello, world!").unwrap();
        w.finish().unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "HEADER: GENERATED\nHEADER: FILE\nHello, world!\n"
        );
    }

    #[test]
    fn test_drop_finalizes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.txt");
        {
            let mut w = writer(&temp);
            w.write_line("kept").unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept\n");
    }

    #[test]
    fn test_drop_with_open_scope_does_not_panic() {
        let temp = TempDir::new().unwrap();
        let mut w = writer(&temp);
        let _token = w.open_indent_scope(Some("{"), Some("}")).unwrap();
        drop(w);

        // The lock is released even though finalization failed.
        let _again = writer(&temp);
    }
}
