//! Language families layered on [`CodeWriter`].

use std::path::{Path, PathBuf};

use scrivener_core::{Error, Result, paths};
use tracing::debug;

use super::{CodeWriter, ScopeToken};
use crate::generation::{IncludeOrder, IncludeSet};

/// Language-specific behavior of a [`CodeWriter`].
pub trait Dialect: std::fmt::Debug + Send + Sized + 'static {
    /// Identifier used by the writer registry and in log events.
    const KIND: &'static str;

    /// Text placed before every line of the generated-file banner.
    fn comment_marker(&self) -> &str;

    /// Text written between the banner and the body.
    fn write_preamble(&self, _out: &mut String, _file_dir: &Path) {}

    /// Called by [`CodeWriter::finish`] before any state is checked.
    fn before_finish(_writer: &mut CodeWriter<Self>) -> Result<()> {
        Ok(())
    }
}

/// Dialects whose blocks are delimited by `{` and `}`.
pub trait BraceLanguage: Dialect {}

pub type PlainTextWriter = CodeWriter<PlainText>;
pub type CLikeCodeWriter = CodeWriter<CLike>;
pub type CppCodeWriter = CodeWriter<Cpp>;

/// Unstructured text with a caller-chosen banner marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainText {
    marker: String,
    preamble: Option<String>,
}

impl PlainText {
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            preamble: None,
        }
    }

    /// Set a line written between the banner and the body.
    pub fn set_preamble(&mut self, preamble: impl Into<String>) {
        self.preamble = Some(preamble.into());
    }
}

impl Dialect for PlainText {
    const KIND: &'static str = "text";

    fn comment_marker(&self) -> &str {
        &self.marker
    }

    fn write_preamble(&self, out: &mut String, _file_dir: &Path) {
        if let Some(preamble) = &self.preamble {
            out.push_str(preamble);
            out.push('\n');
        }
    }
}

/// C, C#, Java and friends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CLike;

impl Dialect for CLike {
    const KIND: &'static str = "c-like";

    fn comment_marker(&self) -> &str {
        "// "
    }
}

impl BraceLanguage for CLike {}

impl<D: BraceLanguage> CodeWriter<D> {
    /// Run `f` inside a `{` / `}` block whose body starts without a blank line.
    pub fn block<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let token = self.open_block()?;
        self.run_scope(token, f)
    }

    /// Explicit form of [`block`](Self::block).
    pub fn open_block(&mut self) -> Result<ScopeToken> {
        let token = self.open_indent_scope(Some("{"), Some("}"))?;
        self.no_separation_needed_before_next_line();
        Ok(token)
    }
}

/// C and C++ headers and sources, with `#include` management.
#[derive(Debug, Clone, Default)]
pub struct Cpp {
    includes: IncludeSet,
    system_includes: IncludeSet,
    include_base: Option<PathBuf>,
}

impl Cpp {
    /// Sort both include blocks with `order`.
    pub fn with_order(order: IncludeOrder) -> Self {
        Self {
            includes: IncludeSet::with_order(order),
            system_includes: IncludeSet::with_order(order),
            include_base: None,
        }
    }

    /// Includes written as `#include "..."`.
    pub fn includes(&self) -> &IncludeSet {
        &self.includes
    }

    /// Includes written as `#include <...>`.
    pub fn system_includes(&self) -> &IncludeSet {
        &self.system_includes
    }
}

impl Dialect for Cpp {
    const KIND: &'static str = "cpp";

    fn comment_marker(&self) -> &str {
        "// "
    }

    fn write_preamble(&self, out: &mut String, file_dir: &Path) {
        for (set, open, close) in [
            (&self.includes, '"', '"'),
            (&self.system_includes, '<', '>'),
        ] {
            let rendered = set.render(file_dir);
            for path in &rendered {
                out.push_str("#include ");
                out.push(open);
                out.push_str(path);
                out.push(close);
                out.push('\n');
            }
            if !rendered.is_empty() {
                out.push('\n');
            }
        }
    }
}

impl BraceLanguage for Cpp {}

impl CodeWriter<Cpp> {
    /// Add a quoted include. Relative paths resolve against the include base.
    pub fn include(&mut self, path: &str) -> Result<()> {
        let resolved = self.resolve_include(path)?;
        debug!(file = %self.path().display(), include = %resolved.display(), "recorded include");
        self.dialect.includes.insert(resolved);
        Ok(())
    }

    /// Add an angle-bracket include.
    ///
    /// Relative paths name a file on the compiler's search path and are kept
    /// as given; absolute paths are rendered relative to the output file.
    pub fn include_system(&mut self, path: &str) -> Result<()> {
        let resolved = paths::normalize_lexically(&paths::from_portable(path));
        debug!(file = %self.path().display(), include = %resolved.display(), "recorded system include");
        self.dialect.system_includes.insert(resolved);
        Ok(())
    }

    /// Resolve later relative includes against `base` instead of the working directory.
    pub fn set_include_base(&mut self, base: impl AsRef<Path>) -> Result<()> {
        let base = paths::from_portable(&base.as_ref().to_string_lossy());
        let cwd = current_dir(&base)?;
        self.dialect.include_base = Some(paths::absolutize(&cwd, &base));
        Ok(())
    }

    /// Change the sort order of both include blocks.
    pub fn set_include_order(&mut self, order: IncludeOrder) {
        self.dialect.includes.set_order(order);
        self.dialect.system_includes.set_order(order);
    }

    /// Wrap the output of `f` in `#if 0` / `#endif` when `disabled` is true.
    ///
    /// The markers are written at column zero and do not change the
    /// indentation of the wrapped region. With `disabled` false, `f` runs
    /// unchanged.
    pub fn disable_scope<T>(
        &mut self,
        disabled: bool,
        message: Option<&str>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if !disabled {
            return f(self);
        }
        let token = self.open_disable_scope(message)?;
        self.run_scope(token, f)
    }

    /// Explicit form of [`disable_scope`](Self::disable_scope), always disabling.
    pub fn open_disable_scope(&mut self, message: Option<&str>) -> Result<ScopeToken> {
        self.ensure_separation()?;
        let start = match message {
            Some(message) => format!("#if 0 // {message}"),
            None => "#if 0".to_string(),
        };
        let token = self.open_left_adjusted_scope(&start, "#endif")?;
        self.no_separation_needed_before_next_line();
        Ok(token)
    }

    fn resolve_include(&self, path: &str) -> Result<PathBuf> {
        let path = paths::from_portable(path);
        let base = match &self.dialect.include_base {
            Some(base) => base.clone(),
            None => current_dir(&path)?,
        };
        Ok(paths::absolutize(&base, &path))
    }
}

fn current_dir(context: &Path) -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| Error::io(context, e))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::builder::WriterSettings;

    #[test]
    fn test_block_is_tight() {
        let temp = TempDir::new().unwrap();
        let mut w =
            CLikeCodeWriter::create(temp.path().join("a.c"), WriterSettings::default()).unwrap();

        w.write_line("void f(void)").unwrap();
        w.block(|w| {
            w.ensure_separation()?;
            w.write_line("g();")
        })
        .unwrap();

        assert_eq!(w.as_str(), "void f(void)\n{\n    g();\n}\n");
    }

    #[test]
    fn test_c_like_header_marker() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.c");
        let mut w =
            CLikeCodeWriter::create(&path, WriterSettings::default().with_header("generated"))
                .unwrap();
        w.write_line("int x;").unwrap();
        w.finish().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "// generated\nint x;\n");
    }

    #[test]
    fn test_plain_text_preamble() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.txt");
        let mut dialect = PlainText::default();
        dialect.set_preamble("BETWEEN");
        let mut w = CodeWriter::with_dialect(&path, WriterSettings::default(), dialect).unwrap();
        w.write_line("Hello, world!").unwrap();
        w.finish().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "BETWEEN\nHello, world!\n");
    }

    #[test]
    fn test_include_relative_and_absolute_dedupe() {
        let temp = TempDir::new().unwrap();
        let mut w =
            CppCodeWriter::create(temp.path().join("out.h"), WriterSettings::default()).unwrap();
        w.set_include_base(temp.path()).unwrap();

        w.include("a/b.h").unwrap();
        w.include(&temp.path().join("a").join("b.h").to_string_lossy())
            .unwrap();
        w.include("a\\.\\b.h").unwrap();

        assert_eq!(w.dialect().includes().len(), 1);
    }

    #[test]
    fn test_same_file_in_both_sets() {
        let temp = TempDir::new().unwrap();
        let mut w =
            CppCodeWriter::create(temp.path().join("out.h"), WriterSettings::default()).unwrap();
        w.set_include_base(temp.path()).unwrap();

        w.include("x.h").unwrap();
        w.include_system("x.h").unwrap();

        assert_eq!(w.render(), "#include \"x.h\"\n\n#include <x.h>\n\n");
    }

    #[test]
    fn test_system_includes_keep_search_path_form() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sub").join("out.h");
        let mut w = CppCodeWriter::create(path, WriterSettings::default()).unwrap();

        w.include_system("sys\\types.h").unwrap();
        w.include_system(&temp.path().join("vendor").join("lib.h").to_string_lossy())
            .unwrap();

        assert_eq!(
            w.render(),
            "#include <../vendor/lib.h>\n#include <sys/types.h>\n\n"
        );
    }

    #[test]
    fn test_system_include_spellings_collapse() {
        let temp = TempDir::new().unwrap();
        let mut w =
            CppCodeWriter::create(temp.path().join("out.h"), WriterSettings::default()).unwrap();

        w.include_system("a/b.h").unwrap();
        w.include_system(&temp.path().join("a").join("b.h").to_string_lossy())
            .unwrap();

        assert_eq!(w.render(), "#include <a/b.h>\n\n");
    }

    #[test]
    fn test_disable_scope() {
        let temp = TempDir::new().unwrap();
        let mut w =
            CppCodeWriter::create(temp.path().join("out.h"), WriterSettings::default()).unwrap();

        w.write_line("int a;").unwrap();
        w.block(|w| {
            w.disable_scope(true, Some("unsupported"), |w| {
                w.ensure_separation()?;
                w.write_line("int b;")
            })?;
            w.disable_scope(false, None, |w| w.write_line("int c;"))
        })
        .unwrap();

        assert_eq!(
            w.as_str(),
            "int a;\n{\n#if 0 // unsupported\n    int b;\n#endif\n    int c;\n}\n"
        );
    }

    #[test]
    fn test_disable_scope_separates_from_previous_line() {
        let temp = TempDir::new().unwrap();
        let mut w =
            CppCodeWriter::create(temp.path().join("out.h"), WriterSettings::default()).unwrap();

        w.write_line("int a;").unwrap();
        w.disable_scope(true, None, |w| w.write_line("int b;"))
            .unwrap();

        assert_eq!(w.as_str(), "int a;\n\n#if 0\nint b;\n#endif\n");
    }

    #[derive(Debug, Default)]
    struct Footer;

    impl Dialect for Footer {
        const KIND: &'static str = "footer";

        fn comment_marker(&self) -> &str {
            "# "
        }

        fn before_finish(writer: &mut CodeWriter<Self>) -> Result<()> {
            writer.ensure_separation()?;
            writer.write_line("# end")
        }
    }

    #[test]
    fn test_before_finish_hook() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.sh");
        let mut w = CodeWriter::<Footer>::create(&path, WriterSettings::default()).unwrap();
        w.write_line("echo hi").unwrap();
        w.finish().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "echo hi\n\n# end\n");
    }
}
