//! Writer factories keyed by kind name.
//!
//! Writers are normally opened with a concrete dialect type
//! (`session.open::<Cpp>(...)`). When the kind is only known at runtime,
//! for example from configuration, a [`WriterRegistry`] maps the kind name to
//! a factory returning a boxed [`OutputWriter`].
//!
//! # Example
//!
//! ```
//! use scrivener_codegen::generation::WriterRegistry;
//!
//! let registry = WriterRegistry::default();
//! assert!(registry.contains("cpp"));
//! assert_eq!(registry.kinds().collect::<Vec<_>>(), ["text", "c-like", "cpp"]);
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use scrivener_core::{Error, Result};

use crate::builder::{CLike, CodeWriter, Cpp, Dialect, PlainText, WriterSettings};

/// Object-safe view of a writer, for callers that pick the kind at runtime.
pub trait OutputWriter: Send + fmt::Debug {
    /// Registry name of the writer's dialect.
    fn kind(&self) -> &'static str;

    fn path(&self) -> &Path;

    fn write(&mut self, text: &str) -> Result<()>;

    fn write_line(&mut self, text: &str) -> Result<()>;

    fn blank_line(&mut self) -> Result<()>;

    fn ensure_separation(&mut self) -> Result<()>;

    /// Run `f` one indentation level deeper.
    fn with_indent(
        &mut self,
        f: &mut dyn FnMut(&mut dyn OutputWriter) -> Result<()>,
    ) -> Result<()>;

    fn finish(&mut self) -> Result<()>;

    fn is_finished(&self) -> bool;
}

impl<D: Dialect> OutputWriter for CodeWriter<D> {
    fn kind(&self) -> &'static str {
        D::KIND
    }

    fn path(&self) -> &Path {
        CodeWriter::path(self)
    }

    fn write(&mut self, text: &str) -> Result<()> {
        CodeWriter::write(self, text)
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        CodeWriter::write_line(self, text)
    }

    fn blank_line(&mut self) -> Result<()> {
        CodeWriter::blank_line(self)
    }

    fn ensure_separation(&mut self) -> Result<()> {
        CodeWriter::ensure_separation(self)
    }

    fn with_indent(
        &mut self,
        f: &mut dyn FnMut(&mut dyn OutputWriter) -> Result<()>,
    ) -> Result<()> {
        self.indent(|w| f(w))
    }

    fn finish(&mut self) -> Result<()> {
        CodeWriter::finish(self)
    }

    fn is_finished(&self) -> bool {
        CodeWriter::is_finished(self)
    }
}

type Factory = Box<dyn Fn(PathBuf, WriterSettings) -> Result<Box<dyn OutputWriter>> + Send + Sync>;

/// Table of writer factories, in registration order.
pub struct WriterRegistry {
    factories: IndexMap<String, Factory>,
}

impl WriterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Create a registry with the built-in `text`, `c-like` and `cpp` writers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_dialect::<PlainText>();
        registry.register_dialect::<CLike>();
        registry.register_dialect::<Cpp>();
        registry
    }

    /// Register `factory` under `kind`, replacing any previous entry.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(PathBuf, WriterSettings) -> Result<Box<dyn OutputWriter>> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    /// Register the default-constructed writer of dialect `D` under `D::KIND`.
    pub fn register_dialect<D: Dialect + Default>(&mut self) {
        self.register(D::KIND, |path, settings| {
            let writer = CodeWriter::<D>::create(path, settings)?;
            Ok(Box::new(writer) as Box<dyn OutputWriter>)
        });
    }

    /// Create a writer of `kind` for `path`.
    pub fn create(
        &self,
        kind: &str,
        path: PathBuf,
        settings: WriterSettings,
    ) -> Result<Box<dyn OutputWriter>> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| Error::UnknownWriterKind {
                kind: kind.to_string(),
            })?;
        factory(path, settings)
    }

    /// Check if a factory is registered under `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Iterate over registered kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Get the number of registered kinds.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for WriterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for WriterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_builtins() {
        let registry = WriterRegistry::with_builtins();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("text"));
        assert!(registry.contains("c-like"));
        assert!(registry.contains("cpp"));
    }

    #[test]
    fn test_unknown_kind() {
        let temp = TempDir::new().unwrap();
        let registry = WriterRegistry::new();
        assert!(registry.is_empty());

        let err = registry
            .create("rust", temp.path().join("a.rs"), WriterSettings::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownWriterKind { kind } if kind == "rust"));
    }

    #[test]
    fn test_create_through_trait_object() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.c");
        let registry = WriterRegistry::default();

        let mut writer = registry
            .create("c-like", path.clone(), WriterSettings::default())
            .unwrap();
        assert_eq!(writer.kind(), "c-like");

        writer.write_line("void f(void)").unwrap();
        writer.write_line("{").unwrap();
        writer
            .with_indent(&mut |w| w.write_line("return;"))
            .unwrap();
        writer.write_line("}").unwrap();
        writer.finish().unwrap();

        assert!(writer.is_finished());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "void f(void)\n{\n    return;\n}\n"
        );
    }

    #[test]
    fn test_custom_factory() {
        let temp = TempDir::new().unwrap();
        let mut registry = WriterRegistry::new();
        registry.register("shell", |path, settings| {
            let writer = CodeWriter::with_dialect(path, settings, PlainText::with_marker("# "))?;
            Ok(Box::new(writer) as Box<dyn OutputWriter>)
        });

        let mut writer = registry
            .create(
                "shell",
                temp.path().join("run.sh"),
                WriterSettings::default().with_header("generated"),
            )
            .unwrap();
        writer.write_line("echo hi").unwrap();
        writer.finish().unwrap();

        assert_eq!(
            std::fs::read_to_string(temp.path().join("run.sh")).unwrap(),
            "# generated\necho hi\n"
        );
    }
}
