//! Output sessions: hand out writers for files under one base directory.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use indexmap::IndexSet;
use parking_lot::Mutex;
use scrivener_core::{Error, FileFormat, OutputFile, Result, paths};
use tracing::{debug, error, warn};

use super::{OutputWriter, SessionOptions, WriterRegistry};
use crate::builder::{CodeWriter, Dialect};

/// Name of the log listing every file a session wrote, relative to the base directory.
pub const FILE_LOG_NAME: &str = "FilesWritten.txt";

/// Longest file name, in bytes, a session will create.
const MAX_FILE_NAME_BYTES: usize = 254;

/// Room kept free in truncated names for a `_N` conflict suffix.
const SUFFIX_RESERVE_BYTES: usize = 21;

/// Longest extension, dot included, kept intact when a name is truncated.
/// Anything longer is treated as part of the stem.
const MAX_EXTENSION_BYTES: usize = 64;

/// A generation run writing into one base directory.
///
/// The session decides where each output goes, resolves name conflicts, and
/// on [`finish`](Self::finish) removes stale files from the previous run and
/// writes [`FILE_LOG_NAME`]. Opening is thread-safe, so independent tasks may
/// share a session through a reference.
///
/// # Example
///
/// ```no_run
/// use scrivener_codegen::builder::Cpp;
/// use scrivener_codegen::generation::{OutputSession, SessionOptions};
///
/// # fn main() -> scrivener_core::Result<()> {
/// let session = OutputSession::new(SessionOptions::new("generated"))?;
///
/// let mut header = session.open::<Cpp>("api.h")?;
/// header.include_system("stdint.h")?;
/// header.write_line("int32_t answer(void);")?;
/// header.finish()?;
///
/// session.finish()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OutputSession {
    options: SessionOptions,
    base: PathBuf,
    registry: WriterRegistry,
    written: Mutex<IndexSet<PathBuf>>,
    finished: bool,
}

impl OutputSession {
    /// Start a session with the built-in writer kinds.
    pub fn new(options: SessionOptions) -> Result<Self> {
        Self::with_registry(options, WriterRegistry::default())
    }

    /// Start a session whose [`open_kind`](Self::open_kind) uses `registry`.
    pub fn with_registry(options: SessionOptions, registry: WriterRegistry) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(&options.base_output_directory, e))?;
        let base = paths::absolutize(&cwd, &options.base_output_directory);
        debug!(base = %base.display(), "started output session");

        Ok(Self {
            options,
            base,
            registry,
            written: Mutex::new(IndexSet::new()),
            finished: false,
        })
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Absolute base output directory.
    pub fn base_output_directory(&self) -> &Path {
        &self.base
    }

    pub fn registry(&self) -> &WriterRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WriterRegistry {
        &mut self.registry
    }

    /// Open a writer of dialect `D` for `relative_path` under the base directory.
    pub fn open<D: Dialect + Default>(&self, relative_path: impl AsRef<Path>) -> Result<CodeWriter<D>> {
        self.open_with(relative_path, D::default())
    }

    /// Open a writer for `relative_path` using an already configured dialect.
    pub fn open_with<D: Dialect>(
        &self,
        relative_path: impl AsRef<Path>,
        dialect: D,
    ) -> Result<CodeWriter<D>> {
        let path = self.claim(relative_path.as_ref())?;
        CodeWriter::with_dialect(path.clone(), self.options.writer_settings(), dialect)
            .inspect_err(|_| self.release(&path))
    }

    /// Open a writer of the registered `kind` for `relative_path`.
    pub fn open_kind(
        &self,
        kind: &str,
        relative_path: impl AsRef<Path>,
    ) -> Result<Box<dyn OutputWriter>> {
        if !self.registry.contains(kind) {
            return Err(Error::UnknownWriterKind {
                kind: kind.to_string(),
            });
        }

        let path = self.claim(relative_path.as_ref())?;
        self.registry
            .create(kind, path.clone(), self.options.writer_settings())
            .inspect_err(|_| self.release(&path))
    }

    /// Absolute paths handed out so far, in the order they were opened.
    pub fn files_written(&self) -> Vec<PathBuf> {
        self.written.lock().iter().cloned().collect()
    }

    /// Remove stale output from the previous run and write the file log.
    ///
    /// Writers still open are unaffected; their paths are already logged.
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.finish_inner()
    }

    /// Pick the absolute output path for `relative` and record it.
    fn claim(&self, relative: &Path) -> Result<PathBuf> {
        let relative = paths::from_portable(&relative.to_string_lossy());
        let requested = fit_file_name(&paths::absolutize(&self.base, &relative), None);

        let mut written = self.written.lock();
        let path = if !written.contains(&requested) {
            requested
        } else if self.options.auto_rename_conflicting_files {
            let mut index = 0;
            let renamed = loop {
                let candidate = fit_file_name(&requested, Some(index));
                if !written.contains(&candidate) {
                    break candidate;
                }
                index += 1;
            };
            debug!(path = %renamed.display(), "renamed conflicting output file");
            renamed
        } else {
            return Err(Error::OutputConflict { path: requested });
        };

        written.insert(path.clone());
        Ok(path)
    }

    fn release(&self, path: &Path) {
        self.written.lock().shift_remove(path);
    }

    fn finish_inner(&mut self) -> Result<()> {
        let written = self.written.get_mut();
        let log_path = self.base.join(FILE_LOG_NAME);

        if self.options.clean_stale_output {
            clean_stale_output(&self.base, &log_path, written)?;
        }

        if self.options.write_file_log {
            let mut log = String::new();
            for path in written.iter() {
                log.push_str(&paths::to_forward_slashes(&paths::relative_path(
                    &self.base, path,
                )));
                log.push('\n');
            }

            let mut file = OutputFile::reserve(&log_path)?;
            file.commit(&log, &FileFormat::default())?;
        }

        debug!(base = %self.base.display(), files = written.len(), "finished output session");
        Ok(())
    }
}

impl Drop for OutputSession {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        if let Err(err) = self.finish_inner() {
            error!(base = %self.base.display(), error = %err, "failed to finish output session");
        }
    }
}

/// Delete files listed in the previous log that this session did not write.
///
/// A file that cannot be removed is logged and skipped so the new log still
/// gets written.
fn clean_stale_output(base: &Path, log_path: &Path, written: &IndexSet<PathBuf>) -> Result<()> {
    let previous = match std::fs::read_to_string(log_path) {
        Ok(previous) => previous,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io(log_path, e)),
    };

    for line in previous.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let stale = paths::absolutize(base, &paths::from_portable(line));
        if !stale.starts_with(base) || stale == log_path || written.contains(&stale) {
            continue;
        }

        match std::fs::remove_file(&stale) {
            Ok(()) => warn!(path = %stale.display(), "removed stale output file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                error!(path = %stale.display(), error = %e, "failed to remove stale output file");
            }
        }
    }
    Ok(())
}

/// Apply the file name length limit and an optional `_N` conflict suffix.
///
/// Names that are too long lose characters from the end of their stem; the
/// extension is kept unless it is longer than [`MAX_EXTENSION_BYTES`], in
/// which case the whole name is truncated. Truncated stems leave room for a
/// suffix, so the renamed variants of one long name share the same stem.
fn fit_file_name(path: &Path, suffix: Option<usize>) -> PathBuf {
    let Some(name) = path.file_name() else {
        return path.to_path_buf();
    };
    let name = name.to_string_lossy();
    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_BYTES => name.split_at(dot),
        _ => (name.as_ref(), ""),
    };
    let suffix = suffix.map(|index| format!("_{index}")).unwrap_or_default();

    let mut stem_budget = MAX_FILE_NAME_BYTES.saturating_sub(extension.len());
    if stem.len() > stem_budget {
        stem_budget = stem_budget.saturating_sub(SUFFIX_RESERVE_BYTES);
    } else {
        stem_budget = stem_budget.saturating_sub(suffix.len());
    }
    let stem = truncate_at_char_boundary(stem, stem_budget);

    path.with_file_name(format!("{stem}{suffix}{extension}"))
}

fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
