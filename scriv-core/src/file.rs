use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use tracing::debug;

use crate::{Error, FileFormat, Result};

/// An output slot on disk held exclusively from reservation until commit.
///
/// Reserving opens the file and takes an exclusive OS lock right away, so a
/// second writer aimed at the same path fails immediately instead of
/// interleaving with the first. Nothing but truncation touches the file until
/// [`OutputFile::commit`] writes the complete contents in one pass.
#[derive(Debug)]
pub struct OutputFile {
    path: PathBuf,
    file: Option<File>,
}

impl OutputFile {
    /// Create (or truncate) `path` and lock it for exclusive writing.
    pub fn reserve(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
        }

        // Truncating before the lock is held would clobber another writer's output.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;

        if let Err(source) = FileExt::try_lock_exclusive(&file) {
            return Err(if is_contended(&source) {
                Error::PathLocked { path, source }
            } else {
                Error::io(path, source)
            });
        }

        file.set_len(0).map_err(|e| Error::io(&path, e))?;
        debug!(path = %path.display(), "reserved output file");

        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Get the reserved path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether the contents were already written and the lock released.
    pub fn is_committed(&self) -> bool {
        self.file.is_none()
    }

    /// Write `text` in the given format, flush, and release the lock.
    ///
    /// Returns the number of bytes written.
    pub fn commit(&mut self, text: &str, format: &FileFormat) -> Result<usize> {
        let Some(mut file) = self.file.take() else {
            return Err(Error::AlreadyFinished {
                path: self.path.clone(),
            });
        };

        let bytes = format.render(text);
        file.write_all(&bytes)
            .and_then(|()| file.flush())
            .map_err(|e| Error::io(&self.path, e))?;
        FileExt::unlock(&file).map_err(|e| Error::io(&self.path, e))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "committed output file");
        Ok(bytes.len())
    }
}

impl Drop for OutputFile {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            debug!(path = %self.path.display(), "releasing uncommitted output file");
            let _ = FileExt::unlock(&file);
        }
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
