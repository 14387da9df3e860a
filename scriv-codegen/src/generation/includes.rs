//! Include tracking for header-based languages.

use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use indexmap::IndexSet;
use scrivener_core::paths;

/// Sort order applied to rendered include paths.
#[derive(Debug, Clone, Copy, Default)]
pub enum IncludeOrder {
    /// Byte-wise comparison.
    #[default]
    Ordinal,
    /// Compare ignoring ASCII case, falling back to ordinal for ties.
    CaseInsensitive,
    /// A caller-supplied comparison.
    Custom(fn(&str, &str) -> Ordering),
}

impl IncludeOrder {
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Ordinal => a.cmp(b),
            Self::CaseInsensitive => a
                .bytes()
                .map(|b| b.to_ascii_lowercase())
                .cmp(b.bytes().map(|b| b.to_ascii_lowercase()))
                .then_with(|| a.cmp(b)),
            Self::Custom(compare) => compare(a, b),
        }
    }
}

/// Duplicate-free set of include paths.
///
/// File includes are stored absolute so that a relative and an absolute
/// spelling of the same file collapse into one entry. Relative entries name
/// files on the compiler's search path and render unchanged. Sorting happens
/// only when rendering, after absolute entries are made relative to the
/// including file.
///
/// # Example
///
/// ```
/// use std::path::{Path, PathBuf};
/// use scrivener_codegen::generation::IncludeSet;
///
/// let mut includes = IncludeSet::new();
/// includes.insert(PathBuf::from("/src/b.h"));
/// includes.insert(PathBuf::from("/src/a.h"));
/// includes.insert(PathBuf::from("/src/a.h"));
///
/// assert_eq!(includes.render(Path::new("/src")), vec!["a.h", "b.h"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IncludeSet {
    paths: IndexSet<PathBuf>,
    order: IncludeOrder,
}

impl IncludeSet {
    /// Create a new empty set with ordinal ordering.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(order: IncludeOrder) -> Self {
        Self {
            paths: IndexSet::new(),
            order,
        }
    }

    pub fn set_order(&mut self, order: IncludeOrder) {
        self.order = order;
    }

    pub fn order(&self) -> IncludeOrder {
        self.order
    }

    /// Add a path. Returns false if it was already present.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.paths.insert(path)
    }

    /// Check if a path is already included.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Iterate over the stored paths in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Merge another set into this one, keeping this set's order.
    pub fn merge(&mut self, other: &IncludeSet) {
        self.paths.extend(other.paths.iter().cloned());
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Get the number of paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Paths relative to `from_dir` with `/` separators, sorted by the set's order.
    ///
    /// Entries that render to the same text appear once.
    pub fn render(&self, from_dir: &Path) -> Vec<String> {
        let rendered: IndexSet<String> = self
            .paths
            .iter()
            .map(|path| {
                if path.is_absolute() {
                    paths::to_forward_slashes(&paths::relative_path(from_dir, path))
                } else {
                    paths::to_forward_slashes(path)
                }
            })
            .collect();
        let mut rendered: Vec<String> = rendered.into_iter().collect();
        rendered.sort_by(|a, b| self.order.compare(a, b));
        rendered
    }
}
