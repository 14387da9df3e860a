//! Path helpers shared by writers and sessions.

use std::path::{Component, Path, PathBuf};

/// Build a path from caller text, accepting `\` as a separator on every host.
pub fn from_portable(s: &str) -> PathBuf {
    PathBuf::from(s.replace('\\', "/"))
}

/// Render a path with `/` separators regardless of the host convention.
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Remove `.` components and fold `..` into their parent without touching the filesystem.
///
/// A `..` that would climb above the root is dropped; on a relative path it is kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Resolve `path` against `base` when it is not already absolute, then normalize it.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&base.join(path))
    }
}

/// Express `target` relative to the directory `from_dir`.
///
/// Both paths are expected to be absolute. Paths on different roots (e.g. two
/// Windows drives) have no relative form, so `target` is returned unchanged.
pub fn relative_path(from_dir: &Path, target: &Path) -> PathBuf {
    let from = normalize_lexically(from_dir);
    let to = normalize_lexically(target);

    let from_parts: Vec<_> = from.components().collect();
    let to_parts: Vec<_> = to.components().collect();

    if from_parts.first() != to_parts.first() {
        return to;
    }

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from_parts.len() {
        rel.push("..");
    }
    for part in &to_parts[common..] {
        rel.push(part.as_os_str());
    }

    if rel.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        rel
    }
}
