//! Whole-file reads and atomic writes with path-naming errors

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use filelock_core::{FilelockError, FilelockResult};
use tempfile::NamedTempFile;
use tracing::warn;

pub(crate) fn read_file(path: &Path) -> FilelockResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| FilelockError::io(path, e))
}

/// Write `data` to a fresh temp file next to `path`, then rename it over `path`.
///
/// Readers never observe a partially written `path`. The temp file gets a
/// unique name, so no existing file is touched, and it is removed if any
/// step fails.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> FilelockResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FilelockError::io(path, e))?;
    tmp.write_all(data)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| FilelockError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| FilelockError::io(path, e.error))?;
    Ok(())
}

/// Best-effort removal used on cleanup paths; failures are logged, not returned.
pub(crate) fn remove_if_present(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove file during cleanup");
            false
        }
    }
}

/// Refuse to clobber `path` unless `overwrite` is set.
pub(crate) fn ensure_absent(path: &Path, overwrite: bool) -> FilelockResult<()> {
    if !overwrite && path.exists() {
        return Err(FilelockError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

/// `a/b.txt` + `.flk` → `a/b.txt.flk`
pub(crate) fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// `a/b.txt.flk` - `.flk` → `a/b.txt`; `None` when the name lacks the suffix
/// or would be empty without it.
pub(crate) fn strip_suffix(path: &Path, suffix: &str) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(suffix)?;
    if stem.is_empty() {
        return None;
    }
    Some(path.with_file_name(stem))
}

/// Whether `a` and `b` name the same location, compared lexically after
/// making both absolute. Symlinks are not resolved.
pub(crate) fn same_path(a: &Path, b: &Path) -> bool {
    absolute(a) == absolute(b)
}

fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
