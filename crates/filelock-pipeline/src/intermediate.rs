//! Ownership of the one intermediate file a pipeline operation creates

use std::path::{Path, PathBuf};

use filelock_core::privacy::{sanitize_path, PrivacyMode};
use filelock_core::{FilelockError, FilelockResult};
use tracing::debug;

use crate::fs::remove_if_present;

/// Guard for an intermediate artifact. The file is removed when the guard
/// drops, whether the operation succeeded, returned an error, or unwound.
pub(crate) struct IntermediateFile {
    path: PathBuf,
    privacy: PrivacyMode,
}

impl IntermediateFile {
    /// Claim `path` for this operation. A file already present there is not
    /// ours to delete, so the claim is refused.
    pub(crate) fn claim(path: PathBuf, privacy: PrivacyMode) -> FilelockResult<Self> {
        if path.exists() {
            return Err(FilelockError::OutputExists(path));
        }
        Ok(Self { path, privacy })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for IntermediateFile {
    fn drop(&mut self) {
        if remove_if_present(&self.path) {
            debug!(path = %sanitize_path(&self.path, self.privacy), "removed intermediate file");
        }
    }
}
