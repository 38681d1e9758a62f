use std::path::PathBuf;

use filelock_core::privacy::PrivacyMode;
use filelock_crypto::KdfParams;

/// Per-call settings, constructed by the caller and passed explicitly.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// How paths appear in log events
    pub privacy: PrivacyMode,
    /// Destination override (default: derived from the input name)
    pub output: Option<PathBuf>,
    /// Replace an existing destination instead of refusing
    pub overwrite: bool,
    /// KDF parameters; must match between secure and restore
    pub kdf: KdfParams,
}

impl OperationContext {
    pub fn with_privacy(mut self, privacy: PrivacyMode) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }
}
