use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type FilelockResult<T> = Result<T, FilelockError>;

#[derive(Debug, Error)]
pub enum FilelockError {
    /// Bad compression level or wrong suffix for the requested operation.
    /// Always raised before any file is read or written.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The destination (or an intermediate path) already exists.
    #[error("refusing to overwrite existing file: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// Stored content hash (or CBC padding) did not check out.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    #[error("decompression failed: {0}")]
    Decompression(String),

    #[error("compression failed: {0}")]
    Compression(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to secure {}", path.display())]
    SecureOperation {
        path: PathBuf,
        #[source]
        source: Box<FilelockError>,
    },

    #[error("failed to restore {}", path.display())]
    RestoreOperation {
        path: PathBuf,
        #[source]
        source: Box<FilelockError>,
    },
}

impl FilelockError {
    /// Classify an I/O error by kind, keeping the failing path.
    pub fn io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FilelockError::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => FilelockError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => FilelockError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// The stage error underneath any orchestration wrappers.
    pub fn cause(&self) -> &FilelockError {
        match self {
            FilelockError::SecureOperation { source, .. }
            | FilelockError::RestoreOperation { source, .. } => source.cause(),
            other => other,
        }
    }

    /// True when stored data failed verification: a content-hash or padding
    /// mismatch, or an inflate failure behind a well-formed compression
    /// header. zlib's own header and adler32 checks reject a flipped payload
    /// byte before the SHA-256 comparison runs, so both mean "tampered".
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self.cause(),
            FilelockError::Integrity(_) | FilelockError::Decompression(_)
        )
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.cause(), FilelockError::InvalidArgument(_))
    }
}
