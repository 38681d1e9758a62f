//! Path sanitization for log output

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How file paths appear in log events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyMode {
    /// Full path as given
    #[default]
    Full,
    /// File name only: `.../name`
    Redacted,
    /// Stable pseudonym derived from the path: `file_<8 hex>`
    Hashed,
}

impl std::str::FromStr for PrivacyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(PrivacyMode::Full),
            "redacted" => Ok(PrivacyMode::Redacted),
            "hashed" => Ok(PrivacyMode::Hashed),
            other => Err(format!("unknown privacy mode '{other}' (expected full, redacted, or hashed)")),
        }
    }
}

/// Render `path` for a log event under the given privacy mode.
pub fn sanitize_path(path: &Path, mode: PrivacyMode) -> String {
    match mode {
        PrivacyMode::Full => path.display().to_string(),
        PrivacyMode::Redacted => match path.file_name() {
            Some(name) => format!(".../{}", name.to_string_lossy()),
            None => "...".to_string(),
        },
        PrivacyMode::Hashed => {
            let digest = Sha256::digest(path.to_string_lossy().as_bytes());
            format!("file_{}", &hex::encode(digest)[..8])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mode_keeps_path() {
        let p = Path::new("/home/user/secret/report.pdf");
        assert_eq!(sanitize_path(p, PrivacyMode::Full), "/home/user/secret/report.pdf");
    }

    #[test]
    fn redacted_mode_keeps_only_file_name() {
        let p = Path::new("/home/user/secret/report.pdf");
        assert_eq!(sanitize_path(p, PrivacyMode::Redacted), ".../report.pdf");
    }

    #[test]
    fn hashed_mode_is_stable_and_opaque() {
        let p = Path::new("/home/user/secret/report.pdf");
        let a = sanitize_path(p, PrivacyMode::Hashed);
        let b = sanitize_path(p, PrivacyMode::Hashed);
        assert_eq!(a, b);
        assert!(a.starts_with("file_"));
        assert_eq!(a.len(), "file_".len() + 8);
        assert!(!a.contains("report"));
    }

    #[test]
    fn parse_modes() {
        assert_eq!("REDACTED".parse::<PrivacyMode>().unwrap(), PrivacyMode::Redacted);
        assert_eq!("hashed".parse::<PrivacyMode>().unwrap(), PrivacyMode::Hashed);
        assert!("loud".parse::<PrivacyMode>().is_err());
    }
}
