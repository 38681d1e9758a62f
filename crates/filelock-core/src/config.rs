use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FilelockError, FilelockResult};
use crate::privacy::PrivacyMode;

/// Top-level configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilelockConfig {
    pub compression: CompressionConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Deflate level used when none is given on the command line (1-9)
    pub default_level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Minimum password length for encrypting operations
    pub min_password_length: usize,
    /// Reject inputs whose extension is not in `allowed_extensions`
    pub enforce_extensions: bool,
    /// Allow-listed input extensions, with leading dot
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
    /// How file paths appear in log events
    pub privacy_mode: PrivacyMode,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { default_level: 6 }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            min_password_length: 8,
            enforce_extensions: true,
            allowed_extensions: [
                ".txt", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".jpg", ".jpeg", ".png", ".zip",
                ".rar", ".7z",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
            privacy_mode: PrivacyMode::Full,
        }
    }
}

impl FilelockConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml(content: &str) -> FilelockResult<Self> {
        let config: FilelockConfig =
            toml::from_str(content).map_err(|e| FilelockError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to defaults when the file does not exist.
    pub fn load(path: &Path) -> FilelockResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| FilelockError::io(path, e))?;
        Self::from_toml(&content).map_err(|e| match e {
            FilelockError::Config(msg) => {
                FilelockError::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn validate(&self) -> FilelockResult<()> {
        if !(1..=9).contains(&self.compression.default_level) {
            return Err(FilelockError::Config(format!(
                "compression.default_level must be between 1 and 9, got {}",
                self.compression.default_level
            )));
        }
        if self.security.min_password_length == 0 {
            return Err(FilelockError::Config(
                "security.min_password_length must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Whether `path` carries an allow-listed extension (case-insensitive).
    pub fn is_allowed_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = format!(".{}", ext.to_string_lossy().to_ascii_lowercase());
        self.security
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.to_ascii_lowercase() == ext)
    }
}
