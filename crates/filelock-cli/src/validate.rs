//! Command-line input checks, applied before any pipeline call

use std::path::Path;

use clap::ValueEnum;
use filelock_core::config::FilelockConfig;
use filelock_core::{FilelockError, FilelockResult};
use secrecy::{ExposeSecret, SecretString};

/// Named compression levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    Fast,
    Balanced,
    Max,
}

impl Preset {
    pub fn level(self) -> u32 {
        match self {
            Preset::Fast => 3,
            Preset::Balanced => 6,
            Preset::Max => 9,
        }
    }
}

/// Explicit level, else preset, else the configured default.
pub fn resolve_level(level: Option<u32>, preset: Option<Preset>, config: &FilelockConfig) -> u32 {
    level
        .or(preset.map(Preset::level))
        .unwrap_or(config.compression.default_level)
}

/// The input must exist and be a regular file.
pub fn input_file(path: &Path) -> FilelockResult<()> {
    let meta = std::fs::metadata(path).map_err(|e| FilelockError::io(path, e))?;
    if !meta.is_file() {
        return Err(FilelockError::InvalidArgument(format!(
            "not a regular file: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Length is counted in characters, not bytes.
pub fn password_strength(password: &SecretString, min_len: usize) -> FilelockResult<()> {
    let len = password.expose_secret().chars().count();
    if len < min_len {
        return Err(FilelockError::InvalidArgument(format!(
            "password must be at least {min_len} characters"
        )));
    }
    Ok(())
}

pub fn extension(path: &Path, config: &FilelockConfig) -> FilelockResult<()> {
    if config.security.enforce_extensions && !config.is_allowed_extension(path) {
        return Err(FilelockError::InvalidArgument(format!(
            "file type not allowed: {} (allowed: {})",
            path.display(),
            config.security.allowed_extensions.join(", ")
        )));
    }
    Ok(())
}
