//! Secure/restore engine: two stages, one owned intermediate file
//!
//!   - `secure_file`:  validate level → encrypt to `<f>.flk` → compress to `<f>.secured` → drop `.flk`
//!   - `restore_file`: check `.secured` suffix → decompress to `<f>.flk` → decrypt to `<f>` → drop `.flk`
//!
//! Argument errors (bad level, wrong suffix, existing destination, a
//! destination that is the intermediate path) are
//! returned as-is before any file is touched. Anything failing after that is
//! wrapped in `SecureOperation` / `RestoreOperation` once the intermediate
//! file has been removed.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use filelock_compress::validate_level;
use filelock_core::privacy::sanitize_path;
use filelock_core::{
    FilelockError, FilelockResult, ProgressFn, ENCRYPTED_SUFFIX, SECURED_SUFFIX,
};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::context::OperationContext;
use crate::fs::{append_suffix, ensure_absent, same_path};
use crate::intermediate::IntermediateFile;
use crate::stages::{
    compress_file_to, decompress_file_to, decrypt_file_to, encrypt_file_to, required_stem,
};

/// Result of a successful secure operation
#[derive(Debug, Clone)]
pub struct SecureReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub original_bytes: u64,
    /// Size of the final `.secured` container
    pub secured_bytes: u64,
    /// Compression ratio of the encrypted payload, in percent
    pub compression_ratio: f64,
    pub elapsed: Duration,
}

/// Result of a successful restore operation
#[derive(Debug, Clone)]
pub struct RestoreReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub restored_bytes: u64,
    pub elapsed: Duration,
}

/// Operation progress, for log events only
#[derive(Debug, Clone, Copy)]
enum Stage {
    Start,
    Stage1Done,
    Stage2Done,
    CleanedUp,
}

/// Secure `path` into `path.secured` with default settings.
pub fn secure_file(
    path: &Path,
    password: &SecretString,
    level: u32,
    progress: Option<&ProgressFn>,
) -> FilelockResult<SecureReport> {
    secure_file_with_context(path, password, level, progress, &OperationContext::default())
}

/// Secure with explicit output, overwrite, privacy and KDF settings.
pub fn secure_file_with_context(
    path: &Path,
    password: &SecretString,
    level: u32,
    progress: Option<&ProgressFn>,
    ctx: &OperationContext,
) -> FilelockResult<SecureReport> {
    validate_level(level)?;
    let output = ctx
        .output
        .clone()
        .unwrap_or_else(|| append_suffix(path, SECURED_SUFFIX));
    let intermediate_path = append_suffix(path, ENCRYPTED_SUFFIX);
    reject_intermediate_output(&output, &intermediate_path)?;
    ensure_absent(&output, ctx.overwrite)?;

    let shown = sanitize_path(path, ctx.privacy);
    let started = Instant::now();
    debug!(path = %shown, level, stage = ?Stage::Start, "secure");

    match run_secure(path, intermediate_path, &output, password, level, progress, ctx) {
        Ok((original_bytes, secured_bytes, compression_ratio)) => {
            let report = SecureReport {
                input: path.to_path_buf(),
                output,
                original_bytes,
                secured_bytes,
                compression_ratio,
                elapsed: started.elapsed(),
            };
            info!(
                path = %shown,
                original = report.original_bytes,
                secured = report.secured_bytes,
                ratio = report.compression_ratio,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "file secured"
            );
            Ok(report)
        }
        Err(e) => {
            warn!(path = %shown, error = %e, "secure failed, intermediate removed");
            Err(FilelockError::SecureOperation {
                path: path.to_path_buf(),
                source: Box::new(e),
            })
        }
    }
}

fn run_secure(
    path: &Path,
    intermediate_path: PathBuf,
    output: &Path,
    password: &SecretString,
    level: u32,
    progress: Option<&ProgressFn>,
    ctx: &OperationContext,
) -> FilelockResult<(u64, u64, f64)> {
    let shown = sanitize_path(path, ctx.privacy);
    let intermediate = IntermediateFile::claim(intermediate_path, ctx.privacy)?;

    let encrypted = encrypt_file_to(path, intermediate.path(), password, &ctx.kdf)?;
    debug!(path = %shown, bytes = encrypted.bytes_out, stage = ?Stage::Stage1Done, "secure");

    let compressed = compress_file_to(intermediate.path(), output, level, progress)?;
    debug!(path = %shown, bytes = compressed.bytes_out, stage = ?Stage::Stage2Done, "secure");

    drop(intermediate);
    debug!(path = %shown, stage = ?Stage::CleanedUp, "secure");

    Ok((
        encrypted.bytes_in,
        compressed.bytes_out,
        compressed.ratio.unwrap_or_default(),
    ))
}

/// Restore `path` (which must end in `.secured`) with default settings.
pub fn restore_file(
    path: &Path,
    password: &SecretString,
    progress: Option<&ProgressFn>,
) -> FilelockResult<RestoreReport> {
    restore_file_with_context(path, password, progress, &OperationContext::default())
}

/// Restore with explicit output, overwrite, privacy and KDF settings.
pub fn restore_file_with_context(
    path: &Path,
    password: &SecretString,
    progress: Option<&ProgressFn>,
    ctx: &OperationContext,
) -> FilelockResult<RestoreReport> {
    let stem = required_stem(path, SECURED_SUFFIX)?;
    let output = ctx.output.clone().unwrap_or_else(|| stem.clone());
    let intermediate_path = append_suffix(&stem, ENCRYPTED_SUFFIX);
    reject_intermediate_output(&output, &intermediate_path)?;
    ensure_absent(&output, ctx.overwrite)?;

    let shown = sanitize_path(path, ctx.privacy);
    let started = Instant::now();
    debug!(path = %shown, stage = ?Stage::Start, "restore");

    match run_restore(path, intermediate_path, &output, password, progress, ctx) {
        Ok(restored_bytes) => {
            let report = RestoreReport {
                input: path.to_path_buf(),
                output,
                restored_bytes,
                elapsed: started.elapsed(),
            };
            info!(
                path = %shown,
                restored = report.restored_bytes,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "file restored"
            );
            Ok(report)
        }
        Err(e) => {
            warn!(path = %shown, error = %e, "restore failed, intermediate removed");
            Err(FilelockError::RestoreOperation {
                path: path.to_path_buf(),
                source: Box::new(e),
            })
        }
    }
}

fn run_restore(
    path: &Path,
    intermediate_path: PathBuf,
    output: &Path,
    password: &SecretString,
    progress: Option<&ProgressFn>,
    ctx: &OperationContext,
) -> FilelockResult<u64> {
    let shown = sanitize_path(path, ctx.privacy);
    let intermediate = IntermediateFile::claim(intermediate_path, ctx.privacy)?;

    let decompressed = decompress_file_to(path, intermediate.path(), progress)?;
    debug!(path = %shown, bytes = decompressed.bytes_out, stage = ?Stage::Stage1Done, "restore");

    let decrypted = decrypt_file_to(intermediate.path(), output, password, &ctx.kdf)?;
    debug!(path = %shown, bytes = decrypted.bytes_out, stage = ?Stage::Stage2Done, "restore");

    drop(intermediate);
    debug!(path = %shown, stage = ?Stage::CleanedUp, "restore");

    Ok(decrypted.bytes_out)
}

/// The intermediate is deleted when the operation ends, so it can never be
/// the destination.
fn reject_intermediate_output(output: &Path, intermediate: &Path) -> FilelockResult<()> {
    if same_path(output, intermediate) {
        return Err(FilelockError::InvalidArgument(format!(
            "output {} is the intermediate file for this operation",
            output.display()
        )));
    }
    Ok(())
}
