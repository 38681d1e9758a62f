//! Single-stage file operations
//!
//! The `*_to` functions are the building blocks the engine composes: they
//! read one file, transform it, and atomically write the result to an
//! explicit destination (replacing whatever is there). The unsuffixed
//! wrappers add default naming, suffix discipline and no-clobber checks for
//! standalone use.

use std::path::{Path, PathBuf};

use filelock_compress::{compress, decompress, validate_level};
use filelock_core::privacy::sanitize_path;
use filelock_core::{
    FilelockError, FilelockResult, ProgressFn, COMPRESSED_SUFFIX, ENCRYPTED_SUFFIX,
};
use filelock_crypto::{decrypt_with_params, encrypt_with_params, KdfParams};
use secrecy::SecretString;
use tracing::info;

use crate::context::OperationContext;
use crate::fs::{append_suffix, ensure_absent, read_file, strip_suffix, write_atomic};

/// Result of one file-level stage
#[derive(Debug, Clone)]
pub struct StageReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub bytes_in: u64,
    pub bytes_out: u64,
    /// Compression ratio in percent (compress stage only)
    pub ratio: Option<f64>,
}

/// Encrypt `input` into a crypto container at `output`.
pub fn encrypt_file_to(
    input: &Path,
    output: &Path,
    password: &SecretString,
    kdf: &KdfParams,
) -> FilelockResult<StageReport> {
    let plaintext = read_file(input)?;
    let container = encrypt_with_params(&plaintext, password, kdf)?;
    write_atomic(output, &container)?;

    Ok(StageReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        bytes_in: plaintext.len() as u64,
        bytes_out: container.len() as u64,
        ratio: None,
    })
}

/// Decrypt the crypto container at `input` into `output`.
///
/// Nothing is written unless the padding and content hash both verify.
pub fn decrypt_file_to(
    input: &Path,
    output: &Path,
    password: &SecretString,
    kdf: &KdfParams,
) -> FilelockResult<StageReport> {
    let container = read_file(input)?;
    let plaintext = decrypt_with_params(&container, password, kdf)?;
    write_atomic(output, &plaintext)?;

    Ok(StageReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        bytes_in: container.len() as u64,
        bytes_out: plaintext.len() as u64,
        ratio: None,
    })
}

/// Compress `input` into a compression container at `output`.
pub fn compress_file_to(
    input: &Path,
    output: &Path,
    level: u32,
    progress: Option<&ProgressFn>,
) -> FilelockResult<StageReport> {
    validate_level(level)?;
    let data = read_file(input)?;
    let blob = compress(&data, level, progress)?;
    write_atomic(output, &blob.container)?;

    Ok(StageReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        bytes_in: blob.original_size,
        bytes_out: blob.container.len() as u64,
        ratio: Some(blob.ratio()),
    })
}

/// Decompress the compression container at `input` into `output`.
pub fn decompress_file_to(
    input: &Path,
    output: &Path,
    progress: Option<&ProgressFn>,
) -> FilelockResult<StageReport> {
    let container = read_file(input)?;
    let data = decompress(&container, progress)?;
    write_atomic(output, &data)?;

    Ok(StageReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        bytes_in: container.len() as u64,
        bytes_out: data.len() as u64,
        ratio: None,
    })
}

/// `<f>` → `<f>.flk`
pub fn encrypt_file(
    path: &Path,
    password: &SecretString,
    ctx: &OperationContext,
) -> FilelockResult<StageReport> {
    let output = resolve_output(ctx, || Ok(append_suffix(path, ENCRYPTED_SUFFIX)))?;
    ensure_absent(&output, ctx.overwrite)?;

    let report = encrypt_file_to(path, &output, password, &ctx.kdf)?;
    info!(
        path = %sanitize_path(path, ctx.privacy),
        bytes = report.bytes_in,
        "file encrypted"
    );
    Ok(report)
}

/// `<f>.flk` → `<f>`
pub fn decrypt_file(
    path: &Path,
    password: &SecretString,
    ctx: &OperationContext,
) -> FilelockResult<StageReport> {
    let output = resolve_output(ctx, || required_stem(path, ENCRYPTED_SUFFIX))?;
    ensure_absent(&output, ctx.overwrite)?;

    let report = decrypt_file_to(path, &output, password, &ctx.kdf)?;
    info!(
        path = %sanitize_path(path, ctx.privacy),
        bytes = report.bytes_out,
        "file decrypted"
    );
    Ok(report)
}

/// `<f>` → `<f>.flc`
pub fn compress_file(
    path: &Path,
    level: u32,
    progress: Option<&ProgressFn>,
    ctx: &OperationContext,
) -> FilelockResult<StageReport> {
    validate_level(level)?;
    let output = resolve_output(ctx, || Ok(append_suffix(path, COMPRESSED_SUFFIX)))?;
    ensure_absent(&output, ctx.overwrite)?;

    let report = compress_file_to(path, &output, level, progress)?;
    info!(
        path = %sanitize_path(path, ctx.privacy),
        level,
        original = report.bytes_in,
        compressed = report.bytes_out,
        ratio = report.ratio.unwrap_or_default(),
        "file compressed"
    );
    Ok(report)
}

/// `<f>.flc` → `<f>`
pub fn decompress_file(
    path: &Path,
    progress: Option<&ProgressFn>,
    ctx: &OperationContext,
) -> FilelockResult<StageReport> {
    // Suffix is checked even with an explicit output: it is format discipline.
    let stem = required_stem(path, COMPRESSED_SUFFIX)?;
    let output = ctx.output.clone().unwrap_or(stem);
    ensure_absent(&output, ctx.overwrite)?;

    let report = decompress_file_to(path, &output, progress)?;
    info!(
        path = %sanitize_path(path, ctx.privacy),
        bytes = report.bytes_out,
        "file decompressed"
    );
    Ok(report)
}

fn resolve_output(
    ctx: &OperationContext,
    default: impl FnOnce() -> FilelockResult<PathBuf>,
) -> FilelockResult<PathBuf> {
    match &ctx.output {
        Some(p) => Ok(p.clone()),
        None => default(),
    }
}

pub(crate) fn required_stem(path: &Path, suffix: &str) -> FilelockResult<PathBuf> {
    strip_suffix(path, suffix).ok_or_else(|| {
        FilelockError::InvalidArgument(format!(
            "expected a '{suffix}' file, got {}",
            path.display()
        ))
    })
}
