//! Read-only inspection of a `.secured` artifact.
//!
//! Unwraps the compression layer (verifying its hash) and parses the crypto
//! container header. No password is needed and nothing is decrypted.

use std::path::Path;

use filelock_compress::{compression_ratio, decompress, parse_header};
use filelock_core::integrity::hash_to_hex;
use filelock_core::FilelockResult;
use filelock_crypto::EncryptedContainer;
use serde::Serialize;

use crate::fs::read_file;

#[derive(Debug, Clone, Serialize)]
pub struct SecuredInfo {
    /// Level byte recorded by the compressor
    pub level: u8,
    /// SHA-256 of the encrypted container, hex
    pub outer_hash: String,
    pub container_bytes: u64,
    pub payload_bytes: u64,
    pub compression_ratio: f64,
    pub salt: String,
    pub iv: String,
    /// SHA-256 of the original plaintext, hex
    pub plaintext_hash: String,
    pub ciphertext_bytes: u64,
}

pub fn inspect_secured(bytes: &[u8]) -> FilelockResult<SecuredInfo> {
    let (header, payload) = parse_header(bytes)?;
    let payload_bytes = payload.len() as u64;
    let inner = decompress(bytes, None)?;
    let container = EncryptedContainer::from_bytes(&inner)?;

    Ok(SecuredInfo {
        level: header.level,
        outer_hash: hash_to_hex(&header.content_hash),
        container_bytes: bytes.len() as u64,
        payload_bytes,
        compression_ratio: compression_ratio(inner.len() as u64, payload_bytes),
        salt: hex::encode(container.salt()),
        iv: hex::encode(container.iv()),
        plaintext_hash: hash_to_hex(container.content_hash()),
        ciphertext_bytes: container.ciphertext().len() as u64,
    })
}

pub fn inspect_secured_file(path: &Path) -> FilelockResult<SecuredInfo> {
    inspect_secured(&read_file(path)?)
}
