//! SHA-256 content hashing for tamper detection
//!
//! Both containers store the digest of their *pre-transform* payload and
//! recompute it after the reverse transform. Comparison is constant-time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{FilelockError, FilelockResult};

/// Size of a SHA-256 digest in bytes
pub const HASH_SIZE: usize = 32;

/// A raw SHA-256 digest
pub type ContentHash = [u8; HASH_SIZE];

/// Compute the SHA-256 digest of `data`.
pub fn content_hash(data: &[u8]) -> ContentHash {
    Sha256::digest(data).into()
}

/// Recompute the digest of `data` and compare it against `expected`.
///
/// `what` names the failure for the caller, e.g. "tampered or wrong password".
pub fn verify_content_hash(data: &[u8], expected: &ContentHash, what: &str) -> FilelockResult<()> {
    let actual = content_hash(data);
    if bool::from(actual.ct_eq(expected)) {
        Ok(())
    } else {
        Err(FilelockError::Integrity(what.to_owned()))
    }
}

/// Format a digest as lowercase hex (64 chars)
pub fn hash_to_hex(hash: &ContentHash) -> String {
    hex::encode(hash)
}
