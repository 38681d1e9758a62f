//! AES-256-CBC crypto container encode/decode
//!
//! Encode: fresh salt + iv → derive key → hash plaintext → PKCS#7 pad → encrypt.
//! Decode: split header → derive key → decrypt → unpad → verify content hash.
//!
//! A wrong password almost always shows up as invalid padding; when the
//! padding happens to validate, the content hash catches it. Both surface as
//! `FilelockError::Integrity`, distinct from a structurally short container.

use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use filelock_core::integrity::{content_hash, verify_content_hash, ContentHash, HASH_SIZE};
use filelock_core::{FilelockError, FilelockResult};
use rand::RngCore;
use secrecy::SecretString;
use tracing::debug;
use zeroize::Zeroize;

use crate::kdf::{derive_key, KdfParams};
use crate::{BLOCK_SIZE, HEADER_SIZE, IV_SIZE, SALT_SIZE};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const WRONG_KEY: &str = "tampered or wrong password";

/// Parsed crypto container
#[derive(Debug, Clone)]
pub struct EncryptedContainer {
    salt: [u8; SALT_SIZE],
    iv: [u8; IV_SIZE],
    content_hash: ContentHash,
    ciphertext: Vec<u8>,
}

impl EncryptedContainer {
    /// Serialize as `salt ‖ iv ‖ content_hash ‖ ciphertext`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + self.ciphertext.len());
        bytes.extend_from_slice(&self.salt);
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.content_hash);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Parse a container. Does not need the password.
    pub fn from_bytes(bytes: &[u8]) -> FilelockResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(FilelockError::MalformedContainer(format!(
                "encrypted container too short: {} bytes (minimum {})",
                bytes.len(),
                HEADER_SIZE
            )));
        }

        let (salt, rest) = bytes.split_at(SALT_SIZE);
        let (iv, rest) = rest.split_at(IV_SIZE);
        let (hash, ciphertext) = rest.split_at(HASH_SIZE);

        // PKCS#7 always emits at least one full block
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(FilelockError::MalformedContainer(format!(
                "ciphertext length {} is not a positive multiple of {BLOCK_SIZE}",
                ciphertext.len()
            )));
        }

        let mut container = EncryptedContainer {
            salt: [0u8; SALT_SIZE],
            iv: [0u8; IV_SIZE],
            content_hash: [0u8; HASH_SIZE],
            ciphertext: ciphertext.to_vec(),
        };
        container.salt.copy_from_slice(salt);
        container.iv.copy_from_slice(iv);
        container.content_hash.copy_from_slice(hash);
        Ok(container)
    }

    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }

    /// SHA-256 of the plaintext
    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

/// Encrypt `plaintext` under a key derived from `password`.
///
/// Returns `salt ‖ iv ‖ content_hash ‖ ciphertext`. Succeeds for any input,
/// including an empty buffer.
pub fn encrypt(plaintext: &[u8], password: &SecretString) -> FilelockResult<Vec<u8>> {
    encrypt_with_params(plaintext, password, &KdfParams::default())
}

/// Like [`encrypt`], with explicit KDF parameters.
pub fn encrypt_with_params(
    plaintext: &[u8],
    password: &SecretString,
    params: &KdfParams,
) -> FilelockResult<Vec<u8>> {
    let mut rng = rand::thread_rng();
    let mut salt = [0u8; SALT_SIZE];
    rng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_SIZE];
    rng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt, params);
    let content_hash = content_hash(plaintext);

    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), &iv)
        .map_err(|e| FilelockError::Encryption(format!("AES-256-CBC init: {e}")))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "encrypted buffer"
    );

    Ok(EncryptedContainer {
        salt,
        iv,
        content_hash,
        ciphertext,
    }
    .to_bytes())
}

/// Decrypt a container produced by [`encrypt`].
///
/// Returns the plaintext only when both the padding and the content hash
/// check out; otherwise nothing is returned.
pub fn decrypt(container: &[u8], password: &SecretString) -> FilelockResult<Vec<u8>> {
    decrypt_with_params(container, password, &KdfParams::default())
}

/// Like [`decrypt`], with explicit KDF parameters.
pub fn decrypt_with_params(
    container: &[u8],
    password: &SecretString,
    params: &KdfParams,
) -> FilelockResult<Vec<u8>> {
    let parsed = EncryptedContainer::from_bytes(container)?;
    let key = derive_key(password, &parsed.salt, params);

    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), &parsed.iv)
        .map_err(|e| FilelockError::Encryption(format!("AES-256-CBC init: {e}")))?;
    let mut plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&parsed.ciphertext)
        .map_err(|_| FilelockError::Integrity(format!("invalid padding: {WRONG_KEY}")))?;

    if let Err(e) = verify_content_hash(&plaintext, &parsed.content_hash, WRONG_KEY) {
        plaintext.zeroize();
        return Err(e);
    }

    debug!(plaintext_len = plaintext.len(), "decrypted buffer");
    Ok(plaintext)
}
