//! filelock-crypto: password-based file encryption container
//!
//! Container layout (binary):
//! ```text
//! [16 bytes: salt][16 bytes: iv][32 bytes: SHA-256(plaintext)][N bytes: AES-256-CBC(PKCS#7(plaintext))]
//! ```
//!
//! Key = PBKDF2-HMAC-SHA256(password, salt, 100 000 iterations, 32 bytes).
//! Salt and IV are fresh random values on every encryption. The content hash
//! authenticates the *decrypted* result; this is not an AEAD construction.

pub mod container;
pub mod kdf;

pub use container::{decrypt, decrypt_with_params, encrypt, encrypt_with_params, EncryptedContainer};
pub use kdf::{derive_key, DerivedKey, KdfParams};

/// Size of a derived AES-256 key (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of the per-file PBKDF2 salt
pub const SALT_SIZE: usize = 16;

/// Size of the AES-CBC initialization vector (one AES block)
pub const IV_SIZE: usize = 16;

/// AES block size
pub const BLOCK_SIZE: usize = 16;

/// Fixed header: salt + iv + content hash
pub const HEADER_SIZE: usize = SALT_SIZE + IV_SIZE + filelock_core::integrity::HASH_SIZE;

/// PBKDF2 iteration count for every container this crate writes
pub const PBKDF2_ITERATIONS: u32 = 100_000;
