/// Suffix of the final artifact produced by `secure` (compress ∘ encrypt).
pub const SECURED_SUFFIX: &str = ".secured";

/// Suffix of a bare crypto container (encrypt-only output).
pub const ENCRYPTED_SUFFIX: &str = ".flk";

/// Suffix of a bare compression container (compress-only output).
pub const COMPRESSED_SUFFIX: &str = ".flc";

/// Progress callback type (bytes_done, bytes_total)
///
/// Invoked synchronously on the calling thread. `bytes_done` never decreases
/// across calls within one operation.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send + Sync>;
