//! filelock-pipeline: secure/restore orchestration
//!
//! ```text
//! secure:  <f>          → encrypt    → <f>.flk (intermediate) → compress → <f>.secured
//! restore: <f>.secured  → decompress → <f>.flk (intermediate) → decrypt  → <f>
//! ```
//!
//! The intermediate `.flk` file belongs to the running operation and is
//! removed on both the success and the failure path. Final outputs are
//! written atomically (temp file + rename) and only after every integrity
//! check has passed.

pub mod context;
pub mod engine;
pub mod inspect;
pub mod stages;

mod fs;
mod intermediate;

pub use context::OperationContext;
pub use engine::{
    restore_file, restore_file_with_context, secure_file, secure_file_with_context,
    RestoreReport, SecureReport,
};
pub use inspect::{inspect_secured, inspect_secured_file, SecuredInfo};
pub use stages::{
    compress_file, compress_file_to, decompress_file, decompress_file_to, decrypt_file,
    decrypt_file_to, encrypt_file, encrypt_file_to, StageReport,
};
