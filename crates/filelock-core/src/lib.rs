pub mod config;
pub mod error;
pub mod integrity;
pub mod privacy;
pub mod types;

pub use error::{FilelockError, FilelockResult};
pub use types::{ProgressFn, COMPRESSED_SUFFIX, ENCRYPTED_SUFFIX, SECURED_SUFFIX};
