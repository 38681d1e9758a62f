//! filelock-compress: self-describing compression container
//!
//! # Overview
//! - `deflate`: zlib-wrapped deflate at a caller-chosen level (1-9), prefixed
//!   by the level byte and the SHA-256 of the uncompressed payload

pub mod deflate;

pub use deflate::{
    compress, compression_ratio, decompress, parse_header, validate_level, CompressedBlob,
    CompressedHeader, DEFAULT_LEVEL, HEADER_SIZE, MAX_LEVEL, MIN_LEVEL,
};
