//! Compression container
//!
//! Container format (binary):
//! ```text
//! [1 byte: level][32 bytes: SHA-256(uncompressed)][N bytes: zlib stream]
//! ```
//!
//! The level byte is informational. Input is fed to the encoder in fixed-size
//! slices so the progress sink sees monotonically increasing byte counts.
//! The zlib stream must end exactly at the end of the container.

use std::io::{Read, Write};

use filelock_core::integrity::{content_hash, verify_content_hash, ContentHash, HASH_SIZE};
use filelock_core::{FilelockError, FilelockResult, ProgressFn};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::debug;

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 9;
pub const DEFAULT_LEVEL: u32 = 6;

/// Fixed header: level byte + content hash
pub const HEADER_SIZE: usize = 1 + HASH_SIZE;

/// Bytes fed to the encoder (and read from the decoder) between progress reports
const PROGRESS_SLICE: usize = 64 * 1024;

/// Reject a level outside 1..=9.
pub fn validate_level(level: u32) -> FilelockResult<()> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(FilelockError::InvalidArgument(format!(
            "compression level must be between {MIN_LEVEL} and {MAX_LEVEL}, got {level}"
        )))
    }
}

/// `(1 - compressed/original) * 100`, defined as 0% for empty input.
pub fn compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    (1.0 - compressed_size as f64 / original_size as f64) * 100.0
}

/// Output of [`compress`]: the container plus size accounting
#[derive(Debug)]
pub struct CompressedBlob {
    /// `level ‖ content_hash ‖ payload`
    pub container: Vec<u8>,
    /// Uncompressed input size
    pub original_size: u64,
    /// Size of the zlib payload alone (header excluded)
    pub payload_size: u64,
}

impl CompressedBlob {
    /// Compression ratio in percent; negative when the payload grew
    pub fn ratio(&self) -> f64 {
        compression_ratio(self.original_size, self.payload_size)
    }
}

/// Parsed container header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedHeader {
    pub level: u8,
    pub content_hash: ContentHash,
}

/// Split a container into its header and zlib payload.
pub fn parse_header(container: &[u8]) -> FilelockResult<(CompressedHeader, &[u8])> {
    if container.len() < HEADER_SIZE {
        return Err(FilelockError::MalformedContainer(format!(
            "compressed container too short: {} bytes (minimum {HEADER_SIZE})",
            container.len()
        )));
    }

    let level = container[0];
    if u32::from(level) > MAX_LEVEL {
        return Err(FilelockError::MalformedContainer(format!(
            "level byte {level} out of range"
        )));
    }

    let mut content_hash = [0u8; HASH_SIZE];
    content_hash.copy_from_slice(&container[1..HEADER_SIZE]);

    Ok((
        CompressedHeader {
            level,
            content_hash,
        },
        &container[HEADER_SIZE..],
    ))
}

/// Compress `data` into a container at `level` (1-9).
pub fn compress(
    data: &[u8],
    level: u32,
    progress: Option<&ProgressFn>,
) -> FilelockResult<CompressedBlob> {
    validate_level(level)?;

    let total = data.len() as u64;
    let hash = content_hash(data);

    let mut container = Vec::with_capacity(HEADER_SIZE + data.len() / 2 + 64);
    container.push(level as u8);
    container.extend_from_slice(&hash);

    let mut encoder = ZlibEncoder::new(container, Compression::new(level));
    let mut done = 0u64;
    for slice in data.chunks(PROGRESS_SLICE) {
        encoder
            .write_all(slice)
            .map_err(|e| FilelockError::Compression(e.to_string()))?;
        done += slice.len() as u64;
        if let Some(cb) = progress {
            cb(done, total);
        }
    }
    if data.is_empty() {
        if let Some(cb) = progress {
            cb(0, 0);
        }
    }
    let container = encoder
        .finish()
        .map_err(|e| FilelockError::Compression(e.to_string()))?;

    let blob = CompressedBlob {
        payload_size: (container.len() - HEADER_SIZE) as u64,
        original_size: total,
        container,
    };
    debug!(
        level,
        original = blob.original_size,
        compressed = blob.payload_size,
        ratio = blob.ratio(),
        "compressed buffer"
    );
    Ok(blob)
}

/// Decompress a container produced by [`compress`] and verify its content hash.
///
/// Progress reports count compressed payload bytes consumed.
pub fn decompress(container: &[u8], progress: Option<&ProgressFn>) -> FilelockResult<Vec<u8>> {
    let (header, payload) = parse_header(container)?;
    let total = payload.len() as u64;

    let mut decoder = ZlibDecoder::new(payload);
    let mut out = Vec::with_capacity(payload.len().saturating_mul(2));
    let mut buf = vec![0u8; PROGRESS_SLICE];
    loop {
        let n = decoder
            .read(&mut buf)
            .map_err(|e| FilelockError::Decompression(e.to_string()))?;
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
        if let Some(cb) = progress {
            cb(decoder.total_in(), total);
        }
    }
    if decoder.total_in() != total {
        return Err(FilelockError::MalformedContainer(format!(
            "{} trailing bytes after zlib stream",
            total.saturating_sub(decoder.total_in())
        )));
    }
    if let Some(cb) = progress {
        cb(total, total);
    }

    verify_content_hash(&out, &header.content_hash, "file may be corrupted")?;

    debug!(
        level = header.level,
        compressed = total,
        decompressed = out.len(),
        "decompressed buffer"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    fn recording_sink() -> (ProgressFn, Arc<Mutex<Vec<(u64, u64)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let cb: ProgressFn = Box::new(move |done, total| {
            sink.lock().unwrap().push((done, total));
        });
        (cb, calls)
    }

    #[test]
    fn round_trip_small() {
        let data = b"hello deflate container";
        let blob = compress(data, DEFAULT_LEVEL, None).unwrap();
        let out = decompress(&blob.container, None).unwrap();
        assert_eq!(out.as_slice(), data.as_slice());
    }

    #[test]
    fn header_layout() {
        let data = b"layout check";
        let blob = compress(data, 4, None).unwrap();
        assert_eq!(blob.container[0], 4);
        assert_eq!(&blob.container[1..33], &content_hash(data));

        let (header, payload) = parse_header(&blob.container).unwrap();
        assert_eq!(header.level, 4);
        assert_eq!(payload.len() as u64, blob.payload_size);
    }

    #[test]
    fn rejects_out_of_range_levels() {
        for level in [0, 10, 255] {
            let err = compress(b"data", level, None).unwrap_err();
            assert!(matches!(err, FilelockError::InvalidArgument(_)), "level {level}");
        }
    }

    #[test]
    fn every_valid_level_round_trips() {
        let data: Vec<u8> = b"the quick brown fox ".repeat(500);
        for level in MIN_LEVEL..=MAX_LEVEL {
            let blob = compress(&data, level, None).unwrap();
            assert!(blob.ratio() > 50.0, "repetitive text should compress at level {level}");
            assert_eq!(decompress(&blob.container, None).unwrap(), data);
        }
    }

    #[test]
    fn empty_input_has_zero_ratio() {
        let blob = compress(b"", DEFAULT_LEVEL, None).unwrap();
        assert_eq!(blob.original_size, 0);
        assert_eq!(blob.ratio(), 0.0);
        assert!(decompress(&blob.container, None).unwrap().is_empty());
    }

    #[test]
    fn ratio_math() {
        assert_eq!(compression_ratio(0, 0), 0.0);
        assert_eq!(compression_ratio(0, 12), 0.0);
        assert_eq!(compression_ratio(100, 25), 75.0);
        assert!(compression_ratio(10, 20) < 0.0);
    }

    #[test]
    fn progress_is_monotonic_and_complete() {
        let data: Vec<u8> = (0u8..=255).cycle().take(300 * 1024).collect();
        let (cb, calls) = recording_sink();

        let blob = compress(&data, 1, Some(&cb)).unwrap();

        let calls = calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 5, "300 KiB in 64 KiB slices");
        assert!(calls.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(calls.last().unwrap(), &(data.len() as u64, data.len() as u64));

        let (cb, calls) = recording_sink();
        decompress(&blob.container, Some(&cb)).unwrap();
        let calls = calls.lock().unwrap().clone();
        assert!(calls.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(calls.last().unwrap(), &(blob.payload_size, blob.payload_size));
    }

    #[test]
    fn empty_input_reports_progress_once() {
        let (cb, calls) = recording_sink();
        compress(b"", DEFAULT_LEVEL, Some(&cb)).unwrap();
        assert_eq!(calls.lock().unwrap().as_slice(), &[(0, 0)]);
    }

    #[test]
    fn short_container_is_malformed() {
        let err = decompress(&[6u8; 10], None).unwrap_err();
        assert!(matches!(err, FilelockError::MalformedContainer(_)));
    }

    #[test]
    fn bad_level_byte_is_malformed() {
        let mut blob = compress(b"abc", 6, None).unwrap();
        blob.container[0] = 42;
        let err = decompress(&blob.container, None).unwrap_err();
        assert!(matches!(err, FilelockError::MalformedContainer(_)));
    }

    #[test]
    fn garbage_payload_is_decompression_error() {
        let mut container = vec![6u8];
        container.extend_from_slice(&content_hash(b"whatever"));
        container.extend_from_slice(&[0xFF; 64]);
        let err = decompress(&container, None).unwrap_err();
        assert!(matches!(err, FilelockError::Decompression(_)), "got {err:?}");
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let mut blob = compress(b"hello", DEFAULT_LEVEL, None).unwrap();
        blob.container.extend_from_slice(b"APPENDED-JUNK");
        let err = decompress(&blob.container, None).unwrap_err();
        assert!(matches!(err, FilelockError::MalformedContainer(_)), "got {err:?}");
    }

    #[test]
    fn tampered_hash_is_integrity_error() {
        let blob = compress(b"integrity matters", 6, None).unwrap();
        for i in 1..HEADER_SIZE {
            let mut tampered = blob.container.clone();
            tampered[i] ^= 0x80;
            let err = decompress(&tampered, None).unwrap_err();
            assert!(matches!(err, FilelockError::Integrity(_)), "flip at {i}: {err:?}");
        }
    }

    #[test]
    fn tampered_payload_never_round_trips() {
        let data: Vec<u8> = b"payload tamper check ".repeat(40);
        let blob = compress(&data, 6, None).unwrap();
        for i in HEADER_SIZE..blob.container.len() {
            let mut tampered = blob.container.clone();
            tampered[i] ^= 0x01;
            let err = decompress(&tampered, None).unwrap_err();
            assert!(err.is_integrity_failure(), "flip at {i}: {err:?}");
        }
    }

    proptest! {
        #[test]
        fn compress_decompress_roundtrip(
            data in proptest::collection::vec(any::<u8>(), 0..=65536),
            level in MIN_LEVEL..=MAX_LEVEL,
        ) {
            let blob = compress(&data, level, None).unwrap();
            prop_assert_eq!(blob.container[0] as u32, level);
            let out = decompress(&blob.container, None).unwrap();
            prop_assert_eq!(out, data, "round-trip must be identical");
        }
    }
}
