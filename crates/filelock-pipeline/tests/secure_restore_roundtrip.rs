//! Integration tests for the secure → restore pipeline.
//!
//! Uses a reduced PBKDF2 iteration count through `OperationContext` except in
//! the test that exercises the public defaults end to end.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use filelock_core::privacy::PrivacyMode;
use filelock_core::ProgressFn;
use filelock_crypto::KdfParams;
use filelock_pipeline::{
    inspect_secured_file, restore_file, restore_file_with_context, secure_file,
    secure_file_with_context, OperationContext,
};
use proptest::prelude::*;
use secrecy::SecretString;
use tempfile::TempDir;

fn fast_ctx() -> OperationContext {
    OperationContext::default().with_kdf(KdfParams { iterations: 64 })
}

fn pw(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

fn write_test_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write test file");
    path
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn default_settings_round_trip() {
    let tmp = TempDir::new().unwrap();
    let src = write_test_file(tmp.path(), "test.txt", b"Hello, FileLock!");

    let report = secure_file(&src, &pw("correct_password"), 6, None).unwrap();
    assert_eq!(report.output, tmp.path().join("test.txt.secured"));
    assert_eq!(report.original_bytes, 16);

    let secured = std::fs::read(&report.output).unwrap();
    assert!(!secured.starts_with(b"Hello, FileLock!"));
    assert!(!tmp.path().join("test.txt.flk").exists());

    std::fs::remove_file(&src).unwrap();
    let restored = restore_file(&report.output, &pw("correct_password"), None).unwrap();
    assert_eq!(restored.output, src);
    assert_eq!(restored.restored_bytes, 16);
    assert_eq!(std::fs::read(&src).unwrap(), b"Hello, FileLock!");

    assert_eq!(dir_entries(tmp.path()), vec!["test.txt", "test.txt.secured"]);
}

#[test]
fn round_trip_with_output_override() {
    let tmp = TempDir::new().unwrap();
    let body: Vec<u8> = b"quarterly numbers, do not share\n".repeat(300);
    let src = write_test_file(tmp.path(), "report.csv", &body);
    let vault = tmp.path().join("vault.secured");

    let ctx = fast_ctx().with_output(&vault);
    let report = secure_file_with_context(&src, &pw("hunter22"), 9, None, &ctx).unwrap();
    assert_eq!(report.output, vault);
    assert!(report.compression_ratio.is_finite());

    let out = tmp.path().join("report-restored.csv");
    let ctx = fast_ctx().with_output(&out);
    restore_file_with_context(&vault, &pw("hunter22"), None, &ctx).unwrap();
    assert_eq!(std::fs::read(&out).unwrap(), body);

    // The intermediate follows the secured name's stem: vault.flk
    assert!(!tmp.path().join("vault.flk").exists());
    assert!(!tmp.path().join("report.csv.flk").exists());
}

#[test]
fn restore_over_original_needs_overwrite() {
    let tmp = TempDir::new().unwrap();
    let src = write_test_file(tmp.path(), "keep.txt", b"original contents");

    secure_file_with_context(&src, &pw("password1"), 6, None, &fast_ctx()).unwrap();
    let secured = tmp.path().join("keep.txt.secured");

    let err = restore_file_with_context(&secured, &pw("password1"), None, &fast_ctx())
        .unwrap_err();
    assert!(matches!(err, filelock_core::FilelockError::OutputExists(_)));

    std::fs::write(&src, b"edited since").unwrap();
    let ctx = fast_ctx().with_overwrite(true);
    restore_file_with_context(&secured, &pw("password1"), None, &ctx).unwrap();
    assert_eq!(std::fs::read(&src).unwrap(), b"original contents");
}

#[test]
fn empty_file_round_trips() {
    let tmp = TempDir::new().unwrap();
    let src = write_test_file(tmp.path(), "empty.txt", b"");

    let report = secure_file_with_context(&src, &pw("password1"), 1, None, &fast_ctx()).unwrap();
    assert_eq!(report.original_bytes, 0);

    std::fs::remove_file(&src).unwrap();
    restore_file_with_context(&report.output, &pw("password1"), None, &fast_ctx()).unwrap();
    assert!(std::fs::read(&src).unwrap().is_empty());
}

#[test]
fn every_level_round_trips() {
    let tmp = TempDir::new().unwrap();
    let body = b"level sweep ".repeat(100);

    for level in 1..=9u32 {
        let src = write_test_file(tmp.path(), &format!("l{level}.txt"), &body);
        let report =
            secure_file_with_context(&src, &pw("password1"), level, None, &fast_ctx()).unwrap();

        let info = inspect_secured_file(&report.output).unwrap();
        assert_eq!(u32::from(info.level), level);

        std::fs::remove_file(&src).unwrap();
        restore_file_with_context(&report.output, &pw("password1"), None, &fast_ctx()).unwrap();
        assert_eq!(std::fs::read(&src).unwrap(), body);
    }
}

#[test]
fn progress_sink_sees_both_directions() {
    let tmp = TempDir::new().unwrap();
    let body: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let src = write_test_file(tmp.path(), "big.bin", &body);

    let calls = Arc::new(Mutex::new(Vec::<(u64, u64)>::new()));
    let sink = calls.clone();
    let cb: ProgressFn = Box::new(move |done, total| sink.lock().unwrap().push((done, total)));

    let report =
        secure_file_with_context(&src, &pw("password1"), 6, Some(&cb), &fast_ctx()).unwrap();
    {
        let seen = calls.lock().unwrap();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
        let (done, total) = *seen.last().unwrap();
        assert_eq!(done, total);
    }

    calls.lock().unwrap().clear();
    std::fs::remove_file(&src).unwrap();
    restore_file_with_context(&report.output, &pw("password1"), Some(&cb), &fast_ctx()).unwrap();
    let seen = calls.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[test]
fn privacy_mode_does_not_change_output() {
    let tmp = TempDir::new().unwrap();
    let src = write_test_file(tmp.path(), "private.txt", b"who am i");

    for mode in [PrivacyMode::Redacted, PrivacyMode::Hashed] {
        let ctx = fast_ctx().with_privacy(mode).with_overwrite(true);
        let report = secure_file_with_context(&src, &pw("password1"), 6, None, &ctx).unwrap();
        assert_eq!(report.output, tmp.path().join("private.txt.secured"));
        assert_eq!(report.input, src);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn any_content_round_trips(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        level in 1u32..=9,
    ) {
        let tmp = TempDir::new().unwrap();
        let src = write_test_file(tmp.path(), "p.bin", &data);

        secure_file_with_context(&src, &pw("prop-password"), level, None, &fast_ctx()).unwrap();
        std::fs::remove_file(&src).unwrap();
        restore_file_with_context(
            &tmp.path().join("p.bin.secured"),
            &pw("prop-password"),
            None,
            &fast_ctx(),
        )
        .unwrap();

        prop_assert_eq!(std::fs::read(&src).unwrap(), data);
        prop_assert!(!tmp.path().join("p.bin.flk").exists());
    }
}
