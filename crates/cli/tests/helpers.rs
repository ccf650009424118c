use std::fs;

use pe_ngram::{canonicalize_or_current, sha256_file};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let previous = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");
    assert_eq!(result, expected);

    std::env::set_current_dir(previous).expect("restore cwd");
}

#[test]
fn canonicalize_or_current_keeps_missing_paths_absolute() {
    let result = canonicalize_or_current("does/not/exist/yet").expect("fallback");
    assert!(result.is_absolute());
    assert!(result.ends_with("does/not/exist/yet"));
}

#[test]
fn sha256_file_matches_known_digest() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("abc.bin");
    fs::write(&path, b"abc").expect("write sample");
    assert_eq!(
        sha256_file(&path).expect("hash"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn sha256_file_reports_missing_file() {
    let tmp = tempdir().expect("tempdir");
    let err = sha256_file(&tmp.path().join("missing")).unwrap_err();
    assert!(err.to_string().contains("Failed to open sample for hashing"));
}
