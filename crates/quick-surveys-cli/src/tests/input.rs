// crates/quick-surveys-cli/src/tests/input.rs
// ============================================================================
// Module: CLI Bounded Input Tests
// Description: Unit tests for size-limited reads and viewer documents.
// Purpose: Ensure bounded reads fail closed on oversized inputs.
// Dependencies: quick-surveys-cli input module
// ============================================================================

//! ## Overview
//! Validates `read_bytes_with_limit` and viewer document parsing.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::input::InputError;
use crate::input::read_bytes_with_limit;
use crate::input::read_viewer_document;

/// Writes bytes to a fresh temporary file.
fn temp_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file
}

/// Tests small files are read in full.
#[test]
fn read_bytes_with_limit_allows_small_file() {
    let file = temp_file(b"ok");
    assert_eq!(read_bytes_with_limit(file.path(), 16).unwrap(), b"ok");
}

/// Tests files over the limit are rejected.
#[test]
fn read_bytes_with_limit_rejects_large_file() {
    let file = temp_file(&[b'a'; 32]);
    match read_bytes_with_limit(file.path(), 16) {
        Err(InputError::TooLarge {
            size,
            limit,
        }) => {
            assert_eq!(size, 32);
            assert_eq!(limit, 16);
        }
        other => panic!("expected size error, got {other:?}"),
    }
}

/// Tests a viewer document carries viewer attributes and tokens.
#[test]
fn viewer_document_parses() {
    let file = temp_file(
        br#"{
            "viewer": {
                "isAnon": true,
                "registration": "2020-03-01T10:00:00Z",
                "country": "ES",
                "embedAnchors": ["anchor-a"]
            },
            "tokens": {"ext-quicksurvey-S": "~"}
        }"#,
    );
    let document = read_viewer_document(file.path(), 1024).unwrap();
    assert!(document.viewer.is_anon);
    assert!(document.viewer.registration.is_some());
    assert!(document.viewer.has_anchor("anchor-a"));
    assert_eq!(document.tokens.get("ext-quicksurvey-S").map(String::as_str), Some("~"));
}

/// Tests an empty object yields a default viewer.
#[test]
fn viewer_document_defaults() {
    let file = temp_file(b"{}");
    let document = read_viewer_document(file.path(), 1024).unwrap();
    assert_eq!(document, crate::input::ViewerDocument::default());
}

/// Tests malformed documents are parse errors.
#[test]
fn viewer_document_rejects_bad_json() {
    let file = temp_file(br#"{"viewer": {"isAnon": "yes"}}"#);
    assert!(matches!(read_viewer_document(file.path(), 1024), Err(InputError::Parse(_))));
}
