// crates/quick-surveys-cli/src/input.rs
// ============================================================================
// Module: CLI Bounded Input
// Description: Size-limited file reads and viewer document parsing.
// Purpose: Keep operator-supplied files from exhausting memory.
// Dependencies: quick-surveys-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Operator files are untrusted. Reads fail closed when a file exceeds its
//! limit, both by metadata and by the bytes actually read.
//!
//! A viewer document bundles what `select` needs for one page view: the
//! viewer's attributes (including page embed anchors) and the viewer's stored
//! survey tokens.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_surveys_core::ViewerContext;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a viewer document in bytes.
pub const MAX_VIEWER_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Viewer attributes and stored tokens for one page view.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ViewerDocument {
    /// Viewer attributes.
    #[serde(default)]
    pub viewer: ViewerContext,
    /// Stored survey tokens keyed by storage key.
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
}

/// Errors returned by bounded reads.
#[derive(Debug, Error)]
pub enum InputError {
    /// File I/O failure.
    #[error("{0}")]
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    #[error("{size} bytes exceeds limit {limit}")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
    /// The document is not valid JSON of the expected shape.
    #[error("{0}")]
    Parse(String),
}

// ============================================================================
// SECTION: Reading
// ============================================================================

/// Reads a file from disk while enforcing a hard size limit.
///
/// # Errors
///
/// Returns [`InputError::Io`] or [`InputError::TooLarge`].
pub fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, InputError> {
    let file = File::open(path).map_err(InputError::Io)?;
    let size = file.metadata().map_err(InputError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| InputError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(InputError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(InputError::Io)?;
    if bytes.len() > max_bytes {
        return Err(InputError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads and parses a viewer document.
///
/// # Errors
///
/// Returns [`InputError`] when the file cannot be read or parsed.
pub fn read_viewer_document(path: &Path, max_bytes: usize) -> Result<ViewerDocument, InputError> {
    let bytes = read_bytes_with_limit(path, max_bytes)?;
    serde_json::from_slice(&bytes).map_err(|err| InputError::Parse(err.to_string()))
}
