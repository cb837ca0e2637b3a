// crates/quick-surveys-cli/src/lib.rs
// ============================================================================
// Module: Quick Surveys CLI Library
// Description: Shared helpers for the Quick Surveys command-line interface.
// Purpose: Provide reusable components (i18n, bounded input) for the binary.
// Dependencies: quick-surveys-core, serde, serde_json
// ============================================================================

//! ## Overview
//! This library houses the operator CLI's message catalog and its bounded
//! input readers. The binary entry point (`src/main.rs`) imports these
//! helpers so that all user-facing output stays consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Internationalization helpers and message catalog.
pub mod i18n;
/// Bounded file input and viewer documents.
pub mod input;

#[cfg(test)]
mod tests;
