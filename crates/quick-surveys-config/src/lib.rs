// crates/quick-surveys-config/src/lib.rs
// ============================================================================
// Module: Quick Surveys Config Library
// Description: Engine configuration model and loader.
// Purpose: Single source of truth for quick-surveys.toml semantics.
// Dependencies: quick-surveys-core, serde, toml
// ============================================================================

//! ## Overview
//! `quick-surveys-config` loads the engine configuration file and hands the
//! raw survey list, factory options, and message catalog to the core. File
//! inputs are untrusted and loading fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
