// crates/quick-surveys-core/src/lib.rs
// ============================================================================
// Module: Quick Surveys Core Library
// Description: Public API surface for the Quick Surveys engine.
// Purpose: Expose survey types, collaborator interfaces, and runtime helpers.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Quick Surveys validates externally authored survey configuration and picks
//! which surveys a viewer sees on a page. Storage, translation, and rendering
//! stay with the host and are reached through explicit interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use audit::FileSurveyAuditSink;
pub use audit::MemorySurveyAuditSink;
pub use audit::NoopSurveyAuditSink;
pub use audit::StderrSurveyAuditSink;
pub use audit::SurveyAuditEvent;
pub use audit::SurveyAuditSink;
pub use interfaces::DISMISSED_TOKEN;
pub use interfaces::MessageResolver;
pub use interfaces::SurveyTokenStore;
pub use interfaces::UNKNOWN_COUNTRY;
pub use interfaces::ViewerContext;
pub use runtime::AnswerSheet;
pub use runtime::Bucket;
pub use runtime::CandidateOutcome;
pub use runtime::FactoryOptions;
pub use runtime::InMemoryTokenStore;
pub use runtime::QuestionFlow;
pub use runtime::SelectionReport;
pub use runtime::SurveyFactory;
pub use runtime::SurveyLoad;
pub use runtime::SurveySelection;
pub use runtime::SurveyValidationError;
