// crates/quick-surveys-core/src/runtime/mod.rs
// ============================================================================
// Module: Quick Surveys Runtime
// Description: Survey factory, targeting, bucketing, and selection.
// Purpose: Turn raw configuration into surveys and pick them per page view.
// Dependencies: crate::{audit, core, interfaces}, rand, url
// ============================================================================

//! ## Overview
//! Runtime modules build surveys once at load time and evaluate them per page
//! view. Everything here is synchronous and total: bad configuration is
//! dropped and logged, and evaluation always yields an answer.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audience;
pub mod bucketing;
pub mod factory;
pub mod flow;
pub mod links;
pub mod selection;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audience::AudienceFilter;
pub use audience::audience_rejection;
pub use audience::is_in_audience;
pub use bucketing::Bucket;
pub use bucketing::bucket_for;
pub use bucketing::dismiss_survey;
pub use bucketing::generate_token;
pub use bucketing::get_bucket_for_survey;
pub use bucketing::is_dismissed;
pub use bucketing::survey_matches_platform;
pub use bucketing::survey_token;
pub use factory::FactoryOptions;
pub use factory::LEGACY_QUESTION_NAME;
pub use factory::QuestionIssue;
pub use factory::SurveyConfigError;
pub use factory::SurveyFactory;
pub use factory::SurveyLoad;
pub use factory::SurveyRejection;
pub use factory::SurveyValidationError;
pub use flow::AnswerSheet;
pub use flow::QuestionFlow;
pub use flow::display_answers;
pub use links::resolve_link;
pub use links::viewer_link;
pub use links::with_instance_token;
pub use selection::CandidateOutcome;
pub use selection::FORCE_RANDOM;
pub use selection::SelectionReport;
pub use selection::SurveySelection;
pub use selection::check_candidate;
pub use selection::select_surveys;
pub use selection::select_with_report;
pub use store::InMemoryTokenStore;
