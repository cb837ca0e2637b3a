// crates/quick-surveys-core/src/core/mod.rs
// ============================================================================
// Module: Quick Surveys Core Types
// Description: Schema validator and immutable survey data model.
// Purpose: Provide validated, serializable survey types for the runtime.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Core types describe what a valid survey looks like: the generic schema
//! validator, the fixed domain schemas, and the typed values built from them.
//! Nothing here performs selection or touches collaborators.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audience;
pub mod hashing;
pub mod identifiers;
pub mod question;
pub mod schema;
pub mod survey;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audience::AudienceError;
pub use audience::SurveyAudience;
pub use audience::audience_definition;
pub use hashing::bucket_score;
pub use hashing::hex_encode;
pub use identifiers::MODULE_NAME_PREFIX;
pub use identifiers::SurveyName;
pub use identifiers::TOKEN_KEY_PREFIX;
pub use identifiers::uniqueness_key;
pub use question::Answer;
pub use question::ExternalQuestion;
pub use question::InternalQuestion;
pub use question::QuestionDependency;
pub use question::QuestionLayout;
pub use question::external_question_definition;
pub use question::internal_question_definition;
pub use schema::PrimitiveType;
pub use schema::SchemaError;
pub use schema::TypeDefinition;
pub use schema::TypeSpec;
pub use schema::ValidatedRecord;
pub use schema::validate;
pub use schema::validate_lenient;
pub use survey::ExternalSurvey;
pub use survey::InternalSurvey;
pub use survey::Platform;
pub use survey::PlatformMode;
pub use survey::Platforms;
pub use survey::ProjectedQuestions;
pub use survey::Survey;
pub use survey::SurveyCommon;
pub use survey::SurveyProjection;
pub use survey::SurveyType;
pub use survey::survey_definition;
pub use time::CalendarDate;
pub use time::DateRange;
