// crates/quick-surveys-core/src/runtime/factory.rs
// ============================================================================
// Module: Quick Surveys Factory
// Description: Builds validated surveys from raw configuration specs.
// Purpose: Enforce cross-field survey invariants the schema cannot express.
// Dependencies: crate::{audit, core, interfaces}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The factory turns a raw list of survey specs into immutable [`Survey`]
//! values. A malformed spec is logged and dropped without affecting its
//! siblings; only a batch that is not a list at all is rejected as a whole.
//! Entries that are not enabled records are skipped without a rejection.
//!
//! Per-survey checks run in a fixed order so the first reported problem is
//! stable: question presence, type, legacy migration, schema, coverage,
//! platforms present, link security, platform values, privacy policy
//! (external), questions, audience.
//!
//! Enabled specs claim their normalized name in input order before any other
//! check. The first claimant keeps the name; later duplicates are dropped even
//! if the first claimant is rejected for another reason.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::audit::NoopSurveyAuditSink;
use crate::audit::SurveyAuditEvent;
use crate::audit::SurveyAuditSink;
use crate::core::Answer;
use crate::core::AudienceError;
use crate::core::ExternalQuestion;
use crate::core::ExternalSurvey;
use crate::core::InternalQuestion;
use crate::core::InternalSurvey;
use crate::core::Platform;
use crate::core::PlatformMode;
use crate::core::Platforms;
use crate::core::QuestionDependency;
use crate::core::QuestionLayout;
use crate::core::SchemaError;
use crate::core::Survey;
use crate::core::SurveyAudience;
use crate::core::SurveyCommon;
use crate::core::SurveyName;
use crate::core::SurveyType;
use crate::core::ValidatedRecord;
use crate::core::external_question_definition;
use crate::core::internal_question_definition;
use crate::core::survey_definition;
use crate::core::uniqueness_key;
use crate::core::validate;
use crate::interfaces::MessageResolver;
use crate::runtime::links::is_secure;
use crate::runtime::links::resolve_link;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name of the question synthesized from legacy single-question fields.
pub const LEGACY_QUESTION_NAME: &str = "question-1";

/// Legacy top-level fields moved into the synthesized internal question.
const LEGACY_INTERNAL_FIELDS: &[&str] = &["question", "description", "layout", "shuffleAnswersDisplay"];

/// Legacy top-level fields moved into the synthesized external question.
const LEGACY_EXTERNAL_FIELDS: &[&str] =
    &["question", "description", "link", "instanceTokenParameterName", "yesMsg", "noMsg"];

// ============================================================================
// SECTION: Options
// ============================================================================

/// Factory policy switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactoryOptions {
    /// Reject external surveys whose resolved link is not https.
    pub require_https: bool,
}

impl Default for FactoryOptions {
    fn default() -> Self {
        Self {
            require_https: true,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Whole-batch configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyConfigError {
    /// The configuration is not a list of specs.
    #[error("survey configuration must be a list, got {0}")]
    NotAList(&'static str),
}

impl SurveyConfigError {
    /// Returns a stable label for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotAList(_) => "not_a_list",
        }
    }
}

/// Single-survey validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyValidationError {
    /// The spec has no name.
    #[error("A survey spec doesn't have a name.")]
    MissingName,
    /// Another enabled spec already claimed the name.
    #[error("The \"{name}\" survey has the same name as another enabled survey.")]
    DuplicateName {
        /// Survey name.
        name: String,
    },
    /// Neither `questions` nor a legacy `question` is given.
    #[error("The \"{name}\" survey doesn't have a question.")]
    MissingQuestion {
        /// Survey name.
        name: String,
    },
    /// `type` is neither internal nor external.
    #[error("The \"{name}\" survey isn't marked as internal or external.")]
    InvalidType {
        /// Survey name.
        name: String,
    },
    /// A top-level field has the wrong type.
    #[error("The \"{name}\" survey has an invalid field: {source}.")]
    Schema {
        /// Survey name.
        name: String,
        /// Schema failure.
        source: SchemaError,
    },
    /// `coverage` is missing.
    #[error("The \"{name}\" survey doesn't have a coverage.")]
    MissingCoverage {
        /// Survey name.
        name: String,
    },
    /// `platforms` is missing.
    #[error("The \"{name}\" survey doesn't have any platforms.")]
    MissingPlatforms {
        /// Survey name.
        name: String,
    },
    /// The resolved external link is not https.
    #[error("The \"{name}\" survey links to an insecure URL: {link}.")]
    InsecureLink {
        /// Survey name.
        name: String,
        /// Resolved link.
        link: String,
    },
    /// `platforms` lists an unsupported platform or mode.
    #[error("The \"{name}\" survey has invalid platforms or modes: {detail}.")]
    InvalidPlatforms {
        /// Survey name.
        name: String,
        /// Offending entry.
        detail: String,
    },
    /// An external survey has no privacy policy.
    #[error("The \"{name}\" survey doesn't have a privacy policy.")]
    MissingPrivacyPolicy {
        /// Survey name.
        name: String,
    },
    /// An external survey does not have exactly one question.
    #[error("The \"{name}\" external survey must have exactly one question, found {count}.")]
    WrongQuestionCount {
        /// Survey name.
        name: String,
        /// Number of configured questions.
        count: usize,
    },
    /// A question breaks a rule.
    #[error("The \"{name}\" survey has an invalid question at index {index}: {issue}.")]
    Question {
        /// Survey name.
        name: String,
        /// Question index.
        index: usize,
        /// Broken rule.
        issue: QuestionIssue,
    },
    /// The audience is malformed.
    #[error("The \"{name}\" survey has an invalid audience: {source}.")]
    InvalidAudience {
        /// Survey name.
        name: String,
        /// Audience failure.
        source: AudienceError,
    },
}

impl SurveyValidationError {
    /// Returns a stable label for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingName => "missing_name",
            Self::DuplicateName {
                ..
            } => "duplicate_name",
            Self::MissingQuestion {
                ..
            } => "missing_question",
            Self::InvalidType {
                ..
            } => "invalid_type",
            Self::Schema {
                ..
            } => "schema_mismatch",
            Self::MissingCoverage {
                ..
            } => "missing_coverage",
            Self::MissingPlatforms {
                ..
            } => "missing_platforms",
            Self::InsecureLink {
                ..
            } => "insecure_link",
            Self::InvalidPlatforms {
                ..
            } => "invalid_platforms",
            Self::MissingPrivacyPolicy {
                ..
            } => "missing_privacy_policy",
            Self::WrongQuestionCount {
                ..
            } => "wrong_question_count",
            Self::Question {
                ..
            } => "invalid_question",
            Self::InvalidAudience {
                ..
            } => "invalid_audience",
        }
    }
}

/// Rule broken by a single question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionIssue {
    /// The question is not a record.
    #[error("question must be a record")]
    NotARecord,
    /// A question field has the wrong type.
    #[error("{0}")]
    Schema(SchemaError),
    /// `name` is missing or empty.
    #[error("question doesn't have a name")]
    MissingName,
    /// `name` repeats an earlier question.
    #[error("question name {0:?} is used more than once")]
    DuplicateName(String),
    /// `layout` is missing.
    #[error("question doesn't have a layout")]
    MissingLayout,
    /// `layout` is not a known layout.
    #[error("layout {0:?} is not single-answer or multiple-answer")]
    InvalidLayout(String),
    /// `question` text is missing or empty.
    #[error("question doesn't have any question text")]
    MissingQuestionText,
    /// `answers` is missing or empty.
    #[error("question doesn't have any answers")]
    MissingAnswers,
    /// An answer has no label.
    #[error("answer {0} doesn't have a label")]
    MissingAnswerLabel(usize),
    /// `link` is missing.
    #[error("question doesn't have a link")]
    MissingLink,
    /// A dependency does not name a question.
    #[error("dependency {0} doesn't name a question")]
    MissingDependencyQuestion(usize),
    /// A dependency names the question itself.
    #[error("question depends on itself")]
    SelfDependency,
    /// A dependency names a later question.
    #[error("question depends on the later question {0:?}")]
    ForwardDependency(String),
    /// A dependency names no question in the survey.
    #[error("question depends on the unknown question {0:?}")]
    UnknownDependency(String),
    /// `answerIsOneOf` names a label the referenced question does not offer.
    #[error("question {question:?} has no answer {answer:?}")]
    UnknownDependencyAnswer {
        /// Referenced question.
        question: String,
        /// Unknown answer label.
        answer: String,
    },
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// A dropped spec and the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyRejection {
    /// Position of the spec in the configuration list.
    pub index: usize,
    /// Survey name when the spec has one.
    pub name: Option<String>,
    /// Validation failure.
    pub error: SurveyValidationError,
}

/// Outcome of parsing a configuration list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyLoad {
    /// Valid enabled surveys in input order.
    pub surveys: Vec<Survey>,
    /// Enabled specs that were dropped.
    pub rejections: Vec<SurveyRejection>,
}

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Builds surveys from raw configuration.
pub struct SurveyFactory {
    /// Policy switches.
    options: FactoryOptions,
    /// Resolver for external link messages.
    resolver: Option<Box<dyn MessageResolver + Send + Sync>>,
    /// Destination of rejection events.
    audit: Arc<dyn SurveyAuditSink>,
}

impl Default for SurveyFactory {
    fn default() -> Self {
        Self::new(FactoryOptions::default())
    }
}

impl SurveyFactory {
    /// Creates a factory without a message resolver that discards events.
    #[must_use]
    pub fn new(options: FactoryOptions) -> Self {
        Self {
            options,
            resolver: None,
            audit: Arc::new(NoopSurveyAuditSink),
        }
    }

    /// Sets the resolver used for external link messages.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl MessageResolver + Send + Sync + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Sets the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn SurveyAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Parses a configuration list into valid enabled surveys.
    ///
    /// Never fails; problems are reported to the audit sink and a batch that
    /// is not a list yields no surveys.
    #[must_use]
    pub fn parse_survey_config(&self, specs: &Value) -> Vec<Survey> {
        self.parse_report(specs).map(|load| load.surveys).unwrap_or_default()
    }

    /// Parses a configuration list and reports every dropped spec.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyConfigError::NotAList`] when `specs` is not a list.
    pub fn parse_report(&self, specs: &Value) -> Result<SurveyLoad, SurveyConfigError> {
        let Value::Array(specs) = specs else {
            let err = SurveyConfigError::NotAList(json_kind(specs));
            self.audit.record(&SurveyAuditEvent::config_rejected(err.kind(), err.to_string()));
            return Err(err);
        };
        let mut load = SurveyLoad::default();
        let mut claimed = BTreeSet::new();
        for (index, spec) in specs.iter().enumerate() {
            let outcome = match spec {
                Value::Object(map) if is_truthy(map.get("enabled")) => {
                    self.claim_and_build(map, &mut claimed)
                }
                _ => continue,
            };
            match outcome {
                Ok(survey) => load.surveys.push(survey),
                Err(error) => {
                    let name = spec.get("name").and_then(Value::as_str).map(str::to_string);
                    self.audit.record(&SurveyAuditEvent::survey_rejected(
                        index,
                        name.as_deref(),
                        error.kind(),
                        error.to_string(),
                    ));
                    load.rejections.push(SurveyRejection {
                        index,
                        name,
                        error,
                    });
                }
            }
        }
        self.audit.record(&SurveyAuditEvent::config_loaded(
            load.surveys.len(),
            load.rejections.len(),
        ));
        Ok(load)
    }

    /// Claims the spec's name, then validates the spec.
    fn claim_and_build(
        &self,
        spec: &Map<String, Value>,
        claimed: &mut BTreeSet<String>,
    ) -> Result<Survey, SurveyValidationError> {
        let name = spec_name(spec)?;
        if !claimed.insert(uniqueness_key(name)) {
            return Err(SurveyValidationError::DuplicateName {
                name: name.to_string(),
            });
        }
        self.new_survey(spec)
    }

    /// Validates a single spec and builds its survey.
    ///
    /// # Errors
    ///
    /// Returns the first [`SurveyValidationError`] in validation order.
    pub fn new_survey(&self, spec: &Map<String, Value>) -> Result<Survey, SurveyValidationError> {
        let name = spec_name(spec)?.to_string();
        if !has_question(spec) {
            return Err(SurveyValidationError::MissingQuestion {
                name,
            });
        }
        let survey_type = spec
            .get("type")
            .and_then(Value::as_str)
            .and_then(SurveyType::parse)
            .ok_or_else(|| SurveyValidationError::InvalidType {
                name: name.clone(),
            })?;
        let migrated = migrate_legacy_question(spec, survey_type);
        let record = validate(&migrated, survey_definition()).map_err(|source| {
            SurveyValidationError::Schema {
                name: name.clone(),
                source,
            }
        })?;
        let Some(coverage) = record.get_f64("coverage") else {
            return Err(SurveyValidationError::MissingCoverage {
                name,
            });
        };
        let Some(raw_platforms) = record.get_object("platforms") else {
            return Err(SurveyValidationError::MissingPlatforms {
                name,
            });
        };
        let questions = record.get_array("questions").map(Vec::as_slice).unwrap_or_default();
        let is_insecure = match survey_type {
            SurveyType::Internal => false,
            SurveyType::External => self.check_link(&name, questions)?,
        };
        let platforms = parse_platforms(&name, raw_platforms)?;
        if survey_type == SurveyType::External && !record.contains_key("privacyPolicy") {
            return Err(SurveyValidationError::MissingPrivacyPolicy {
                name,
            });
        }
        let survey = match survey_type {
            SurveyType::Internal => {
                let questions = build_internal_questions(&name, questions)?;
                let common = build_common(&name, coverage, platforms, &record)?;
                Survey::Internal(InternalSurvey {
                    common,
                    questions,
                })
            }
            SurveyType::External => {
                let question = build_external_question(&name, questions)?;
                let common = build_common(&name, coverage, platforms, &record)?;
                Survey::External(ExternalSurvey {
                    common,
                    question,
                    is_insecure,
                })
            }
        };
        Ok(survey)
    }

    /// Resolves the external link and applies the https policy.
    ///
    /// Returns whether the resolved link is insecure.
    fn check_link(&self, name: &str, questions: &[Value]) -> Result<bool, SurveyValidationError> {
        let Some(link) =
            questions.first().and_then(|question| question.get("link")).and_then(Value::as_str)
        else {
            return Ok(false);
        };
        let resolver = self.resolver.as_deref().map(|resolver| resolver as &dyn MessageResolver);
        let Some(url) = resolve_link(link, resolver) else {
            return Ok(false);
        };
        if is_secure(&url) {
            return Ok(false);
        }
        if self.options.require_https {
            return Err(SurveyValidationError::InsecureLink {
                name: name.to_string(),
                link: url.to_string(),
            });
        }
        Ok(true)
    }
}

// ============================================================================
// SECTION: Spec Helpers
// ============================================================================

/// Returns the spec name, treating a non-string name as missing.
fn spec_name(spec: &Map<String, Value>) -> Result<&str, SurveyValidationError> {
    spec.get("name").and_then(Value::as_str).ok_or(SurveyValidationError::MissingName)
}

/// Returns true when the spec has a question list or a legacy question.
fn has_question(spec: &Map<String, Value>) -> bool {
    has_question_list(spec) || spec.get("question").is_some_and(|value| !value.is_null())
}

/// Returns true when the spec has a non-empty `questions` list.
fn has_question_list(spec: &Map<String, Value>) -> bool {
    spec.get("questions").and_then(Value::as_array).is_some_and(|questions| !questions.is_empty())
}

/// Interprets `enabled` with loose truthiness.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|number| number != 0.0),
        Some(Value::String(text)) => !text.is_empty() && text != "0",
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(_)) => true,
    }
}

/// Returns a short label for the JSON kind of `value`.
const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Legacy Migration
// ============================================================================

/// Expands legacy single-question fields into a canonical `questions` list.
///
/// Specs that already have a non-empty `questions` list are returned as is.
fn migrate_legacy_question(spec: &Map<String, Value>, survey_type: SurveyType) -> Map<String, Value> {
    let mut out = spec.clone();
    if has_question_list(spec) {
        return out;
    }
    let mut question = Map::new();
    question.insert("name".to_string(), Value::String(LEGACY_QUESTION_NAME.to_string()));
    let fields = match survey_type {
        SurveyType::Internal => LEGACY_INTERNAL_FIELDS,
        SurveyType::External => LEGACY_EXTERNAL_FIELDS,
    };
    for field in fields {
        if let Some(value) = out.remove(*field).filter(|value| !value.is_null()) {
            question.insert((*field).to_string(), value);
        }
    }
    if survey_type == SurveyType::Internal {
        question
            .entry("layout")
            .or_insert_with(|| Value::String("single-answer".to_string()));
        let freeform = out.remove("freeformTextLabel").filter(|value| !value.is_null());
        if let Some(answers) = out.remove("answers").filter(|value| !value.is_null()) {
            question.insert("answers".to_string(), migrate_legacy_answers(answers, freeform));
        }
    }
    out.insert("questions".to_string(), Value::Array(vec![Value::Object(question)]));
    out
}

/// Converts legacy answers (strings or records) into answer records.
fn migrate_legacy_answers(answers: Value, freeform: Option<Value>) -> Value {
    let Value::Array(items) = answers else {
        return answers;
    };
    let mut out: Vec<Value> = items
        .into_iter()
        .map(|item| match item {
            Value::String(label) => {
                let mut answer = Map::new();
                answer.insert("label".to_string(), Value::String(label));
                Value::Object(answer)
            }
            other => other,
        })
        .collect();
    if let Some(freeform) = freeform
        && let Some(Value::Object(last)) = out.last_mut()
    {
        last.entry("freeformTextLabel").or_insert(freeform);
    }
    Value::Array(out)
}

// ============================================================================
// SECTION: Platform Validation
// ============================================================================

/// Parses `platforms`, rejecting unknown platforms and unsupported modes.
fn parse_platforms(
    name: &str,
    raw: &Map<String, Value>,
) -> Result<Platforms, SurveyValidationError> {
    let invalid = |detail: String| SurveyValidationError::InvalidPlatforms {
        name: name.to_string(),
        detail,
    };
    let mut platforms = Platforms::new();
    for (key, modes) in raw {
        let platform = Platform::parse(key).ok_or_else(|| invalid(format!("unknown platform {key:?}")))?;
        let Some(modes) = modes.as_array() else {
            return Err(invalid(format!("{key} must list modes")));
        };
        let mut parsed = Vec::with_capacity(modes.len());
        for mode in modes {
            let supported = mode
                .as_str()
                .and_then(PlatformMode::parse)
                .filter(|mode| platform.supported_modes().contains(mode));
            let Some(mode) = supported else {
                return Err(invalid(format!("{key} does not support mode {mode}")));
            };
            parsed.push(mode);
        }
        platforms = platforms.with(platform, parsed);
    }
    Ok(platforms)
}

// ============================================================================
// SECTION: Common Fields
// ============================================================================

/// Builds the shared survey fields, validating the audience.
fn build_common(
    name: &str,
    coverage: f64,
    platforms: Platforms,
    record: &ValidatedRecord,
) -> Result<SurveyCommon, SurveyValidationError> {
    let audience = match record.get_object("audience") {
        Some(raw) => SurveyAudience::from_map(raw).map_err(|source| {
            SurveyValidationError::InvalidAudience {
                name: name.to_string(),
                source,
            }
        })?,
        None => SurveyAudience::default(),
    };
    let text = |field: &str| record.get_str(field).map(str::to_string);
    Ok(SurveyCommon {
        name: SurveyName::new(name),
        coverage,
        platforms,
        privacy_policy: text("privacyPolicy"),
        additional_info: text("additionalInfo"),
        confirm_msg: text("confirmMsg"),
        confirm_description: text("confirmDescription"),
        audience,
        embed_element_id: text("embedElementId"),
    })
}

// ============================================================================
// SECTION: Internal Questions
// ============================================================================

/// Validates and builds the questions of an internal survey.
fn build_internal_questions(
    name: &str,
    raw: &[Value],
) -> Result<Vec<InternalQuestion>, SurveyValidationError> {
    let mut questions: Vec<InternalQuestion> = Vec::with_capacity(raw.len());
    for (index, value) in raw.iter().enumerate() {
        let question = build_internal_question(value, &questions, &raw[index + 1 ..]).map_err(
            |issue| SurveyValidationError::Question {
                name: name.to_string(),
                index,
                issue,
            },
        )?;
        questions.push(question);
    }
    Ok(questions)
}

/// Validates one internal question against the questions before it.
fn build_internal_question(
    value: &Value,
    earlier: &[InternalQuestion],
    later: &[Value],
) -> Result<InternalQuestion, QuestionIssue> {
    let Value::Object(map) = value else {
        return Err(QuestionIssue::NotARecord);
    };
    let record = validate(map, internal_question_definition()).map_err(QuestionIssue::Schema)?;
    let name = required_text(&record, "name").ok_or(QuestionIssue::MissingName)?;
    if earlier.iter().any(|question| question.name == name) {
        return Err(QuestionIssue::DuplicateName(name));
    }
    let layout = record.get_str("layout").ok_or(QuestionIssue::MissingLayout)?;
    let layout =
        QuestionLayout::parse(layout).ok_or_else(|| QuestionIssue::InvalidLayout(layout.to_string()))?;
    let text = required_text(&record, "question").ok_or(QuestionIssue::MissingQuestionText)?;
    let answers = build_answers(&record)?;
    let depends_on = build_dependencies(&record, &name, earlier, later)?;
    Ok(InternalQuestion {
        name,
        layout,
        question: text,
        description: record.get_str("description").map(str::to_string),
        shuffle_answers_display: record.get_bool("shuffleAnswersDisplay").unwrap_or(true),
        answers,
        depends_on,
    })
}

/// Builds the non-empty answer list.
fn build_answers(record: &ValidatedRecord) -> Result<Vec<Answer>, QuestionIssue> {
    let raw = record.get_array("answers").filter(|answers| !answers.is_empty());
    let Some(raw) = raw else {
        return Err(QuestionIssue::MissingAnswers);
    };
    raw.iter()
        .enumerate()
        .map(|(index, answer)| {
            let label = answer
                .get("label")
                .and_then(Value::as_str)
                .ok_or(QuestionIssue::MissingAnswerLabel(index))?;
            Ok(Answer {
                label: label.to_string(),
                freeform_text_label: answer
                    .get("freeformTextLabel")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}

/// Builds dependencies, requiring each to name an earlier question.
fn build_dependencies(
    record: &ValidatedRecord,
    own_name: &str,
    earlier: &[InternalQuestion],
    later: &[Value],
) -> Result<Vec<QuestionDependency>, QuestionIssue> {
    let Some(raw) = record.get_array("dependsOn") else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(raw.len());
    for (index, dependency) in raw.iter().enumerate() {
        let target = dependency
            .get("question")
            .and_then(Value::as_str)
            .ok_or(QuestionIssue::MissingDependencyQuestion(index))?;
        let Some(referenced) = earlier.iter().find(|question| question.name == target) else {
            if target == own_name {
                return Err(QuestionIssue::SelfDependency);
            }
            let is_later = later
                .iter()
                .any(|question| question.get("name").and_then(Value::as_str) == Some(target));
            return Err(if is_later {
                QuestionIssue::ForwardDependency(target.to_string())
            } else {
                QuestionIssue::UnknownDependency(target.to_string())
            });
        };
        let answer_is_one_of = match dependency.get("answerIsOneOf").and_then(Value::as_array) {
            None => None,
            Some(labels) => Some(dependency_labels(referenced, labels)?),
        };
        out.push(QuestionDependency {
            question: target.to_string(),
            answer_is_one_of,
        });
    }
    Ok(out)
}

/// Checks that every label is an answer of the referenced question.
fn dependency_labels(
    referenced: &InternalQuestion,
    labels: &[Value],
) -> Result<Vec<String>, QuestionIssue> {
    labels
        .iter()
        .map(|label| {
            let text = label.as_str().filter(|text| referenced.has_answer(text));
            text.map(str::to_string).ok_or_else(|| QuestionIssue::UnknownDependencyAnswer {
                question: referenced.name.clone(),
                answer: label.as_str().map_or_else(|| label.to_string(), str::to_string),
            })
        })
        .collect()
}

// ============================================================================
// SECTION: External Question
// ============================================================================

/// Validates and builds the single question of an external survey.
fn build_external_question(
    name: &str,
    raw: &[Value],
) -> Result<ExternalQuestion, SurveyValidationError> {
    let [value] = raw else {
        return Err(SurveyValidationError::WrongQuestionCount {
            name: name.to_string(),
            count: raw.len(),
        });
    };
    build_external(value).map_err(|issue| SurveyValidationError::Question {
        name: name.to_string(),
        index: 0,
        issue,
    })
}

/// Validates the fields of an external question.
fn build_external(value: &Value) -> Result<ExternalQuestion, QuestionIssue> {
    let Value::Object(map) = value else {
        return Err(QuestionIssue::NotARecord);
    };
    let record = validate(map, external_question_definition()).map_err(QuestionIssue::Schema)?;
    let optional = |field: &str| record.get_str(field).map(str::to_string);
    Ok(ExternalQuestion {
        name: required_text(&record, "name").ok_or(QuestionIssue::MissingName)?,
        question: required_text(&record, "question").ok_or(QuestionIssue::MissingQuestionText)?,
        description: optional("description"),
        link: required_text(&record, "link").ok_or(QuestionIssue::MissingLink)?,
        instance_token_parameter_name: optional("instanceTokenParameterName"),
        yes_msg: optional("yesMsg"),
        no_msg: optional("noMsg"),
    })
}

/// Returns a non-empty string field.
fn required_text(record: &ValidatedRecord, field: &str) -> Option<String> {
    record.get_str(field).filter(|text| !text.is_empty()).map(str::to_string)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
