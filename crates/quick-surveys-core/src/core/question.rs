// crates/quick-surveys-core/src/core/question.rs
// ============================================================================
// Module: Quick Surveys Question Model
// Description: Internal and external survey questions and their schemas.
// Purpose: Typed question records produced by factory validation.
// Dependencies: crate::core::schema, serde
// ============================================================================

//! ## Overview
//! Internal surveys ask ordered in-page questions with fixed answers and
//! optional dependencies on earlier answers. External surveys link out and
//! carry exactly one question. The schemas here describe the raw shapes; the
//! factory enforces required fields and cross-references.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;

use serde::Serialize;

use crate::core::schema::TypeDefinition;
use crate::core::schema::TypeSpec;

// ============================================================================
// SECTION: Schemas
// ============================================================================

/// Returns the schema of one answer of an internal question.
#[must_use]
pub fn answer_definition() -> &'static TypeDefinition {
    static DEFINITION: OnceLock<TypeDefinition> = OnceLock::new();
    DEFINITION.get_or_init(|| {
        TypeDefinition::new()
            .field("label", TypeSpec::STRING)
            .field("freeformTextLabel", TypeSpec::STRING)
    })
}

/// Returns the schema of an internal survey question.
#[must_use]
pub fn internal_question_definition() -> &'static TypeDefinition {
    static DEFINITION: OnceLock<TypeDefinition> = OnceLock::new();
    DEFINITION.get_or_init(|| {
        let dependency = TypeDefinition::new()
            .field("question", TypeSpec::STRING)
            .field("answerIsOneOf", TypeSpec::ARRAY);
        TypeDefinition::new()
            .field("name", TypeSpec::STRING)
            .field("layout", TypeSpec::STRING)
            .field("question", TypeSpec::STRING)
            .field("description", TypeSpec::STRING)
            .field("shuffleAnswersDisplay", TypeSpec::BOOLEAN)
            .field("answers", TypeSpec::ArrayOf(answer_definition().clone()))
            .field("dependsOn", TypeSpec::ArrayOf(dependency))
    })
}

/// Returns the schema of an external survey question.
#[must_use]
pub fn external_question_definition() -> &'static TypeDefinition {
    static DEFINITION: OnceLock<TypeDefinition> = OnceLock::new();
    DEFINITION.get_or_init(|| {
        TypeDefinition::new()
            .field("name", TypeSpec::STRING)
            .field("question", TypeSpec::STRING)
            .field("description", TypeSpec::STRING)
            .field("link", TypeSpec::STRING)
            .field("instanceTokenParameterName", TypeSpec::STRING)
            .field("yesMsg", TypeSpec::STRING)
            .field("noMsg", TypeSpec::STRING)
    })
}

// ============================================================================
// SECTION: Internal Questions
// ============================================================================

/// Answer layout of an internal question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionLayout {
    /// Exactly one answer may be chosen.
    SingleAnswer,
    /// Several answers may be chosen.
    MultipleAnswer,
}

impl QuestionLayout {
    /// Parses a configured layout label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "single-answer" => Some(Self::SingleAnswer),
            "multiple-answer" => Some(Self::MultipleAnswer),
            _ => None,
        }
    }
}

/// Fixed answer of an internal question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Message key of the answer label.
    pub label: String,
    /// Message key of the free-text placeholder shown with this answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeform_text_label: Option<String>,
}

/// Condition on an earlier answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDependency {
    /// Name of an earlier question.
    pub question: String,
    /// Labels that satisfy the condition; any answer when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_is_one_of: Option<Vec<String>>,
}

/// Question of an internal survey.
///
/// # Invariants
/// - `name` is unique within its survey.
/// - `answers` is non-empty and every dependency names an earlier question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalQuestion {
    /// Question name.
    pub name: String,
    /// Answer layout.
    pub layout: QuestionLayout,
    /// Message key of the question text.
    pub question: String,
    /// Message key of the optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether answers are shuffled for display.
    pub shuffle_answers_display: bool,
    /// Answers in configured order.
    pub answers: Vec<Answer>,
    /// Conditions on earlier answers; all must hold.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<QuestionDependency>,
}

impl InternalQuestion {
    /// Returns true when `label` is one of this question's answers.
    #[must_use]
    pub fn has_answer(&self, label: &str) -> bool {
        self.answers.iter().any(|answer| answer.label == label)
    }

    /// Appends the message keys of this question.
    pub fn collect_messages(&self, out: &mut Vec<String>) {
        out.push(self.question.clone());
        out.extend(self.description.iter().cloned());
        for answer in &self.answers {
            out.push(answer.label.clone());
            out.extend(answer.freeform_text_label.iter().cloned());
        }
    }
}

// ============================================================================
// SECTION: External Questions
// ============================================================================

/// Question of an external survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalQuestion {
    /// Question name.
    pub name: String,
    /// Message key of the question text.
    pub question: String,
    /// Message key of the optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Message key (or literal URL) of the survey link.
    pub link: String,
    /// Query parameter carrying the instance token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_token_parameter_name: Option<String>,
    /// Message key of the accept button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yes_msg: Option<String>,
    /// Message key of the decline button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_msg: Option<String>,
}

impl ExternalQuestion {
    /// Appends the message keys of this question.
    pub fn collect_messages(&self, out: &mut Vec<String>) {
        out.push(self.question.clone());
        out.extend(self.description.iter().cloned());
        out.push(self.link.clone());
        out.extend(self.yes_msg.iter().cloned());
        out.extend(self.no_msg.iter().cloned());
    }
}
