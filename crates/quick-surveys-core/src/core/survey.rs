// crates/quick-surveys-core/src/core/survey.rs
// ============================================================================
// Module: Quick Surveys Survey Model
// Description: Internal and external survey variants, platforms, projections.
// Purpose: Immutable survey values produced by the factory and read by selection.
// Dependencies: crate::core::{audience, identifiers, question, schema}, serde
// ============================================================================

//! ## Overview
//! A [`Survey`] is either internal (in-page questions) or external (a link to
//! an outside questionnaire). Shared fields live in [`SurveyCommon`]; variant
//! behavior is a `match` on the tag. Surveys are built once by the factory and
//! never mutated afterwards.
//!
//! Two read-only views are exported for the client runtime: the JSON
//! projection ([`Survey::projection`]) and the list of message keys that need
//! translating ([`Survey::messages`]).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::core::audience::SurveyAudience;
use crate::core::identifiers::SurveyName;
use crate::core::question::ExternalQuestion;
use crate::core::question::InternalQuestion;
use crate::core::schema::TypeDefinition;
use crate::core::schema::TypeSpec;

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Returns the top-level survey schema.
///
/// `questions` is checked element by element against the schema of the
/// survey's variant, so it is declared as an untyped array here.
#[must_use]
pub fn survey_definition() -> &'static TypeDefinition {
    static DEFINITION: OnceLock<TypeDefinition> = OnceLock::new();
    DEFINITION.get_or_init(|| {
        TypeDefinition::new()
            .field("name", TypeSpec::STRING)
            .field("type", TypeSpec::STRING)
            .field("coverage", TypeSpec::NUMBER)
            .field("platforms", TypeSpec::OBJECT)
            .field("privacyPolicy", TypeSpec::STRING)
            .field("additionalInfo", TypeSpec::STRING)
            .field("confirmMsg", TypeSpec::STRING)
            .field("confirmDescription", TypeSpec::STRING)
            .field("audience", TypeSpec::OBJECT)
            .field("questions", TypeSpec::ARRAY)
            .field("embedElementId", TypeSpec::STRING)
    })
}

// ============================================================================
// SECTION: Survey Type
// ============================================================================

/// Survey variant tag as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyType {
    /// In-page questionnaire.
    Internal,
    /// Link to an outside questionnaire.
    External,
}

impl SurveyType {
    /// Parses a configured type label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "internal" => Some(Self::Internal),
            "external" => Some(Self::External),
            _ => None,
        }
    }

    /// Returns the configuration label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }
}

// ============================================================================
// SECTION: Platforms
// ============================================================================

/// Client platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Desktop skin.
    Desktop,
    /// Mobile skin.
    Mobile,
}

impl Platform {
    /// Parses a platform key.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "desktop" => Some(Self::Desktop),
            "mobile" => Some(Self::Mobile),
            _ => None,
        }
    }

    /// Returns the modes a survey may target on this platform.
    #[must_use]
    pub const fn supported_modes(self) -> &'static [PlatformMode] {
        match self {
            Self::Desktop => &[PlatformMode::Stable],
            Self::Mobile => &[PlatformMode::Stable, PlatformMode::Beta],
        }
    }
}

/// Release channel within a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformMode {
    /// Default channel.
    Stable,
    /// Opt-in beta channel.
    Beta,
}

impl PlatformMode {
    /// Parses a mode label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "stable" => Some(Self::Stable),
            "beta" => Some(Self::Beta),
            _ => None,
        }
    }
}

/// Platforms and modes targeted by a survey.
///
/// # Invariants
/// - Every listed mode is one of [`Platform::supported_modes`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Platforms(BTreeMap<Platform, Vec<PlatformMode>>);

impl Platforms {
    /// Creates an empty platform map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds modes for a platform and returns the map.
    #[must_use]
    pub fn with(mut self, platform: Platform, modes: impl IntoIterator<Item = PlatformMode>) -> Self {
        self.0.entry(platform).or_default().extend(modes);
        self
    }

    /// Returns true when `platform` is listed with `mode`.
    #[must_use]
    pub fn allows(&self, platform: Platform, mode: PlatformMode) -> bool {
        self.0.get(&platform).is_some_and(|modes| modes.contains(&mode))
    }
}

// ============================================================================
// SECTION: Survey
// ============================================================================

/// Fields shared by every survey variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyCommon {
    /// Survey name, unique among enabled surveys ignoring case.
    pub name: SurveyName,
    /// Fraction of eligible viewers bucketed into the shown group.
    pub coverage: f64,
    /// Targeted platforms.
    pub platforms: Platforms,
    /// Message key of the privacy policy notice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_policy: Option<String>,
    /// Message key of additional information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    /// Message key of the confirmation heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_msg: Option<String>,
    /// Message key of the confirmation body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_description: Option<String>,
    /// Targeting constraints.
    pub audience: SurveyAudience,
    /// Page anchor the survey embeds into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_element_id: Option<String>,
}

/// In-page survey with ordered questions.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalSurvey {
    /// Shared fields.
    pub common: SurveyCommon,
    /// Questions in display order.
    pub questions: Vec<InternalQuestion>,
}

/// Link-out survey with exactly one question.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSurvey {
    /// Shared fields.
    pub common: SurveyCommon,
    /// The single question.
    pub question: ExternalQuestion,
    /// True when the resolved link is not served over https.
    pub is_insecure: bool,
}

/// Validated survey.
#[derive(Debug, Clone, PartialEq)]
pub enum Survey {
    /// In-page survey.
    Internal(InternalSurvey),
    /// Link-out survey.
    External(ExternalSurvey),
}

impl Survey {
    /// Returns the shared fields.
    #[must_use]
    pub const fn common(&self) -> &SurveyCommon {
        match self {
            Self::Internal(survey) => &survey.common,
            Self::External(survey) => &survey.common,
        }
    }

    /// Returns the survey name.
    #[must_use]
    pub const fn name(&self) -> &SurveyName {
        &self.common().name
    }

    /// Returns the variant tag.
    #[must_use]
    pub const fn survey_type(&self) -> SurveyType {
        match self {
            Self::Internal(_) => SurveyType::Internal,
            Self::External(_) => SurveyType::External,
        }
    }

    /// Returns the coverage fraction.
    #[must_use]
    pub const fn coverage(&self) -> f64 {
        self.common().coverage
    }

    /// Returns the embed anchor, if any.
    #[must_use]
    pub fn embed_element_id(&self) -> Option<&str> {
        self.common().embed_element_id.as_deref()
    }

    /// Returns the serializable projection sent to the client runtime.
    #[must_use]
    pub fn projection(&self) -> SurveyProjection<'_> {
        let common = self.common();
        let (questions, is_insecure) = match self {
            Self::Internal(survey) => (ProjectedQuestions::Internal(&survey.questions), None),
            Self::External(survey) => (
                ProjectedQuestions::External(std::slice::from_ref(&survey.question)),
                Some(survey.is_insecure),
            ),
        };
        SurveyProjection {
            name: &common.name,
            survey_type: self.survey_type(),
            module: common.name.module_name(),
            coverage: common.coverage,
            platforms: &common.platforms,
            privacy_policy: common.privacy_policy.as_deref(),
            additional_info: common.additional_info.as_deref(),
            confirm_msg: common.confirm_msg.as_deref(),
            confirm_description: common.confirm_description.as_deref(),
            audience: &common.audience,
            questions,
            embed_element_id: common.embed_element_id.as_deref(),
            is_insecure,
        }
    }

    /// Returns every message key the survey displays, in display order.
    ///
    /// Survey-level text comes first, then each question's text followed by
    /// its answers. Keys are not de-duplicated.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        let common = self.common();
        let mut out: Vec<String> = [
            &common.privacy_policy,
            &common.additional_info,
            &common.confirm_msg,
            &common.confirm_description,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect();
        match self {
            Self::Internal(survey) => {
                for question in &survey.questions {
                    question.collect_messages(&mut out);
                }
            }
            Self::External(survey) => survey.question.collect_messages(&mut out),
        }
        out
    }
}

// ============================================================================
// SECTION: Projection
// ============================================================================

/// Question list of a projection.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProjectedQuestions<'a> {
    /// Internal survey questions.
    Internal(&'a [InternalQuestion]),
    /// External survey question.
    External(&'a [ExternalQuestion]),
}

/// Flattened, JSON-serializable view of a survey.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyProjection<'a> {
    /// Survey name.
    pub name: &'a SurveyName,
    /// Variant tag.
    #[serde(rename = "type")]
    pub survey_type: SurveyType,
    /// Client module name.
    pub module: String,
    /// Coverage fraction.
    pub coverage: f64,
    /// Targeted platforms.
    pub platforms: &'a Platforms,
    /// Privacy policy message key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_policy: Option<&'a str>,
    /// Additional information message key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<&'a str>,
    /// Confirmation heading message key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_msg: Option<&'a str>,
    /// Confirmation body message key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_description: Option<&'a str>,
    /// Targeting constraints.
    pub audience: &'a SurveyAudience,
    /// Questions in display order.
    pub questions: ProjectedQuestions<'a>,
    /// Page anchor the survey embeds into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_element_id: Option<&'a str>,
    /// Insecure link flag; external surveys only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_insecure: Option<bool>,
}
