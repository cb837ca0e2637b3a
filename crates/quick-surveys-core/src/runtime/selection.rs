// crates/quick-surveys-core/src/runtime/selection.rs
// ============================================================================
// Module: Quick Surveys Selection
// Description: Picks the survey(s) to show for a single page view.
// Purpose: Combine dismissal, bucketing, audience, and platform checks.
// Dependencies: crate::{core, interfaces, runtime}, rand
// ============================================================================

//! ## Overview
//! Selection runs once per page view over the enabled surveys.
//!
//! A forced override bypasses every check. Otherwise a survey is a candidate
//! when it is not dismissed, its bucket is `A`, the viewer is in its audience,
//! and it targets the viewer's platform. Candidates whose embed anchor is on
//! the page are all shown (one per anchor); if there are none, one floating
//! candidate is picked at random. Embedded surveys whose anchor is missing
//! from the page are never shown as floating surveys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::core::Survey;
use crate::interfaces::SurveyTokenStore;
use crate::interfaces::ViewerContext;
use crate::runtime::audience::AudienceFilter;
use crate::runtime::audience::audience_rejection;
use crate::runtime::bucketing::Bucket;
use crate::runtime::bucketing::get_bucket_for_survey;
use crate::runtime::bucketing::is_dismissed;
use crate::runtime::bucketing::survey_matches_platform;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Forced override value that picks a random enabled survey.
pub const FORCE_RANDOM: &str = "true";

/// Prefixes accepted in front of a forced survey name.
const LEGACY_FORCE_PREFIXES: [&str; 2] = ["internal-survey-", "external-survey-"];

// ============================================================================
// SECTION: Types
// ============================================================================

/// Surveys chosen for a page view.
#[derive(Debug, Clone, PartialEq)]
pub enum SurveySelection<'a> {
    /// Nothing is shown.
    None,
    /// The forced survey is shown regardless of targeting.
    Forced(&'a Survey),
    /// Every embedded candidate is shown at its anchor.
    Embedded(Vec<&'a Survey>),
    /// One floating candidate is shown.
    Floating(&'a Survey),
}

impl<'a> SurveySelection<'a> {
    /// Returns the selected surveys.
    #[must_use]
    pub fn surveys(&self) -> Vec<&'a Survey> {
        match self {
            Self::None => Vec::new(),
            Self::Forced(survey) | Self::Floating(survey) => vec![*survey],
            Self::Embedded(surveys) => surveys.clone(),
        }
    }

    /// Returns true when nothing is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Candidate check result for one survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// The viewer dismissed the survey.
    Dismissed,
    /// The viewer is in the control bucket.
    Control,
    /// An audience filter rejected the viewer.
    OutOfAudience(AudienceFilter),
    /// The survey does not target the viewer's platform.
    WrongPlatform,
    /// The survey is a candidate.
    Admitted,
}

impl CandidateOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dismissed => "dismissed",
            Self::Control => "control",
            Self::OutOfAudience(_) => "out_of_audience",
            Self::WrongPlatform => "wrong_platform",
            Self::Admitted => "admitted",
        }
    }
}

/// Selection plus the per-survey candidate checks behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionReport<'a> {
    /// Chosen surveys.
    pub selection: SurveySelection<'a>,
    /// Candidate check per survey; empty for forced selections.
    pub outcomes: Vec<(&'a Survey, CandidateOutcome)>,
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Picks the surveys to show for this page view.
pub fn select_surveys<'a, R: Rng + ?Sized>(
    surveys: &'a [Survey],
    viewer: &ViewerContext,
    store: &dyn SurveyTokenStore,
    forced: Option<&str>,
    rng: &mut R,
) -> SurveySelection<'a> {
    select_with_report(surveys, viewer, store, forced, rng).selection
}

/// Picks the surveys to show and reports why each survey was or was not a
/// candidate.
pub fn select_with_report<'a, R: Rng + ?Sized>(
    surveys: &'a [Survey],
    viewer: &ViewerContext,
    store: &dyn SurveyTokenStore,
    forced: Option<&str>,
    rng: &mut R,
) -> SelectionReport<'a> {
    if let Some(forced) = forced {
        let survey = find_forced(surveys, forced, rng);
        return SelectionReport {
            selection: survey.map_or(SurveySelection::None, SurveySelection::Forced),
            outcomes: Vec::new(),
        };
    }
    let outcomes: Vec<(&Survey, CandidateOutcome)> = surveys
        .iter()
        .map(|survey| (survey, check_candidate(survey, viewer, store, rng)))
        .collect();
    let candidates = outcomes
        .iter()
        .filter(|(_, outcome)| *outcome == CandidateOutcome::Admitted)
        .map(|(survey, _)| *survey);
    let mut anchors = BTreeSet::new();
    let mut embedded = Vec::new();
    let mut floating = Vec::new();
    for survey in candidates {
        match survey.embed_element_id() {
            Some(anchor) if viewer.has_anchor(anchor) => {
                if anchors.insert(anchor) {
                    embedded.push(survey);
                }
            }
            Some(_) => {}
            None => floating.push(survey),
        }
    }
    let selection = if !embedded.is_empty() {
        SurveySelection::Embedded(embedded)
    } else {
        floating.choose(rng).copied().map_or(SurveySelection::None, SurveySelection::Floating)
    };
    SelectionReport {
        selection,
        outcomes,
    }
}

/// Runs the candidate checks for one survey in order.
///
/// The bucket check stores a fresh token for surveys the viewer has not seen.
pub fn check_candidate<R: Rng + ?Sized>(
    survey: &Survey,
    viewer: &ViewerContext,
    store: &dyn SurveyTokenStore,
    rng: &mut R,
) -> CandidateOutcome {
    if is_dismissed(survey, store) {
        return CandidateOutcome::Dismissed;
    }
    if get_bucket_for_survey(survey, store, rng) != Bucket::A {
        return CandidateOutcome::Control;
    }
    if let Some(filter) = audience_rejection(&survey.common().audience, viewer) {
        return CandidateOutcome::OutOfAudience(filter);
    }
    if !survey_matches_platform(survey, viewer.platform_mode()) {
        return CandidateOutcome::WrongPlatform;
    }
    CandidateOutcome::Admitted
}

/// Resolves a forced override to a survey.
fn find_forced<'a, R: Rng + ?Sized>(
    surveys: &'a [Survey],
    forced: &str,
    rng: &mut R,
) -> Option<&'a Survey> {
    if forced == FORCE_RANDOM {
        return surveys.choose(rng);
    }
    let by_name = |name: &str| surveys.iter().find(|survey| survey.name().as_str() == name);
    by_name(forced).or_else(|| {
        LEGACY_FORCE_PREFIXES.iter().find_map(|prefix| forced.strip_prefix(prefix)).and_then(by_name)
    })
}
