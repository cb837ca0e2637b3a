// crates/quick-surveys-core/src/runtime/bucketing.rs
// ============================================================================
// Module: Quick Surveys Bucketing
// Description: Per-viewer coverage buckets, platform matching, and dismissal.
// Purpose: Decide whether a survey is in the shown group for this viewer.
// Dependencies: crate::{core, interfaces}, rand
// ============================================================================

//! ## Overview
//! Each viewer gets one random token per survey, generated on first use and
//! kept by the host's token store. The bucket is a pure function of the
//! survey name and that token, so it is stable across page loads. Coverage is
//! not range-checked: at or below zero nobody is shown, at or above one
//! everybody is.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::Rng;
use serde::Serialize;

use crate::core::Platform;
use crate::core::PlatformMode;
use crate::core::Survey;
use crate::core::SurveyName;
use crate::core::bucket_score;
use crate::core::hex_encode;
use crate::interfaces::DISMISSED_TOKEN;
use crate::interfaces::SurveyTokenStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of random bytes in a generated token.
const TOKEN_BYTES: usize = 10;

// ============================================================================
// SECTION: Buckets
// ============================================================================

/// Coverage bucket of a viewer for one survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Bucket {
    /// Shown group.
    #[serde(rename = "A")]
    A,
    /// Held-out group.
    #[serde(rename = "control")]
    Control,
}

impl Bucket {
    /// Returns the bucket label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Control => "control",
        }
    }
}

/// Returns the bucket of `token` for the named survey.
#[must_use]
pub fn bucket_for(name: &SurveyName, token: &str, coverage: f64) -> Bucket {
    if bucket_score(name.as_str(), token) < coverage { Bucket::A } else { Bucket::Control }
}

// ============================================================================
// SECTION: Tokens
// ============================================================================

/// Generates a fresh random token.
pub fn generate_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rng.fill(&mut bytes[..]);
    hex_encode(&bytes)
}

/// Returns the viewer's token for `survey`, generating and storing one when
/// none exists. An empty stored value counts as no token.
pub fn survey_token<R: Rng + ?Sized>(
    survey: &Survey,
    store: &dyn SurveyTokenStore,
    rng: &mut R,
) -> String {
    let key = survey.name().storage_key();
    if let Some(token) = store.get(&key).filter(|token| !token.is_empty()) {
        return token;
    }
    let token = generate_token(rng);
    store.set(&key, &token);
    token
}

/// Returns the viewer's bucket for `survey`.
pub fn get_bucket_for_survey<R: Rng + ?Sized>(
    survey: &Survey,
    store: &dyn SurveyTokenStore,
    rng: &mut R,
) -> Bucket {
    let token = survey_token(survey, store, rng);
    bucket_for(survey.name(), &token, survey.coverage())
}

/// Returns true when the viewer permanently dismissed `survey`.
#[must_use]
pub fn is_dismissed(survey: &Survey, store: &dyn SurveyTokenStore) -> bool {
    store.get(&survey.name().storage_key()).as_deref() == Some(DISMISSED_TOKEN)
}

/// Records a permanent dismissal of `survey`.
pub fn dismiss_survey(survey: &Survey, store: &dyn SurveyTokenStore) {
    store.set(&survey.name().storage_key(), DISMISSED_TOKEN);
}

// ============================================================================
// SECTION: Platforms
// ============================================================================

/// Returns true when `survey` targets the viewer's platform.
///
/// A mode means the mobile platform; no mode (or an empty one) means desktop
/// stable.
#[must_use]
pub fn survey_matches_platform(survey: &Survey, mode: Option<&str>) -> bool {
    let (platform, mode) = match mode.filter(|mode| !mode.is_empty()) {
        Some(mode) => (Platform::Mobile, PlatformMode::parse(mode)),
        None => (Platform::Desktop, Some(PlatformMode::Stable)),
    };
    mode.is_some_and(|mode| survey.common().platforms.allows(platform, mode))
}
