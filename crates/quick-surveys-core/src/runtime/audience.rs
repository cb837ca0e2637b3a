// crates/quick-surveys-core/src/runtime/audience.rs
// ============================================================================
// Module: Quick Surveys Audience Evaluator
// Description: Admit/reject decision for one audience and one viewer.
// Purpose: Apply targeting constraints without ever failing.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The evaluator is a short-circuiting conjunction of independent filters,
//! applied in a fixed order. Each filter is skipped when its constraint is
//! absent. Unknown viewer attributes reject only when a constraint needs them.
//!
//! Browser keywords match as case-sensitive substrings of the user agent.
//! Chrome user agents also contain `Safari`, so a `Safari` keyword never
//! matches a Chrome user agent unless `Chrome` is targeted as well. A
//! `Chrome` keyword covers every Chromium-based browser (Edge, Opera) since
//! their user agents carry the `Chrome/` token.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;

use crate::core::DateRange;
use crate::core::SurveyAudience;
use crate::interfaces::ViewerContext;

// ============================================================================
// SECTION: Filters
// ============================================================================

/// Audience filters in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudienceFilter {
    /// `pageIds`.
    PageIds,
    /// `registrationStart` / `registrationEnd`.
    Registration,
    /// `firstEdit`.
    FirstEdit,
    /// `lastEdit`.
    LastEdit,
    /// `anons`.
    Anons,
    /// `minEdits` / `maxEdits`.
    EditCount,
    /// `countries`.
    Countries,
    /// `userAgent`.
    UserAgent,
}

impl AudienceFilter {
    /// Returns a stable label for the filter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PageIds => "page_ids",
            Self::Registration => "registration",
            Self::FirstEdit => "first_edit",
            Self::LastEdit => "last_edit",
            Self::Anons => "anons",
            Self::EditCount => "edit_count",
            Self::Countries => "countries",
            Self::UserAgent => "user_agent",
        }
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Returns true when `viewer` passes every constraint of `audience`.
#[must_use]
pub fn is_in_audience(audience: &SurveyAudience, viewer: &ViewerContext) -> bool {
    audience_rejection(audience, viewer).is_none()
}

/// Returns the first filter that rejects `viewer`, or `None` when admitted.
#[must_use]
pub fn audience_rejection(audience: &SurveyAudience, viewer: &ViewerContext) -> Option<AudienceFilter> {
    if let Some(page_ids) = &audience.page_ids
        && !viewer.page_id.is_some_and(|page| page_ids.contains(&page))
    {
        return Some(AudienceFilter::PageIds);
    }
    if audience.registration_start.is_some() || audience.registration_end.is_some() {
        let window = DateRange {
            from: audience.registration_start,
            to: audience.registration_end,
        };
        if !within(&window, viewer.registration) {
            return Some(AudienceFilter::Registration);
        }
    }
    if let Some(range) = &audience.first_edit
        && !within(range, viewer.first_edit)
    {
        return Some(AudienceFilter::FirstEdit);
    }
    if let Some(range) = &audience.last_edit
        && !within(range, viewer.last_edit)
    {
        return Some(AudienceFilter::LastEdit);
    }
    if let Some(anons) = audience.anons
        && anons != viewer.is_anon
    {
        return Some(AudienceFilter::Anons);
    }
    if !edit_count_matches(audience, viewer.edit_count) {
        return Some(AudienceFilter::EditCount);
    }
    if let Some(countries) = &audience.countries
        && !countries.iter().any(|country| country == viewer.country())
    {
        return Some(AudienceFilter::Countries);
    }
    if let Some(keywords) = &audience.user_agent
        && !user_agent_matches(keywords, &viewer.user_agent)
    {
        return Some(AudienceFilter::UserAgent);
    }
    None
}

/// Returns true when a known instant falls inside `range`.
fn within(range: &DateRange, instant: Option<OffsetDateTime>) -> bool {
    instant.is_some_and(|instant| range.contains(instant))
}

/// Applies the edit-count bounds.
fn edit_count_matches(audience: &SurveyAudience, edit_count: Option<i64>) -> bool {
    let Some(count) = edit_count else {
        return audience.min_edits.is_none();
    };
    audience.min_edits.is_none_or(|min| count >= min) && audience.max_edits.is_none_or(|max| count <= max)
}

/// Returns true when any targeted browser keyword matches `user_agent`.
#[must_use]
pub fn user_agent_matches(keywords: &[String], user_agent: &str) -> bool {
    let is_chrome = user_agent.contains("Chrome");
    let targets_chrome = keywords.iter().any(|keyword| keyword == "Chrome");
    keywords.iter().any(|keyword| {
        if keyword == "Safari" && is_chrome && !targets_chrome {
            return false;
        }
        user_agent.contains(keyword.as_str())
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
