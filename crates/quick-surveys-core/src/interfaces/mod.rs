// crates/quick-surveys-core/src/interfaces/mod.rs
// ============================================================================
// Module: Quick Surveys Interfaces
// Description: Collaborator contracts for token storage, messages, and viewers.
// Purpose: Keep host integration outside the engine behind explicit seams.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! The engine never persists anything and never reads ambient state. Hosts
//! supply a [`SurveyTokenStore`] for per-survey tokens, a [`MessageResolver`]
//! for link messages, and a [`ViewerContext`] describing the current page
//! view. All calls are synchronous and infallible from the engine's view.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Stored token value meaning the viewer dismissed the survey for good.
pub const DISMISSED_TOKEN: &str = "~";

/// Country code used when geolocation is unavailable.
pub const UNKNOWN_COUNTRY: &str = "??";

// ============================================================================
// SECTION: Token Store
// ============================================================================

/// Key-value store holding per-survey bucket tokens.
///
/// Keys come from [`crate::SurveyName::storage_key`]. The value
/// [`DISMISSED_TOKEN`] marks a permanent opt-out.
pub trait SurveyTokenStore {
    /// Returns the token stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: &str);
}

// ============================================================================
// SECTION: Message Resolver
// ============================================================================

/// Resolves message keys to text.
pub trait MessageResolver {
    /// Returns the text of `key`, or `None` when the key is unknown.
    fn resolve(&self, key: &str) -> Option<String>;
}

impl MessageResolver for BTreeMap<String, String> {
    fn resolve(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl MessageResolver for HashMap<String, String> {
    fn resolve(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

// ============================================================================
// SECTION: Viewer Context
// ============================================================================

/// Attributes of the viewer for a single page view.
///
/// Timestamps are RFC 3339 when serialized. Absent attributes are unknown,
/// which the audience filters treat conservatively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerContext {
    /// True for logged-out viewers.
    pub is_anon: bool,
    /// Edit count; unknown for anonymous viewers.
    pub edit_count: Option<i64>,
    /// Registration timestamp.
    #[serde(with = "time::serde::rfc3339::option")]
    pub registration: Option<OffsetDateTime>,
    /// Timestamp of the first edit.
    #[serde(with = "time::serde::rfc3339::option")]
    pub first_edit: Option<OffsetDateTime>,
    /// Timestamp of the most recent edit.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_edit: Option<OffsetDateTime>,
    /// Two-letter geolocated country code.
    pub country: Option<String>,
    /// Raw user-agent string.
    pub user_agent: String,
    /// Current page identifier.
    pub page_id: Option<i64>,
    /// Mobile mode; `None` or empty means desktop.
    pub platform_mode: Option<String>,
    /// Embed anchors present on the current page.
    pub embed_anchors: Vec<String>,
    /// Stable per-viewer session token appended to external links.
    pub session_token: Option<String>,
}

impl ViewerContext {
    /// Returns the country code, or [`UNKNOWN_COUNTRY`].
    #[must_use]
    pub fn country(&self) -> &str {
        self.country.as_deref().unwrap_or(UNKNOWN_COUNTRY)
    }

    /// Returns the platform mode when one is set.
    #[must_use]
    pub fn platform_mode(&self) -> Option<&str> {
        self.platform_mode.as_deref().filter(|mode| !mode.is_empty())
    }

    /// Returns true when `anchor` is present on the current page.
    #[must_use]
    pub fn has_anchor(&self, anchor: &str) -> bool {
        self.embed_anchors.iter().any(|present| present == anchor)
    }
}
