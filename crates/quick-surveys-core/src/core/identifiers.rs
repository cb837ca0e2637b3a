// crates/quick-surveys-core/src/core/identifiers.rs
// ============================================================================
// Module: Quick Surveys Identifiers
// Description: Survey name wrapper and the keys derived from it.
// Purpose: Keep name normalization rules in one place.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Survey names are free-form configuration strings. Several stable keys are
//! derived from them: the case-insensitive uniqueness key, the token store
//! key, and the client module name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix of token store keys.
pub const TOKEN_KEY_PREFIX: &str = "ext-quicksurvey-";
/// Prefix of client module names.
pub const MODULE_NAME_PREFIX: &str = "ext.quicksurveys.survey.";

// ============================================================================
// SECTION: Survey Name
// ============================================================================

/// Configured survey name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyName(String);

impl SurveyName {
    /// Creates a new survey name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the token store key for this survey.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{TOKEN_KEY_PREFIX}{}", self.0.replace(' ', "-"))
    }

    /// Returns the client module name for this survey.
    #[must_use]
    pub fn module_name(&self) -> String {
        format!("{MODULE_NAME_PREFIX}{}", self.0.replace(' ', "."))
    }
}

impl fmt::Display for SurveyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SurveyName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SurveyName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Normalizes a raw name for duplicate detection.
#[must_use]
pub fn uniqueness_key(name: &str) -> String {
    name.trim().to_lowercase()
}
