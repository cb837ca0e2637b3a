// crates/quick-surveys-core/src/core/audience.rs
// ============================================================================
// Module: Quick Surveys Audience Model
// Description: Typed audience constraints built from validated records.
// Purpose: Give the evaluator parsed dates and typed lists instead of raw JSON.
// Dependencies: crate::core::{schema, time}, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`SurveyAudience`] holds the optional targeting constraints of one
//! survey. Every field is optional and an absent field leaves that dimension
//! unconstrained. Construction goes through the fixed audience schema first,
//! then checks what the generic validator cannot express: date syntax and
//! list element types.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::schema::SchemaError;
use crate::core::schema::TypeDefinition;
use crate::core::schema::TypeSpec;
use crate::core::schema::ValidatedRecord;
use crate::core::schema::validate;
use crate::core::schema::validate_lenient;
use crate::core::time::CalendarDate;
use crate::core::time::DateRange;

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Returns the fixed audience schema.
#[must_use]
pub fn audience_definition() -> &'static TypeDefinition {
    static DEFINITION: OnceLock<TypeDefinition> = OnceLock::new();
    DEFINITION.get_or_init(|| {
        let range = TypeDefinition::new().field("from", TypeSpec::STRING).field("to", TypeSpec::STRING);
        TypeDefinition::new()
            .field("minEdits", TypeSpec::INTEGER)
            .field("maxEdits", TypeSpec::INTEGER)
            .field("countries", TypeSpec::ARRAY)
            .field("anons", TypeSpec::BOOLEAN)
            .field("registrationStart", TypeSpec::STRING)
            .field("registrationEnd", TypeSpec::STRING)
            .field("pageIds", TypeSpec::ARRAY)
            .field("userAgent", TypeSpec::ARRAY)
            .field("firstEdit", TypeSpec::Nested(range.clone()))
            .field("lastEdit", TypeSpec::Nested(range))
    })
}

// ============================================================================
// SECTION: Audience
// ============================================================================

/// Targeting constraints of a survey.
///
/// # Invariants
/// - `None` means unconstrained on that dimension, never "reject everyone".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAudience {
    /// Minimum edit count (inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_edits: Option<i64>,
    /// Maximum edit count (inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_edits: Option<i64>,
    /// Admitted two-letter country codes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
    /// Required anonymity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anons: Option<bool>,
    /// Earliest admitted registration day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_start: Option<CalendarDate>,
    /// Latest admitted registration day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_end: Option<CalendarDate>,
    /// Admitted page identifiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_ids: Option<Vec<i64>>,
    /// Targeted browser keywords.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<Vec<String>>,
    /// Admitted range for the first edit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_edit: Option<DateRange>,
    /// Admitted range for the last edit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_edit: Option<DateRange>,
}

impl SurveyAudience {
    /// Builds an audience from a raw record with strict validation.
    ///
    /// # Errors
    ///
    /// Returns [`AudienceError`] on a schema mismatch, a malformed date, or a
    /// list element of the wrong type.
    pub fn from_map(data: &Map<String, Value>) -> Result<Self, AudienceError> {
        let record = validate(data, audience_definition())?;
        Self::from_record(&record)
    }

    /// Builds an audience from a validated record.
    ///
    /// # Errors
    ///
    /// Returns [`AudienceError`] on a malformed date or list element.
    pub fn from_record(record: &ValidatedRecord) -> Result<Self, AudienceError> {
        Ok(Self {
            min_edits: record.get_i64("minEdits"),
            max_edits: record.get_i64("maxEdits"),
            countries: string_list(record, "countries")?,
            anons: record.get_bool("anons"),
            registration_start: date_field(record, "registrationStart")?,
            registration_end: date_field(record, "registrationEnd")?,
            page_ids: integer_list(record, "pageIds")?,
            user_agent: string_list(record, "userAgent")?,
            first_edit: range_field(record, "firstEdit")?,
            last_edit: range_field(record, "lastEdit")?,
        })
    }

    /// Builds an audience that never fails, dropping every malformed field.
    ///
    /// Returns the audience plus a description of each dropped field.
    #[must_use]
    pub fn from_value_lenient(data: &Value) -> (Self, Vec<String>) {
        let Some(map) = data.as_object() else {
            return (Self::default(), vec!["audience must be a record".to_string()]);
        };
        let (mut record, dropped) = validate_lenient(map, audience_definition());
        let mut notes: Vec<String> = dropped.iter().map(ToString::to_string).collect();
        loop {
            match Self::from_record(&record) {
                Ok(audience) => return (audience, notes),
                Err(err) => {
                    let Some(field) = err.field().filter(|field| record.contains_key(field)) else {
                        return (Self::default(), notes);
                    };
                    notes.push(err.to_string());
                    record = without_field(record, field);
                }
            }
        }
    }

    /// Returns true when no constraint is set.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Audience construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudienceError {
    /// Schema validation failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A date bound is not `YYYY-MM-DD`.
    #[error("{field} must be a YYYY-MM-DD date, got {value:?}")]
    InvalidDate {
        /// Offending field.
        field: String,
        /// Offending value.
        value: String,
    },
    /// A list holds an element of the wrong type.
    #[error("{field} must only contain {expected} values")]
    InvalidListElement {
        /// Offending field.
        field: &'static str,
        /// Expected element type.
        expected: &'static str,
    },
}

impl AudienceError {
    /// Returns the top-level audience field that caused the error.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Schema(_) => None,
            Self::InvalidDate {
                field, ..
            } => field.split('.').next(),
            Self::InvalidListElement {
                field, ..
            } => Some(field),
        }
    }
}

// ============================================================================
// SECTION: Field Helpers
// ============================================================================

/// Reads a list of strings.
fn string_list(
    record: &ValidatedRecord,
    field: &'static str,
) -> Result<Option<Vec<String>>, AudienceError> {
    let Some(items) = record.get_array(field) else {
        return Ok(None);
    };
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or(AudienceError::InvalidListElement {
                field,
                expected: "string",
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Reads a list of integers.
fn integer_list(
    record: &ValidatedRecord,
    field: &'static str,
) -> Result<Option<Vec<i64>>, AudienceError> {
    let Some(items) = record.get_array(field) else {
        return Ok(None);
    };
    items
        .iter()
        .map(|item| {
            item.as_i64().ok_or(AudienceError::InvalidListElement {
                field,
                expected: "integer",
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Reads a top-level date.
fn date_field(record: &ValidatedRecord, field: &str) -> Result<Option<CalendarDate>, AudienceError> {
    record.get_str(field).map(|value| parse_date(field, value)).transpose()
}

/// Reads a `{from, to}` range.
fn range_field(record: &ValidatedRecord, field: &str) -> Result<Option<DateRange>, AudienceError> {
    let Some(range) = record.get_object(field) else {
        return Ok(None);
    };
    let bound = |name: &str| -> Result<Option<CalendarDate>, AudienceError> {
        range
            .get(name)
            .and_then(Value::as_str)
            .map(|value| parse_date(&format!("{field}.{name}"), value))
            .transpose()
    };
    Ok(Some(DateRange {
        from: bound("from")?,
        to: bound("to")?,
    }))
}

/// Parses a date bound.
fn parse_date(field: &str, value: &str) -> Result<CalendarDate, AudienceError> {
    CalendarDate::parse(value).ok_or_else(|| AudienceError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Returns `record` without `field`.
fn without_field(record: ValidatedRecord, field: &str) -> ValidatedRecord {
    let mut map = record.as_map().clone();
    map.remove(field);
    let (pruned, _) = validate_lenient(&map, audience_definition());
    pruned
}
