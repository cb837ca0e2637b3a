// crates/quick-surveys-core/src/core/schema.rs
// ============================================================================
// Module: Quick Surveys Schema Validator
// Description: Generic recursive type checking and pruning of raw records.
// Purpose: Turn loosely typed configuration data into validated records.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! The schema validator walks a raw JSON record against a declarative
//! [`TypeDefinition`] and produces a [`ValidatedRecord`] that holds only the
//! declared keys whose values carry the declared type. Unknown keys are
//! dropped, `null` values count as absent, and nothing is defaulted.
//!
//! Two call styles exist:
//! - [`validate`] aborts on the first type mismatch. Factory validation uses
//!   it so a mistyped field rejects the whole survey spec.
//! - [`validate_lenient`] drops the offending field, reports it, and keeps
//!   going. Constructors that must never fail use it.
//!
//! The validator knows nothing about surveys; domain schemas live next to the
//! models that consume them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Type Definitions
// ============================================================================

/// Primitive type tags understood by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    /// JSON string.
    String,
    /// JSON number without a fractional component.
    Integer,
    /// Any JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON array with unchecked elements.
    Array,
    /// JSON object with unchecked members.
    Object,
}

impl PrimitiveType {
    /// Returns the stable label used in mismatch errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Returns true when `value` carries this primitive type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// Declared type of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    /// Value is copied verbatim when the primitive type matches.
    Primitive(PrimitiveType),
    /// Homogeneous list whose elements are records of the sub-definition.
    ArrayOf(TypeDefinition),
    /// Single nested record validated against the sub-definition.
    Nested(TypeDefinition),
}

impl TypeSpec {
    /// Shorthand for a string field.
    pub const STRING: Self = Self::Primitive(PrimitiveType::String);
    /// Shorthand for an integer field.
    pub const INTEGER: Self = Self::Primitive(PrimitiveType::Integer);
    /// Shorthand for a numeric field.
    pub const NUMBER: Self = Self::Primitive(PrimitiveType::Number);
    /// Shorthand for a boolean field.
    pub const BOOLEAN: Self = Self::Primitive(PrimitiveType::Boolean);
    /// Shorthand for an untyped array field.
    pub const ARRAY: Self = Self::Primitive(PrimitiveType::Array);
    /// Shorthand for an untyped object field.
    pub const OBJECT: Self = Self::Primitive(PrimitiveType::Object);

    /// Returns the label reported when a value does not match.
    #[must_use]
    pub const fn expected(&self) -> &'static str {
        match self {
            Self::Primitive(primitive) => primitive.as_str(),
            Self::ArrayOf(_) => "array",
            Self::Nested(_) => "record",
        }
    }
}

/// Ordered mapping from field name to declared type.
///
/// # Invariants
/// - Field order is the iteration order of validation and of error reporting.
/// - A field name appears at most once; later declarations replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeDefinition {
    /// Declared fields in definition order.
    fields: Vec<(String, TypeSpec)>,
}

impl TypeDefinition {
    /// Creates an empty definition.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: Vec::new(),
        }
    }

    /// Adds a field declaration and returns the definition.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, spec: TypeSpec) -> Self {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            slot.1 = spec;
        } else {
            self.fields.push((name, spec));
        }
        self
    }

    /// Returns the declared type of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeSpec> {
        self.fields.iter().find(|(existing, _)| existing == name).map(|(_, spec)| spec)
    }

    /// Iterates declared fields in definition order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &TypeSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }
}

// ============================================================================
// SECTION: Validated Records
// ============================================================================

/// Pruned output of schema validation.
///
/// # Invariants
/// - Every value matches the declared type of its key.
/// - Absent or `null` source fields are omitted; no placeholders are injected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedRecord(Map<String, Value>);

impl ValidatedRecord {
    /// Returns the raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns true when `key` survived validation.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns a string field.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns an integer field.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// Returns a numeric field as a float.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Returns a boolean field.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Returns an array field.
    #[must_use]
    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    /// Returns an object field.
    #[must_use]
    pub fn get_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Returns the number of validated fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no field survived validation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts the record back into a raw JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A present field does not carry its declared type.
    #[error("field {field} must be of type {expected}")]
    TypeMismatch {
        /// Path of the offending field (`questions[0].answers[1].label`).
        field: String,
        /// Declared type label.
        expected: &'static str,
    },
}

impl SchemaError {
    /// Returns the path of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::TypeMismatch {
                field, ..
            } => field,
        }
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates `data` against `definition`, aborting on the first mismatch.
///
/// # Errors
///
/// Returns [`SchemaError::TypeMismatch`] when a present field does not match
/// its declared type, including any element of an `ArrayOf` list.
pub fn validate(
    data: &Map<String, Value>,
    definition: &TypeDefinition,
) -> Result<ValidatedRecord, SchemaError> {
    let mut dropped = Vec::new();
    validate_record(data, definition, "", Mode::Strict, &mut dropped)
}

/// Validates `data` against `definition`, dropping mismatched fields.
///
/// Returns the pruned record plus one error per dropped field. An `ArrayOf`
/// field with any bad element is dropped as a whole.
#[must_use]
pub fn validate_lenient(
    data: &Map<String, Value>,
    definition: &TypeDefinition,
) -> (ValidatedRecord, Vec<SchemaError>) {
    let mut dropped = Vec::new();
    let record = validate_record(data, definition, "", Mode::Lenient, &mut dropped)
        .unwrap_or_default();
    (record, dropped)
}

/// Mismatch handling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Abort on the first mismatch.
    Strict,
    /// Drop mismatched fields and record them.
    Lenient,
}

/// Validates one record level.
fn validate_record(
    data: &Map<String, Value>,
    definition: &TypeDefinition,
    path: &str,
    mode: Mode,
    dropped: &mut Vec<SchemaError>,
) -> Result<ValidatedRecord, SchemaError> {
    let mut out = Map::new();
    for (name, spec) in definition.fields() {
        let Some(value) = data.get(name) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let field_path = join_path(path, name);
        match validate_field(value, spec, &field_path, mode, dropped) {
            Ok(validated) => {
                out.insert(name.to_string(), validated);
            }
            Err(err) if mode == Mode::Lenient => dropped.push(err),
            Err(err) => return Err(err),
        }
    }
    Ok(ValidatedRecord(out))
}

/// Validates a single present field value.
fn validate_field(
    value: &Value,
    spec: &TypeSpec,
    path: &str,
    mode: Mode,
    dropped: &mut Vec<SchemaError>,
) -> Result<Value, SchemaError> {
    match spec {
        TypeSpec::Primitive(primitive) => {
            if primitive.matches(value) {
                Ok(value.clone())
            } else {
                Err(mismatch(path, spec.expected()))
            }
        }
        TypeSpec::ArrayOf(definition) => {
            let Value::Array(items) = value else {
                return Err(mismatch(path, spec.expected()));
            };
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{index}]");
                let Value::Object(map) = item else {
                    return Err(mismatch(&item_path, "record"));
                };
                let record = validate_record(map, definition, &item_path, Mode::Strict, dropped)?;
                out.push(record.into_value());
            }
            Ok(Value::Array(out))
        }
        TypeSpec::Nested(definition) => {
            let Value::Object(map) = value else {
                return Err(mismatch(path, spec.expected()));
            };
            Ok(validate_record(map, definition, path, mode, dropped)?.into_value())
        }
    }
}

/// Builds a type mismatch error.
fn mismatch(path: &str, expected: &'static str) -> SchemaError {
    SchemaError::TypeMismatch {
        field: path.to_string(),
        expected,
    }
}

/// Joins a parent path and a field name.
fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() { name.to_string() } else { format!("{parent}.{name}") }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
