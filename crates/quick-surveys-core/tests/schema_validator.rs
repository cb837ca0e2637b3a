// crates/quick-surveys-core/tests/schema_validator.rs
// ============================================================================
// Module: Schema Validator Tests
// Description: Tests for recursive type checking and pruning.
// ============================================================================
//! ## Overview
//! Validates strict and lenient schema validation over nested records.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use proptest::prelude::*;
use quick_surveys_core::SchemaError;
use quick_surveys_core::TypeDefinition;
use quick_surveys_core::TypeSpec;
use quick_surveys_core::validate;
use quick_surveys_core::validate_lenient;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a definition with primitive, list, and nested fields.
fn person_definition() -> TypeDefinition {
    let pet = TypeDefinition::new().field("kind", TypeSpec::STRING).field("age", TypeSpec::INTEGER);
    let address = TypeDefinition::new().field("city", TypeSpec::STRING).field("zip", TypeSpec::STRING);
    TypeDefinition::new()
        .field("name", TypeSpec::STRING)
        .field("age", TypeSpec::INTEGER)
        .field("score", TypeSpec::NUMBER)
        .field("active", TypeSpec::BOOLEAN)
        .field("tags", TypeSpec::ARRAY)
        .field("pets", TypeSpec::ArrayOf(pet))
        .field("address", TypeSpec::Nested(address))
}

/// Unwraps a JSON object literal.
fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// ============================================================================
// SECTION: Strict Validation
// ============================================================================

/// Tests valid input is copied and unknown keys are dropped.
#[test]
fn test_validate_prunes_unknown_keys() {
    let data = object(json!({
        "name": "Ada",
        "age": 36,
        "extra": "dropped",
        "pets": [{"kind": "cat", "age": 3, "color": "black"}],
        "address": {"city": "London", "planet": "Earth"},
    }));
    let record = validate(&data, &person_definition()).unwrap();
    assert_eq!(
        record.into_value(),
        json!({
            "name": "Ada",
            "age": 36,
            "pets": [{"kind": "cat", "age": 3}],
            "address": {"city": "London"},
        })
    );
}

/// Tests null and absent fields are omitted rather than defaulted.
#[test]
fn test_validate_omits_null_fields() {
    let data = object(json!({"name": null, "age": 4}));
    let record = validate(&data, &person_definition()).unwrap();
    assert!(!record.contains_key("name"));
    assert!(!record.contains_key("score"));
    assert_eq!(record.len(), 1);
}

/// Tests a primitive mismatch names the field and the expected type.
#[test]
fn test_validate_reports_primitive_mismatch() {
    let data = object(json!({"name": "Ada", "age": "thirty"}));
    let err = validate(&data, &person_definition()).unwrap_err();
    assert_eq!(
        err,
        SchemaError::TypeMismatch {
            field: "age".to_string(),
            expected: "integer",
        }
    );
}

/// Tests a bad list element aborts validation with its path.
#[test]
fn test_validate_list_element_failure_aborts() {
    let data = object(json!({"pets": [{"kind": "cat"}, {"kind": 7}]}));
    let err = validate(&data, &person_definition()).unwrap_err();
    assert_eq!(err.field(), "pets[1].kind");
}

/// Tests non-record list elements and non-list values are rejected.
#[test]
fn test_validate_list_shape_mismatches() {
    let err = validate(&object(json!({"pets": ["cat"]})), &person_definition()).unwrap_err();
    assert_eq!(err.field(), "pets[0]");
    let err = validate(&object(json!({"pets": {"kind": "cat"}})), &person_definition()).unwrap_err();
    assert_eq!(err.field(), "pets");
}

/// Tests a nested record mismatch reports the nested path.
#[test]
fn test_validate_nested_mismatch_path() {
    let data = object(json!({"address": {"city": 12}}));
    let err = validate(&data, &person_definition()).unwrap_err();
    assert_eq!(err.to_string(), "field address.city must be of type string");
}

// ============================================================================
// SECTION: Lenient Validation
// ============================================================================

/// Tests lenient validation drops only the offending fields.
#[test]
fn test_validate_lenient_drops_bad_fields() {
    let data = object(json!({
        "name": "Ada",
        "age": 3.5,
        "pets": [{"kind": "cat"}, {"kind": false}],
        "address": {"city": "London", "zip": 1},
    }));
    let (record, dropped) = validate_lenient(&data, &person_definition());
    assert_eq!(record.into_value(), json!({"name": "Ada", "address": {"city": "London"}}));
    let fields: Vec<&str> = dropped.iter().map(SchemaError::field).collect();
    assert_eq!(fields, vec!["age", "pets[1].kind", "address.zip"]);
}

// ============================================================================
// SECTION: Properties
// ============================================================================

/// Generates loosely typed JSON values.
fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        (-1000.0_f64 .. 1000.0).prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0 .. 4).prop_map(Value::Array),
            prop::collection::btree_map(
                prop_oneof![Just("kind".to_string()), Just("age".to_string()), "[a-z]{1,4}"],
                inner,
                0 .. 4,
            )
            .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Generates records using a mix of declared and undeclared keys.
fn arb_record() -> impl Strategy<Value = Map<String, Value>> {
    let key = prop_oneof![
        Just("name".to_string()),
        Just("age".to_string()),
        Just("score".to_string()),
        Just("active".to_string()),
        Just("tags".to_string()),
        Just("pets".to_string()),
        Just("address".to_string()),
        "[a-z]{1,8}",
    ];
    prop::collection::btree_map(key, arb_value(), 0 .. 8)
        .prop_map(|map| map.into_iter().collect())
}

proptest! {
    /// Tests validating a validated record yields the same record.
    #[test]
    fn test_validate_is_idempotent(data in arb_record()) {
        let definition = person_definition();
        if let Ok(first) = validate(&data, &definition) {
            let second = validate(first.as_map(), &definition).unwrap();
            prop_assert_eq!(second, first);
        }
        let (lenient, _) = validate_lenient(&data, &definition);
        let (again, dropped) = validate_lenient(lenient.as_map(), &definition);
        prop_assert!(dropped.is_empty());
        prop_assert_eq!(again, lenient);
    }

    /// Tests undeclared keys never survive validation.
    #[test]
    fn test_unknown_keys_are_dropped(data in arb_record()) {
        let definition = person_definition();
        let (record, _) = validate_lenient(&data, &definition);
        for key in record.as_map().keys() {
            prop_assert!(definition.get(key).is_some());
        }
        if let Ok(strict) = validate(&data, &definition) {
            for key in strict.as_map().keys() {
                prop_assert!(definition.get(key).is_some());
            }
        }
    }
}
