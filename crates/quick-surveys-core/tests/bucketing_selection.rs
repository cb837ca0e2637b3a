// crates/quick-surveys-core/tests/bucketing_selection.rs
// ============================================================================
// Module: Bucketing and Selection Tests
// Description: Tests for coverage buckets, platform matching, and selection.
// ============================================================================
//! ## Overview
//! Validates bucket determinism, token persistence, dismissal, forced
//! overrides, and the embedded/floating selection rules.

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
use quick_surveys_core::Bucket;
use quick_surveys_core::CandidateOutcome;
use quick_surveys_core::DISMISSED_TOKEN;
use quick_surveys_core::InMemoryTokenStore;
use quick_surveys_core::Survey;
use quick_surveys_core::SurveyFactory;
use quick_surveys_core::SurveyName;
use quick_surveys_core::SurveySelection;
use quick_surveys_core::SurveyTokenStore;
use quick_surveys_core::ViewerContext;
use quick_surveys_core::runtime::AudienceFilter;
use quick_surveys_core::runtime::bucket_for;
use quick_surveys_core::runtime::dismiss_survey;
use quick_surveys_core::runtime::get_bucket_for_survey;
use quick_surveys_core::runtime::select_surveys;
use quick_surveys_core::runtime::select_with_report;
use quick_surveys_core::runtime::survey_matches_platform;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds an enabled internal spec.
fn spec(name: &str, coverage: f64, platforms: Value) -> Value {
    json!({
        "name": name,
        "type": "internal",
        "enabled": true,
        "coverage": coverage,
        "platforms": platforms,
        "question": "q",
        "answers": ["a", "b"],
    })
}

/// Parses specs, asserting none were rejected.
fn parse(specs: Vec<Value>) -> Vec<Survey> {
    let load = SurveyFactory::default().parse_report(&Value::Array(specs)).unwrap();
    assert!(load.rejections.is_empty(), "{:?}", load.rejections);
    load.surveys
}

/// Builds a single always-shown desktop survey.
fn desktop_survey(name: &str) -> Survey {
    parse(vec![spec(name, 1.0, json!({"desktop": ["stable"]}))]).remove(0)
}

/// Returns a deterministic random source.
fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

// ============================================================================
// SECTION: Buckets
// ============================================================================

proptest! {
    /// Tests the same name and token always land in the same bucket.
    #[test]
    fn test_bucket_is_deterministic(name in "[a-z ]{1,12}", token in "[0-9a-f]{20}", coverage in 0.0_f64 .. 1.0) {
        let name = SurveyName::new(name);
        prop_assert_eq!(bucket_for(&name, &token, coverage), bucket_for(&name, &token, coverage));
    }

    /// Tests coverage of zero and one are absolute.
    #[test]
    fn test_coverage_extremes(token in "[0-9a-f]{20}") {
        let name = SurveyName::new("S");
        prop_assert_eq!(bucket_for(&name, &token, 0.0), Bucket::Control);
        prop_assert_eq!(bucket_for(&name, &token, 1.0), Bucket::A);
        prop_assert_eq!(bucket_for(&name, &token, -3.0), Bucket::Control);
        prop_assert_eq!(bucket_for(&name, &token, 7.5), Bucket::A);
    }
}

/// Tests a stored token is reused and a missing token is generated once.
#[test]
fn test_bucket_token_is_persisted() {
    let survey = desktop_survey("Token survey");
    let store = InMemoryTokenStore::new();
    let mut rng = rng();
    let first = get_bucket_for_survey(&survey, &store, &mut rng);
    let token = store.get("ext-quicksurvey-Token-survey").unwrap();
    assert_eq!(token.len(), 20);
    assert!(token.chars().all(|ch| ch.is_ascii_hexdigit()));
    let second = get_bucket_for_survey(&survey, &store, &mut StdRng::seed_from_u64(99));
    assert_eq!(first, second);
    assert_eq!(store.get("ext-quicksurvey-Token-survey"), Some(token));
}

/// Tests an empty stored token is replaced with a generated one.
#[test]
fn test_empty_token_is_regenerated() {
    let survey = desktop_survey("Empty token");
    let store = InMemoryTokenStore::new();
    store.set("ext-quicksurvey-Empty-token", "");
    let bucket = get_bucket_for_survey(&survey, &store, &mut rng());
    let token = store.get("ext-quicksurvey-Empty-token").unwrap();
    assert_eq!(token.len(), 20);
    assert_eq!(bucket, bucket_for(survey.name(), &token, survey.coverage()));
}

/// Tests zero coverage always yields the control bucket.
#[test]
fn test_zero_coverage_is_always_control() {
    let survey = parse(vec![spec("S", 0.0, json!({"desktop": ["stable"]}))]).remove(0);
    let mut rng = rng();
    for _ in 0 .. 50 {
        let store = InMemoryTokenStore::new();
        assert_eq!(get_bucket_for_survey(&survey, &store, &mut rng), Bucket::Control);
    }
}

/// Tests coverage roughly matches the share of A buckets.
#[test]
fn test_coverage_fraction_is_respected() {
    let name = SurveyName::new("Share");
    let shown = (0 .. 2000)
        .filter(|index| bucket_for(&name, &format!("token-{index}"), 0.3) == Bucket::A)
        .count();
    assert!((450 .. 750).contains(&shown), "shown {shown}");
}

// ============================================================================
// SECTION: Platforms
// ============================================================================

/// Tests platform and mode matching.
#[test]
fn test_platform_matching() {
    let mobile_beta = parse(vec![spec("M", 1.0, json!({"mobile": ["beta"]}))]).remove(0);
    assert!(survey_matches_platform(&mobile_beta, Some("beta")));
    assert!(!survey_matches_platform(&mobile_beta, None));
    assert!(!survey_matches_platform(&mobile_beta, Some("stable")));

    let desktop = desktop_survey("D");
    assert!(survey_matches_platform(&desktop, None));
    assert!(survey_matches_platform(&desktop, Some("")));
    assert!(!survey_matches_platform(&desktop, Some("stable")));
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Tests forced overrides bypass targeting and strip legacy prefixes.
#[test]
fn test_forced_override() {
    let surveys = parse(vec![
        spec("Hidden", 0.0, json!({"mobile": ["beta"]})),
        spec("Other", 1.0, json!({"desktop": ["stable"]})),
    ]);
    let store = InMemoryTokenStore::new();
    let viewer = ViewerContext::default();
    let mut rng = rng();

    let forced = select_surveys(&surveys, &viewer, &store, Some("internal-survey-Hidden"), &mut rng);
    assert_eq!(forced, SurveySelection::Forced(&surveys[0]));
    let forced = select_surveys(&surveys, &viewer, &store, Some("Hidden"), &mut rng);
    assert_eq!(forced, SurveySelection::Forced(&surveys[0]));
    assert!(select_surveys(&surveys, &viewer, &store, Some("Missing"), &mut rng).is_empty());
    assert!(store.snapshot().is_empty());

    let random = select_surveys(&surveys, &viewer, &store, Some("true"), &mut rng);
    assert!(matches!(random, SurveySelection::Forced(_)));
    assert!(select_surveys(&[], &viewer, &store, Some("true"), &mut rng).is_empty());
}

/// Tests dismissed surveys are never candidates.
#[test]
fn test_dismissed_survey_is_skipped() {
    let surveys = vec![desktop_survey("Dismissed survey")];
    let store = InMemoryTokenStore::new();
    dismiss_survey(&surveys[0], &store);
    assert_eq!(store.get("ext-quicksurvey-Dismissed-survey").as_deref(), Some(DISMISSED_TOKEN));
    let report = select_with_report(&surveys, &ViewerContext::default(), &store, None, &mut rng());
    assert!(report.selection.is_empty());
    assert_eq!(report.outcomes[0].1, CandidateOutcome::Dismissed);
}

/// Tests every embedded candidate is selected, one per anchor.
#[test]
fn test_embedded_candidates_win() {
    let mut first = spec("First", 1.0, json!({"desktop": ["stable"]}));
    first["embedElementId"] = json!("anchor-a");
    let mut second = spec("Second", 1.0, json!({"desktop": ["stable"]}));
    second["embedElementId"] = json!("anchor-b");
    let mut same_anchor = spec("Same anchor", 1.0, json!({"desktop": ["stable"]}));
    same_anchor["embedElementId"] = json!("anchor-a");
    let mut missing_anchor = spec("Missing anchor", 1.0, json!({"desktop": ["stable"]}));
    missing_anchor["embedElementId"] = json!("anchor-z");
    let floating = spec("Floating", 1.0, json!({"desktop": ["stable"]}));
    let surveys = parse(vec![first, floating, second, same_anchor, missing_anchor]);
    let viewer = ViewerContext {
        embed_anchors: vec!["anchor-a".to_string(), "anchor-b".to_string()],
        ..ViewerContext::default()
    };
    let selection = select_surveys(&surveys, &viewer, &InMemoryTokenStore::new(), None, &mut rng());
    let names: Vec<&str> = selection.surveys().iter().map(|survey| survey.name().as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);
}

/// Tests one floating candidate is picked when nothing is embedded.
#[test]
fn test_single_floating_candidate() {
    let mut embedded = spec("Embedded", 1.0, json!({"desktop": ["stable"]}));
    embedded["embedElementId"] = json!("anchor-a");
    let surveys = parse(vec![
        embedded,
        spec("One", 1.0, json!({"desktop": ["stable"]})),
        spec("Two", 1.0, json!({"desktop": ["stable"]})),
        spec("Mobile", 1.0, json!({"mobile": ["stable"]})),
    ]);
    let store = InMemoryTokenStore::new();
    let report = select_with_report(&surveys, &ViewerContext::default(), &store, None, &mut rng());
    let SurveySelection::Floating(chosen) = report.selection else {
        panic!("expected a floating survey");
    };
    assert!(["One", "Two"].contains(&chosen.name().as_str()));
    assert_eq!(report.outcomes[3].1, CandidateOutcome::WrongPlatform);
    assert_eq!(store.snapshot().len(), 4);
}

/// Tests audience and bucket rejections are reported per survey.
#[test]
fn test_rejections_are_reported() {
    let mut targeted = spec("Targeted", 1.0, json!({"desktop": ["stable"]}));
    targeted["audience"] = json!({"anons": true});
    let surveys = parse(vec![targeted, spec("Never", 0.0, json!({"desktop": ["stable"]}))]);
    let report = select_with_report(
        &surveys,
        &ViewerContext::default(),
        &InMemoryTokenStore::new(),
        None,
        &mut rng(),
    );
    assert!(report.selection.is_empty());
    assert_eq!(report.outcomes[0].1, CandidateOutcome::OutOfAudience(AudienceFilter::Anons));
    assert_eq!(report.outcomes[1].1, CandidateOutcome::Control);
}
