// crates/quick-surveys-core/tests/projection_flow.rs
// ============================================================================
// Module: Projection and Question Flow Tests
// Description: Tests for client projections, message keys, and question flow.
// ============================================================================
//! ## Overview
//! Validates the JSON projection sent to clients, message key enumeration,
//! conditional question visibility, and answer display order.

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

use std::collections::BTreeMap;

use quick_surveys_core::AnswerSheet;
use quick_surveys_core::InternalSurvey;
use quick_surveys_core::MessageResolver;
use quick_surveys_core::QuestionFlow;
use quick_surveys_core::Survey;
use quick_surveys_core::SurveyFactory;
use quick_surveys_core::runtime::display_answers;
use quick_surveys_core::runtime::resolve_link;
use quick_surveys_core::runtime::with_instance_token;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Parses a single spec that must be valid.
fn parse_one(spec: Value) -> Survey {
    let load = SurveyFactory::default().parse_report(&json!([spec])).unwrap();
    assert!(load.rejections.is_empty(), "{:?}", load.rejections);
    load.surveys.into_iter().next().unwrap()
}

/// Returns a three-question internal survey with dependencies.
fn branching_survey() -> Survey {
    parse_one(json!({
        "name": "Reader feedback",
        "type": "internal",
        "enabled": true,
        "coverage": 0.5,
        "platforms": {"desktop": ["stable"], "mobile": ["stable"]},
        "privacyPolicy": "privacy",
        "confirmMsg": "thanks",
        "embedElementId": "feedback-anchor",
        "audience": {"anons": true},
        "questions": [
            {
                "name": "useful",
                "layout": "single-answer",
                "question": "useful-q",
                "description": "useful-desc",
                "answers": [{"label": "yes"}, {"label": "no", "freeformTextLabel": "why-not"}],
            },
            {
                "name": "why",
                "layout": "multiple-answer",
                "question": "why-q",
                "shuffleAnswersDisplay": false,
                "answers": [{"label": "slow"}, {"label": "wrong"}],
                "dependsOn": [{"question": "useful", "answerIsOneOf": ["no"]}],
            },
            {
                "name": "details",
                "layout": "single-answer",
                "question": "details-q",
                "answers": [{"label": "ok"}],
                "dependsOn": [{"question": "why"}],
            },
        ],
    }))
}

/// Returns the internal variant of a survey.
fn internal(survey: &Survey) -> &InternalSurvey {
    match survey {
        Survey::Internal(survey) => survey,
        Survey::External(_) => panic!("expected internal survey"),
    }
}

// ============================================================================
// SECTION: Projection
// ============================================================================

/// Tests the projection carries validated and derived fields.
#[test]
fn test_internal_projection() {
    let survey = branching_survey();
    let value = serde_json::to_value(survey.projection()).unwrap();
    assert_eq!(value["name"], json!("Reader feedback"));
    assert_eq!(value["type"], json!("internal"));
    assert_eq!(value["module"], json!("ext.quicksurveys.survey.Reader.feedback"));
    assert_eq!(value["platforms"], json!({"desktop": ["stable"], "mobile": ["stable"]}));
    assert_eq!(value["audience"], json!({"anons": true}));
    assert_eq!(value["embedElementId"], json!("feedback-anchor"));
    assert_eq!(
        value["questions"][1]["dependsOn"],
        json!([{"question": "useful", "answerIsOneOf": ["no"]}])
    );
    assert_eq!(value["questions"][0]["shuffleAnswersDisplay"], json!(true));
    assert!(value.get("isInsecure").is_none());
    assert!(value.get("additionalInfo").is_none());
}

/// Tests external projections include the insecure flag.
#[test]
fn test_external_projection() {
    let survey = parse_one(json!({
        "name": "Outside",
        "type": "external",
        "enabled": true,
        "coverage": 0.1,
        "platforms": {"desktop": ["stable"]},
        "privacyPolicy": "privacy",
        "questions": [{"name": "ext", "question": "ext-q", "link": "ext-link", "yesMsg": "go"}],
    }));
    let value = serde_json::to_value(survey.projection()).unwrap();
    assert_eq!(value["type"], json!("external"));
    assert_eq!(value["isInsecure"], json!(false));
    assert_eq!(
        value["questions"],
        json!([{"name": "ext", "question": "ext-q", "link": "ext-link", "yesMsg": "go"}])
    );
    assert_eq!(survey.messages(), vec!["privacy", "ext-q", "ext-link", "go"]);
}

/// Tests message keys are enumerated in display order.
#[test]
fn test_internal_messages() {
    let survey = branching_survey();
    assert_eq!(
        survey.messages(),
        vec![
            "privacy",
            "thanks",
            "useful-q",
            "useful-desc",
            "yes",
            "no",
            "why-not",
            "why-q",
            "slow",
            "wrong",
            "details-q",
            "ok",
        ]
    );
}

/// Tests instance tokens are appended to resolved external links.
#[test]
fn test_instance_link() {
    let mut messages = BTreeMap::new();
    messages.insert("ext-link".to_string(), "https://example.org/form".to_string());
    let resolver: &dyn MessageResolver = &messages;
    let url = resolve_link("ext-link", Some(resolver)).unwrap();
    let link = with_instance_token(&url, "session", "abc");
    assert_eq!(link.as_str(), "https://example.org/form?session=abc");
}

// ============================================================================
// SECTION: Question Flow
// ============================================================================

/// Tests dependent questions appear only after matching answers.
#[test]
fn test_question_visibility() {
    let survey = branching_survey();
    let flow = QuestionFlow::new(internal(&survey));
    let mut sheet = AnswerSheet::new();
    assert_eq!(flow.visibility(&sheet), vec![true, false, false]);
    assert_eq!(flow.next_visible(Some(0), &sheet), None);

    sheet.answer("useful", ["yes"]);
    assert!(!flow.is_visible(1, &sheet));

    sheet.answer("useful", ["no"]);
    assert_eq!(flow.next_visible(Some(0), &sheet), Some(1));
    assert!(!flow.is_visible(2, &sheet));

    sheet.answer("why", ["slow", "wrong"]);
    let names: Vec<&str> =
        flow.visible_questions(&sheet).iter().map(|question| question.name.as_str()).collect();
    assert_eq!(names, vec!["useful", "why", "details"]);

    sheet.answer("useful", ["yes"]);
    assert_eq!(flow.visibility(&sheet), vec![true, false, false]);
    assert_eq!(flow.next_visible(None, &sheet), Some(0));
}

/// Tests answer shuffling keeps free-text answers last.
#[test]
fn test_display_answers() {
    let survey = branching_survey();
    let questions = &internal(&survey).questions;
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0 .. 10 {
        let shown = display_answers(&questions[0], &mut rng);
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[1].label, "no");
    }
    let fixed: Vec<&str> =
        display_answers(&questions[1], &mut rng).iter().map(|answer| answer.label.as_str()).collect();
    assert_eq!(fixed, vec!["slow", "wrong"]);
}
