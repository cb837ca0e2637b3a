// crates/quick-surveys-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: End-to-end tests running the quick-surveys binary.
// Purpose: Ensure each command reads config and prints stable output.
// Dependencies: quick-surveys-cli binary
// ============================================================================
//! ## Overview
//! Runs the built binary against temporary configuration and viewer files
//! and checks exit codes, stdout, and audit output.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Two valid surveys, one of them embedded.
const VALID_CONFIG: &str = r#"
[messages]
"outside-link" = "https://example.org/form"

[[surveys]]
name = "Reader feedback"
type = "internal"
enabled = true
coverage = 1
embedElementId = "feedback-anchor"
privacyPolicy = "privacy"
question = "feedback-q"
answers = ["yes", "no"]

[surveys.platforms]
desktop = ["stable"]

[[surveys]]
name = "Outside"
type = "external"
enabled = true
coverage = 1
privacyPolicy = "privacy"
question = "outside-q"
link = "outside-link"
instanceTokenParameterName = "sid"

[surveys.platforms]
desktop = ["stable"]

[[surveys]]
name = "Disabled"
type = "internal"
enabled = false
"#;

/// One valid survey and one external survey missing its privacy policy.
const REJECTING_CONFIG: &str = r#"
[[surveys]]
name = "Good"
type = "internal"
enabled = true
coverage = 0.5
question = "q"
answers = ["a"]

[surveys.platforms]
mobile = ["stable", "beta"]

[[surveys]]
name = "Outside"
type = "external"
enabled = true
coverage = 1
question = "outside-q"
link = "https://example.org/form"

[surveys.platforms]
desktop = ["stable"]
"#;

/// Returns the binary under test.
fn quick_surveys_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_quick-surveys"))
}

/// Writes a file into `dir` and returns its path.
fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Runs the binary with a clean language and config environment.
fn run(args: &[&str]) -> Output {
    Command::new(quick_surveys_bin())
        .args(args)
        .env_remove("QUICK_SURVEYS_LANG")
        .env_remove("QUICK_SURVEYS_CONFIG")
        .output()
        .unwrap()
}

/// Runs a command that takes `--config`.
fn run_with_config(args: &[&str], config: &Path) -> Output {
    let mut all: Vec<&str> = args.to_vec();
    let config = config.to_str().unwrap();
    all.extend(["--config", config]);
    run(&all)
}

/// Returns stdout as text.
fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

/// Returns stderr as text.
fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Tests a valid config reports its counts and succeeds.
#[test]
fn config_validate_accepts_valid_config() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "quick-surveys.toml", VALID_CONFIG);
    let output = run_with_config(&["config", "validate"], &config);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Surveys accepted: 2, rejected: 0"));
    assert!(text.contains("Config valid."));
}

/// Tests rejected surveys fail validation and are logged.
#[test]
fn config_validate_reports_rejections() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "quick-surveys.toml", REJECTING_CONFIG);
    let output = run_with_config(&["config", "validate"], &config);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("Surveys accepted: 1, rejected: 1"));
    let errors = stderr(&output);
    assert!(errors.contains("doesn't have a privacy policy"));
    assert!(errors.contains("survey_rejected"));
}

/// Tests rejections go to the configured audit log.
#[test]
fn config_validate_writes_audit_log() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("audit.jsonl");
    let body = format!(
        "[engine]\naudit_log = {}\n{REJECTING_CONFIG}",
        Value::String(log.to_string_lossy().into_owned())
    );
    let config = write_file(&dir, "quick-surveys.toml", &body);
    let output = run_with_config(&["config", "validate"], &config);
    assert!(!output.status.success());
    let events: Vec<Value> = fs::read_to_string(&log)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"], json!("survey_rejected"));
    assert_eq!(events[0]["survey"], json!("Outside"));
    assert_eq!(events[1]["event"], json!("survey_config_loaded"));
}

/// Tests a survey value that is not a list fails the command.
#[test]
fn config_validate_rejects_non_list() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "quick-surveys.json", r#"{"surveys": {"name": "S"}}"#);
    let output = run_with_config(&["config", "validate"], &config);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Survey list rejected"));
}

/// Tests a missing config file fails with a load error.
#[test]
fn config_validate_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let output = run_with_config(&["config", "validate"], &dir.path().join("absent.toml"));
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to load config"));
}

// ============================================================================
// SECTION: Surveys Commands
// ============================================================================

/// Tests list prints one line per enabled survey.
#[test]
fn surveys_list_prints_enabled_surveys() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "quick-surveys.toml", VALID_CONFIG);
    let output = run_with_config(&["surveys", "list"], &config);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "Reader feedback (internal, coverage 1)\nOutside (external, coverage 1)\n"
    );
}

/// Tests export prints the client projections.
#[test]
fn surveys_export_prints_projections() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "quick-surveys.toml", VALID_CONFIG);
    let output = run_with_config(&["surveys", "export"], &config);
    assert!(output.status.success());
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let surveys = value.as_array().unwrap();
    assert_eq!(surveys.len(), 2);
    assert_eq!(surveys[0]["module"], json!("ext.quicksurveys.survey.Reader.feedback"));
    assert_eq!(surveys[1]["isInsecure"], json!(false));
}

/// Tests messages prints sorted, unique keys.
#[test]
fn surveys_messages_are_sorted_and_unique() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "quick-surveys.toml", VALID_CONFIG);
    let output = run_with_config(&["surveys", "messages"], &config);
    assert!(output.status.success());
    let keys: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(keys, vec!["feedback-q", "no", "outside-link", "outside-q", "privacy", "yes"]);
}

// ============================================================================
// SECTION: Select Command
// ============================================================================

/// Tests an embedded survey is selected and tokens are reported.
#[test]
fn select_prefers_embedded_surveys() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "quick-surveys.toml", VALID_CONFIG);
    let viewer = write_file(
        &dir,
        "viewer.json",
        r#"{"viewer": {"embedAnchors": ["feedback-anchor"]}, "tokens": {}}"#,
    );
    let output = run_with_config(
        &["select", "--viewer", viewer.to_str().unwrap(), "--seed", "4"],
        &config,
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["mode"], json!("embedded"));
    assert_eq!(value["selected"], json!([{"name": "Reader feedback", "type": "internal"}]));
    let tokens = value["tokens"].as_object().unwrap();
    assert!(tokens.contains_key("ext-quicksurvey-Reader-feedback"));
    assert!(tokens.contains_key("ext-quicksurvey-Outside"));
}

/// Tests dismissed surveys stay hidden and external links carry the session.
#[test]
fn select_skips_dismissed_and_links_external() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "quick-surveys.toml", VALID_CONFIG);
    let viewer = write_file(
        &dir,
        "viewer.json",
        r#"{
            "viewer": {"embedAnchors": ["feedback-anchor"], "sessionToken": "s1"},
            "tokens": {"ext-quicksurvey-Reader-feedback": "~"}
        }"#,
    );
    let output = run_with_config(
        &["select", "--viewer", viewer.to_str().unwrap(), "--seed", "4"],
        &config,
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["mode"], json!("floating"));
    assert_eq!(
        value["selected"],
        json!([{"name": "Outside", "type": "external", "link": "https://example.org/form?sid=s1"}])
    );
    assert_eq!(value["outcomes"][0]["outcome"], json!("dismissed"));
    assert_eq!(value["tokens"]["ext-quicksurvey-Reader-feedback"], json!("~"));
}

/// Tests a forced survey bypasses targeting.
#[test]
fn select_honors_forced_survey() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "quick-surveys.toml", VALID_CONFIG);
    let viewer = write_file(&dir, "viewer.json", r#"{"viewer": {"platformMode": "beta"}}"#);
    let output = run_with_config(
        &["select", "--viewer", viewer.to_str().unwrap(), "--force", "external-survey-Outside"],
        &config,
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["mode"], json!("forced"));
    assert_eq!(value["selected"][0]["name"], json!("Outside"));
    assert_eq!(value["outcomes"], json!([]));
}

/// Tests an invalid viewer file is reported.
#[test]
fn select_rejects_invalid_viewer() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "quick-surveys.toml", VALID_CONFIG);
    let viewer = write_file(&dir, "viewer.json", "not json");
    let output = run_with_config(&["select", "--viewer", viewer.to_str().unwrap()], &config);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid viewer file"));
}

// ============================================================================
// SECTION: Localization
// ============================================================================

/// Tests Catalan output carries the disclaimer and localized text.
#[test]
fn catalan_output_is_localized() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "quick-surveys.toml", VALID_CONFIG);
    let output = run_with_config(&["--lang", "ca", "config", "validate"], &config);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Configuració vàlida."));
    assert!(stderr(&output).contains("traduïda automàticament"));
}

/// Tests an unsupported language environment value fails.
#[test]
fn invalid_lang_env_fails() {
    let output = Command::new(quick_surveys_bin())
        .args(["--version"])
        .env("QUICK_SURVEYS_LANG", "xx")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("QUICK_SURVEYS_LANG"));
}

/// Tests the version flag.
#[test]
fn version_flag_prints_version() {
    let output = run(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("quick-surveys "));
}
