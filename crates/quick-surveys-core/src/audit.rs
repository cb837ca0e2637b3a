// crates/quick-surveys-core/src/audit.rs
// ============================================================================
// Module: Quick Surveys Audit Logging
// Description: Structured audit events emitted while loading survey config.
// Purpose: Report dropped surveys without failing the batch.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Configuration problems never abort a load; they are reported here instead.
//! Events are plain serializable records and sinks decide where they go, so
//! hosts can route them into their own logging pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Event label for a dropped survey.
pub const EVENT_SURVEY_REJECTED: &str = "survey_rejected";
/// Event label for a rejected configuration batch.
pub const EVENT_CONFIG_REJECTED: &str = "survey_config_rejected";
/// Event label for a completed configuration load.
pub const EVENT_CONFIG_LOADED: &str = "survey_config_loaded";

/// Survey audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Survey name when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survey: Option<String>,
    /// Position of the spec in the configuration list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Stable error or outcome label.
    pub kind: &'static str,
    /// Human-readable description.
    pub message: String,
    /// Accepted survey count (load summaries only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<usize>,
    /// Rejected survey count (load summaries only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<usize>,
}

impl SurveyAuditEvent {
    /// Creates an event for a dropped survey spec.
    #[must_use]
    pub fn survey_rejected(
        index: usize,
        survey: Option<&str>,
        kind: &'static str,
        message: String,
    ) -> Self {
        Self {
            survey: survey.map(str::to_string),
            index: Some(index),
            ..Self::base(EVENT_SURVEY_REJECTED, kind, message)
        }
    }

    /// Creates an event for a configuration batch rejected as a whole.
    #[must_use]
    pub fn config_rejected(kind: &'static str, message: String) -> Self {
        Self::base(EVENT_CONFIG_REJECTED, kind, message)
    }

    /// Creates a load summary event.
    #[must_use]
    pub fn config_loaded(accepted: usize, rejected: usize) -> Self {
        Self {
            accepted: Some(accepted),
            rejected: Some(rejected),
            ..Self::base(
                EVENT_CONFIG_LOADED,
                "loaded",
                format!("loaded {accepted} surveys, rejected {rejected}"),
            )
        }
    }

    /// Builds an event with a consistent timestamp.
    fn base(event: &'static str, kind: &'static str, message: String) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            survey: None,
            index: None,
            kind,
            message,
            accepted: None,
            rejected: None,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for survey configuration events.
pub trait SurveyAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &SurveyAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrSurveyAuditSink;

impl SurveyAuditSink for StderrSurveyAuditSink {
    fn record(&self, event: &SurveyAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileSurveyAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileSurveyAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl SurveyAuditSink for FileSurveyAuditSink {
    fn record(&self, event: &SurveyAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopSurveyAuditSink;

impl SurveyAuditSink for NoopSurveyAuditSink {
    fn record(&self, _event: &SurveyAuditEvent) {}
}

/// Audit sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct MemorySurveyAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<SurveyAuditEvent>>,
}

impl MemorySurveyAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<SurveyAuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Returns the recorded events with the given label.
    #[must_use]
    pub fn events_named(&self, event: &str) -> Vec<SurveyAuditEvent> {
        self.events().into_iter().filter(|recorded| recorded.event == event).collect()
    }
}

impl SurveyAuditSink for MemorySurveyAuditSink {
    fn record(&self, event: &SurveyAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
