// crates/quick-surveys-config/src/config.rs
// ============================================================================
// Module: Quick Surveys Configuration
// Description: Configuration loading and validation for the survey engine.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: quick-surveys-core, serde, serde_json, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML or JSON file with strict size and path
//! limits. The survey list stays an untyped value so that a malformed batch
//! still reaches the factory and is rejected there with a logged reason.
//! Everything else (engine switches, message catalog) is typed and validated
//! here before any survey is built.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use quick_surveys_core::FactoryOptions;
use quick_surveys_core::SurveyAuditSink;
use quick_surveys_core::SurveyFactory;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "quick-surveys.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "QUICK_SURVEYS_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of survey entries in one configuration.
pub(crate) const MAX_SURVEY_ENTRIES: usize = 256;
/// Maximum number of message catalog entries.
pub(crate) const MAX_MESSAGES: usize = 4096;
/// Maximum length of a message key.
pub(crate) const MAX_MESSAGE_KEY_LENGTH: usize = 255;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Quick Surveys engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QuickSurveysConfig {
    /// Engine policy switches.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Raw survey specifications, validated by the core factory.
    #[serde(default = "default_surveys")]
    pub surveys: Value,
    /// Message catalog used to resolve external survey links.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
    /// Path the configuration was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl QuickSurveysConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = match ConfigFormat::from_path(&resolved) {
            ConfigFormat::Json => Self::from_json_str(content)?,
            ConfigFormat::Toml => Self::from_toml_str(content)?,
        };
        config.source_path = Some(resolved);
        Ok(config)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if let Some(count) = self.survey_count()
            && count > MAX_SURVEY_ENTRIES
        {
            return Err(ConfigError::Invalid(format!(
                "surveys exceeds {MAX_SURVEY_ENTRIES} entries"
            )));
        }
        if self.messages.len() > MAX_MESSAGES {
            return Err(ConfigError::Invalid(format!("messages exceeds {MAX_MESSAGES} entries")));
        }
        for key in self.messages.keys() {
            if key.trim().is_empty() {
                return Err(ConfigError::Invalid("message keys must be non-empty".to_string()));
            }
            if key.len() > MAX_MESSAGE_KEY_LENGTH {
                return Err(ConfigError::Invalid(format!("message key {key} too long")));
            }
        }
        Ok(())
    }

    /// Returns the number of survey entries when the list is well formed.
    #[must_use]
    pub fn survey_count(&self) -> Option<usize> {
        self.surveys.as_array().map(Vec::len)
    }

    /// Projects engine settings into core factory options.
    #[must_use]
    pub const fn factory_options(&self) -> FactoryOptions {
        FactoryOptions {
            require_https: self.engine.require_https,
        }
    }

    /// Builds a survey factory wired to this configuration's messages.
    #[must_use]
    pub fn survey_factory(&self, audit: Arc<dyn SurveyAuditSink>) -> SurveyFactory {
        SurveyFactory::new(self.factory_options())
            .with_resolver(self.messages.clone())
            .with_audit_sink(audit)
    }
}

/// Engine policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Reject external surveys whose links are not https.
    #[serde(default = "default_require_https")]
    pub require_https: bool,
    /// Optional JSON-lines audit log path.
    #[serde(default)]
    pub audit_log: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            require_https: default_require_https(),
            audit_log: None,
        }
    }
}

impl EngineConfig {
    /// Validates engine settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.audit_log {
            validate_path_string("engine.audit_log", path)?;
        }
        Ok(())
    }

    /// Returns the audit log path, if configured.
    #[must_use]
    pub fn audit_log_path(&self) -> Option<&Path> {
        self.audit_log.as_deref().map(|path| Path::new(path.trim()))
    }
}

/// On-disk configuration formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    /// TOML document.
    Toml,
    /// JSON document.
    Json,
}

impl ConfigFormat {
    /// Picks the format from the file extension; anything but `.json` is TOML.
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML or JSON parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default survey list.
const fn default_surveys() -> Value {
    Value::Array(Vec::new())
}

/// Default https requirement.
const fn default_require_https() -> bool {
    true
}

// ============================================================================
// SECTION: Tests
// ============================================================================
