//! Structured errors surfaced to the presentation layer
//!
//! Every fallible operation in coatingtk returns a `CoatingError`. Errors carry
//! a machine-readable code, a human-readable message and an optional
//! suggestion, and serialise cleanly for the server driver.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const MATERIAL_NOT_DEFINED: &str = "MATERIAL_NOT_DEFINED";
    pub const MATERIAL_ALREADY_DEFINED: &str = "MATERIAL_ALREADY_DEFINED";
    pub const DUPLICATE_PLUGIN_ID: &str = "DUPLICATE_PLUGIN_ID";
    pub const UNKNOWN_PLUGIN_ID: &str = "UNKNOWN_PLUGIN_ID";
    pub const DUPLICATE_KEY: &str = "DUPLICATE_KEY";
    pub const UNKNOWN_KEY: &str = "UNKNOWN_KEY";
    pub const INVALID_THICKNESS: &str = "INVALID_THICKNESS";
    pub const INVALID_RANGE: &str = "INVALID_RANGE";
    pub const INVALID_STEPS: &str = "INVALID_STEPS";
    pub const INVALID_VALUE: &str = "INVALID_VALUE";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const EMPTY_PLOT: &str = "EMPTY_PLOT";
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Operation continued with a degraded result
    Warning,
    /// Operation aborted, nothing was mutated
    Error,
    /// Programming error, only expected at startup
    Fatal,
}

/// Structured error for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoatingError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Severity level
    pub severity: Severity,
}

impl CoatingError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Check the error code
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    // ========== Common Error Constructors ==========

    pub fn material_not_defined(name: &str) -> Self {
        Self::new(codes::MATERIAL_NOT_DEFINED, format!("Material not defined: {}", name))
            .with_suggestion("Add the material to the library or enter a numeric refractive index")
    }

    pub fn missing_mechanical(name: &str) -> Self {
        Self::new(codes::MATERIAL_NOT_DEFINED,
            format!("Material '{}' has no mechanical properties", name))
            .with_suggestion("Define Young's modulus, Poisson ratio and loss angle for the material")
    }

    pub fn material_already_defined(name: &str) -> Self {
        Self::new(codes::MATERIAL_ALREADY_DEFINED, format!("Material already defined: {}", name))
            .with_suggestion("Unregister the existing material first or pick another name")
    }

    pub fn duplicate_plugin_id(id: &str) -> Self {
        Self::new(codes::DUPLICATE_PLUGIN_ID, format!("Plugin id registered twice: {}", id))
            .with_severity(Severity::Fatal)
    }

    pub fn unknown_plugin_id(id: &str) -> Self {
        Self::new(codes::UNKNOWN_PLUGIN_ID, format!("Unknown plugin: {}", id))
            .with_suggestion("Use plots/list to see the registered analyses")
            .with_severity(Severity::Fatal)
    }

    pub fn duplicate_key(key: &str) -> Self {
        Self::new(codes::DUPLICATE_KEY, format!("Config key claimed by two facets: {}", key))
            .with_severity(Severity::Fatal)
    }

    pub fn unknown_key(key: &str) -> Self {
        Self::new(codes::UNKNOWN_KEY, format!("Config key not available here: {}", key))
    }

    pub fn invalid_thickness(text: &str) -> Self {
        Self::new(codes::INVALID_THICKNESS, format!("Invalid thickness: \"{}\"", text))
            .with_suggestion("Enter a thickness in nm, L/N, /N or *X")
    }

    pub fn invalid_range(min: f64, max: f64) -> Self {
        Self::new(codes::INVALID_RANGE, format!("Invalid range [{}, {}]", min, max))
            .with_suggestion("Limits must satisfy 0 < min < max")
    }

    pub fn invalid_steps(steps: i64) -> Self {
        Self::new(codes::INVALID_STEPS, format!("Invalid number of steps: {}", steps))
            .with_suggestion("Use at least 2 steps")
    }

    pub fn invalid_value(key: &str, raw: &str, expected: &str) -> Self {
        Self::new(codes::INVALID_VALUE, format!("Invalid value for {}: \"{}\"", key, raw))
            .with_suggestion(format!("Expected {}", expected))
    }

    pub fn type_error(key: &str, expected: &str, got: &str) -> Self {
        Self::new(codes::TYPE_ERROR, format!("{}: expected {}, got {}", key, expected, got))
    }

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
    }

    pub fn empty_plot() -> Self {
        Self::new(codes::EMPTY_PLOT, "Plot is empty, so there's no data to be exported")
            .with_severity(Severity::Warning)
    }
}

impl std::fmt::Display for CoatingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for CoatingError {}

impl From<ConfigError> for CoatingError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Json(e) => Self::parse_error(e.to_string()),
            ConfigError::NotAnObject => {
                Self::parse_error("configuration root must be a JSON object")
            }
        }
    }
}
