//! The annotation payload schema.
//!
//! A `@test` marker carries a JSON object describing which channels of the
//! following command are graded and for how many points. The schema is
//! closed: any key outside the set below is a validation error, which keeps
//! typos like `"stdotu"` from silently producing an ungraded test.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Seconds a command may run before it is killed, absent an explicit
/// `timeout` in the annotation.
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;

/// Gradescope visibility levels for a graded check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Hidden,
    AfterDueDate,
    AfterPublished,
    Visible,
}

/// A validated test annotation payload.
///
/// All fields are optional; a channel is graded only when its score field is
/// present. `filename` declares a named output file to collect and diff,
/// scored out of `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestSpec {
    /// Max score for the stdout diff.
    pub stdout: Option<f64>,
    /// Max score for the stderr diff.
    pub stderr: Option<f64>,
    /// Max score for the return-code comparison.
    #[serde(rename = "return")]
    pub return_code: Option<f64>,
    /// Text fed to the command's standard input.
    pub stdin: Option<String>,
    /// Output file the command is expected to produce.
    pub filename: Option<String>,
    /// Max score for the `filename` diff.
    pub points: Option<f64>,
    /// Display name for the check; channels are suffixed onto it.
    pub name: Option<String>,
    pub visibility: Option<Visibility>,
    /// Seconds before the command is killed.
    pub timeout: Option<f64>,
}

/// Why a `@test` payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// The payload was not valid JSON at all.
    Json(String),
    /// The payload parsed as JSON but violates the annotation schema.
    Schema(String),
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::Json(msg) => write!(f, "{}", msg),
            SpecError::Schema(msg) => write!(f, "{}", msg),
        }
    }
}

impl TestSpec {
    /// Validates a parsed JSON value against the annotation schema.
    pub fn from_value(value: Value) -> Result<TestSpec, SpecError> {
        let spec: TestSpec =
            serde_json::from_value(value).map_err(|e| SpecError::Schema(e.to_string()))?;
        if spec.filename.is_some() && spec.points.is_none() {
            return Err(SpecError::Schema(
                "\"filename\" requires \"points\" to score the file diff".to_string(),
            ));
        }
        if let Some(timeout) = spec.timeout {
            if !timeout.is_finite() || timeout <= 0.0 || timeout > 86400.0 {
                return Err(SpecError::Schema(
                    "\"timeout\" must be a positive number of seconds (at most 86400)"
                        .to_string(),
                ));
            }
        }
        Ok(spec)
    }

    /// Parses and validates the raw text captured after the `@test` token.
    pub fn parse_payload(raw: &str) -> Result<TestSpec, SpecError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| SpecError::Json(e.to_string()))?;
        TestSpec::from_value(value)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// True if any channel of this annotation is graded.
    pub fn grades_anything(&self) -> bool {
        self.stdout.is_some()
            || self.stderr.is_some()
            || self.return_code.is_some()
            || self.filename.is_some()
    }
}
