//! Error types for trajectory segmentation.
//!
//! Every [`Error`] carries a numeric code that scripts can match on, a
//! coarse [`ErrorCategory`], and a one-line fix for the person at the
//! terminal.
//!
//! Malformed input *records* are never errors: readers report them as skip
//! reasons in a diagnostic summary. The variants here cover conditions that
//! stop a stage, such as invalid configuration, unreadable files or an input
//! set that contains nothing to process.
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Nothing To Process
//!   Reason: nothing to process: no trips available for transform
//!   Fix: Check that the input file has a header line followed by ...
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Result type alias for trajectory segmentation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline area an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors.
    Config,
    /// Input trajectories or model tables.
    Input,
    /// Transition model arithmetic.
    Model,
    /// Filesystem and JSON encoding.
    Io,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Config => "config",
            ErrorCategory::Input => "input",
            ErrorCategory::Model => "model",
            ErrorCategory::Io => "io",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for trajectory segmentation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("config: {0}")]
    Config(String),

    #[error("invalid configuration value for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("config schema version mismatch: expected {expected}, got {actual}")]
    ConfigVersion { expected: String, actual: String },

    #[error("input error: {0}")]
    Input(String),

    #[error("nothing to process: {stage}")]
    NothingToProcess { stage: String },

    #[error("non-finite value in model: {0}")]
    NumericalInstability(String),

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Convenience constructor for the empty-input condition.
    pub fn nothing_to_process(stage: impl Into<String>) -> Self {
        Error::NothingToProcess {
            stage: stage.into(),
        }
    }

    /// Stable numeric code. The tens digit follows the category: config 1x,
    /// input 2x, model 3x, i/o 6x.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig { .. } => 11,
            Error::ConfigVersion { .. } => 12,
            Error::Input(_) => 20,
            Error::NothingToProcess { .. } => 21,
            Error::NumericalInstability(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidConfig { .. } | Error::ConfigVersion { .. } => {
                ErrorCategory::Config
            }

            Error::Input(_) | Error::NothingToProcess { .. } => ErrorCategory::Input,

            Error::NumericalInstability(_) => ErrorCategory::Model,

            Error::Json(_) | Error::Io(_) => ErrorCategory::Io,
        }
    }

    /// False for internal faults that a rerun with other inputs will not fix.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::NumericalInstability(_))
    }

    /// One-line fix shown under the error message.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) | Error::InvalidConfig { .. } => {
                "Run 'trajseg config validate <file>' and fix the reported field."
            }
            Error::ConfigVersion { .. } => {
                "Regenerate the file with 'trajseg config show' and re-apply local changes."
            }

            Error::Input(_) => "Check the input path and that the file is comma-delimited text.",
            Error::NothingToProcess { .. } => {
                "Check that the input file has a header line followed by at least one valid record."
            }

            Error::NumericalInstability(_) => {
                "Check the probability table for out-of-range weights, or rebuild it from trajectories."
            }

            Error::Io(_) => "Check disk space, permissions and that directories exist.",
            Error::Json(_) => "Invalid JSON in file. Check its syntax or restore it from backup.",
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Bad Configuration",
            Error::InvalidConfig { .. } => "Invalid Configuration",
            Error::ConfigVersion { .. } => "Configuration Version Mismatch",

            Error::Input(_) => "Input Error",
            Error::NothingToProcess { .. } => "Nothing To Process",

            Error::NumericalInstability(_) => "Non-Finite Model Value",

            Error::Io(_) => "File Access Failed",
            Error::Json(_) => "Bad JSON",
        }
    }
}

/// Error body written to stderr in `json` and `jsonl` output formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub recoverable: bool,
    /// Offending field or stage, when known.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let detail = match err {
            Error::InvalidConfig { field, .. } => Some(("field", field)),
            Error::NothingToProcess { stage } => Some(("stage", stage)),
            _ => None,
        };

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context: detail
                .map(|(k, v)| (k.to_string(), v.clone()))
                .into_iter()
                .collect(),
        }
    }
}

impl StructuredError {
    /// Compact JSON; falls back to a bare code object if encoding fails.
    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(_) => format!("{{\"code\":{},\"category\":\"{}\"}}", self.code, self.category),
        }
    }
}

/// Three-line stderr rendering: headline, reason, fix.
///
/// ```text
/// ✗ Nothing To Process
///   Reason: nothing to process: count
///   Fix: Check that the input file has ...
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    const RED: &str = "\x1b[31m";
    const CYAN: &str = "\x1b[36m";
    const RESET: &str = "\x1b[0m";
    let paint = |code: &'static str| if use_color { code } else { "" };

    let mut out = String::new();
    out.push_str(&format!("{}✗{} {}\n", paint(RED), paint(RESET), err.headline()));
    out.push_str(&format!("  Reason: {err}\n"));
    out.push_str(&format!(
        "  {}Fix:{} {}",
        paint(CYAN),
        paint(RESET),
        err.remediation()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::Config("bad".into()).code(), 10);
        assert_eq!(Error::nothing_to_process("transform").code(), 21);
        assert_eq!(Error::NumericalInstability("row 3".into()).code(), 30);
    }

    #[test]
    fn test_category_grouping() {
        assert_eq!(
            Error::nothing_to_process("count").category(),
            ErrorCategory::Input
        );
        assert_eq!(
            Error::NumericalInstability("row 3".into()).category(),
            ErrorCategory::Model
        );
        assert!(!Error::NumericalInstability("row 3".into()).is_recoverable());
        let io = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.category(), ErrorCategory::Io);
    }

    #[test]
    fn test_structured_error_context() {
        let err = Error::InvalidConfig {
            field: "quantization.accel_step".into(),
            message: "must be positive".into(),
        };
        let structured: StructuredError = (&err).into();
        assert_eq!(structured.code, 11);
        assert_eq!(
            structured.context.get("field"),
            Some(&"quantization.accel_step".to_string())
        );
        assert!(structured.to_json().contains("\"category\":\"config\""));
    }

    #[test]
    fn test_format_error_human_without_color() {
        let err = Error::nothing_to_process("segment");
        let text = format_error_human(&err, false);
        assert!(text.starts_with("✗ Nothing To Process"));
        assert!(text.contains("Reason: nothing to process: segment"));
        assert!(!text.contains("\x1b["));
    }
}
