//! Exit codes for the trajseg CLI.
//!
//! Exit code ranges:
//! - 0-1: operational outcomes (parse the outcome from the code, not output)
//! - 10-19: user/environment errors (fix the arguments, config or input)
//! - 20-29: internal errors

use trajseg_common::{Error, ErrorCategory};

/// Exit codes for trajseg operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed.
    Clean = 0,

    /// No usable input records; nothing was produced.
    NothingToProcess = 1,

    /// Invalid arguments.
    ArgsError = 10,

    /// Configuration file missing, unparsable or invalid.
    ConfigError = 11,

    /// Input file missing or unreadable.
    InputError = 12,

    /// Internal error (bug - please report).
    InternalError = 20,

    /// I/O error while writing output.
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Codes 0-9 describe an outcome, not a failure.
    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Stable name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::NothingToProcess => "OK_NOTHING_TO_PROCESS",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        if matches!(err, Error::NothingToProcess { .. }) {
            return ExitCode::NothingToProcess;
        }
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Input => ExitCode::InputError,
            ErrorCategory::Model => ExitCode::InternalError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
