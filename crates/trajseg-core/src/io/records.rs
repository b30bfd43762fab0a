//! Record-level parsing with explicit skip reasons.
//!
//! A malformed line never aborts a read. It is recorded as a
//! [`SkipReason`] in [`ParseDiagnostics`] and the reader moves on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::state::StateKeyError;

/// Field delimiter of every table.
pub const DELIMITER: char = ',';

/// How many skipped records keep a sample for the summary.
pub const MAX_SAMPLES: usize = 5;

/// Why a record was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Blank line.
    Empty,
    /// Line is not valid UTF-8.
    Encoding,
    /// Fewer fields than the table needs.
    FieldCount,
    /// A numeric field did not parse.
    NotANumber,
    /// A numeric field parsed to NaN or infinity.
    NonFinite,
    /// A state key field did not parse.
    BadStateKey,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::Empty => "empty",
            SkipReason::Encoding => "encoding",
            SkipReason::FieldCount => "field_count",
            SkipReason::NotANumber => "not_a_number",
            SkipReason::NonFinite => "non_finite",
            SkipReason::BadStateKey => "bad_state_key",
        };
        f.write_str(s)
    }
}

impl From<&StateKeyError> for SkipReason {
    fn from(_: &StateKeyError) -> Self {
        SkipReason::BadStateKey
    }
}

/// A skipped record, kept as a sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// 1-indexed line number in the source file.
    pub line: usize,
    pub reason: SkipReason,
    pub detail: String,
}

/// Why a line could not become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    pub reason: SkipReason,
    pub detail: String,
}

impl RecordError {
    pub fn new(reason: SkipReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

impl From<StateKeyError> for RecordError {
    fn from(err: StateKeyError) -> Self {
        RecordError::new(SkipReason::from(&err), err.to_string())
    }
}

/// Outcome counts of one table read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    /// Table kind, e.g. `trajectories`.
    pub artifact: String,
    pub accepted: u64,
    pub skipped: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_reason: BTreeMap<SkipReason, u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<SkippedRecord>,
}

impl ParseDiagnostics {
    pub fn new(artifact: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            ..Self::default()
        }
    }

    pub fn accept(&mut self) {
        self.accepted += 1;
    }

    pub fn skip(&mut self, line: usize, error: RecordError) {
        self.skipped += 1;
        *self.by_reason.entry(error.reason).or_insert(0) += 1;
        if self.samples.len() < MAX_SAMPLES {
            self.samples.push(SkippedRecord {
                line,
                reason: error.reason,
                detail: error.detail,
            });
        }
    }

    pub fn skipped_for(&self, reason: SkipReason) -> u64 {
        self.by_reason.get(&reason).copied().unwrap_or(0)
    }

    pub fn is_clean(&self) -> bool {
        self.skipped == 0
    }
}

/// The first `expected` trimmed fields of a line.
///
/// Columns past `expected`, including the empty one left by a trailing
/// comma, are ignored.
pub fn split_fields(line: &str, expected: usize) -> Result<Vec<&str>, RecordError> {
    if line.trim().is_empty() {
        return Err(RecordError::new(SkipReason::Empty, "blank line"));
    }
    let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).take(expected).collect();
    if fields.len() < expected {
        return Err(RecordError::new(
            SkipReason::FieldCount,
            format!("expected {expected} fields, got {}", fields.len()),
        ));
    }
    Ok(fields)
}

/// Parse a finite float.
pub fn parse_f64(name: &str, value: &str) -> Result<f64, RecordError> {
    let parsed: f64 = value.parse().map_err(|_| {
        RecordError::new(SkipReason::NotANumber, format!("{name}: {value:?}"))
    })?;
    if !parsed.is_finite() {
        return Err(RecordError::new(SkipReason::NonFinite, name.to_string()));
    }
    Ok(parsed)
}

/// Parse an integer time step. Integral floats such as `12.0` are accepted.
pub fn parse_time_step(value: &str) -> Result<i64, RecordError> {
    if let Ok(step) = value.parse::<i64>() {
        return Ok(step);
    }
    let as_float = parse_f64("time_step", value)?;
    if as_float.fract() != 0.0 || as_float.abs() > i64::MAX as f64 {
        return Err(RecordError::new(
            SkipReason::NotANumber,
            format!("time_step: {value:?}"),
        ));
    }
    Ok(as_float as i64)
}

/// Parse a non-negative integer count.
pub fn parse_count(value: &str) -> Result<u64, RecordError> {
    value
        .parse()
        .map_err(|_| RecordError::new(SkipReason::NotANumber, format!("count: {value:?}")))
}
