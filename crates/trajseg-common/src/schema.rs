//! Schema version for run summaries.

/// Version of the run-summary document written to stdout.
pub const SCHEMA_VERSION: &str = "1.0.0";
