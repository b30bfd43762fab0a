//! Stages, stable event names and per-run correlation context.

use serde::{Deserialize, Serialize};

/// Pipeline stages, used as the `stage` field of structured events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Transition counting.
    Count,
    /// Counts to probabilities.
    Estimate,
    /// Neighborhood smoothing of the graph.
    Regularize,
    /// Trajectories to dissimilarity signals.
    Transform,
    /// MDL segmentation.
    Segment,
    /// Artifact output.
    Write,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Count => "count",
            Stage::Estimate => "estimate",
            Stage::Regularize => "regularize",
            Stage::Transform => "transform",
            Stage::Segment => "segment",
            Stage::Write => "write",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";
    pub const RUN_NOTHING_TO_PROCESS: &str = "run.nothing_to_process";
    pub const RUN_FAILED: &str = "run.failed";

    // Config/init events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_ERROR: &str = "config.error";

    // Input tables
    pub const INPUT_READ: &str = "input.read";
    pub const INPUT_RECORDS_SKIPPED: &str = "input.records_skipped";

    // Graph construction
    pub const COUNT_FINISHED: &str = "count.finished";
    pub const ESTIMATE_FINISHED: &str = "estimate.finished";
    pub const REGULARIZE_PROGRESS: &str = "regularize.progress";
    pub const REGULARIZE_FINISHED: &str = "regularize.finished";

    // Transform stage
    pub const TRANSFORM_FALLBACK: &str = "transform.fallback";
    pub const TRANSFORM_FINISHED: &str = "transform.finished";

    // Segment stage
    pub const SEGMENT_TRIP_DONE: &str = "segment.trip_done";
    pub const SEGMENT_FINISHED: &str = "segment.finished";

    // Output
    pub const ARTIFACT_WRITTEN: &str = "write.artifact";

    // Error events
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Correlation fields shared by every event of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogContext {
    pub run_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }

    /// Context with a freshly generated run id.
    pub fn generate() -> Self {
        Self::new(super::generate_run_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serialization() {
        assert_eq!(serde_json::to_string(&Stage::Regularize).unwrap(), "\"regularize\"");
        assert_eq!(Stage::Segment.to_string(), "segment");
        assert_eq!(Stage::Init.to_string(), "init");
    }

    #[test]
    fn test_event_names() {
        assert_eq!(event_names::REGULARIZE_PROGRESS, "regularize.progress");
        assert_eq!(event_names::TRANSFORM_FALLBACK, "transform.fallback");
        assert_eq!(event_names::SEGMENT_TRIP_DONE, "segment.trip_done");
    }

    #[test]
    fn test_generated_context() {
        let a = LogContext::generate();
        let b = LogContext::generate();
        assert!(a.run_id.starts_with("run-"));
        assert_ne!(a, b);
    }
}
