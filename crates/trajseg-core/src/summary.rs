//! Run summary written to stdout.
//!
//! Stages record what they did into a [`RunReport`]; the CLI wraps it with
//! the run id, timestamps and config snapshot into a [`RunSummary`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use trajseg_common::{TripId, SCHEMA_VERSION};
use trajseg_config::ConfigSnapshot;

use crate::io::{Artifact, ParseDiagnostics, SegmentedSignal};
use crate::model::{TransitionCounts, TransitionGraph, TransitionModel};
use crate::regularize::RegularizationStats;
use crate::segment::Segmentation;
use crate::transform::TransformContext;

/// Transition counting results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountStats {
    /// Distinct trips seen by the counter.
    pub trajectories: usize,
    /// Adjacent sample pairs counted.
    pub transitions: u64,
    /// Distinct `(source, destination)` pairs.
    pub distinct_transitions: usize,
    /// Pairs skipped for a time gap other than 1.
    pub gaps_skipped: u64,
}

impl From<&TransitionCounts> for CountStats {
    fn from(counts: &TransitionCounts) -> Self {
        Self {
            trajectories: counts.trajectories,
            transitions: counts.total(),
            distinct_transitions: counts.distinct_transitions(),
            gaps_skipped: counts.gaps_skipped,
        }
    }
}

/// Size of a transition graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// States appearing as a source or destination.
    pub states: usize,
    /// States with an outgoing distribution.
    pub sources: usize,
    pub edges: usize,
}

impl From<&TransitionGraph> for GraphStats {
    fn from(graph: &TransitionGraph) -> Self {
        Self {
            states: graph.node_count(),
            sources: graph.source_count(),
            edges: graph.edge_count(),
        }
    }
}

impl From<&TransitionModel> for GraphStats {
    fn from(model: &TransitionModel) -> Self {
        Self::from(&model.graph)
    }
}

/// Transform counters plus the derived fallback ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformStats {
    #[serde(flatten)]
    pub counters: TransformContext,
    /// Graph-wide mean weight used for unknown source states.
    pub fallback_value: f64,
    pub fallback_percent: Option<f64>,
}

impl TransformStats {
    pub fn new(counters: TransformContext, fallback_value: f64) -> Self {
        Self {
            counters,
            fallback_value,
            fallback_percent: counters.fallback_percent(),
        }
    }
}

/// Segmentation result of one trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSegmentReport {
    pub trip_id: TripId,
    pub points: usize,
    pub segments: usize,
    pub mdl: Option<f64>,
}

impl TripSegmentReport {
    pub fn new(trip: &SegmentedSignal, segmentation: &Segmentation) -> Self {
        Self {
            trip_id: trip.signal.trip_id.clone(),
            points: trip.signal.len(),
            segments: segmentation.segment_count(),
            mdl: segmentation.mdl,
        }
    }
}

/// An artifact written by the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub artifact: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// What the stages of one command did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<ParseDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<CountStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empirical_graph: Option<GraphStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regularization: Option<RegularizationStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformStats>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segmentation: Vec<TripSegmentReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactRecord>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_artifact(&mut self, artifact: Artifact, path: impl Into<PathBuf>, rows: usize) {
        self.artifacts.push(ArtifactRecord {
            artifact: artifact.name().to_string(),
            path: path.into(),
            rows,
        });
    }

    pub fn records_skipped(&self) -> u64 {
        self.inputs.iter().map(|d| d.skipped).sum()
    }

    pub fn total_segments(&self) -> usize {
        self.segmentation.iter().map(|t| t.segments).sum()
    }
}

/// Document printed on stdout at the end of a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: String,
    pub run_id: String,
    pub command: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: String,
    pub exit_code: i32,
    pub config: ConfigSnapshot,
    #[serde(flatten)]
    pub report: RunReport,
}

impl RunSummary {
    pub fn new(
        run_id: impl Into<String>,
        command: impl Into<String>,
        started_at: DateTime<Utc>,
        config: ConfigSnapshot,
        report: RunReport,
        exit_code: crate::exit_codes::ExitCode,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            run_id: run_id.into(),
            command: command.into(),
            started_at,
            finished_at: Utc::now(),
            status: exit_code.code_name().to_string(),
            exit_code: exit_code.as_i32(),
            config,
            report,
        }
    }

    /// One human-readable line.
    pub fn one_line(&self) -> String {
        let mut parts = vec![format!("[{}] {}: {}", self.run_id, self.command, self.status)];
        let accepted: u64 = self.report.inputs.iter().map(|d| d.accepted).sum();
        if !self.report.inputs.is_empty() {
            parts.push(format!(
                "records={} skipped={}",
                accepted,
                self.report.records_skipped()
            ));
        }
        if let Some(graph) = &self.report.graph {
            parts.push(format!("states={} edges={}", graph.states, graph.edges));
        }
        if let Some(t) = &self.report.transform {
            let pct = t.fallback_percent.unwrap_or(0.0);
            parts.push(format!("trips={} fallback={:.2}%", t.counters.trips, pct));
        }
        if !self.report.segmentation.is_empty() {
            parts.push(format!(
                "segmented={} segments={}",
                self.report.segmentation.len(),
                self.report.total_segments()
            ));
        }
        parts.join(" ")
    }
}
