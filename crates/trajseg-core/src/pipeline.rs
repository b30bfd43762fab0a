//! Stage orchestration.
//!
//! Each stage takes its inputs by reference, logs its diagnostics and
//! records them in the caller's [`RunReport`]. An empty input set is
//! reported as [`Error::NothingToProcess`] instead of producing empty output.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use trajseg_common::{Error, Result};
use trajseg_config::PipelineConfig;

use crate::io::{self, Artifact, ParseDiagnostics, SegmentedSignal};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use crate::model::{
    count_transitions, estimate_probabilities, TransitionCounts, TransitionGraph, TransitionModel,
};
use crate::regularize::Regularizer;
use crate::segment::Segmenter;
use crate::state::{Quantizer, StateInterner};
use crate::summary::{CountStats, GraphStats, RunReport, TransformStats, TripSegmentReport};
use crate::trajectory::Trip;
use crate::transform::{FeatureScaler, Signal, SignalTransformer};

/// Everything produced while building the regularized graph.
#[derive(Debug, Clone, Default)]
pub struct GraphArtifacts {
    /// Interning table shared by every graph below.
    pub interner: StateInterner,
    pub counts: TransitionCounts,
    pub model: TransitionModel,
    /// Regularized graph.
    pub graph: TransitionGraph,
}

/// Configured pipeline for one invocation.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    quantizer: Quantizer,
    ctx: LogContext,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, ctx: LogContext) -> Self {
        Self {
            quantizer: Quantizer::from_config(&config.quantization),
            config,
            ctx,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    pub fn context(&self) -> &LogContext {
        &self.ctx
    }

    // ------------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------------

    fn record_input(&self, stage: Stage, path: &Path, diagnostics: ParseDiagnostics, report: &mut RunReport) {
        log_event!(
            self.ctx,
            INFO,
            event_names::INPUT_READ,
            stage,
            "Input table read",
            artifact = tracing::field::display(&diagnostics.artifact),
            path = tracing::field::display(path.display()),
            accepted = diagnostics.accepted,
            skipped = diagnostics.skipped
        );
        for sample in &diagnostics.samples {
            log_event!(
                self.ctx,
                WARN,
                event_names::INPUT_RECORDS_SKIPPED,
                stage,
                "Skipped malformed record",
                line = sample.line as u64,
                reason = tracing::field::display(sample.reason),
                detail = tracing::field::display(&sample.detail)
            );
        }
        report.inputs.push(diagnostics);
    }

    /// Read raw trajectories grouped into trips.
    pub fn load_trajectories(&self, path: &Path, stage: Stage, report: &mut RunReport) -> Result<Vec<Trip>> {
        let parsed = io::read_trajectories(io::open_table(path)?)?;
        self.record_input(stage, path, parsed.diagnostics, report);
        Ok(parsed.data)
    }

    pub fn load_counts(
        &self,
        path: &Path,
        interner: &mut StateInterner,
        report: &mut RunReport,
    ) -> Result<TransitionCounts> {
        let parsed = io::read_counts(io::open_table(path)?, &self.quantizer, interner)?;
        self.record_input(Stage::Estimate, path, parsed.diagnostics, report);
        Ok(parsed.data)
    }

    pub fn load_probabilities(
        &self,
        path: &Path,
        interner: &mut StateInterner,
        report: &mut RunReport,
    ) -> Result<TransitionModel> {
        let parsed = io::read_probabilities(io::open_table(path)?, &self.quantizer, interner)?;
        self.record_input(Stage::Regularize, path, parsed.diagnostics, report);
        Ok(parsed.data)
    }

    pub fn load_graph(
        &self,
        path: &Path,
        interner: &mut StateInterner,
        report: &mut RunReport,
    ) -> Result<TransitionGraph> {
        let parsed = io::read_graph(io::open_table(path)?, &self.quantizer, interner)?;
        self.record_input(Stage::Transform, path, parsed.diagnostics, report);
        Ok(parsed.data)
    }

    pub fn load_signals(&self, path: &Path, report: &mut RunReport) -> Result<Vec<Signal>> {
        let parsed = io::read_signals(io::open_table(path)?)?;
        self.record_input(Stage::Segment, path, parsed.diagnostics, report);
        Ok(parsed.data)
    }

    /// Write one artifact with `write` and record it.
    pub fn write_artifact<F>(
        &self,
        artifact: Artifact,
        path: &Path,
        report: &mut RunReport,
        write: F,
    ) -> Result<usize>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<usize>,
    {
        let mut out = io::create_table(path)?;
        let rows = write(&mut out)?;
        log_event!(
            self.ctx,
            INFO,
            event_names::ARTIFACT_WRITTEN,
            Stage::Write,
            "Artifact written",
            artifact = artifact.name(),
            path = tracing::field::display(path.display()),
            rows = rows as u64
        );
        report.record_artifact(artifact, path, rows);
        Ok(rows)
    }

    // ------------------------------------------------------------------------
    // Graph construction
    // ------------------------------------------------------------------------

    pub fn count(
        &self,
        trips: &[Trip],
        interner: &mut StateInterner,
        report: &mut RunReport,
    ) -> Result<TransitionCounts> {
        if trips.is_empty() {
            return Err(Error::nothing_to_process("count"));
        }
        let counts = count_transitions(trips, &self.quantizer, interner);
        let stats = CountStats::from(&counts);
        log_event!(
            self.ctx,
            INFO,
            event_names::COUNT_FINISHED,
            Stage::Count,
            "Transitions counted",
            trajectories = stats.trajectories as u64,
            transitions = stats.transitions,
            distinct_transitions = stats.distinct_transitions as u64,
            gaps_skipped = stats.gaps_skipped
        );
        report.counts = Some(stats);
        Ok(counts)
    }

    pub fn estimate(
        &self,
        counts: &TransitionCounts,
        interner: &StateInterner,
        report: &mut RunReport,
    ) -> Result<TransitionModel> {
        if counts.is_empty() {
            return Err(Error::nothing_to_process("estimate"));
        }
        let model = estimate_probabilities(counts, interner);
        let stats = GraphStats::from(&model);
        log_event!(
            self.ctx,
            INFO,
            event_names::ESTIMATE_FINISHED,
            Stage::Estimate,
            "Transition probabilities estimated",
            sources = stats.sources as u64,
            edges = stats.edges as u64
        );
        report.empirical_graph = Some(stats);
        Ok(model)
    }

    pub fn regularize(
        &self,
        empirical: &TransitionGraph,
        interner: &mut StateInterner,
        report: &mut RunReport,
    ) -> Result<TransitionGraph> {
        if empirical.is_empty() {
            return Err(Error::nothing_to_process("regularize"));
        }
        let (graph, stats) =
            Regularizer::from_config(&self.config).regularize(empirical, interner)?;
        let graph_stats = GraphStats::from(&graph);
        log_event!(
            self.ctx,
            INFO,
            event_names::REGULARIZE_FINISHED,
            Stage::Regularize,
            "Graph regularized",
            states = graph_stats.states as u64,
            edges = graph_stats.edges as u64,
            discovered_states = stats.discovered_states() as u64,
            rows_without_mass = stats.rows_without_mass as u64
        );
        report.regularization = Some(stats);
        report.graph = Some(graph_stats);
        Ok(graph)
    }

    /// Count, estimate and regularize in one go.
    pub fn build_graph(&self, trips: &[Trip], report: &mut RunReport) -> Result<GraphArtifacts> {
        let mut interner = StateInterner::new();
        let counts = self.count(trips, &mut interner, report)?;
        let model = self.estimate(&counts, &interner, report)?;
        let graph = self.regularize(&model.graph, &mut interner, report)?;
        Ok(GraphArtifacts {
            interner,
            counts,
            model,
            graph,
        })
    }

    // ------------------------------------------------------------------------
    // Transform and segment
    // ------------------------------------------------------------------------

    pub fn transform(
        &self,
        trips: &[Trip],
        graph: &TransitionGraph,
        interner: &StateInterner,
        report: &mut RunReport,
    ) -> Result<Vec<Signal>> {
        if trips.is_empty() {
            return Err(Error::nothing_to_process("transform"));
        }
        let transformer = SignalTransformer::new(
            graph,
            interner,
            self.quantizer,
            FeatureScaler::new(&self.config.features),
        );
        let (signals, ctx) = transformer.transform_all(trips, self.config.transform.min_trip_length);
        if signals.is_empty() {
            return Err(Error::nothing_to_process("transform"));
        }

        let stats = TransformStats::new(ctx, transformer.fallback_value());
        log_event!(
            self.ctx,
            INFO,
            event_names::TRANSFORM_FINISHED,
            Stage::Transform,
            "Trajectories transformed",
            trips = ctx.trips,
            steps = ctx.steps,
            state_changes = ctx.state_changes,
            fallback_count = ctx.fallback_count,
            fallback_percent = stats.fallback_percent.unwrap_or(0.0)
        );
        report.transform = Some(stats);
        Ok(signals)
    }

    pub fn segment(&self, signals: &[Signal], report: &mut RunReport) -> Result<Vec<SegmentedSignal>> {
        if signals.iter().all(Signal::is_empty) {
            return Err(Error::nothing_to_process("segment"));
        }
        let segmenter = Segmenter::from_config(&self.config.segmentation);

        let mut out = Vec::with_capacity(signals.len());
        for signal in signals.iter().filter(|s| !s.is_empty()) {
            let segmentation = segmenter.segment(&signal.values());
            let trip = SegmentedSignal::new(signal.clone(), &segmentation);
            let trip_report = TripSegmentReport::new(&trip, &segmentation);
            log_event!(
                self.ctx,
                DEBUG,
                event_names::SEGMENT_TRIP_DONE,
                Stage::Segment,
                "Trip segmented",
                trip = tracing::field::display(&trip_report.trip_id),
                points = trip_report.points as u64,
                segments = trip_report.segments as u64,
                mdl = trip_report.mdl.unwrap_or(f64::NAN)
            );
            report.segmentation.push(trip_report);
            out.push(trip);
        }

        log_event!(
            self.ctx,
            INFO,
            event_names::SEGMENT_FINISHED,
            Stage::Segment,
            "Segmentation finished",
            trips = out.len() as u64,
            segments = report.total_segments() as u64
        );
        Ok(out)
    }

    // ------------------------------------------------------------------------
    // Whole run
    // ------------------------------------------------------------------------

    /// Build the graph from `graph_input`, then transform and segment the
    /// trips of `segment_input`, writing every artifact into `out_dir`.
    pub fn run(
        &self,
        graph_input: &Path,
        segment_input: &Path,
        out_dir: &Path,
        report: &mut RunReport,
    ) -> Result<Vec<SegmentedSignal>> {
        std::fs::create_dir_all(out_dir)?;

        let graph_trips = self.load_trajectories(graph_input, Stage::Count, report)?;
        let built = self.build_graph(&graph_trips, report)?;
        self.write_graph_artifacts(&built, out_dir, report)?;

        let trips = if graph_input == segment_input {
            graph_trips
        } else {
            self.load_trajectories(segment_input, Stage::Transform, report)?
        };
        let signals = self.transform(&trips, &built.graph, &built.interner, report)?;
        self.write_artifact(
            Artifact::Dissimilarities,
            &out_dir.join(Artifact::Dissimilarities.file_name()),
            report,
            |w| io::write_signals(w, &signals),
        )?;

        let segmented = self.segment(&signals, report)?;
        self.write_artifact(
            Artifact::Segmentation,
            &out_dir.join(Artifact::Segmentation.file_name()),
            report,
            |w| io::write_segmentation(w, &segmented),
        )?;
        Ok(segmented)
    }

    /// Write the frequency, probability and regularized tables.
    pub fn write_graph_artifacts(
        &self,
        built: &GraphArtifacts,
        out_dir: &Path,
        report: &mut RunReport,
    ) -> Result<()> {
        std::fs::create_dir_all(out_dir)?;
        self.write_artifact(
            Artifact::Transitions,
            &out_dir.join(Artifact::Transitions.file_name()),
            report,
            |w| io::write_counts(w, &built.counts, &built.interner),
        )?;
        self.write_artifact(
            Artifact::Probabilities,
            &out_dir.join(Artifact::Probabilities.file_name()),
            report,
            |w| io::write_probabilities(w, &built.model, &built.interner),
        )?;
        self.write_artifact(
            Artifact::Regularized,
            &out_dir.join(Artifact::Regularized.file_name()),
            report,
            |w| io::write_graph(w, &built.graph, &built.interner),
        )?;
        Ok(())
    }
}
