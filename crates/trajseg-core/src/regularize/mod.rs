//! Distance-weighted smoothing of the empirical transition graph.
//!
//! Every empirical edge `src → dst` with probability `p` spreads mass to
//! nearby states on both ends:
//!
//! ```text
//! n  ∈ neighbors(src):  (n → dst)  += p / (d(n - src) + 1)
//! n' ∈ neighbors(dst):  (src → n') += p / (d(n' - dst) + 1)
//! d(Δ) = sqrt(Δspeed² + k·Δaccel² + Δheading²)
//! ```
//!
//! A stationary source-side neighbor also gets a self-loop of 1.0. Each row
//! is then rescaled so its non-self weights sum to 1; self-loops are kept
//! as they are.

pub mod neighbors;

pub use neighbors::{
    neighbors, sign_consistent, stays_non_negative, Neighbor, NeighborhoodSpec, Neighbors, Offset,
};

use serde::{Deserialize, Serialize};
use tracing::debug;
use trajseg_common::{Error, Result};
use trajseg_config::PipelineConfig;
use trajseg_math::compensated_sum;

use crate::logging::event_names;
use crate::model::TransitionGraph;
use crate::state::StateInterner;

/// How often (in processed source states) progress is logged.
const PROGRESS_EVERY: usize = 500;

/// Counters describing one regularization pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegularizationStats {
    /// Source states of the empirical graph.
    pub empirical_sources: usize,
    /// Edges of the empirical graph that were expanded.
    pub empirical_edges: usize,
    /// Interned states before the pass.
    pub states_before: usize,
    /// Interned states after the pass.
    pub states_after: usize,
    /// Source states of the regularized graph.
    pub regularized_sources: usize,
    /// Edges of the regularized graph.
    pub regularized_edges: usize,
    /// Rows with no non-self mass, left unscaled.
    pub rows_without_mass: usize,
}

impl RegularizationStats {
    /// States first seen during regularization.
    pub fn discovered_states(&self) -> usize {
        self.states_after.saturating_sub(self.states_before)
    }
}

/// Graph regularizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regularizer {
    spec: NeighborhoodSpec,
    accel_influence: f64,
}

impl Regularizer {
    pub fn new(spec: NeighborhoodSpec, accel_influence: f64) -> Self {
        Self {
            spec,
            accel_influence,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            NeighborhoodSpec::from_config(&config.regularization, &config.quantization),
            config.regularization.accel_influence,
        )
    }

    pub fn spec(&self) -> &NeighborhoodSpec {
        &self.spec
    }

    /// Regularize `empirical`, interning newly discovered states.
    ///
    /// The result starts as a copy of `empirical`; neighbor contributions are
    /// added on top and every row is normalized at the end.
    ///
    /// Fails with [`Error::NumericalInstability`] if a row's mass overflows.
    pub fn regularize(
        &self,
        empirical: &TransitionGraph,
        interner: &mut StateInterner,
    ) -> Result<(TransitionGraph, RegularizationStats)> {
        let mut graph = empirical.clone();
        let mut stats = RegularizationStats {
            empirical_sources: empirical.source_count(),
            empirical_edges: empirical.edge_count(),
            states_before: interner.len(),
            ..Default::default()
        };

        for (processed, (src, row)) in empirical.rows().enumerate() {
            if processed % PROGRESS_EVERY == 0 {
                let percent = 100.0 * processed as f64 / stats.empirical_sources.max(1) as f64;
                debug!(
                    target: event_names::REGULARIZE_PROGRESS,
                    percent = (percent * 100.0).round() / 100.0,
                    regularized_sources = graph.source_count(),
                    states = interner.len(),
                    "Regularizing"
                );
            }

            let src_state = interner[src];
            for (&dst, &prob) in row {
                let dst_state = interner[dst];

                for n in neighbors(src_state, &self.spec) {
                    let id = interner.intern(n.state);
                    if id == src || id == dst {
                        continue;
                    }
                    graph.add_weight(id, dst, prob * n.offset.influence(self.accel_influence));
                    if n.state.is_stationary() {
                        graph.set_weight(id, id, 1.0);
                    }
                }

                for n in neighbors(dst_state, &self.spec) {
                    let id = interner.intern(n.state);
                    if id == src || id == dst {
                        continue;
                    }
                    graph.add_weight(src, id, prob * n.offset.influence(self.accel_influence));
                }
            }
        }

        stats.rows_without_mass = normalize_rows(&mut graph)?;
        stats.states_after = interner.len();
        stats.regularized_sources = graph.source_count();
        stats.regularized_edges = graph.edge_count();

        debug!(
            target: event_names::REGULARIZE_PROGRESS,
            percent = 100.0,
            regularized_sources = stats.regularized_sources,
            states = stats.states_after,
            "Regularization complete"
        );

        Ok((graph, stats))
    }
}

/// Scale every row so that its non-self weights sum to 1.
///
/// Self-loops are excluded from the sum and left unchanged. Rows with no
/// non-self mass are skipped; their count is returned. A row whose mass is
/// NaN or infinite cannot be scaled and fails the whole pass.
pub fn normalize_rows(graph: &mut TransitionGraph) -> Result<usize> {
    let mut skipped = 0;
    for (src, row) in graph.rows_mut() {
        let total = compensated_sum(row.iter().filter(|(&dst, _)| dst != src).map(|(_, &w)| w));
        if !total.is_finite() {
            return Err(Error::NumericalInstability(format!(
                "outgoing weights of state {src} sum to {total}"
            )));
        }
        if total <= 0.0 {
            skipped += 1;
            continue;
        }
        for (&dst, weight) in row.iter_mut() {
            if dst != src {
                *weight /= total;
            }
        }
    }
    Ok(skipped)
}
