//! Conditional transition probabilities from raw counts.

use std::collections::BTreeMap;
use trajseg_common::StateId;

use super::counts::TransitionCounts;
use super::graph::TransitionGraph;
use crate::state::StateInterner;

/// Empirical transition model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionModel {
    pub graph: TransitionGraph,
    /// Non-self transition count of every source in `graph`.
    pub source_totals: BTreeMap<StateId, u64>,
}

impl TransitionModel {
    pub fn source_total(&self, src: StateId) -> Option<u64> {
        self.source_totals.get(&src).copied()
    }
}

/// Turn raw counts into per-source conditional probabilities.
///
/// For each source the non-self counts are normalized by their total.
/// Self-transitions are dropped, except that every stationary source (zero
/// acceleration) gets a self-loop of exactly 1.0. A non-stationary source
/// with no non-self transitions is left out of the graph.
pub fn estimate_probabilities(
    counts: &TransitionCounts,
    interner: &StateInterner,
) -> TransitionModel {
    let mut model = TransitionModel::default();

    for (src, row) in counts.rows() {
        let total: u64 = row
            .iter()
            .filter(|(&dst, _)| dst != src)
            .map(|(_, &n)| n)
            .sum();
        let stationary = interner.resolve(src).is_some_and(|s| s.is_stationary());

        if total == 0 && !stationary {
            continue;
        }

        model.graph.ensure_source(src);
        model.source_totals.insert(src, total);

        if total > 0 {
            for (&dst, &n) in row {
                if dst != src {
                    model.graph.set_weight(src, dst, n as f64 / total as f64);
                }
            }
        }
        if stationary {
            model.graph.set_weight(src, src, 1.0);
        }
    }

    model
}
