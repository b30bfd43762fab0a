//! Arena-backed transition graph keyed by interned state ids.

use std::collections::{BTreeMap, BTreeSet};
use trajseg_common::StateId;
use trajseg_math::compensated_mean;

/// Outgoing weights of one source state, ordered by destination id.
pub type TransitionRow = BTreeMap<StateId, f64>;

/// Weighted directed graph over interned states.
///
/// Rows live in a vector indexed by source id; a `None` slot means the state
/// has no outgoing distribution. Destinations within a row are kept in id
/// order so iteration, and therefore output, is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionGraph {
    rows: Vec<Option<TransitionRow>>,
}

impl TransitionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn row_slot(&mut self, src: StateId) -> &mut TransitionRow {
        let idx = src.index();
        if idx >= self.rows.len() {
            self.rows.resize_with(idx + 1, || None);
        }
        self.rows[idx].get_or_insert_with(TransitionRow::new)
    }

    /// Make `src` a source state, with an empty row if it had none.
    pub fn ensure_source(&mut self, src: StateId) {
        self.row_slot(src);
    }

    /// Add `weight` to the `src → dst` edge, creating it at 0 if missing.
    pub fn add_weight(&mut self, src: StateId, dst: StateId, weight: f64) {
        *self.row_slot(src).entry(dst).or_insert(0.0) += weight;
    }

    /// Overwrite the `src → dst` edge.
    pub fn set_weight(&mut self, src: StateId, dst: StateId, weight: f64) {
        self.row_slot(src).insert(dst, weight);
    }

    pub fn weight(&self, src: StateId, dst: StateId) -> Option<f64> {
        self.row(src).and_then(|row| row.get(&dst).copied())
    }

    pub fn row(&self, src: StateId) -> Option<&TransitionRow> {
        self.rows.get(src.index()).and_then(Option::as_ref)
    }

    pub fn contains_source(&self, src: StateId) -> bool {
        self.row(src).is_some()
    }

    /// Self-loop weight of `src`, if present.
    pub fn self_loop(&self, src: StateId) -> Option<f64> {
        self.weight(src, src)
    }

    /// Source rows in id order.
    pub fn rows(&self) -> impl Iterator<Item = (StateId, &TransitionRow)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.as_ref().map(|r| (StateId(i as u32), r)))
    }

    /// Mutable source rows in id order.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = (StateId, &mut TransitionRow)> {
        self.rows
            .iter_mut()
            .enumerate()
            .filter_map(|(i, row)| row.as_mut().map(|r| (StateId(i as u32), r)))
    }

    /// Every edge as `(src, dst, weight)`, sources then destinations in id order.
    pub fn edges(&self) -> impl Iterator<Item = (StateId, StateId, f64)> + '_ {
        self.rows()
            .flat_map(|(src, row)| row.iter().map(move |(&dst, &w)| (src, dst, w)))
    }

    pub fn source_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_some()).count()
    }

    pub fn edge_count(&self) -> usize {
        self.rows().map(|(_, row)| row.len()).sum()
    }

    /// Number of distinct states appearing as a source or a destination.
    pub fn node_count(&self) -> usize {
        let mut nodes = BTreeSet::new();
        for (src, row) in self.rows() {
            nodes.insert(src);
            nodes.extend(row.keys().copied());
        }
        nodes.len()
    }

    /// Mean of every edge weight in the graph, self-loops included.
    pub fn mean_weight(&self) -> Option<f64> {
        compensated_mean(self.edges().map(|(_, _, w)| w))
    }

    pub fn is_empty(&self) -> bool {
        self.source_count() == 0
    }
}
