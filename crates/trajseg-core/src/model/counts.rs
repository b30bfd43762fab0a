//! Raw transition frequencies between consecutive samples.

use std::collections::BTreeMap;
use trajseg_common::StateId;

use crate::state::{Quantizer, StateInterner};
use crate::trajectory::Trip;

/// Transition counts keyed by `(source, destination)` state ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionCounts {
    rows: BTreeMap<StateId, BTreeMap<StateId, u64>>,
    /// Trips that contributed at least one sample.
    pub trajectories: usize,
    /// Consecutive pairs skipped because their time steps were not adjacent.
    pub gaps_skipped: u64,
}

impl TransitionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `src → dst`.
    pub fn add(&mut self, src: StateId, dst: StateId, count: u64) {
        *self.rows.entry(src).or_default().entry(dst).or_insert(0) += count;
    }

    pub fn get(&self, src: StateId, dst: StateId) -> u64 {
        self.rows
            .get(&src)
            .and_then(|row| row.get(&dst))
            .copied()
            .unwrap_or(0)
    }

    /// Source rows in id order.
    pub fn rows(&self) -> impl Iterator<Item = (StateId, &BTreeMap<StateId, u64>)> {
        self.rows.iter().map(|(&src, row)| (src, row))
    }

    /// Every `(src, dst, count)` triple in id order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, StateId, u64)> + '_ {
        self.rows
            .iter()
            .flat_map(|(&src, row)| row.iter().map(move |(&dst, &n)| (src, dst, n)))
    }

    /// Number of distinct `(src, dst)` pairs.
    pub fn distinct_transitions(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.iter().map(|(_, _, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Count transitions between consecutive samples of each trip.
///
/// Only pairs whose time steps differ by exactly 1 are counted; other pairs
/// are skipped without error. States are interned as they are counted.
pub fn count_transitions(
    trips: &[Trip],
    quantizer: &Quantizer,
    interner: &mut StateInterner,
) -> TransitionCounts {
    let mut counts = TransitionCounts::new();

    for trip in trips {
        if trip.is_empty() {
            continue;
        }
        counts.trajectories += 1;

        for (prev, curr) in trip.steps() {
            if curr.time_step.checked_sub(prev.time_step) != Some(1) {
                counts.gaps_skipped += 1;
                continue;
            }
            let src = interner.intern(quantizer.quantize_point(prev));
            let dst = interner.intern(quantizer.quantize_point(curr));
            counts.add(src, dst, 1);
        }
    }

    counts
}
