//! Per-trip transformation counters.

use serde::{Deserialize, Serialize};

/// Diagnostics collected while transforming trips.
///
/// Each trip owns its own context; contexts are merged afterwards, so trips
/// can be processed independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformContext {
    /// Trips transformed.
    pub trips: u64,
    /// Signal values emitted.
    pub steps: u64,
    /// Steps where the state changed and a dissimilarity was scored.
    pub state_changes: u64,
    /// State changes scored with the graph-wide fallback value.
    pub fallback_count: u64,
}

impl TransformContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another context into this one.
    pub fn merge(&mut self, other: &TransformContext) {
        self.trips += other.trips;
        self.steps += other.steps;
        self.state_changes += other.state_changes;
        self.fallback_count += other.fallback_count;
    }

    /// Percentage of state changes that used the fallback, if any were scored.
    pub fn fallback_percent(&self) -> Option<f64> {
        if self.state_changes == 0 {
            None
        } else {
            Some(100.0 * self.fallback_count as f64 / self.state_changes as f64)
        }
    }
}

impl std::iter::Sum for TransformContext {
    fn sum<I: Iterator<Item = TransformContext>>(iter: I) -> Self {
        iter.fold(TransformContext::new(), |mut acc, ctx| {
            acc.merge(&ctx);
            acc
        })
    }
}
