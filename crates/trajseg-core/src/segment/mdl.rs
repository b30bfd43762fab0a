//! Minimum-description-length model selection.

use super::cost::SegmentCosts;

/// Complexity penalty of `segments` segments over `n` points:
/// two Gaussian parameters per segment plus `segments - 1` boundaries.
pub fn complexity_penalty(segments: usize, n: usize) -> f64 {
    (3.0 * segments as f64 - 1.0) / 2.0 * (n as f64).ln()
}

/// Likelihood term: total cost of the segments starting at `starts`.
pub fn likelihood_cost(starts: &[usize], costs: &SegmentCosts) -> f64 {
    let n = costs.len();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).map_or(n, |&next| next) - 1;
            costs.cost(start, end)
        })
        .sum()
}

/// MDL score of a partition; lower is better.
pub fn mdl_score(starts: &[usize], costs: &SegmentCosts) -> f64 {
    likelihood_cost(starts, costs) + complexity_penalty(starts.len(), costs.len())
}
