//! Dynamic program over segment counts.
//!
//! `I[k][L]` is the cheapest way to cover `signal[0..=L]` with `k + 1`
//! segments, each at least two points long:
//!
//! ```text
//! I[0][L] = cost(0, L)
//! I[k][L] = min_{b ∈ [2k, L-1]} I[k-1][b-1] + cost(b, L)
//! ```
//!
//! Row `k` does not depend on the total segment count, so rows are shared by
//! every candidate count and only extended as needed.

use super::cost::SegmentCosts;

#[derive(Debug, Clone, Default)]
pub struct DpTable {
    cost: Vec<Vec<f64>>,
    breakpoint: Vec<Vec<usize>>,
}

impl DpTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of computed rows (the largest segment count supported).
    pub fn rows(&self) -> usize {
        self.cost.len()
    }

    /// Compute rows until `segments` segments are supported.
    pub fn extend_to(&mut self, segments: usize, costs: &SegmentCosts) {
        let n = costs.len();
        while self.cost.len() < segments {
            let k = self.cost.len();
            let mut row = vec![f64::INFINITY; n];
            let mut index = vec![0usize; n];

            if k == 0 {
                for (l, slot) in row.iter_mut().enumerate() {
                    *slot = costs.cost(0, l);
                }
            } else {
                let prev = &self.cost[k - 1];
                for l in (2 * k + 1)..n {
                    for b in (2 * k)..l {
                        let candidate = prev[b - 1] + costs.cost(b, l);
                        if candidate < row[l] {
                            row[l] = candidate;
                            index[l] = b;
                        }
                    }
                }
            }

            self.cost.push(row);
            self.breakpoint.push(index);
        }
    }

    /// Optimal total cost of `segments` segments over `signal[0..=last]`.
    pub fn optimum(&self, segments: usize, last: usize) -> Option<f64> {
        let value = *self.cost.get(segments.checked_sub(1)?)?.get(last)?;
        value.is_finite().then_some(value)
    }

    /// Start index of every segment of the optimal `segments`-way partition
    /// of `signal[0..=last]`, in ascending order.
    pub fn backtrack(&self, segments: usize, last: usize) -> Option<Vec<usize>> {
        self.optimum(segments, last)?;
        let mut starts = Vec::with_capacity(segments);
        let mut l = last;
        for k in (1..segments).rev() {
            let b = self.breakpoint[k][l];
            starts.push(b);
            l = b - 1;
        }
        starts.push(0);
        starts.reverse();
        Some(starts)
    }
}
