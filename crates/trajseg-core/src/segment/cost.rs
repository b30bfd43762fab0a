//! Gaussian segment costs over every span of a signal.

use trajseg_math::RunningMoments;

/// Shortest span that may form a segment.
pub const MIN_SEGMENT_LEN: usize = 2;

/// `cost(i, j)`: negative log-likelihood of `signal[i..=j]` under the
/// Gaussian fitted to it.
///
/// Spans shorter than [`MIN_SEGMENT_LEN`] cost `+∞`; spans with zero standard
/// deviation cost 0. The full upper triangle is precomputed with one Welford
/// pass per start index.
#[derive(Debug, Clone)]
pub struct SegmentCosts {
    n: usize,
    costs: Vec<f64>,
}

impl SegmentCosts {
    pub fn new(signal: &[f64]) -> Self {
        let n = signal.len();
        let mut costs = vec![f64::INFINITY; n * n];

        for i in 0..n {
            let mut moments = RunningMoments::new();
            for j in i..n {
                moments.push(signal[j]);
                if j + 1 - i >= MIN_SEGMENT_LEN {
                    costs[i * n + j] = moments.negative_log_likelihood();
                }
            }
        }

        Self { n, costs }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Cost of the inclusive span `[i, j]`; `+∞` when invalid or out of range.
    pub fn cost(&self, i: usize, j: usize) -> f64 {
        if i > j || j >= self.n {
            return f64::INFINITY;
        }
        self.costs[i * self.n + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trajseg_math::fit_gaussian;

    #[test]
    fn constant_span_costs_zero() {
        let costs = SegmentCosts::new(&[2.0, 2.0, 2.0, 2.0]);
        assert_eq!(costs.cost(0, 3), 0.0);
        assert_eq!(costs.cost(1, 2), 0.0);
    }

    #[test]
    fn short_and_reversed_spans_are_infinite() {
        let costs = SegmentCosts::new(&[1.0, 2.0, 3.0]);
        assert!(costs.cost(1, 1).is_infinite());
        assert!(costs.cost(2, 1).is_infinite());
        assert!(costs.cost(0, 3).is_infinite());
        assert!(costs.cost(0, 1).is_finite());
    }

    #[test]
    fn matches_batch_fit() {
        let signal = [0.1, 0.9, 0.4, 2.5, 1.7];
        let costs = SegmentCosts::new(&signal);
        let fit = fit_gaussian(&signal[1..=4]).unwrap();
        assert!((costs.cost(1, 4) - fit.self_negative_log_likelihood()).abs() < 1e-10);
    }
}
