//! MDL-optimal segmentation of a dissimilarity signal.
//!
//! Every candidate segment count `Ns ∈ [1, max_segments]` that fits the
//! signal (`2·Ns ≤ N`) is solved exactly by dynamic programming; the count
//! with the lowest MDL score wins, ties going to the smaller count.

pub mod cost;
pub mod dp;
pub mod mdl;

pub use cost::{SegmentCosts, MIN_SEGMENT_LEN};
pub use dp::DpTable;
pub use mdl::{complexity_penalty, likelihood_cost, mdl_score};

use serde::{Deserialize, Serialize};
use trajseg_config::SegmentationConfig;

/// Inclusive index range `[start, end]` of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// MDL score of one candidate segment count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub segments: usize,
    pub mdl: f64,
}

/// Result of segmenting one signal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Segmentation {
    /// Segments partitioning `[0, N-1]`, in order.
    pub segments: Vec<Segment>,
    /// MDL score of the chosen partition; `None` for signals too short to score.
    pub mdl: Option<f64>,
    /// Scores of every feasible candidate count.
    pub candidates: Vec<CandidateScore>,
}

impl Segmentation {
    fn from_starts(starts: &[usize], n: usize) -> Vec<Segment> {
        starts
            .iter()
            .enumerate()
            .map(|(i, &start)| Segment {
                start,
                end: starts.get(i + 1).map_or(n, |&next| next) - 1,
            })
            .collect()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Per-point flags, true at the first point of each segment.
    pub fn start_flags(&self) -> Vec<bool> {
        let n = self.segments.last().map_or(0, |s| s.end + 1);
        let mut flags = vec![false; n];
        for segment in &self.segments {
            flags[segment.start] = true;
        }
        flags
    }
}

/// Segments signals by exhaustive search over segment counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenter {
    max_segments: usize,
}

impl Segmenter {
    pub fn new(max_segments: usize) -> Self {
        Self {
            max_segments: max_segments.max(1),
        }
    }

    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self::new(config.max_segments)
    }

    pub fn max_segments(&self) -> usize {
        self.max_segments
    }

    pub fn segment(&self, signal: &[f64]) -> Segmentation {
        let n = signal.len();
        match n {
            0 => return Segmentation::default(),
            1 => {
                return Segmentation {
                    segments: vec![Segment { start: 0, end: 0 }],
                    mdl: None,
                    candidates: Vec::new(),
                }
            }
            _ => {}
        }

        let costs = SegmentCosts::new(signal);
        let feasible = self.max_segments.min(n / MIN_SEGMENT_LEN);
        let mut dp = DpTable::new();
        dp.extend_to(feasible, &costs);

        let mut best: Option<(f64, Vec<usize>)> = None;
        let mut candidates = Vec::with_capacity(feasible);
        for segments in 1..=feasible {
            let Some(starts) = dp.backtrack(segments, n - 1) else {
                continue;
            };
            let score = mdl_score(&starts, &costs);
            candidates.push(CandidateScore {
                segments,
                mdl: score,
            });
            if best.as_ref().map_or(true, |(b, _)| score < *b) {
                best = Some((score, starts));
            }
        }

        match best {
            Some((score, starts)) => Segmentation {
                segments: Segmentation::from_starts(&starts, n),
                mdl: Some(score),
                candidates,
            },
            None => Segmentation {
                segments: vec![Segment { start: 0, end: n - 1 }],
                mdl: None,
                candidates,
            },
        }
    }
}
