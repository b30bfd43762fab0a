//! Property-based tests for segmentation, quantization and estimation.

use proptest::prelude::*;
use trajseg_core::model::{count_transitions, estimate_probabilities};
use trajseg_core::segment::{mdl_score, SegmentCosts, Segmenter, MIN_SEGMENT_LEN};
use trajseg_core::state::{Quantizer, StateInterner};
use trajseg_core::trajectory::{TrajectoryPoint, Trip};

fn signal_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-5.0f64..5.0, 0..40)
}

fn point_strategy() -> impl Strategy<Value = (f64, f64, f64)> {
    (0.0f64..60.0, -3.0f64..3.0, 0.0f64..360.0)
}

fn trip_strategy() -> impl Strategy<Value = Trip> {
    prop::collection::vec(point_strategy(), 0..25).prop_map(|samples| Trip {
        id: "p".into(),
        points: samples
            .into_iter()
            .enumerate()
            .map(|(i, (speed, acceleration, heading))| TrajectoryPoint {
                time_step: i as i64,
                speed,
                acceleration,
                heading,
                latitude: 0.0,
                longitude: 0.0,
            })
            .collect(),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Segments tile [0, N-1] in order with no gaps or overlaps.
    #[test]
    fn segments_partition_the_signal(signal in signal_strategy(), max in 1usize..8) {
        let result = Segmenter::new(max).segment(&signal);
        let n = signal.len();

        if n == 0 {
            prop_assert!(result.segments.is_empty());
            return Ok(());
        }

        prop_assert_eq!(result.segments[0].start, 0);
        prop_assert_eq!(result.segments.last().map(|s| s.end), Some(n - 1));
        for pair in result.segments.windows(2) {
            prop_assert_eq!(pair[0].end + 1, pair[1].start);
        }
        prop_assert!(result.segment_count() <= max);
    }

    /// Every segment of a signal with at least two points has at least two points.
    #[test]
    fn segments_respect_min_length(signal in signal_strategy(), max in 1usize..8) {
        prop_assume!(signal.len() >= MIN_SEGMENT_LEN);
        let result = Segmenter::new(max).segment(&signal);
        for segment in &result.segments {
            prop_assert!(segment.len() >= MIN_SEGMENT_LEN, "short segment {:?}", segment);
        }
        prop_assert!(result.segment_count() <= signal.len() / MIN_SEGMENT_LEN);
    }

    /// The chosen partition scores no worse than any other candidate count.
    #[test]
    fn chosen_partition_minimizes_mdl(signal in signal_strategy(), max in 1usize..8) {
        prop_assume!(signal.len() >= MIN_SEGMENT_LEN);
        let result = Segmenter::new(max).segment(&signal);
        let Some(best) = result.mdl else {
            return Ok(());
        };
        for candidate in &result.candidates {
            prop_assert!(best <= candidate.mdl, "{} beats chosen {}", candidate.mdl, best);
        }

        let starts: Vec<usize> = result.segments.iter().map(|s| s.start).collect();
        let recomputed = mdl_score(&starts, &SegmentCosts::new(&signal));
        prop_assert!((recomputed - best).abs() < 1e-9);
    }

    /// Start flags mark exactly the first point of every segment.
    #[test]
    fn start_flags_match_segments(signal in signal_strategy()) {
        let result = Segmenter::new(10).segment(&signal);
        let flags = result.start_flags();
        prop_assert_eq!(flags.len(), signal.len());
        if !flags.is_empty() {
            prop_assert!(flags[0]);
        }
        prop_assert_eq!(flags.iter().filter(|&&f| f).count(), result.segment_count());
    }

    /// Writing a state key and reading it back yields the same state.
    #[test]
    fn state_keys_round_trip(
        (speed, accel, heading) in point_strategy(),
        bin in prop::sample::select(vec![1u32, 2, 3, 5, 6, 10, 15, 30]),
    ) {
        let q = Quantizer::new(0.25, bin);
        let state = q.quantize(speed, accel, heading);
        let parsed = q.parse_key(&state.key()).unwrap();
        prop_assert_eq!(parsed, state);
        prop_assert!((0..360).contains(&state.heading));
    }

    /// Non-self probabilities of every source sum to one; stationary sources
    /// keep a unit self-loop.
    #[test]
    fn estimated_rows_are_normalized(trips in prop::collection::vec(trip_strategy(), 1..4)) {
        let quantizer = Quantizer::default();
        let mut interner = StateInterner::new();
        let counts = count_transitions(&trips, &quantizer, &mut interner);
        let model = estimate_probabilities(&counts, &interner);

        for (src, row) in model.graph.rows() {
            let stationary = interner[src].is_stationary();
            if stationary {
                prop_assert_eq!(row.get(&src).copied(), Some(1.0));
            } else {
                prop_assert!(!row.contains_key(&src));
            }
            let non_self: f64 = row
                .iter()
                .filter(|(&dst, _)| dst != src)
                .map(|(_, &w)| w)
                .sum();
            if model.source_total(src).unwrap_or(0) > 0 {
                prop_assert!((non_self - 1.0).abs() < 1e-9, "row sums to {}", non_self);
            } else {
                prop_assert!(stationary);
            }
        }
    }
}
