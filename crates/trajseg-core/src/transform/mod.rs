//! Trajectory → dissimilarity signal.
//!
//! For consecutive samples `(prev, curr)` of a trip, with `P(prev → d)` the
//! regularized transition probabilities:
//!
//! ```text
//! curr == prev            → 0
//! prev has no row         → mean weight of the whole graph (fallback)
//! otherwise               → Σ_{d ≠ prev} dist(curr, d) · P(prev → d)
//! ```
//!
//! The first sample of a trip has no predecessor and gets no value.

pub mod context;
pub mod distance;

pub use context::TransformContext;
pub use distance::FeatureScaler;

use serde::{Deserialize, Serialize};
use tracing::debug;
use trajseg_common::TripId;

use crate::logging::event_names;
use crate::model::TransitionGraph;
use crate::state::{Quantizer, State, StateInterner};
use crate::trajectory::{TrajectoryPoint, Trip};

/// One signal value and the sample it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub point: TrajectoryPoint,
    pub dissimilarity: f64,
}

/// Dissimilarity signal of one trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub trip_id: TripId,
    pub points: Vec<SignalPoint>,
}

impl Signal {
    pub fn new(trip_id: TripId) -> Self {
        Self {
            trip_id,
            points: Vec::new(),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.dissimilarity).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Scores trips against a regularized graph.
///
/// Borrows the graph and interning table read-only; both must be complete
/// before any trip is transformed.
#[derive(Debug, Clone)]
pub struct SignalTransformer<'a> {
    graph: &'a TransitionGraph,
    interner: &'a StateInterner,
    quantizer: Quantizer,
    scaler: FeatureScaler,
    fallback: f64,
}

impl<'a> SignalTransformer<'a> {
    pub fn new(
        graph: &'a TransitionGraph,
        interner: &'a StateInterner,
        quantizer: Quantizer,
        scaler: FeatureScaler,
    ) -> Self {
        Self {
            graph,
            interner,
            quantizer,
            scaler,
            fallback: graph.mean_weight().unwrap_or(0.0),
        }
    }

    /// Value used when the previous state has no outgoing distribution.
    pub fn fallback_value(&self) -> f64 {
        self.fallback
    }

    /// Dissimilarity of moving from `prev` to `curr`.
    pub fn dissimilarity(&self, prev: &State, curr: &State, ctx: &mut TransformContext) -> f64 {
        if prev == curr {
            return 0.0;
        }
        ctx.state_changes += 1;

        let row = self
            .interner
            .get(prev)
            .and_then(|id| self.graph.row(id).map(|row| (id, row)));
        let Some((prev_id, row)) = row else {
            ctx.fallback_count += 1;
            debug!(target: event_names::TRANSFORM_FALLBACK, state = %prev, "No transitions known for state");
            return self.fallback;
        };

        row.iter()
            .filter(|(&dst, _)| dst != prev_id)
            .map(|(&dst, &prob)| self.scaler.distance(curr, &self.interner[dst]) * prob)
            .sum()
    }

    /// Transform one trip, counting into `ctx`.
    pub fn transform_trip(&self, trip: &Trip, ctx: &mut TransformContext) -> Signal {
        let mut signal = Signal::new(trip.id.clone());
        ctx.trips += 1;

        let mut states = trip.points.iter().map(|p| self.quantizer.quantize_point(p));
        let Some(mut prev) = states.next() else {
            return signal;
        };

        for (point, curr) in trip.points.iter().skip(1).zip(states) {
            let dissimilarity = self.dissimilarity(&prev, &curr, ctx);
            signal.points.push(SignalPoint {
                point: *point,
                dissimilarity,
            });
            ctx.steps += 1;
            prev = curr;
        }

        signal
    }

    /// Transform every trip with at least `min_trip_length` points.
    ///
    /// Returns the signals in trip order and the merged per-trip contexts.
    pub fn transform_all(
        &self,
        trips: &[Trip],
        min_trip_length: usize,
    ) -> (Vec<Signal>, TransformContext) {
        let mut signals = Vec::with_capacity(trips.len());
        let mut total = TransformContext::new();

        for trip in trips.iter().filter(|t| t.len() >= min_trip_length) {
            let mut ctx = TransformContext::new();
            signals.push(self.transform_trip(trip, &mut ctx));
            total.merge(&ctx);
        }

        (signals, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::point;
    use trajseg_common::StateId;

    /// Graph over (10,0.25,90) → {(11,0.25,90): 0.75, (12,0.25,90): 0.25}
    /// plus a stationary state (20,0.0,0) with its self-loop.
    fn fixture() -> (TransitionGraph, StateInterner) {
        let mut interner = StateInterner::new();
        let a = interner.intern(State::new(10, 0.25, 90));
        let b = interner.intern(State::new(11, 0.25, 90));
        let c = interner.intern(State::new(12, 0.25, 90));
        let s = interner.intern(State::new(20, 0.0, 0));
        let mut graph = TransitionGraph::new();
        graph.set_weight(a, b, 0.75);
        graph.set_weight(a, c, 0.25);
        graph.set_weight(s, s, 1.0);
        graph.set_weight(s, a, 1.0);
        (graph, interner)
    }

    fn trip(points: Vec<TrajectoryPoint>) -> Trip {
        Trip {
            id: "t".into(),
            points,
        }
    }

    #[test]
    fn unchanged_state_scores_zero() {
        let (graph, interner) = fixture();
        let tf = SignalTransformer::new(&graph, &interner, Quantizer::default(), FeatureScaler::default());
        let mut ctx = TransformContext::new();
        let signal = tf.transform_trip(
            &trip(vec![point(0, 10.2, 0.3, 90.1), point(1, 10.9, 0.2, 89.8)]),
            &mut ctx,
        );
        assert_eq!(signal.values(), vec![0.0]);
        assert_eq!(ctx.state_changes, 0);
        assert_eq!(ctx.steps, 1);
    }

    #[test]
    fn expected_distance_over_known_row() {
        let (graph, interner) = fixture();
        let scaler = FeatureScaler::default();
        let tf = SignalTransformer::new(&graph, &interner, Quantizer::default(), scaler);
        let mut ctx = TransformContext::new();
        let signal = tf.transform_trip(
            &trip(vec![point(0, 10.0, 0.25, 90.0), point(1, 13.0, 0.25, 90.0)]),
            &mut ctx,
        );
        let curr = State::new(13, 0.25, 90);
        let expected = 0.75 * scaler.distance(&curr, &State::new(11, 0.25, 90))
            + 0.25 * scaler.distance(&curr, &State::new(12, 0.25, 90));
        assert!((signal.values()[0] - expected).abs() < 1e-12);
        assert_eq!(ctx.fallback_count, 0);
    }

    #[test]
    fn self_loop_excluded_from_expectation() {
        let (graph, interner) = fixture();
        let scaler = FeatureScaler::default();
        let tf = SignalTransformer::new(&graph, &interner, Quantizer::default(), scaler);
        let mut ctx = TransformContext::new();
        let prev = State::new(20, 0.0, 0);
        let curr = State::new(21, 0.0, 0);
        let value = tf.dissimilarity(&prev, &curr, &mut ctx);
        let expected = scaler.distance(&curr, &State::new(10, 0.25, 90));
        assert!((value - expected).abs() < 1e-12);
    }

    #[test]
    fn unseen_state_uses_mean_weight_once_per_occurrence() {
        let (graph, interner) = fixture();
        let tf = SignalTransformer::new(&graph, &interner, Quantizer::default(), FeatureScaler::default());
        let mean = (0.75 + 0.25 + 1.0 + 1.0) / 4.0;
        assert_eq!(tf.fallback_value(), mean);

        // "10&0.0&90" has no row and is the previous state twice.
        let mut ctx = TransformContext::new();
        let signal = tf.transform_trip(
            &trip(vec![
                point(0, 10.0, 0.0, 90.0),
                point(1, 10.0, 0.25, 90.0),
                point(2, 10.0, 0.0, 90.0),
                point(3, 40.0, 1.0, 180.0),
            ]),
            &mut ctx,
        );
        let values = signal.values();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], mean);
        assert_ne!(values[1], mean);
        assert_eq!(values[2], mean);
        assert_eq!(ctx.fallback_count, 2);
        assert_eq!(ctx.state_changes, 3);
    }

    #[test]
    fn first_point_has_no_value_and_short_trips_are_filtered() {
        let (graph, interner) = fixture();
        let tf = SignalTransformer::new(&graph, &interner, Quantizer::default(), FeatureScaler::default());
        let trips = vec![
            Trip {
                id: "one".into(),
                points: vec![point(0, 1.0, 0.0, 0.0)],
            },
            Trip {
                id: "three".into(),
                points: vec![point(0, 1.0, 0.0, 0.0), point(1, 1.0, 0.0, 0.0), point(2, 1.0, 0.0, 0.0)],
            },
        ];
        let (signals, ctx) = tf.transform_all(&trips, 1);
        assert_eq!(signals.len(), 2);
        assert!(signals[0].is_empty());
        assert_eq!(signals[1].len(), 2);
        assert_eq!(signals[1].points[0].point.time_step, 1);
        assert_eq!(ctx.trips, 2);

        let (signals, ctx) = tf.transform_all(&trips, 2);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].trip_id.as_str(), "three");
        assert_eq!(ctx.trips, 1);
    }

    #[test]
    fn ids_resolve_through_interner() {
        let (graph, interner) = fixture();
        assert_eq!(interner.get(&State::new(10, 0.0, 90)), None);
        assert!(graph.contains_source(StateId(0)));
    }
}
