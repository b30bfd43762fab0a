//! Trajectory samples and trip grouping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use trajseg_common::TripId;

/// One GPS sample. Latitude and longitude are passthrough attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub time_step: i64,
    pub speed: f64,
    pub acceleration: f64,
    pub heading: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// All samples of one trip, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub points: Vec<TrajectoryPoint>,
}

impl Trip {
    pub fn new(id: impl Into<TripId>) -> Self {
        Self {
            id: id.into(),
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consecutive sample pairs `(previous, current)`.
    pub fn steps(&self) -> impl Iterator<Item = (&TrajectoryPoint, &TrajectoryPoint)> {
        self.points.iter().zip(self.points.iter().skip(1))
    }
}

/// Group samples by trip id.
///
/// Trips are returned in order of first appearance and samples keep their
/// input order within a trip, even when trips are interleaved in the input.
pub fn group_trips<I>(records: I) -> Vec<Trip>
where
    I: IntoIterator<Item = (TripId, TrajectoryPoint)>,
{
    let mut trips: Vec<Trip> = Vec::new();
    let mut index: HashMap<TripId, usize> = HashMap::new();

    for (trip_id, point) in records {
        let slot = match index.get(&trip_id) {
            Some(&slot) => slot,
            None => {
                index.insert(trip_id.clone(), trips.len());
                trips.push(Trip::new(trip_id));
                trips.len() - 1
            }
        };
        trips[slot].points.push(point);
    }

    trips
}

#[cfg(test)]
pub(crate) fn point(time_step: i64, speed: f64, acceleration: f64, heading: f64) -> TrajectoryPoint {
    TrajectoryPoint {
        time_step,
        speed,
        acceleration,
        heading,
        latitude: 0.0,
        longitude: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_interleaved_trips_in_first_seen_order() {
        let records = vec![
            (TripId::from("b"), point(0, 1.0, 0.0, 0.0)),
            (TripId::from("a"), point(0, 2.0, 0.0, 0.0)),
            (TripId::from("b"), point(1, 3.0, 0.0, 0.0)),
            (TripId::from("a"), point(1, 4.0, 0.0, 0.0)),
        ];
        let trips = group_trips(records);
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].id.as_str(), "b");
        assert_eq!(trips[1].id.as_str(), "a");
        let speeds: Vec<f64> = trips[0].points.iter().map(|p| p.speed).collect();
        assert_eq!(speeds, vec![1.0, 3.0]);
    }

    #[test]
    fn steps_pairs_consecutive_points() {
        let mut trip = Trip::new("t");
        trip.points = vec![point(0, 1.0, 0.0, 0.0), point(1, 2.0, 0.0, 0.0), point(2, 3.0, 0.0, 0.0)];
        let steps: Vec<(i64, i64)> = trip.steps().map(|(a, b)| (a.time_step, b.time_step)).collect();
        assert_eq!(steps, vec![(0, 1), (1, 2)]);
        assert_eq!(Trip::new("empty").steps().count(), 0);
    }
}
