//! Normalized feature distance between states.

use trajseg_config::{FeatureRange, FeatureRanges};
use trajseg_math::{circular_distance_deg, min_max_scale};

use crate::state::State;

/// Euclidean distance over min-max scaled speed, acceleration and circular
/// heading difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureScaler {
    speed: FeatureRange,
    acceleration: FeatureRange,
    heading: FeatureRange,
}

impl FeatureScaler {
    pub fn new(ranges: &FeatureRanges) -> Self {
        Self {
            speed: ranges.speed,
            acceleration: ranges.acceleration,
            heading: ranges.heading,
        }
    }

    pub fn distance(&self, a: &State, b: &State) -> f64 {
        let speed = scaled(a.speed as f64, &self.speed) - scaled(b.speed as f64, &self.speed);
        let accel = scaled(a.acceleration, &self.acceleration)
            - scaled(b.acceleration, &self.acceleration);
        let heading = scaled(
            circular_distance_deg(a.heading as f64, b.heading as f64),
            &self.heading,
        );
        (speed * speed + accel * accel + heading * heading).sqrt()
    }
}

impl Default for FeatureScaler {
    fn default() -> Self {
        Self::new(&FeatureRanges::default())
    }
}

fn scaled(value: f64, range: &FeatureRange) -> f64 {
    min_max_scale(value, range.min, range.max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_states_are_zero_apart() {
        let s = State::new(40, 1.25, 200);
        assert_eq!(FeatureScaler::default().distance(&s, &s), 0.0);
    }

    #[test]
    fn each_axis_scales_by_its_range() {
        let f = FeatureScaler::default();
        let base = State::new(0, 0.0, 0);
        assert!((f.distance(&base, &State::new(18, 0.0, 0)) - 0.1).abs() < 1e-12);
        assert!((f.distance(&base, &State::new(0, 3.5, 0)) - 0.1).abs() < 1e-12);
        assert!((f.distance(&base, &State::new(0, 0.0, 18)) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn heading_uses_short_way_round() {
        let f = FeatureScaler::default();
        let a = State::new(10, 0.0, 350);
        let b = State::new(10, 0.0, 10);
        assert!((f.distance(&a, &b) - 20.0 / 180.0).abs() < 1e-12);
    }

    #[test]
    fn distance_is_symmetric() {
        let f = FeatureScaler::default();
        let a = State::new(33, -1.5, 12);
        let b = State::new(70, 2.25, 300);
        assert_eq!(f.distance(&a, &b), f.distance(&b, &a));
    }
}
