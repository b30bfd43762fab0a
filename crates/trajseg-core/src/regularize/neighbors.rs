//! Lattice neighborhoods of a state.
//!
//! A neighborhood is every lattice offset within the configured speed,
//! acceleration and heading radii, minus offsets rejected by the physical
//! rules below. [`neighbors`] yields it lazily; the iterator is finite and
//! can be cloned to restart from any point.

use trajseg_config::{QuantizationConfig, RegularizationConfig};
use trajseg_math::wrap_degrees;

use crate::state::{round_to_step, State};

/// Radii and strides of the neighborhood lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborhoodSpec {
    /// Speed offsets run over `-max_speed_delta..=max_speed_delta`, stride 1.
    pub max_speed_delta: i64,
    /// Acceleration stride (the quantization step).
    pub accel_step: f64,
    /// Number of acceleration strides on each side of the center.
    pub accel_ticks: i64,
    /// Heading stride in degrees. Taken from the regularization settings and
    /// independent of the quantizer's `heading_bin`.
    pub heading_stride: i64,
    /// Number of heading strides on each side of the center.
    pub heading_ticks: i64,
}

impl NeighborhoodSpec {
    pub fn from_config(regularization: &RegularizationConfig, quantization: &QuantizationConfig) -> Self {
        let accel_step = quantization.accel_step;
        let heading_stride = i64::from(regularization.heading_stride.max(1));
        Self {
            max_speed_delta: i64::from(regularization.max_speed_delta),
            accel_step,
            accel_ticks: (regularization.max_accel_delta / accel_step + 1e-9).floor() as i64,
            heading_stride,
            heading_ticks: i64::from(regularization.max_heading_delta) / heading_stride,
        }
    }

    /// Upper bound on the neighbors of any state.
    pub fn lattice_size(&self) -> usize {
        let side = |n: i64| (2 * n + 1) as usize;
        side(self.max_speed_delta) * side(self.accel_ticks) * side(self.heading_ticks) - 1
    }
}

impl Default for NeighborhoodSpec {
    fn default() -> Self {
        Self::from_config(&RegularizationConfig::default(), &QuantizationConfig::default())
    }
}

/// Displacement from a center state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offset {
    pub speed: i64,
    pub accel: f64,
    pub heading: i64,
}

impl Offset {
    pub fn is_zero(&self) -> bool {
        self.speed == 0 && self.accel == 0.0 && self.heading == 0
    }

    /// `sqrt(speed² + k·accel² + heading²)`.
    pub fn weighted_distance(&self, accel_influence: f64) -> f64 {
        let s = self.speed as f64;
        let h = self.heading as f64;
        (s * s + accel_influence * self.accel * self.accel + h * h).sqrt()
    }

    /// Share of a transition's probability handed to a neighbor at this
    /// offset: `1 / (distance + 1)`.
    pub fn influence(&self, accel_influence: f64) -> f64 {
        1.0 / (self.weighted_distance(accel_influence) + 1.0)
    }
}

/// Speed and acceleration may not move in opposite directions.
pub fn sign_consistent(offset: &Offset) -> bool {
    offset.speed as f64 * offset.accel >= 0.0
}

/// Neither speed nor (unwrapped) heading may go below zero.
pub fn stays_non_negative(center: &State, offset: &Offset) -> bool {
    center.speed + offset.speed >= 0 && center.heading + offset.heading >= 0
}

/// A neighbor state and the offset that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub state: State,
    pub offset: Offset,
}

/// Lazy iterator over the neighbors of a state.
///
/// Offsets are visited speed-major, then acceleration, then heading, each
/// from the most negative value upward. The center itself is never yielded.
#[derive(Debug, Clone)]
pub struct Neighbors {
    center: State,
    spec: NeighborhoodSpec,
    speed: i64,
    tick: i64,
    heading: i64,
    done: bool,
}

/// Neighbors of `center` under `spec`.
pub fn neighbors(center: State, spec: &NeighborhoodSpec) -> Neighbors {
    Neighbors {
        center,
        spec: *spec,
        speed: -spec.max_speed_delta,
        tick: -spec.accel_ticks,
        heading: -spec.heading_ticks,
        done: spec.max_speed_delta < 0 || spec.accel_ticks < 0 || spec.heading_ticks < 0,
    }
}

impl Neighbors {
    fn advance(&mut self) {
        self.heading += 1;
        if self.heading > self.spec.heading_ticks {
            self.heading = -self.spec.heading_ticks;
            self.tick += 1;
            if self.tick > self.spec.accel_ticks {
                self.tick = -self.spec.accel_ticks;
                self.speed += 1;
                if self.speed > self.spec.max_speed_delta {
                    self.done = true;
                }
            }
        }
    }

    fn neighbor_at(&self, offset: Offset) -> State {
        State::new(
            self.center.speed + offset.speed,
            round_to_step(self.center.acceleration + offset.accel, self.spec.accel_step),
            wrap_degrees(self.center.heading + offset.heading),
        )
    }
}

impl Iterator for Neighbors {
    type Item = Neighbor;

    fn next(&mut self) -> Option<Neighbor> {
        while !self.done {
            let offset = Offset {
                speed: self.speed,
                accel: self.tick as f64 * self.spec.accel_step,
                heading: self.heading * self.spec.heading_stride,
            };
            self.advance();

            if offset.is_zero()
                || !sign_consistent(&offset)
                || !stays_non_negative(&self.center, &offset)
            {
                continue;
            }
            return Some(Neighbor {
                state: self.neighbor_at(offset),
                offset,
            });
        }
        None
    }
}

impl std::iter::FusedIterator for Neighbors {}
