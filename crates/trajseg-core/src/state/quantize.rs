//! Deterministic quantization of raw kinematics into states.

use trajseg_config::QuantizationConfig;
use trajseg_math::wrap_degrees;

use super::{parse_state_key, State, StateKeyError};
use crate::trajectory::TrajectoryPoint;

/// Round `value` to the nearest multiple of `step`, halves rounding up.
///
/// `-0.125` with step `0.25` rounds to `0.0`, never `-0.0`.
pub fn round_to_step(value: f64, step: f64) -> f64 {
    let rounded = (value / step + 0.5).floor() * step;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Maps raw `(speed, acceleration, heading)` measurements onto the state
/// lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    accel_step: f64,
    heading_bin: i64,
}

impl Quantizer {
    pub fn new(accel_step: f64, heading_bin: u32) -> Self {
        Self {
            accel_step,
            heading_bin: i64::from(heading_bin.max(1)),
        }
    }

    pub fn from_config(config: &QuantizationConfig) -> Self {
        Self::new(config.accel_step, config.heading_bin)
    }

    pub fn accel_step(&self) -> f64 {
        self.accel_step
    }

    pub fn heading_bin(&self) -> i64 {
        self.heading_bin
    }

    /// Speed is truncated toward zero, acceleration rounded to the nearest
    /// step, heading rounded to the nearest bin and wrapped into `[0, 360)`.
    pub fn quantize(&self, speed: f64, acceleration: f64, heading: f64) -> State {
        State::new(
            speed.trunc() as i64,
            self.quantize_acceleration(acceleration),
            self.quantize_heading(heading),
        )
    }

    pub fn quantize_point(&self, point: &TrajectoryPoint) -> State {
        self.quantize(point.speed, point.acceleration, point.heading)
    }

    pub fn quantize_acceleration(&self, acceleration: f64) -> f64 {
        round_to_step(acceleration, self.accel_step)
    }

    pub fn quantize_heading(&self, heading: f64) -> i64 {
        let bins = (heading / self.heading_bin as f64 + 0.5).floor() as i64;
        wrap_degrees(bins * self.heading_bin)
    }

    /// Read a state key and re-quantize it.
    ///
    /// Idempotent on keys this quantizer wrote, so keys round-trip exactly.
    pub fn parse_key(&self, key: &str) -> Result<State, StateKeyError> {
        let raw = parse_state_key(key)?;
        Ok(self.quantize(raw.speed, raw.acceleration, raw.heading))
    }
}

impl Default for Quantizer {
    fn default() -> Self {
        Self::from_config(&QuantizationConfig::default())
    }
}
