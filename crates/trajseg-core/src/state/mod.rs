//! Discrete motion states.
//!
//! A [`State`] is a quantized `(speed, acceleration, heading)` triple. Its only
//! serialized form is the state key `speed&acceleration&heading`, e.g.
//! `42&-0.25&90`. Acceleration always prints with a fractional part (`0.0`,
//! `1.5`) so keys written by any stage compare equal as strings.

pub mod interner;
pub mod quantize;

pub use interner::StateInterner;
pub use quantize::{round_to_step, Quantizer};

use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Separator between the three fields of a state key.
pub const KEY_SEPARATOR: char = '&';

/// A quantized motion state.
///
/// Values are expected to already sit on the quantization lattice; use
/// [`Quantizer`] to build states from raw measurements.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct State {
    pub speed: i64,
    pub acceleration: f64,
    pub heading: i64,
}

impl State {
    /// Build a state from lattice values. `-0.0` acceleration is stored as `0.0`.
    pub fn new(speed: i64, acceleration: f64, heading: i64) -> Self {
        Self {
            speed,
            acceleration: if acceleration == 0.0 { 0.0 } else { acceleration },
            heading,
        }
    }

    /// Zero acceleration marks a stationary state, which keeps a self-loop
    /// probability of 1.0.
    pub fn is_stationary(&self) -> bool {
        self.acceleration == 0.0
    }

    /// Serialized state key.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.speed == other.speed
            && self.acceleration.to_bits() == other.acceleration.to_bits()
            && self.heading == other.heading
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.speed.hash(state);
        self.acceleration.to_bits().hash(state);
        self.heading.hash(state);
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.speed, KEY_SEPARATOR)?;
        write_acceleration(f, self.acceleration)?;
        write!(f, "{}{}", KEY_SEPARATOR, self.heading)
    }
}

fn write_acceleration(f: &mut fmt::Formatter<'_>, accel: f64) -> fmt::Result {
    let accel = if accel == 0.0 { 0.0 } else { accel };
    if accel.fract() == 0.0 && accel.abs() < 1e15 {
        write!(f, "{:.1}", accel)
    } else {
        write!(f, "{}", accel)
    }
}

/// Why a state key could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateKeyError {
    #[error("state key has {0} fields, expected 3")]
    FieldCount(usize),

    #[error("state key field {field} is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("state key field {field} is not finite")]
    NonFinite { field: &'static str },
}

/// Raw numeric fields of a state key, before re-quantization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawStateKey {
    pub speed: f64,
    pub acceleration: f64,
    pub heading: f64,
}

/// Split and parse a state key without quantizing it.
pub fn parse_state_key(key: &str) -> Result<RawStateKey, StateKeyError> {
    let fields: Vec<&str> = key.split(KEY_SEPARATOR).collect();
    if fields.len() != 3 {
        return Err(StateKeyError::FieldCount(fields.len()));
    }
    Ok(RawStateKey {
        speed: parse_field("speed", fields[0])?,
        acceleration: parse_field("acceleration", fields[1])?,
        heading: parse_field("heading", fields[2])?,
    })
}

fn parse_field(field: &'static str, value: &str) -> Result<f64, StateKeyError> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| StateKeyError::NotANumber {
            field,
            value: value.to_string(),
        })?;
    if !parsed.is_finite() {
        return Err(StateKeyError::NonFinite { field });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_prints_acceleration_with_fraction() {
        assert_eq!(State::new(10, 0.0, 90).key(), "10&0.0&90");
        assert_eq!(State::new(42, -0.25, 359).key(), "42&-0.25&359");
        assert_eq!(State::new(3, 2.0, 0).key(), "3&2.0&0");
        assert_eq!(State::new(3, 1.5, 7).key(), "3&1.5&7");
    }

    #[test]
    fn negative_zero_is_normalized() {
        let a = State::new(5, -0.0, 10);
        let b = State::new(5, 0.0, 10);
        assert_eq!(a, b);
        assert_eq!(a.key(), "5&0.0&10");
        assert!(a.is_stationary());
    }

    #[test]
    fn parse_rejects_malformed_keys() {
        assert_eq!(parse_state_key("1&2"), Err(StateKeyError::FieldCount(2)));
        assert!(matches!(
            parse_state_key("a&0.0&1"),
            Err(StateKeyError::NotANumber { field: "speed", .. })
        ));
        assert_eq!(
            parse_state_key("1&NaN&1"),
            Err(StateKeyError::NonFinite {
                field: "acceleration"
            })
        );
    }

    #[test]
    fn parse_reads_raw_values() {
        let raw = parse_state_key("12&-0.75&180").unwrap();
        assert_eq!(raw.speed, 12.0);
        assert_eq!(raw.acceleration, -0.75);
        assert_eq!(raw.heading, 180.0);
    }
}
