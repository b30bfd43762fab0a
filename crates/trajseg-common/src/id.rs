//! Identity types for states and trips.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interned state identifier.
///
/// Ids are dense indices assigned in first-seen order; they are only
/// meaningful relative to the interning table that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub u32);

impl StateId {
    /// Position of this id in arena-backed storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StateId {
    fn from(id: u32) -> Self {
        StateId(id)
    }
}

/// Trip identifier as it appears in the input files.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(pub String);

impl TripId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TripId {
    fn from(s: &str) -> Self {
        TripId(s.to_string())
    }
}

impl From<String> for TripId {
    fn from(s: String) -> Self {
        TripId(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_id_orders_by_value() {
        assert!(StateId(1) < StateId(2));
        assert_eq!(StateId(7).index(), 7);
    }

    #[test]
    fn ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&StateId(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&TripId::from("trip-9")).unwrap(),
            "\"trip-9\""
        );
    }
}
