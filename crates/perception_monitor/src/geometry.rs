use serde::{Deserialize, Serialize};

/// Position of a static perceivable object, captured once at setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Exact-bit key for map lookups. Objects are static, so the bits
    /// captured at setup identify the object for the whole run.
    pub fn key(&self) -> LocationKey {
        LocationKey([self.x.to_bits(), self.y.to_bits(), self.z.to_bits()])
    }
}

/// Orderable, hashable stand-in for a `Location` used as a map key.
///
/// Built from the raw bit patterns of the three coordinates, so equality is
/// exact and independent of float comparison semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocationKey([u64; 3]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_coordinates_share_a_key() {
        let a = Location::new(1.5, -2.0, 0.25);
        let b = Location::new(1.5, -2.0, 0.25);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn distinct_coordinates_have_distinct_keys() {
        let a = Location::new(0.0, 0.0, 0.0);
        let b = Location::new(0.0, 0.0, f64::MIN_POSITIVE);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn negative_zero_is_a_distinct_key() {
        // Bit-exact identity: -0.0 and 0.0 are different objects if the
        // environment ever reports both, matching capture-time bits.
        let a = Location::new(0.0, 0.0, 0.0);
        let b = Location::new(-0.0, 0.0, 0.0);
        assert_ne!(a.key(), b.key());
    }
}
