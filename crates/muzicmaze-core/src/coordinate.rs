use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a hex cell on a skewed two-axis grid.
///
/// See <https://www.redblobgames.com/grids/hexagons/#coordinates-axial>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AxialCoordinate {
    pub q: i32,
    pub r: i32,
}

/// The six unit steps, in canonical scan order.
pub const AXIAL_DIRECTIONS: [AxialCoordinate; 6] = [
    AxialCoordinate::new(1, 0),
    AxialCoordinate::new(1, -1),
    AxialCoordinate::new(0, -1),
    AxialCoordinate::new(-1, 0),
    AxialCoordinate::new(-1, 1),
    AxialCoordinate::new(0, 1),
];

/// Height at which cells are laid out in world space.
const WORLD_ELEVATION: f64 = 1.5;

/// Centre of a cell in the rendering layer's 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AxialCoordinate {
    pub const ORIGIN: AxialCoordinate = AxialCoordinate::new(0, 0);

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Canonical store key, `"(q, r)"`.
    pub fn key(&self) -> String {
        format!("({}, {})", self.q, self.r)
    }

    pub fn neighbor(&self, direction: AxialCoordinate) -> AxialCoordinate {
        AxialCoordinate::new(self.q + direction.q, self.r + direction.r)
    }

    pub fn neighbors(&self) -> [AxialCoordinate; 6] {
        AXIAL_DIRECTIONS.map(|direction| self.neighbor(direction))
    }

    /// Vector pointing from `other` to `self`.
    pub fn offset_from(&self, other: &AxialCoordinate) -> AxialCoordinate {
        AxialCoordinate::new(self.q - other.q, self.r - other.r)
    }

    /// Minimum number of single-cell steps between two coordinates.
    pub fn distance(&self, other: &AxialCoordinate) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let ds = (self.q + self.r - other.q - other.r).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        (dq + ds + dr) / 2
    }

    /// True when both vectors lie on the same axis, pointing the same way or opposite.
    pub fn is_collinear(&self, other: &AxialCoordinate) -> bool {
        let same = self.q == other.q && self.r == other.r;
        let opposite = self.q + other.q == 0 && self.r + other.r == 0;
        same || opposite
    }

    /// Flat-top hex-to-pixel conversion.
    ///
    /// See <https://www.redblobgames.com/grids/hexagons/#hex-to-pixel>.
    pub fn world_position(&self, hex_size: f64) -> WorldPosition {
        let q = f64::from(self.q);
        let r = f64::from(self.r);
        let sqrt3 = 3f64.sqrt();
        WorldPosition {
            x: hex_size * (3.0 / 2.0 * q),
            y: WORLD_ELEVATION,
            z: hex_size * (sqrt3 / 2.0 * q + sqrt3 * r),
        }
    }
}

impl fmt::Display for AxialCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_distance_is_symmetric_and_non_negative() {
        let a = AxialCoordinate::new(2, -1);
        let b = AxialCoordinate::new(-1, 3);
        assert_eq!(a.distance(&b), b.distance(&a));
        assert_eq!(a.distance(&a), 0);
        assert_eq!(a.distance(&b), 4);
    }

    #[test]
    fn test_every_direction_is_one_step_away() {
        for direction in AXIAL_DIRECTIONS {
            assert_eq!(AxialCoordinate::ORIGIN.neighbor(direction).distance(&AxialCoordinate::ORIGIN), 1);
        }
    }

    #[test]
    fn test_neighbors_follow_canonical_order() {
        let center = AxialCoordinate::new(3, -2);
        let neighbors = center.neighbors();
        assert_eq!(neighbors[0], AxialCoordinate::new(4, -2));
        assert_eq!(neighbors[1], AxialCoordinate::new(4, -3));
        assert_eq!(neighbors[5], AxialCoordinate::new(3, -1));
    }

    #[test]
    fn test_collinearity() {
        let east = AXIAL_DIRECTIONS[0];
        let west = AXIAL_DIRECTIONS[3];
        let north_east = AXIAL_DIRECTIONS[1];
        assert!(east.is_collinear(&east));
        assert!(east.is_collinear(&west));
        assert!(!east.is_collinear(&north_east));
    }

    #[test]
    fn test_key_is_injective_over_a_patch() {
        let mut keys = HashSet::new();
        for q in -10..=10 {
            for r in -10..=10 {
                assert!(keys.insert(AxialCoordinate::new(q, r).key()));
            }
        }
        assert_eq!(AxialCoordinate::new(-1, 12).key(), AxialCoordinate::new(-1, 12).key());
        assert_ne!(AxialCoordinate::new(1, 12).key(), AxialCoordinate::new(11, 2).key());
        assert_eq!(AxialCoordinate::new(-1, 2).key(), "(-1, 2)");
    }

    #[test]
    fn test_world_position() {
        let origin = AxialCoordinate::ORIGIN.world_position(1.5);
        assert_eq!(origin, WorldPosition { x: 0.0, y: 1.5, z: 0.0 });

        let p = AxialCoordinate::new(2, 0).world_position(1.5);
        assert!((p.x - 4.5).abs() < 1e-9);
        assert!((p.z - 1.5 * 3f64.sqrt()).abs() < 1e-9);
    }
}
