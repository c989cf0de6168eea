//! Hex coordinate system for the game board.
//!
//! Uses offset "odd-q" coordinates where odd columns are shifted down by half
//! a cell. Cells are drawn as flat-top hexagons.

use serde::{Deserialize, Serialize};

/// √3, used by the pixel projection.
const SQRT_3: f32 = 1.732_050_8;

/// Offset coordinates of a board cell (odd-q).
///
/// - `q` is the column (x-axis)
/// - `r` is the row (y-axis)
/// - Odd columns are shifted down by half a cell
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct HexCoord {
    /// Column coordinate
    pub q: i32,
    /// Row coordinate
    pub r: i32,
}

impl PartialOrd for HexCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HexCoord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major ordering for deterministic iteration
        (self.r, self.q).cmp(&(other.r, other.q))
    }
}

impl HexCoord {
    /// Create a new hex coordinate.
    #[inline]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Get all 6 neighboring cells in clockwise order starting from northeast.
    ///
    /// Returns neighbors in order: NE, E, SE, SW, W, NW. The row shift of the
    /// diagonal neighbors depends on the parity of the column.
    pub fn neighbors(&self) -> [HexCoord; 6] {
        let offset = self.q & 1;

        [
            // NE
            HexCoord::new(self.q + 1, self.r - 1 + offset),
            // E
            HexCoord::new(self.q + 1, self.r + offset),
            // SE
            HexCoord::new(self.q, self.r + 1),
            // SW
            HexCoord::new(self.q - 1, self.r + offset),
            // W
            HexCoord::new(self.q - 1, self.r - 1 + offset),
            // NW
            HexCoord::new(self.q, self.r - 1),
        ]
    }

    /// Calculate the distance to another cell (in hex steps).
    pub fn distance(&self, other: &HexCoord) -> u32 {
        let (x1, y1, z1) = self.to_cube();
        let (x2, y2, z2) = other.to_cube();

        let dx = (x1 - x2).abs();
        let dy = (y1 - y2).abs();
        let dz = (z1 - z2).abs();

        dx.max(dy).max(dz) as u32
    }

    /// Convert offset coordinates to cube coordinates.
    ///
    /// Cube coordinates satisfy x + y + z = 0.
    pub fn to_cube(&self) -> (i32, i32, i32) {
        let x = self.q;
        let z = self.r - (self.q - (self.q & 1)) / 2;
        let y = -x - z;
        (x, y, z)
    }

    /// Project the cell center into pixel space for hexagons of the given
    /// outer radius.
    pub fn to_pixel(&self, size: f32) -> (f32, f32) {
        let x = size * 1.5 * self.q as f32;
        let y = size * SQRT_3 * (self.r as f32 + 0.5 * (self.q & 1) as f32);
        (x, y)
    }

    /// Get all cells within a given radius (inclusive).
    pub fn hexes_in_radius(&self, radius: u32) -> Vec<HexCoord> {
        let mut result = Vec::new();
        let r = radius as i32;

        for dq in -r..=r {
            for dr in -r - 1..=r + 1 {
                let candidate = HexCoord::new(self.q + dq, self.r + dr);
                if self.distance(&candidate) <= radius {
                    result.push(candidate);
                }
            }
        }

        result
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let coord = HexCoord::new(3, 5);
        assert_eq!(coord.q, 3);
        assert_eq!(coord.r, 5);
    }

    #[test]
    fn test_neighbors_even_column() {
        let n = HexCoord::new(2, 2).neighbors();
        assert_eq!(
            n,
            [
                HexCoord::new(3, 1),
                HexCoord::new(3, 2),
                HexCoord::new(2, 3),
                HexCoord::new(1, 2),
                HexCoord::new(1, 1),
                HexCoord::new(2, 1),
            ]
        );
    }

    #[test]
    fn test_neighbors_odd_column() {
        let n = HexCoord::new(3, 2).neighbors();
        assert_eq!(
            n,
            [
                HexCoord::new(4, 2),
                HexCoord::new(4, 3),
                HexCoord::new(3, 3),
                HexCoord::new(2, 3),
                HexCoord::new(2, 2),
                HexCoord::new(3, 1),
            ]
        );
    }

    #[test]
    fn test_neighbors_are_symmetric() {
        for q in 0..6 {
            for r in 0..6 {
                let c = HexCoord::new(q, r);
                for n in c.neighbors() {
                    assert!(n.neighbors().contains(&c), "{} <-> {}", c, n);
                }
            }
        }
    }

    #[test]
    fn test_distance_neighbors() {
        let coord = HexCoord::new(5, 5);
        assert_eq!(coord.distance(&coord), 0);
        for neighbor in coord.neighbors() {
            assert_eq!(coord.distance(&neighbor), 1);
        }
    }

    #[test]
    fn test_hexes_in_radius() {
        let center = HexCoord::new(5, 5);
        assert_eq!(center.hexes_in_radius(0), vec![center]);

        let radius_1 = center.hexes_in_radius(1);
        assert_eq!(radius_1.len(), 7);
        for n in center.neighbors() {
            assert!(radius_1.contains(&n));
        }

        assert_eq!(HexCoord::new(4, 4).hexes_in_radius(2).len(), 19);
    }

    #[test]
    fn test_cube_coordinates_sum_to_zero() {
        for q in -3..4 {
            for r in -3..4 {
                let (x, y, z) = HexCoord::new(q, r).to_cube();
                assert_eq!(x + y + z, 0);
            }
        }
    }

    #[test]
    fn test_to_pixel() {
        assert_eq!(HexCoord::new(0, 0).to_pixel(10.0), (0.0, 0.0));

        let (x, y) = HexCoord::new(1, 0).to_pixel(10.0);
        assert!((x - 15.0).abs() < 1e-4);
        assert!((y - 8.660254).abs() < 1e-4);

        let (x, y) = HexCoord::new(2, 1).to_pixel(10.0);
        assert!((x - 30.0).abs() < 1e-4);
        assert!((y - 17.320508).abs() < 1e-4);
    }

    #[test]
    fn test_ordering_is_row_major() {
        let mut coords = vec![HexCoord::new(1, 1), HexCoord::new(0, 2), HexCoord::new(2, 0)];
        coords.sort();
        assert_eq!(
            coords,
            vec![HexCoord::new(2, 0), HexCoord::new(1, 1), HexCoord::new(0, 2)]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", HexCoord::new(3, 7)), "(3, 7)");
    }
}
