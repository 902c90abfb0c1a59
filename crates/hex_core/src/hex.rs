//! Axial hex coordinates and hex/world conversion.
//!
//! Tiles are addressed with two-integer axial coordinates `(q, r)`. The
//! implicit third cube coordinate is `s = -q - r`. Nothing in this module
//! checks bounds: a coordinate is just a pair of integers, and whether a
//! tile exists there is the grid's business.
//!
//! # Layout
//!
//! [`HexLayout`] maps axial coordinates onto the X/Z ground plane:
//!
//! ```text
//! x = size * (√3 * q + √3/2 * r)
//! z = size * (3/2 * r)
//! ```
//!
//! # Example
//!
//! ```
//! use hex_core::hex::{HexCoord, HexLayout};
//!
//! let layout = HexLayout::default();
//! let coord = HexCoord::new(3, -2);
//! let world = layout.axial_to_world(coord);
//! assert_eq!(layout.world_to_axial(world), Some(coord));
//! assert_eq!(coord.distance(HexCoord::ORIGIN), 3);
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_decimal_serde, Fixed, Vec3Fixed, SQRT_3};

/// Axial offsets of the six neighbours, clockwise from East.
///
/// Order: East, North-East, North-West, West, South-West, South-East.
pub const NEIGHBOR_DIRECTIONS: [(i32, i32); 6] =
    [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Axial hex coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HexCoord {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

impl PartialOrd for HexCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HexCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        // Row-major ordering for deterministic iteration
        (self.r, self.q).cmp(&(other.r, other.q))
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

impl From<(i32, i32)> for HexCoord {
    fn from((q, r): (i32, i32)) -> Self {
        Self { q, r }
    }
}

impl HexCoord {
    /// The origin tile `(0, 0)`.
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// Create a new axial coordinate.
    #[inline]
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third cube axis, `-q - r`.
    #[inline]
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Convert to cube coordinates.
    #[must_use]
    pub const fn to_cube(self) -> CubeCoord {
        CubeCoord {
            x: self.q,
            y: self.s(),
            z: self.r,
        }
    }

    /// Hex-step distance to another coordinate.
    ///
    /// Half the Manhattan distance between the two cube coordinates.
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        let dq = i64::from(self.q) - i64::from(other.q);
        let dr = i64::from(self.r) - i64::from(other.r);
        let ds = -dq - dr;
        let steps = (dq.abs() + dr.abs() + ds.abs()) / 2;
        u32::try_from(steps).unwrap_or(u32::MAX)
    }

    /// The adjacent coordinate in `direction`.
    #[must_use]
    pub const fn neighbor(self, direction: HexDirection) -> Self {
        let (dq, dr) = direction.offset();
        Self::new(self.q + dq, self.r + dr)
    }

    /// All six adjacent coordinates, in [`NEIGHBOR_DIRECTIONS`] order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        NEIGHBOR_DIRECTIONS.map(|(dq, dr)| Self::new(self.q + dq, self.r + dr))
    }

    /// Coordinates exactly `radius` steps away, walking clockwise.
    ///
    /// A radius of zero yields only `self`.
    #[must_use]
    pub fn ring(self, radius: u32) -> Vec<Self> {
        if radius == 0 {
            return vec![self];
        }

        let radius = radius as i32;
        let (sw_q, sw_r) = HexDirection::SouthWest.offset();
        let mut current = Self::new(self.q + sw_q * radius, self.r + sw_r * radius);
        let mut results = Vec::with_capacity(6 * radius as usize);

        for direction in HexDirection::ALL {
            for _ in 0..radius {
                results.push(current);
                current = current.neighbor(direction);
            }
        }

        results
    }

    /// Every coordinate within `radius` steps, including `self`.
    #[must_use]
    pub fn range(self, radius: u32) -> Vec<Self> {
        let n = radius as i32;
        let mut results = Vec::new();
        for dq in -n..=n {
            let low = (-n).max(-dq - n);
            let high = n.min(-dq + n);
            for dr in low..=high {
                results.push(Self::new(self.q + dq, self.r + dr));
            }
        }
        results
    }
}

/// Cube coordinate, `x + y + z == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeCoord {
    /// Matches axial `q`.
    pub x: i32,
    /// Matches `-q - r`.
    pub y: i32,
    /// Matches axial `r`.
    pub z: i32,
}

impl CubeCoord {
    /// Convert back to axial coordinates.
    #[must_use]
    pub const fn to_axial(self) -> HexCoord {
        HexCoord::new(self.x, self.z)
    }
}

/// One of the six hex directions, clockwise from East.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexDirection {
    /// `(+1, 0)`
    East,
    /// `(+1, -1)`
    NorthEast,
    /// `(0, -1)`
    NorthWest,
    /// `(-1, 0)`
    West,
    /// `(-1, +1)`
    SouthWest,
    /// `(0, +1)`
    SouthEast,
}

impl HexDirection {
    /// All directions in neighbour-table order.
    pub const ALL: [Self; 6] = [
        Self::East,
        Self::NorthEast,
        Self::NorthWest,
        Self::West,
        Self::SouthWest,
        Self::SouthEast,
    ];

    /// Index into [`NEIGHBOR_DIRECTIONS`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::East => 0,
            Self::NorthEast => 1,
            Self::NorthWest => 2,
            Self::West => 3,
            Self::SouthWest => 4,
            Self::SouthEast => 5,
        }
    }

    /// Axial offset for one step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        NEIGHBOR_DIRECTIONS[self.index()]
    }

    /// The direction pointing back.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::ALL[(self.index() + 3) % 6]
    }
}

/// Maps axial coordinates to world space and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexLayout {
    /// Distance from a hex centre to any of its corners, in world units.
    #[serde(with = "fixed_decimal_serde")]
    pub size: Fixed,
}

impl Default for HexLayout {
    fn default() -> Self {
        Self { size: Fixed::ONE }
    }
}

impl HexLayout {
    /// Create a layout with the given hex size.
    #[must_use]
    pub const fn new(size: Fixed) -> Self {
        Self { size }
    }

    /// Centre of the hex in world space. `y` is always zero.
    ///
    /// Coordinates too far out for the fixed-point range saturate at the
    /// range limits.
    #[must_use]
    pub fn axial_to_world(&self, coord: HexCoord) -> Vec3Fixed {
        let q = Fixed::from_num(coord.q);
        let r = Fixed::from_num(coord.r);
        let column = SQRT_3
            .saturating_mul(q)
            .saturating_add(SQRT_3.saturating_mul(r) / 2);
        let x = self.size.saturating_mul(column);
        let z = self.size.saturating_mul(r.saturating_mul_int(3) / 2);
        Vec3Fixed::new(x, Fixed::ZERO, z)
    }

    /// The hex containing a world position. Height is ignored.
    ///
    /// The inverse transform yields fractional axial coordinates which
    /// are rounded in cube space: each axis is rounded, and the axis with
    /// the largest rounding error is recomputed from the other two.
    ///
    /// `None` for a zero-size layout or when the result leaves the
    /// coordinate range.
    #[must_use]
    pub fn world_to_axial(&self, position: Vec3Fixed) -> Option<HexCoord> {
        let r = position
            .z
            .checked_mul_int(2)?
            .checked_div(self.size.checked_mul_int(3)?)?;
        let q = position
            .x
            .checked_div(SQRT_3.checked_mul(self.size)?)?
            .checked_sub(r / 2)?;
        cube_round(q, r)
    }
}

/// Round fractional axial coordinates to the nearest hex.
fn cube_round(q: Fixed, r: Fixed) -> Option<HexCoord> {
    let s = q.checked_add(r)?.checked_neg()?;

    let mut rq = q.checked_round()?;
    let mut rr = r.checked_round()?;
    let rs = s.checked_round()?;

    let q_diff = (rq - q).abs();
    let r_diff = (rr - r).abs();
    let s_diff = (rs - s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        rq = rr.checked_add(rs)?.checked_neg()?;
    } else if r_diff > s_diff {
        rr = rq.checked_add(rs)?.checked_neg()?;
    }

    Some(HexCoord::new(rq.checked_to_num()?, rr.checked_to_num()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance_same_and_adjacent() {
        let origin = HexCoord::ORIGIN;
        assert_eq!(origin.distance(origin), 0);
        for neighbor in origin.neighbors() {
            assert_eq!(origin.distance(neighbor), 1);
        }
    }

    #[test]
    fn test_distance_known_values() {
        assert_eq!(HexCoord::new(0, 0).distance(HexCoord::new(2, 0)), 2);
        assert_eq!(HexCoord::new(0, 0).distance(HexCoord::new(3, -3)), 3);
        assert_eq!(HexCoord::new(-2, 1).distance(HexCoord::new(1, 1)), 3);
        assert_eq!(HexCoord::new(1, 2).distance(HexCoord::new(-1, -1)), 5);
    }

    #[test]
    fn test_neighbor_order_is_clockwise_from_east() {
        let n = HexCoord::ORIGIN.neighbors();
        assert_eq!(n[0], HexCoord::new(1, 0));
        assert_eq!(n[1], HexCoord::new(1, -1));
        assert_eq!(n[2], HexCoord::new(0, -1));
        assert_eq!(n[3], HexCoord::new(-1, 0));
        assert_eq!(n[4], HexCoord::new(-1, 1));
        assert_eq!(n[5], HexCoord::new(0, 1));
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(HexDirection::East.opposite(), HexDirection::West);
        assert_eq!(HexDirection::NorthEast.opposite(), HexDirection::SouthWest);
        assert_eq!(HexDirection::NorthWest.opposite(), HexDirection::SouthEast);
        for direction in HexDirection::ALL {
            let there = HexCoord::ORIGIN.neighbor(direction);
            assert_eq!(there.neighbor(direction.opposite()), HexCoord::ORIGIN);
        }
    }

    #[test]
    fn test_cube_coordinates_sum_to_zero() {
        let cube = HexCoord::new(4, -7).to_cube();
        assert_eq!(cube.x + cube.y + cube.z, 0);
        assert_eq!(cube.to_axial(), HexCoord::new(4, -7));
    }

    #[test]
    fn test_axial_to_world_origin_and_axes() {
        let layout = HexLayout::default();
        assert_eq!(layout.axial_to_world(HexCoord::ORIGIN), Vec3Fixed::ZERO);

        let east = layout.axial_to_world(HexCoord::new(1, 0));
        assert_eq!(east.x, SQRT_3);
        assert_eq!(east.z, Fixed::ZERO);

        let south_east = layout.axial_to_world(HexCoord::new(0, 1));
        assert_eq!(south_east.z, Fixed::from_num(1.5));
    }

    #[test]
    fn test_world_to_axial_snaps_near_centre() {
        let layout = HexLayout::new(Fixed::from_num(2));
        let centre = layout.axial_to_world(HexCoord::new(5, -3));
        let nudged = Vec3Fixed::new(
            centre.x + Fixed::from_num(0.4),
            Fixed::from_num(7),
            centre.z - Fixed::from_num(0.3),
        );
        assert_eq!(layout.world_to_axial(nudged), Some(HexCoord::new(5, -3)));
    }

    #[test]
    fn test_far_coordinates_do_not_overflow() {
        let layout = HexLayout::default();
        let far = layout.axial_to_world(HexCoord::new(1_500_000_000, 0));
        assert_eq!(far.x, Fixed::MAX);

        let beyond = Vec3Fixed::new(Fixed::ZERO, Fixed::ZERO, Fixed::from_num(1_500_000_000));
        assert_eq!(layout.world_to_axial(beyond), None);
    }

    #[test]
    fn test_zero_size_layout_has_no_hexes() {
        let layout = HexLayout::new(Fixed::ZERO);
        assert_eq!(layout.world_to_axial(Vec3Fixed::ZERO), None);
    }

    #[test]
    fn test_distance_across_whole_range() {
        let low = HexCoord::new(i32::MIN, 0);
        let high = HexCoord::new(i32::MAX, 0);
        assert_eq!(low.distance(high), u32::MAX);
    }

    #[test]
    fn test_ring_sizes_and_distances() {
        let centre = HexCoord::new(2, -1);
        assert_eq!(centre.ring(0), vec![centre]);
        for radius in 1..5 {
            let ring = centre.ring(radius);
            assert_eq!(ring.len(), 6 * radius as usize);
            assert!(ring.iter().all(|c| c.distance(centre) == radius));
        }
    }

    #[test]
    fn test_range_counts() {
        // 1 + 3n(n+1) hexes within radius n
        for radius in 0..5u32 {
            let range = HexCoord::ORIGIN.range(radius);
            assert_eq!(range.len() as u32, 1 + 3 * radius * (radius + 1));
            assert!(range.iter().all(|c| c.distance(HexCoord::ORIGIN) <= radius));
        }
    }

    #[test]
    fn test_ordering_is_row_major() {
        let mut coords = vec![HexCoord::new(1, 1), HexCoord::new(5, 0), HexCoord::new(0, 1)];
        coords.sort();
        assert_eq!(
            coords,
            vec![HexCoord::new(5, 0), HexCoord::new(0, 1), HexCoord::new(1, 1)]
        );
    }

    proptest! {
        /// Every hex centre maps back to its own coordinate.
        #[test]
        fn prop_world_round_trip(q in -500i32..500, r in -500i32..500, size in 1i32..8) {
            let layout = HexLayout::new(Fixed::from_num(size));
            let coord = HexCoord::new(q, r);
            prop_assert_eq!(layout.world_to_axial(layout.axial_to_world(coord)), Some(coord));
        }

        /// Adjacency is symmetric and always one step.
        #[test]
        fn prop_neighbors_are_symmetric(q in -1000i32..1000, r in -1000i32..1000) {
            let coord = HexCoord::new(q, r);
            for neighbor in coord.neighbors() {
                prop_assert_eq!(coord.distance(neighbor), 1);
                prop_assert!(neighbor.neighbors().contains(&coord));
            }
        }

        /// Distance is a metric: symmetric and obeys the triangle inequality.
        #[test]
        fn prop_distance_is_metric(
            a in (-200i32..200, -200i32..200),
            b in (-200i32..200, -200i32..200),
            c in (-200i32..200, -200i32..200),
        ) {
            let (a, b, c) = (HexCoord::from(a), HexCoord::from(b), HexCoord::from(c));
            prop_assert_eq!(a.distance(b), b.distance(a));
            prop_assert!(a.distance(c) <= a.distance(b) + b.distance(c));
        }
    }
}
