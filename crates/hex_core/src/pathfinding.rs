//! Movement legality and hex pathfinding.
//!
//! A [`PathValidator`] answers "may a unit stand here, and what does it
//! cost to enter?". Validators are chosen per unit type, so air or naval
//! movers can swap passability rules without touching the grid.
//! [`find_path`] runs A* on top of any validator.
//!
//! All costs are fixed-point for deterministic results across clients.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::data::{TerrainConfig, TerrainTable, TerrainType};
use crate::error::{GameError, Result};
use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::math::Fixed;

/// Movement cost reported for tiles that cannot be entered.
pub const IMPASSABLE_COST: Fixed = Fixed::MAX;

/// Movement rules for one kind of mover.
pub trait PathValidator {
    /// Whether a mover may enter `coord`. False for missing tiles.
    fn is_passable(&self, grid: &HexGrid, coord: HexCoord) -> bool;

    /// Cost to enter `coord`; [`IMPASSABLE_COST`] when not passable.
    fn movement_cost(&self, grid: &HexGrid, coord: HexCoord) -> Fixed;

    /// Lowest cost any passable tile can have. Used as the A* heuristic
    /// scale, so it must never overestimate.
    fn min_movement_cost(&self) -> Fixed {
        Fixed::ZERO
    }

    /// Whether a single step from `from` to `to` is legal.
    ///
    /// Both tiles must exist, `to` must be passable and unoccupied, and
    /// the two must be adjacent.
    fn is_valid_move(&self, grid: &HexGrid, from: HexCoord, to: HexCoord) -> bool {
        if !grid.contains(from) {
            return false;
        }
        let Some(destination) = grid.get_tile(to) else {
            return false;
        };
        from.distance(to) == 1 && !destination.is_occupied() && self.is_passable(grid, to)
    }
}

/// Ground movement driven by a terrain table.
#[derive(Debug, Clone)]
pub struct HexPathValidator {
    table: Option<TerrainTable>,
    fallback: TerrainTable,
}

impl Default for HexPathValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl HexPathValidator {
    /// Validator using only the built-in terrain table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: None,
            fallback: TerrainTable::fallback(),
        }
    }

    /// Validator reading a data table first and the built-in table for
    /// terrain types the data leaves out.
    #[must_use]
    pub fn with_table(table: TerrainTable) -> Self {
        Self {
            table: Some(table),
            fallback: TerrainTable::fallback(),
        }
    }

    /// Whether a data table was supplied.
    #[must_use]
    pub fn has_data_table(&self) -> bool {
        self.table.is_some()
    }

    fn config(&self, terrain: TerrainType) -> Option<&TerrainConfig> {
        self.table
            .as_ref()
            .and_then(|table| table.get(terrain))
            .or_else(|| self.fallback.get(terrain))
    }

    fn terrain_cost(&self, terrain: TerrainType) -> Fixed {
        match self.config(terrain) {
            Some(config) if config.passable => config.movement_cost,
            _ => IMPASSABLE_COST,
        }
    }
}

impl PathValidator for HexPathValidator {
    fn is_passable(&self, grid: &HexGrid, coord: HexCoord) -> bool {
        grid.get_tile(coord)
            .and_then(|tile| self.config(tile.terrain()))
            .is_some_and(|config| config.passable)
    }

    fn movement_cost(&self, grid: &HexGrid, coord: HexCoord) -> Fixed {
        grid.get_tile(coord)
            .map_or(IMPASSABLE_COST, |tile| self.terrain_cost(tile.terrain()))
    }

    fn min_movement_cost(&self) -> Fixed {
        TerrainType::ALL
            .into_iter()
            .map(|terrain| self.terrain_cost(terrain))
            .filter(|&cost| cost != IMPASSABLE_COST)
            .min()
            .unwrap_or(Fixed::ZERO)
    }
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    coord: HexCoord,
    /// f_score = g_score + heuristic
    f_score: Fixed,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for lowest f_score first,
        // then lowest coordinate (row-major) for determinism.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.coord.cmp(&self.coord),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the cheapest step-by-step route from `start` to `goal`.
///
/// Each step must satisfy [`PathValidator::is_valid_move`]; the cost of a
/// step is the movement cost of the tile entered. The returned path starts
/// with `start` and ends with `goal`.
///
/// # Errors
///
/// - [`GameError::TileNotFound`] if `start` or `goal` has no tile.
/// - [`GameError::InvalidState`] if no route exists.
pub fn find_path<V>(grid: &HexGrid, validator: &V, start: HexCoord, goal: HexCoord) -> Result<Vec<HexCoord>>
where
    V: PathValidator + ?Sized,
{
    if !grid.contains(start) {
        return Err(GameError::TileNotFound(start));
    }
    if !grid.contains(goal) {
        return Err(GameError::TileNotFound(goal));
    }
    if start == goal {
        return Ok(vec![start]);
    }

    let heuristic_scale = validator.min_movement_cost();
    let heuristic = |coord: HexCoord| heuristic_scale * Fixed::from_num(coord.distance(goal));

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<HexCoord, HexCoord> = HashMap::new();
    let mut g_score: HashMap<HexCoord, Fixed> = HashMap::new();
    let mut neighbors = Vec::with_capacity(6);

    g_score.insert(start, Fixed::ZERO);
    open_set.push(AStarNode {
        coord: start,
        f_score: heuristic(start),
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return Ok(reconstruct_path(&came_from, goal));
        }

        let current_g = g_score.get(&current.coord).copied().unwrap_or(Fixed::MAX);

        grid.neighbors_into(current.coord, &mut neighbors);
        for &next in &neighbors {
            if !validator.is_valid_move(grid, current.coord, next) {
                continue;
            }
            let step = validator.movement_cost(grid, next);
            if step == IMPASSABLE_COST {
                continue;
            }

            let tentative_g = current_g.saturating_add(step);
            let next_g = g_score.get(&next).copied().unwrap_or(Fixed::MAX);
            if tentative_g < next_g {
                came_from.insert(next, current.coord);
                g_score.insert(next, tentative_g);
                open_set.push(AStarNode {
                    coord: next,
                    f_score: tentative_g.saturating_add(heuristic(next)),
                });
            }
        }
    }

    Err(GameError::InvalidState(format!(
        "No path from {start} to {goal}"
    )))
}

/// Total cost of walking `path` (excluding the starting tile).
#[must_use]
pub fn path_cost<V>(grid: &HexGrid, validator: &V, path: &[HexCoord]) -> Fixed
where
    V: PathValidator + ?Sized,
{
    path.iter()
        .skip(1)
        .fold(Fixed::ZERO, |total, &coord| {
            total.saturating_add(validator.movement_cost(grid, coord))
        })
}

fn reconstruct_path(came_from: &HashMap<HexCoord, HexCoord>, goal: HexCoord) -> Vec<HexCoord> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
