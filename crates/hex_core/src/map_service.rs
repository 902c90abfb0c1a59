//! Read-only access to the session's grid.
//!
//! Systems outside the core (input, rendering) query the map through
//! [`MapService`]. Until a grid is installed every query logs a warning
//! and returns an empty result.

use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::math::Vec3Fixed;
use crate::tile::{HexTile, PlayerId};

/// Facade over an optional [`HexGrid`].
#[derive(Debug, Default)]
pub struct MapService {
    grid: Option<HexGrid>,
}

impl MapService {
    /// Create a service with no grid yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service around an existing grid.
    #[must_use]
    pub fn with_grid(grid: HexGrid) -> Self {
        Self { grid: Some(grid) }
    }

    /// Install `grid`, returning the previous one.
    pub fn install(&mut self, grid: HexGrid) -> Option<HexGrid> {
        tracing::info!(width = grid.width(), height = grid.height(), tiles = grid.len(), "Map installed");
        self.grid.replace(grid)
    }

    /// Remove the grid.
    pub fn take(&mut self) -> Option<HexGrid> {
        self.grid.take()
    }

    /// Check if a grid is installed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.grid.is_some()
    }

    /// The installed grid.
    #[must_use]
    pub fn grid(&self) -> Option<&HexGrid> {
        self.ready()
    }

    pub(crate) fn grid_mut(&mut self) -> Option<&mut HexGrid> {
        if self.grid.is_none() {
            tracing::warn!("Map not ready");
        }
        self.grid.as_mut()
    }

    /// Declared `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.ready().map(|grid| (grid.width(), grid.height()))
    }

    /// Tile at `coord`.
    #[must_use]
    pub fn get_tile(&self, coord: HexCoord) -> Option<&HexTile> {
        self.ready()?.get_tile(coord)
    }

    /// Tile under a world-space point.
    #[must_use]
    pub fn tile_at_world_position(&self, position: Vec3Fixed) -> Option<&HexTile> {
        self.ready()?.tile_at_world_position(position)
    }

    /// Existing neighbours of `coord`, written into `out`.
    pub fn neighbors_into(&self, coord: HexCoord, out: &mut Vec<HexCoord>) {
        match self.ready() {
            Some(grid) => grid.neighbors_into(coord, out),
            None => out.clear(),
        }
    }

    /// Tiles owned by `player`.
    #[must_use]
    pub fn tiles_owned_by(&self, player: PlayerId) -> Vec<HexCoord> {
        self.ready()
            .map(|grid| grid.tiles_owned_by(player))
            .unwrap_or_default()
    }

    /// Tiles currently visible to `player`.
    #[must_use]
    pub fn visible_tiles(&self, player: PlayerId) -> Vec<HexCoord> {
        self.ready()
            .map(|grid| grid.visible_tiles(player))
            .unwrap_or_default()
    }

    fn ready(&self) -> Option<&HexGrid> {
        if self.grid.is_none() {
            tracing::warn!("Map not ready");
        }
        self.grid.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexLayout;

    #[test]
    fn test_not_ready_returns_defaults() {
        let map = MapService::new();
        assert!(!map.is_ready());
        assert!(map.get_tile(HexCoord::ORIGIN).is_none());
        assert!(map.tiles_owned_by(0).is_empty());
        assert!(map.visible_tiles(0).is_empty());
        assert!(map.dimensions().is_none());

        let mut out = vec![HexCoord::new(7, 7)];
        map.neighbors_into(HexCoord::ORIGIN, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_queries_delegate_to_grid() {
        let mut map = MapService::new();
        let mut grid = HexGrid::generate(3, 3, HexLayout::default());
        grid.set_owner(HexCoord::new(1, 1), Some(4));
        assert!(map.install(grid).is_none());

        assert_eq!(map.dimensions(), Some((3, 3)));
        assert_eq!(map.tiles_owned_by(4), vec![HexCoord::new(1, 1)]);
        assert_eq!(map.visible_tiles(0).len(), 9);

        let center = map.get_tile(HexCoord::new(1, 1)).unwrap().world_position();
        assert_eq!(
            map.tile_at_world_position(center).map(HexTile::coord),
            Some(HexCoord::new(1, 1))
        );

        let mut out = Vec::new();
        map.neighbors_into(HexCoord::new(1, 1), &mut out);
        assert_eq!(out.len(), 6);
    }
}
