//! The hex grid: tile storage, neighbour queries and bulk queries.
//!
//! Tiles are keyed by their own axial coordinate. Declared width/height
//! describe the generated map but are advisory: tiles may be added
//! outside them. Every query on a missing coordinate yields "no tile" or
//! an empty result, never an error.
//!
//! Bulk queries return coordinates in row-major order so callers iterate
//! deterministically.
//!
//! # Example
//!
//! ```
//! use hex_core::grid::HexGrid;
//! use hex_core::hex::{HexCoord, HexLayout};
//!
//! let grid = HexGrid::generate(4, 4, HexLayout::default());
//! let mut buffer = Vec::with_capacity(6);
//! grid.neighbors_into(HexCoord::new(0, 0), &mut buffer);
//! assert_eq!(buffer.len(), 2);
//! grid.neighbors_into(HexCoord::new(3, 0), &mut buffer);
//! assert_eq!(buffer.len(), 3);
//! ```

use std::collections::HashMap;

use crate::buildings::BuildingId;
use crate::data::{TerrainConfig, TerrainTable, TerrainType};
use crate::error::{GameError, Result};
use crate::hex::{HexCoord, HexLayout};
use crate::math::Vec3Fixed;
use crate::resources::ResourceType;
use crate::snapshot::GridSnapshot;
use crate::tile::{HexTile, PlayerId, TileEvent, VisibilityState};

/// Owns every tile of a map.
#[derive(Debug, Clone)]
pub struct HexGrid {
    width: u32,
    height: u32,
    layout: HexLayout,
    tiles: HashMap<HexCoord, HexTile>,
    events: Vec<TileEvent>,
}

impl HexGrid {
    /// Create an empty grid with declared dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32, layout: HexLayout) -> Self {
        Self {
            width,
            height,
            layout,
            tiles: HashMap::with_capacity((width as usize) * (height as usize)),
            events: Vec::new(),
        }
    }

    /// Create a grid with a Grassland tile at every `(q, r)` for
    /// `0 <= q < width`, `0 <= r < height`.
    #[must_use]
    pub fn generate(width: u32, height: u32, layout: HexLayout) -> Self {
        let mut grid = Self::new(width, height, layout);
        for r in 0..height as i32 {
            for q in 0..width as i32 {
                grid.add_tile(HexTile::new(HexCoord::new(q, r), &layout));
            }
        }
        tracing::debug!(width, height, tiles = grid.len(), "Generated hex grid");
        grid
    }

    /// Like [`generate`](Self::generate), choosing each tile's terrain with
    /// `pick` and configuring it from `table`.
    ///
    /// Terrain types missing from `table` fall back to the built-in table.
    pub fn generate_with<F>(
        width: u32,
        height: u32,
        layout: HexLayout,
        table: &TerrainTable,
        mut pick: F,
    ) -> Self
    where
        F: FnMut(HexCoord) -> TerrainType,
    {
        let fallback = TerrainTable::fallback();
        let mut grid = Self::generate(width, height, layout);
        for tile in grid.tiles.values_mut() {
            let terrain = pick(tile.coord());
            if let Some(config) = table.get(terrain).or_else(|| fallback.get(terrain)) {
                tile.set_terrain(terrain, config);
            }
        }
        grid
    }

    /// Declared width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Declared height.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Layout used to place tiles in world space.
    #[must_use]
    pub const fn layout(&self) -> &HexLayout {
        &self.layout
    }

    /// Number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Check if the grid holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Check if `coord` falls inside the declared rectangle.
    #[must_use]
    pub fn in_declared_bounds(&self, coord: HexCoord) -> bool {
        coord.q >= 0 && coord.r >= 0 && (coord.q as u32) < self.width && (coord.r as u32) < self.height
    }

    /// Insert a tile, replacing any tile at the same coordinate.
    ///
    /// Returns the replaced tile.
    pub fn add_tile(&mut self, tile: HexTile) -> Option<HexTile> {
        self.tiles.insert(tile.coord(), tile)
    }

    /// Check if a tile exists at `coord`.
    #[must_use]
    pub fn contains(&self, coord: HexCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    /// Tile at `coord`, if any.
    #[must_use]
    pub fn get_tile(&self, coord: HexCoord) -> Option<&HexTile> {
        self.tiles.get(&coord)
    }

    /// Mutable tile at `coord`, if any.
    ///
    /// Changes made through this reference are not recorded as
    /// [`TileEvent`]s; prefer the grid's mutators.
    pub fn get_tile_mut(&mut self, coord: HexCoord) -> Option<&mut HexTile> {
        self.tiles.get_mut(&coord)
    }

    /// Tile under a world position, if any.
    #[must_use]
    pub fn tile_at_world_position(&self, position: Vec3Fixed) -> Option<&HexTile> {
        self.get_tile(self.layout.world_to_axial(position)?)
    }

    /// Iterate over all tiles (not in deterministic order).
    pub fn tiles(&self) -> impl Iterator<Item = &HexTile> {
        self.tiles.values()
    }

    /// All tile coordinates in row-major order.
    #[must_use]
    pub fn sorted_coords(&self) -> Vec<HexCoord> {
        let mut coords: Vec<_> = self.tiles.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    // ------------------------------------------------------------------
    // Neighbour queries
    // ------------------------------------------------------------------

    /// Existing neighbour tiles of `coord` (0 to 6), in direction order.
    ///
    /// Allocation-free.
    pub fn neighbors(&self, coord: HexCoord) -> impl Iterator<Item = &HexTile> + '_ {
        coord
            .neighbors()
            .into_iter()
            .filter_map(move |neighbor| self.tiles.get(&neighbor))
    }

    /// Clear `out` and fill it with the coordinates of existing neighbours.
    ///
    /// Does not allocate once `out` has capacity for six entries.
    pub fn neighbors_into(&self, coord: HexCoord, out: &mut Vec<HexCoord>) {
        out.clear();
        out.extend(
            coord
                .neighbors()
                .into_iter()
                .filter(|neighbor| self.tiles.contains_key(neighbor)),
        );
    }

    // ------------------------------------------------------------------
    // Bulk queries
    // ------------------------------------------------------------------

    /// Coordinates of tiles owned by `player`, row-major.
    #[must_use]
    pub fn tiles_owned_by(&self, player: PlayerId) -> Vec<HexCoord> {
        let mut out = Vec::new();
        self.tiles_owned_by_into(player, &mut out);
        out
    }

    /// Buffer-reusing form of [`tiles_owned_by`](Self::tiles_owned_by).
    pub fn tiles_owned_by_into(&self, player: PlayerId, out: &mut Vec<HexCoord>) {
        self.collect_where(out, |tile| tile.is_owned_by(player));
    }

    /// Coordinates of tiles `player` currently sees, row-major.
    #[must_use]
    pub fn visible_tiles(&self, player: PlayerId) -> Vec<HexCoord> {
        let mut out = Vec::new();
        self.visible_tiles_into(player, &mut out);
        out
    }

    /// Buffer-reusing form of [`visible_tiles`](Self::visible_tiles).
    pub fn visible_tiles_into(&self, player: PlayerId, out: &mut Vec<HexCoord>) {
        self.collect_where(out, |tile| tile.is_visible_to_player(player));
    }

    fn collect_where<P>(&self, out: &mut Vec<HexCoord>, predicate: P)
    where
        P: Fn(&HexTile) -> bool,
    {
        out.clear();
        out.extend(
            self.tiles
                .values()
                .filter(|tile| predicate(tile))
                .map(HexTile::coord),
        );
        out.sort_unstable();
    }

    // ------------------------------------------------------------------
    // Event-recording mutators
    // ------------------------------------------------------------------

    /// Replace a tile's terrain. Returns `false` if the tile is missing or
    /// the terrain did not change.
    pub fn set_terrain(
        &mut self,
        coord: HexCoord,
        terrain: TerrainType,
        config: &TerrainConfig,
    ) -> bool {
        let Some(tile) = self.tiles.get_mut(&coord) else {
            tracing::debug!(%coord, "set_terrain on missing tile");
            return false;
        };
        if !tile.set_terrain(terrain, config) {
            return false;
        }
        self.events.push(TileEvent::TerrainChanged { coord, terrain });
        true
    }

    /// Set or clear a tile's owner.
    pub fn set_owner(&mut self, coord: HexCoord, owner: Option<PlayerId>) -> bool {
        let Some(tile) = self.tiles.get_mut(&coord) else {
            tracing::debug!(%coord, "set_owner on missing tile");
            return false;
        };
        let previous = tile.owner();
        if !tile.set_owner(owner) {
            return false;
        }
        self.events.push(TileEvent::OwnerChanged {
            coord,
            previous,
            owner,
        });
        true
    }

    /// Store an explicit visibility state for `player` on one tile.
    pub fn set_visibility(
        &mut self,
        coord: HexCoord,
        player: PlayerId,
        state: VisibilityState,
    ) -> bool {
        let Some(tile) = self.tiles.get_mut(&coord) else {
            tracing::debug!(%coord, player, "set_visibility on missing tile");
            return false;
        };
        if !tile.set_visibility(player, state) {
            return false;
        }
        self.events.push(TileEvent::VisibilityChanged {
            coord,
            player,
            state: tile.visibility(player),
        });
        true
    }

    /// Reveal every existing tile within `radius` of `center` to `player`.
    ///
    /// Returns how many tiles changed.
    pub fn reveal_around(&mut self, player: PlayerId, center: HexCoord, radius: u32) -> usize {
        let mut changed = 0;
        for coord in center.range(radius) {
            if let Some(tile) = self.tiles.get_mut(&coord) {
                if tile.reveal(player) {
                    self.events.push(TileEvent::VisibilityChanged {
                        coord,
                        player,
                        state: tile.visibility(player),
                    });
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Hide every tile from `player`, keeping exploration.
    ///
    /// Returns how many tiles changed.
    pub fn hide_all(&mut self, player: PlayerId) -> usize {
        let mut changed = 0;
        for coord in self.sorted_coords() {
            if let Some(tile) = self.tiles.get_mut(&coord) {
                if tile.conceal(player) {
                    self.events.push(TileEvent::VisibilityChanged {
                        coord,
                        player,
                        state: tile.visibility(player),
                    });
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Mark every tile unexplored for `player`: the start-of-match fog.
    pub fn shroud_all(&mut self, player: PlayerId) -> usize {
        let mut changed = 0;
        for coord in self.sorted_coords() {
            if self.set_visibility(coord, player, VisibilityState::UNEXPLORED) {
                changed += 1;
            }
        }
        changed
    }

    /// Harvest from a tile. Returns the amount taken (zero if missing).
    pub fn harvest(&mut self, coord: HexCoord, resource: ResourceType, amount: i32) -> i32 {
        let Some(tile) = self.tiles.get_mut(&coord) else {
            tracing::debug!(%coord, "harvest on missing tile");
            return 0;
        };
        let taken = tile.harvest(resource, amount);
        if taken > 0 {
            let current = tile.resource(resource).map_or(0, |a| a.current());
            self.events.push(TileEvent::ResourcesChanged {
                coord,
                resource,
                current,
            });
        }
        taken
    }

    /// Replenish a tile's resource. Returns the amount added.
    pub fn replenish(&mut self, coord: HexCoord, resource: ResourceType, amount: i32) -> i32 {
        let Some(tile) = self.tiles.get_mut(&coord) else {
            tracing::debug!(%coord, "replenish on missing tile");
            return 0;
        };
        let added = tile.replenish(resource, amount);
        if added > 0 {
            let current = tile.resource(resource).map_or(0, |a| a.current());
            self.events.push(TileEvent::ResourcesChanged {
                coord,
                resource,
                current,
            });
        }
        added
    }

    /// Place or clear the building on a tile.
    pub fn set_occupying_building(&mut self, coord: HexCoord, building: Option<BuildingId>) -> bool {
        let Some(tile) = self.tiles.get_mut(&coord) else {
            tracing::debug!(%coord, "set_occupying_building on missing tile");
            return false;
        };
        if !tile.set_occupying_building(building) {
            return false;
        }
        self.events.push(TileEvent::OccupancyChanged { coord, building });
        true
    }

    /// Take every recorded event, oldest first.
    pub fn drain_events(&mut self) -> Vec<TileEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of events waiting to be drained.
    #[must_use]
    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Capture every tile.
    #[must_use]
    pub fn to_snapshot(&self, timestamp: u64) -> GridSnapshot {
        let tiles = self
            .sorted_coords()
            .into_iter()
            .filter_map(|coord| self.tiles.get(&coord).map(HexTile::to_data))
            .collect();
        GridSnapshot::new(self.width, self.height, timestamp, tiles)
    }

    /// Overwrite tile state from a snapshot of a grid with the same shape.
    ///
    /// The whole snapshot is validated first: version, per-tile data,
    /// dimensions, and that every saved coordinate exists here. On error
    /// no tile has been touched.
    pub fn apply_snapshot(&mut self, snapshot: &GridSnapshot) -> Result<()> {
        snapshot.validate()?;
        snapshot.validate_dimensions(self.width, self.height)?;
        if let Some(missing) = snapshot.tiles.iter().find(|t| !self.contains(t.coord())) {
            return Err(GameError::SnapshotValidation(format!(
                "tile {} does not exist in this grid",
                missing.coord()
            )));
        }

        for data in &snapshot.tiles {
            if let Some(tile) = self.tiles.get_mut(&data.coord()) {
                tile.apply_data(data);
            }
        }
        #[cfg(feature = "debug-validation")]
        self.check_invariants()?;
        tracing::info!(tiles = snapshot.tiles.len(), "Applied grid snapshot");
        Ok(())
    }

    /// Build a fresh grid holding exactly the tiles of a snapshot.
    pub fn from_snapshot(snapshot: &GridSnapshot, layout: HexLayout) -> Result<Self> {
        snapshot.validate()?;
        let mut grid = Self::new(snapshot.width, snapshot.height, layout);
        for data in &snapshot.tiles {
            let mut tile = HexTile::new(data.coord(), &layout);
            tile.apply_data(data);
            grid.add_tile(tile);
        }
        Ok(grid)
    }

    /// Verify storage invariants.
    pub fn check_invariants(&self) -> Result<()> {
        for (key, tile) in &self.tiles {
            if *key != tile.coord() {
                return Err(GameError::InvalidState(format!(
                    "tile {} stored under key {key}",
                    tile.coord()
                )));
            }
            if tile.is_occupied() && tile.is_buildable() {
                return Err(GameError::InvalidState(format!(
                    "occupied tile {key} reports buildable"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;

    fn grid() -> HexGrid {
        HexGrid::generate(5, 5, HexLayout::default())
    }

    #[test]
    fn test_generate_fills_rectangle_with_grassland() {
        let grid = grid();
        assert_eq!(grid.len(), 25);
        assert!(grid.tiles().all(|t| t.terrain() == TerrainType::Grassland));
        assert!(grid.check_invariants().is_ok());
    }

    #[test]
    fn test_add_tile_is_idempotent_upsert() {
        let mut grid = grid();
        let tile = grid.get_tile(HexCoord::new(1, 1)).cloned().unwrap();
        let replaced = grid.add_tile(tile.clone());
        assert_eq!(replaced.as_ref(), Some(&tile));
        grid.add_tile(tile.clone());
        assert_eq!(grid.len(), 25);
        assert_eq!(grid.get_tile(HexCoord::new(1, 1)), Some(&tile));
    }

    #[test]
    fn test_tiles_outside_declared_bounds_are_allowed() {
        let mut grid = grid();
        let outside = HexCoord::new(-3, 12);
        assert!(!grid.in_declared_bounds(outside));
        grid.add_tile(HexTile::new(outside, &HexLayout::default()));
        assert!(grid.get_tile(outside).is_some());
    }

    #[test]
    fn test_missing_tile_queries_degrade() {
        let mut grid = grid();
        let missing = HexCoord::new(100, 100);
        assert!(grid.get_tile(missing).is_none());
        assert_eq!(grid.neighbors(missing).count(), 0);
        assert!(!grid.set_owner(missing, Some(1)));
        assert_eq!(grid.harvest(missing, ResourceType::Food, 5), 0);
        assert!(grid.drain_events().is_empty());
    }

    #[test]
    fn test_neighbor_counts_interior_and_corner() {
        let grid = grid();
        assert_eq!(grid.neighbors(HexCoord::new(2, 2)).count(), 6);
        assert_eq!(grid.neighbors(HexCoord::new(0, 0)).count(), 2);
        assert_eq!(grid.neighbors(HexCoord::new(4, 0)).count(), 3);
        assert_eq!(grid.neighbors(HexCoord::new(0, 4)).count(), 3);
        assert_eq!(grid.neighbors(HexCoord::new(2, 0)).count(), 4);

        let mut buffer = Vec::with_capacity(6);
        grid.neighbors_into(HexCoord::new(4, 4), &mut buffer);
        assert_eq!(buffer.len(), 2);

        // Buffer is cleared between calls
        grid.neighbors_into(HexCoord::new(2, 2), &mut buffer);
        assert_eq!(buffer.len(), 6);
    }

    #[test]
    fn test_neighbors_into_reuses_capacity() {
        let grid = grid();
        let mut buffer = Vec::with_capacity(6);
        let before = buffer.as_ptr();
        for q in 0..5 {
            grid.neighbors_into(HexCoord::new(q, 2), &mut buffer);
        }
        assert_eq!(buffer.as_ptr(), before);
    }

    #[test]
    fn test_owned_and_visible_queries_sorted() {
        let mut grid = grid();
        grid.set_owner(HexCoord::new(3, 1), Some(1));
        grid.set_owner(HexCoord::new(0, 1), Some(1));
        grid.set_owner(HexCoord::new(4, 0), Some(2));

        assert_eq!(
            grid.tiles_owned_by(1),
            vec![HexCoord::new(0, 1), HexCoord::new(3, 1)]
        );

        let mut buffer = vec![HexCoord::new(9, 9)];
        grid.tiles_owned_by_into(2, &mut buffer);
        assert_eq!(buffer, vec![HexCoord::new(4, 0)]);

        grid.shroud_all(0);
        grid.reveal_around(0, HexCoord::new(2, 2), 1);
        assert_eq!(grid.visible_tiles(0).len(), 7);
        // Untouched player sees everything
        assert_eq!(grid.visible_tiles(5).len(), 25);
    }

    #[test]
    fn test_hide_all_keeps_exploration() {
        let mut grid = grid();
        grid.shroud_all(0);
        grid.reveal_around(0, HexCoord::new(0, 0), 1);
        grid.hide_all(0);
        assert!(grid.visible_tiles(0).is_empty());
        let tile = grid.get_tile(HexCoord::new(1, 0)).unwrap();
        assert!(tile.is_explored_by_player(0));
        let far = grid.get_tile(HexCoord::new(4, 4)).unwrap();
        assert!(!far.is_explored_by_player(0));
    }

    #[test]
    fn test_events_recorded_in_order() {
        let mut grid = grid();
        let coord = HexCoord::new(1, 2);
        grid.set_owner(coord, Some(3));
        grid.set_owner(coord, Some(3));
        grid.set_occupying_building(coord, Some(BuildingId(7)));

        let events = grid.drain_events();
        assert_eq!(
            events,
            vec![
                TileEvent::OwnerChanged {
                    coord,
                    previous: None,
                    owner: Some(3)
                },
                TileEvent::OccupancyChanged {
                    coord,
                    building: Some(BuildingId(7))
                },
            ]
        );
        assert_eq!(grid.pending_event_count(), 0);
    }

    #[test]
    fn test_tile_at_world_position() {
        let grid = grid();
        let coord = HexCoord::new(3, 2);
        let world = grid.layout().axial_to_world(coord);
        assert_eq!(grid.tile_at_world_position(world).map(HexTile::coord), Some(coord));
    }

    #[test]
    fn test_tile_at_far_world_position_is_none() {
        let grid = grid();
        let far = Vec3Fixed::new(Fixed::MAX, Fixed::ZERO, Fixed::MAX);
        assert!(grid.tile_at_world_position(far).is_none());

        let flat = HexGrid::generate(2, 2, HexLayout::new(Fixed::ZERO));
        assert!(flat.tile_at_world_position(Vec3Fixed::ZERO).is_none());
    }

    #[test]
    fn test_generate_with_terrain_picker() {
        let table = TerrainTable::fallback();
        let grid = HexGrid::generate_with(3, 3, HexLayout::default(), &table, |c| {
            if c.q == 0 {
                TerrainType::Water
            } else {
                TerrainType::Plains
            }
        });
        let water = grid.get_tile(HexCoord::new(0, 1)).unwrap();
        assert_eq!(water.terrain(), TerrainType::Water);
        assert!(!water.is_buildable());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut grid = grid();
        grid.set_owner(HexCoord::new(1, 1), Some(0));
        grid.set_occupying_building(HexCoord::new(1, 1), Some(BuildingId(3)));
        grid.shroud_all(1);

        let snapshot = grid.to_snapshot(99);
        let mut restored = HexGrid::generate(5, 5, HexLayout::default());
        restored.apply_snapshot(&snapshot).unwrap();

        for coord in grid.sorted_coords() {
            assert_eq!(grid.get_tile(coord), restored.get_tile(coord));
        }
        let rebuilt = HexGrid::from_snapshot(&snapshot, HexLayout::default()).unwrap();
        assert_eq!(rebuilt.len(), 25);
    }

    #[test]
    fn test_bad_snapshot_leaves_grid_untouched() {
        let mut grid = grid();
        let mut snapshot = grid.to_snapshot(0);
        snapshot.tiles[0].owner = 4;
        snapshot.tiles[1].owner = -7;

        assert!(grid.apply_snapshot(&snapshot).is_err());
        assert!(grid.tiles_owned_by(4).is_empty());
    }

    #[test]
    fn test_snapshot_dimension_mismatch_rejected() {
        let mut grid = grid();
        let other = HexGrid::generate(4, 4, HexLayout::default());
        let snapshot = other.to_snapshot(0);
        assert!(matches!(
            grid.apply_snapshot(&snapshot),
            Err(GameError::SnapshotValidation(_))
        ));
    }

    #[test]
    fn test_snapshot_with_unknown_tile_rejected() {
        let mut grid = grid();
        let mut snapshot = grid.to_snapshot(0);
        snapshot.tiles[0].q = 40;
        assert!(grid.apply_snapshot(&snapshot).is_err());
    }
}
