//! Building placement and removal on the hex grid.
//!
//! The registry tracks which building stands where; the grid's tiles hold
//! the matching occupancy. Placement and selling always update both.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::BuildingData;
use crate::error::{GameError, Result};
use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::tile::PlayerId;

/// Largest building id. Saves store ids as `i32`.
pub const MAX_BUILDING_ID: u32 = 0x7FFF_FFFF;

/// Identifier of a placed building. Serialized on tiles as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

/// A building standing on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBuilding {
    /// Registry id.
    pub id: BuildingId,
    /// Definition id from the building catalog.
    pub kind: String,
    /// Owning player.
    pub owner: PlayerId,
    /// Tile it occupies.
    pub coord: HexCoord,
    /// Credits paid to build it.
    pub credits_cost: i32,
}

/// All placed buildings of a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingRegistry {
    buildings: BTreeMap<BuildingId, PlacedBuilding>,
    next_id: u32,
}

impl BuildingRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Building by id.
    #[must_use]
    pub fn get(&self, id: BuildingId) -> Option<&PlacedBuilding> {
        self.buildings.get(&id)
    }

    /// Number of placed buildings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    /// Check if nothing is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Iterate in id order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedBuilding> {
        self.buildings.values()
    }

    /// Place a building for `owner` on `coord`.
    ///
    /// The tile must exist and be buildable. The tile becomes occupied and
    /// owned by `owner`, and tiles within the building's vision radius are
    /// revealed to them.
    pub fn place(
        &mut self,
        grid: &mut HexGrid,
        definition: &BuildingData,
        coord: HexCoord,
        owner: PlayerId,
    ) -> Result<BuildingId> {
        let Some(tile) = grid.get_tile(coord) else {
            return Err(GameError::TileNotFound(coord));
        };
        if !tile.is_buildable() {
            let reason = if tile.is_occupied() {
                "tile is occupied"
            } else {
                "terrain does not allow construction"
            };
            tracing::warn!(%coord, kind = %definition.id, reason, "Building placement refused");
            return Err(GameError::BuildingRefused {
                coord,
                reason: reason.to_string(),
            });
        }

        if self.next_id > MAX_BUILDING_ID {
            return Err(GameError::InvalidState("building ids exhausted".to_string()));
        }
        let id = BuildingId(self.next_id);
        self.next_id += 1;

        grid.set_occupying_building(coord, Some(id));
        grid.set_owner(coord, Some(owner));
        if definition.vision_radius > 0 {
            grid.reveal_around(owner, coord, definition.vision_radius);
        }

        self.buildings.insert(
            id,
            PlacedBuilding {
                id,
                kind: definition.id.clone(),
                owner,
                coord,
                credits_cost: definition.credits_cost,
            },
        );
        tracing::debug!(%coord, id = id.0, kind = %definition.id, owner, "Building placed");
        Ok(id)
    }

    /// Sell the building on `coord`, freeing the tile.
    ///
    /// Returns the credits refunded: `floor(credits_cost × 0.5)`.
    pub fn sell(&mut self, grid: &mut HexGrid, coord: HexCoord) -> Result<i32> {
        let Some(tile) = grid.get_tile(coord) else {
            return Err(GameError::TileNotFound(coord));
        };
        let Some(id) = tile.occupying_building() else {
            return Err(GameError::BuildingRefused {
                coord,
                reason: "no building on tile".to_string(),
            });
        };

        grid.set_occupying_building(coord, None);
        let refund = self
            .buildings
            .remove(&id)
            .map_or(0, |building| crate::data::sell_refund(building.credits_cost));
        tracing::debug!(%coord, id = id.0, refund, "Building sold");
        Ok(refund)
    }

    /// Bring the registry in line with a grid whose occupancy was replaced,
    /// after a load or a new map.
    ///
    /// Records whose tile no longer holds their id are dropped, and new ids
    /// skip past every id found on the grid.
    pub fn sync_with_grid(&mut self, grid: &HexGrid) {
        let before = self.buildings.len();
        self.buildings.retain(|id, building| {
            grid.get_tile(building.coord)
                .and_then(|tile| tile.occupying_building())
                == Some(*id)
        });
        let dropped = before - self.buildings.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Dropped building records missing from grid");
        }

        let highest = grid
            .tiles()
            .filter_map(|tile| tile.occupying_building())
            .map(|id| id.0.saturating_add(1))
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(highest);
    }
}
