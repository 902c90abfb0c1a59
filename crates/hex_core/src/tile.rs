//! A single hex cell: terrain, ownership, fog of war, resources and
//! building occupancy.
//!
//! # Invariants
//!
//! - The coordinate and world position never change after construction.
//! - An occupied tile is never buildable.
//! - `is_occupied() ⇔ occupying_building().is_some() ⇔ occupying_building_id() >= 0`.
//! - Every resource amount stays within `[0, max]`.
//! - A player with no visibility entry sees the tile as visible and
//!   explored. Missing state is never read as hidden.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingId, MAX_BUILDING_ID};
use crate::data::{TerrainConfig, TerrainType};
use crate::hex::{HexCoord, HexLayout};
use crate::math::Vec3Fixed;
use crate::resources::{ResourceAmount, ResourceType};
use crate::snapshot::{ResourceData, TileData, VisibilityData};

/// Player index. Unowned tiles have no player.
pub type PlayerId = u32;

/// Largest player index a tile can be owned by. Saves store owners as `i32`.
pub const MAX_PLAYER_ID: PlayerId = 0x7FFF_FFFF;

/// Serialized owner value for an unowned tile.
pub const UNOWNED: i32 = -1;

/// Serialized building id for an unoccupied tile.
pub const NO_BUILDING: i32 = -1;

/// What one player knows about one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibilityState {
    /// The player currently sees the tile.
    pub is_visible: bool,
    /// The player has seen the tile at some point.
    pub has_been_explored: bool,
}

impl VisibilityState {
    /// State reported for players without an explicit entry.
    pub const DEFAULT: Self = Self {
        is_visible: true,
        has_been_explored: true,
    };

    /// Never seen.
    pub const UNEXPLORED: Self = Self {
        is_visible: false,
        has_been_explored: false,
    };

    /// Seen before, not in sight now.
    pub const REMEMBERED: Self = Self {
        is_visible: false,
        has_been_explored: true,
    };
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Change notifications for the presentation layer.
///
/// Recorded by [`HexGrid`](crate::grid::HexGrid) mutators and drained in
/// mutation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileEvent {
    /// Terrain type was replaced.
    TerrainChanged {
        /// Tile that changed.
        coord: HexCoord,
        /// New terrain.
        terrain: TerrainType,
    },
    /// Ownership moved.
    OwnerChanged {
        /// Tile that changed.
        coord: HexCoord,
        /// Previous owner.
        previous: Option<PlayerId>,
        /// New owner.
        owner: Option<PlayerId>,
    },
    /// A player's view of the tile changed.
    VisibilityChanged {
        /// Tile that changed.
        coord: HexCoord,
        /// Player whose view changed.
        player: PlayerId,
        /// New state.
        state: VisibilityState,
    },
    /// A resource amount changed.
    ResourcesChanged {
        /// Tile that changed.
        coord: HexCoord,
        /// Resource that changed.
        resource: ResourceType,
        /// Amount after the change.
        current: i32,
    },
    /// A building was placed on or removed from the tile.
    OccupancyChanged {
        /// Tile that changed.
        coord: HexCoord,
        /// New occupant.
        building: Option<BuildingId>,
    },
}

/// One cell of the hex grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexTile {
    coord: HexCoord,
    world_position: Vec3Fixed,
    terrain: TerrainType,
    terrain_buildable: bool,
    owner: Option<PlayerId>,
    visibility: BTreeMap<PlayerId, VisibilityState>,
    resources: BTreeMap<ResourceType, ResourceAmount>,
    occupant: Option<BuildingId>,
}

impl HexTile {
    /// Create an unowned, unoccupied Grassland tile with no resources.
    #[must_use]
    pub fn new(coord: HexCoord, layout: &HexLayout) -> Self {
        Self {
            coord,
            world_position: layout.axial_to_world(coord),
            terrain: TerrainType::Grassland,
            terrain_buildable: true,
            owner: None,
            visibility: BTreeMap::new(),
            resources: BTreeMap::new(),
            occupant: None,
        }
    }

    /// Axial coordinate of this tile.
    #[must_use]
    pub const fn coord(&self) -> HexCoord {
        self.coord
    }

    /// Centre of the tile in world space.
    #[must_use]
    pub const fn world_position(&self) -> Vec3Fixed {
        self.world_position
    }

    /// Current terrain.
    #[must_use]
    pub const fn terrain(&self) -> TerrainType {
        self.terrain
    }

    /// Replace the terrain and reset buildability and resources from its
    /// configuration record.
    ///
    /// Returns `true` if the terrain type changed.
    pub fn set_terrain(&mut self, terrain: TerrainType, config: &TerrainConfig) -> bool {
        let changed = self.terrain != terrain;
        self.terrain = terrain;
        self.terrain_buildable = config.buildable;
        self.resources = config
            .resources
            .iter()
            .map(|deposit| (deposit.resource, ResourceAmount::full(deposit.amount)))
            .collect();
        changed
    }

    /// Whether a building may be placed here right now.
    #[must_use]
    pub const fn is_buildable(&self) -> bool {
        self.terrain_buildable && self.occupant.is_none()
    }

    // ------------------------------------------------------------------
    // Ownership
    // ------------------------------------------------------------------

    /// Owning player, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Owner in serialized form: `-1` for unowned.
    #[must_use]
    pub fn owner_id(&self) -> i32 {
        self.owner
            .and_then(|player| i32::try_from(player).ok())
            .unwrap_or(UNOWNED)
    }

    /// Check if `player` owns this tile.
    #[must_use]
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    /// Set or clear the owner. Returns `true` if it changed.
    ///
    /// Players above [`MAX_PLAYER_ID`] are refused.
    pub fn set_owner(&mut self, owner: Option<PlayerId>) -> bool {
        if let Some(player) = owner.filter(|player| *player > MAX_PLAYER_ID) {
            tracing::warn!(coord = %self.coord, player, "Owner id out of range");
            return false;
        }
        if self.owner == owner {
            return false;
        }
        self.owner = owner;
        true
    }

    // ------------------------------------------------------------------
    // Fog of war
    // ------------------------------------------------------------------

    /// What `player` knows about this tile.
    #[must_use]
    pub fn visibility(&self, player: PlayerId) -> VisibilityState {
        self.visibility.get(&player).copied().unwrap_or_default()
    }

    /// Check if `player` currently sees this tile.
    #[must_use]
    pub fn is_visible_to_player(&self, player: PlayerId) -> bool {
        self.visibility(player).is_visible
    }

    /// Check if `player` has ever seen this tile.
    #[must_use]
    pub fn is_explored_by_player(&self, player: PlayerId) -> bool {
        self.visibility(player).has_been_explored
    }

    /// Store an explicit state for `player`.
    ///
    /// A visible tile is always explored. Returns `true` if the effective
    /// state changed.
    pub fn set_visibility(&mut self, player: PlayerId, state: VisibilityState) -> bool {
        let state = VisibilityState {
            is_visible: state.is_visible,
            has_been_explored: state.has_been_explored || state.is_visible,
        };
        let previous = self.visibility(player);
        self.visibility.insert(player, state);
        previous != state
    }

    /// Make the tile visible (and therefore explored) to `player`.
    pub fn reveal(&mut self, player: PlayerId) -> bool {
        self.set_visibility(player, VisibilityState::DEFAULT)
    }

    /// Hide the tile from `player`, keeping what they explored.
    pub fn conceal(&mut self, player: PlayerId) -> bool {
        let explored = self.is_explored_by_player(player);
        self.set_visibility(
            player,
            VisibilityState {
                is_visible: false,
                has_been_explored: explored,
            },
        )
    }

    /// Drop the explicit entry for `player`, returning them to the default.
    pub fn clear_visibility(&mut self, player: PlayerId) -> bool {
        let previous = self.visibility(player);
        self.visibility.remove(&player);
        previous != VisibilityState::DEFAULT
    }

    /// Players with an explicit visibility entry, ascending.
    pub fn visibility_entries(&self) -> impl Iterator<Item = (PlayerId, VisibilityState)> + '_ {
        self.visibility.iter().map(|(&p, &s)| (p, s))
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Amount of one resource on this tile.
    #[must_use]
    pub fn resource(&self, resource: ResourceType) -> Option<ResourceAmount> {
        self.resources.get(&resource).copied()
    }

    /// All resources on this tile, in [`ResourceType`] order.
    pub fn resources(&self) -> impl Iterator<Item = (ResourceType, ResourceAmount)> + '_ {
        self.resources.iter().map(|(&t, &a)| (t, a))
    }

    /// Set a resource's current and maximum amount (clamped).
    pub fn set_resource(&mut self, resource: ResourceType, current: i32, max: i32) -> bool {
        let amount = ResourceAmount::new(current, max);
        self.resources.insert(resource, amount) != Some(amount)
    }

    /// Take up to `amount` units. Returns what was taken.
    pub fn harvest(&mut self, resource: ResourceType, amount: i32) -> i32 {
        self.resources
            .get_mut(&resource)
            .map_or(0, |deposit| deposit.harvest(amount))
    }

    /// Add up to `amount` units. Returns what was added.
    pub fn replenish(&mut self, resource: ResourceType, amount: i32) -> i32 {
        self.resources
            .get_mut(&resource)
            .map_or(0, |deposit| deposit.replenish(amount))
    }

    // ------------------------------------------------------------------
    // Occupancy
    // ------------------------------------------------------------------

    /// Check if a building sits on this tile.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Building on this tile, if any.
    #[must_use]
    pub const fn occupying_building(&self) -> Option<BuildingId> {
        self.occupant
    }

    /// Occupant in serialized form: `-1` when empty.
    #[must_use]
    pub fn occupying_building_id(&self) -> i32 {
        self.occupant
            .and_then(|id| i32::try_from(id.0).ok())
            .unwrap_or(NO_BUILDING)
    }

    /// Place or clear the occupying building. Returns `true` if it changed.
    ///
    /// Ids above [`MAX_BUILDING_ID`] are refused.
    pub fn set_occupying_building(&mut self, building: Option<BuildingId>) -> bool {
        if let Some(id) = building.filter(|id| id.0 > MAX_BUILDING_ID) {
            tracing::warn!(coord = %self.coord, id = id.0, "Building id out of range");
            return false;
        }
        if self.occupant == building {
            return false;
        }
        self.occupant = building;
        true
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serializable snapshot of this tile.
    #[must_use]
    pub fn to_data(&self) -> TileData {
        TileData {
            q: self.coord.q,
            r: self.coord.r,
            terrain: self.terrain,
            buildable: self.terrain_buildable,
            owner: self.owner_id(),
            resources: self
                .resources()
                .map(|(resource, amount)| ResourceData {
                    resource,
                    current: amount.current(),
                    max: amount.max(),
                })
                .collect(),
            visibility: self
                .visibility_entries()
                .map(|(player, state)| VisibilityData {
                    player,
                    is_visible: state.is_visible,
                    has_been_explored: state.has_been_explored,
                })
                .collect(),
            occupying_building_id: self.occupying_building_id(),
        }
    }

    /// Overwrite mutable state from a snapshot.
    ///
    /// The coordinate in `data` is not applied; the caller matches
    /// snapshots to tiles. Values are expected to have passed
    /// [`TileData::validate`]; anything out of range is clamped or
    /// treated as absent.
    pub fn apply_data(&mut self, data: &TileData) {
        self.terrain = data.terrain;
        self.terrain_buildable = data.buildable;
        self.owner = u32::try_from(data.owner).ok();
        self.resources = data
            .resources
            .iter()
            .map(|r| (r.resource, ResourceAmount::new(r.current, r.max)))
            .collect();
        self.visibility = data
            .visibility
            .iter()
            .map(|v| {
                (
                    v.player,
                    VisibilityState {
                        is_visible: v.is_visible,
                        has_been_explored: v.has_been_explored || v.is_visible,
                    },
                )
            })
            .collect();
        self.occupant = u32::try_from(data.occupying_building_id).ok().map(BuildingId);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TerrainTable;

    fn tile() -> HexTile {
        HexTile::new(HexCoord::new(2, -1), &HexLayout::default())
    }

    #[test]
    fn test_new_tile_defaults() {
        let tile = tile();
        assert_eq!(tile.terrain(), TerrainType::Grassland);
        assert_eq!(tile.owner(), None);
        assert_eq!(tile.owner_id(), UNOWNED);
        assert!(tile.is_buildable());
        assert!(!tile.is_occupied());
        assert_eq!(tile.occupying_building_id(), NO_BUILDING);
        assert_eq!(
            tile.world_position(),
            HexLayout::default().axial_to_world(HexCoord::new(2, -1))
        );
    }

    #[test]
    fn test_out_of_range_ids_are_refused() {
        let mut tile = tile();
        assert!(!tile.set_owner(Some(u32::MAX)));
        assert!(!tile.set_occupying_building(Some(BuildingId(MAX_BUILDING_ID + 1))));
        assert_eq!(tile.owner(), None);
        assert_eq!(tile.owner_id(), UNOWNED);
        assert!(!tile.is_occupied());

        assert!(tile.set_owner(Some(MAX_PLAYER_ID)));
        assert!(tile.set_occupying_building(Some(BuildingId(MAX_BUILDING_ID))));
        let data = tile.to_data();
        assert_eq!(data.owner, i32::MAX);
        assert_eq!(data.occupying_building_id, i32::MAX);
        assert!(data.validate().is_ok());

        let mut restored = HexTile::new(tile.coord(), &HexLayout::default());
        restored.apply_data(&data);
        assert_eq!(restored.owner(), Some(MAX_PLAYER_ID));
        assert_eq!(restored.occupying_building(), Some(BuildingId(MAX_BUILDING_ID)));
    }

    #[test]
    fn test_fog_defaults_to_visible_and_explored() {
        let tile = tile();
        for player in [0, 1, 7, 1000] {
            assert!(tile.is_visible_to_player(player));
            assert!(tile.is_explored_by_player(player));
        }
    }

    #[test]
    fn test_visible_implies_explored() {
        let mut tile = tile();
        tile.set_visibility(
            3,
            VisibilityState {
                is_visible: true,
                has_been_explored: false,
            },
        );
        assert!(tile.is_explored_by_player(3));
    }

    #[test]
    fn test_conceal_keeps_exploration() {
        let mut tile = tile();
        tile.set_visibility(1, VisibilityState::UNEXPLORED);
        assert!(!tile.is_visible_to_player(1));
        assert!(!tile.is_explored_by_player(1));

        assert!(tile.reveal(1));
        assert!(tile.conceal(1));
        assert_eq!(tile.visibility(1), VisibilityState::REMEMBERED);

        // Other players are unaffected
        assert!(tile.is_visible_to_player(2));
    }

    #[test]
    fn test_clear_visibility_restores_default() {
        let mut tile = tile();
        tile.set_visibility(1, VisibilityState::UNEXPLORED);
        assert!(tile.clear_visibility(1));
        assert_eq!(tile.visibility(1), VisibilityState::DEFAULT);
        assert!(!tile.clear_visibility(1));
    }

    #[test]
    fn test_occupied_tile_is_never_buildable() {
        let mut tile = tile();
        assert!(tile.set_occupying_building(Some(BuildingId(4))));
        assert!(tile.is_occupied());
        assert!(!tile.is_buildable());
        assert_eq!(tile.occupying_building_id(), 4);

        assert!(!tile.set_occupying_building(Some(BuildingId(4))));
        assert!(tile.set_occupying_building(None));
        assert!(tile.is_buildable());
        assert_eq!(tile.occupying_building_id(), NO_BUILDING);
    }

    #[test]
    fn test_set_terrain_applies_config() {
        let table = TerrainTable::fallback();
        let mut tile = tile();

        let forest = table.get(TerrainType::Forest).unwrap();
        assert!(tile.set_terrain(TerrainType::Forest, forest));
        assert!(!tile.is_buildable());
        assert_eq!(tile.resource(ResourceType::Wood).unwrap().current(), 200);

        let plains = table.get(TerrainType::Plains).unwrap();
        tile.set_terrain(TerrainType::Plains, plains);
        assert!(tile.is_buildable());
        assert!(tile.resource(ResourceType::Wood).is_none());
    }

    #[test]
    fn test_resources_stay_in_bounds() {
        let mut tile = tile();
        tile.set_resource(ResourceType::Minerals, 500, 100);
        assert_eq!(tile.resource(ResourceType::Minerals).unwrap().current(), 100);

        assert_eq!(tile.harvest(ResourceType::Minerals, 130), 100);
        assert_eq!(tile.resource(ResourceType::Minerals).unwrap().current(), 0);
        assert_eq!(tile.replenish(ResourceType::Minerals, 250), 100);

        // Absent resources yield nothing
        assert_eq!(tile.harvest(ResourceType::Energy, 10), 0);
    }

    #[test]
    fn test_owner_changes_report() {
        let mut tile = tile();
        assert!(tile.set_owner(Some(2)));
        assert!(!tile.set_owner(Some(2)));
        assert!(tile.is_owned_by(2));
        assert_eq!(tile.owner_id(), 2);
        assert!(tile.set_owner(None));
        assert_eq!(tile.owner_id(), UNOWNED);
    }

    #[test]
    fn test_data_round_trip_preserves_state() {
        let mut original = tile();
        original.set_owner(Some(1));
        original.set_resource(ResourceType::Food, 30, 80);
        original.set_visibility(0, VisibilityState::REMEMBERED);
        original.set_occupying_building(Some(BuildingId(12)));

        let data = original.to_data();
        assert_eq!(data.owner, 1);
        assert_eq!(data.occupying_building_id, 12);

        let mut restored = tile();
        restored.apply_data(&data);
        assert_eq!(restored, original);
    }
}
