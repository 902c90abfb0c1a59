//! The application context that owns every core service.
//!
//! A [`GameSession`] is built explicitly and passed to whatever needs it.
//! It wires the shared [`TickManager`] into the game mode and owns the
//! map, the lifecycle state machine and the building registry.

use std::rc::Rc;

use crate::buildings::{BuildingId, BuildingRegistry};
use crate::data::{BuildingCatalog, GameModeConfig};
use crate::error::{GameError, Result};
use crate::game_mode::{GameModeManager, GamePhase};
use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::map_service::MapService;
use crate::math::Fixed;
use crate::snapshot::GridSnapshot;
use crate::state::GameStateManager;
use crate::tick::TickManager;
use crate::tile::PlayerId;

/// Owner of the map, game state, tick manager and buildings.
#[derive(Debug)]
pub struct GameSession {
    map: MapService,
    state: GameStateManager,
    ticks: Rc<TickManager>,
    buildings: BuildingRegistry,
    catalog: BuildingCatalog,
}

impl GameSession {
    /// Build a session in `Initialization` with no map.
    #[must_use]
    pub fn new(config: GameModeConfig) -> Self {
        let ticks = TickManager::shared();
        let modes = GameModeManager::new(config, Rc::clone(&ticks));
        Self {
            map: MapService::new(),
            state: GameStateManager::new(modes),
            ticks,
            buildings: BuildingRegistry::new(),
            catalog: BuildingCatalog::default(),
        }
    }

    /// Use `catalog` for building lookups.
    #[must_use]
    pub fn with_catalog(mut self, catalog: BuildingCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Install the map.
    #[must_use]
    pub fn with_grid(mut self, grid: HexGrid) -> Self {
        self.install_map(grid);
        self
    }

    /// Replace the map. Existing buildings are forgotten.
    pub fn install_map(&mut self, grid: HexGrid) {
        self.buildings = BuildingRegistry::new();
        self.buildings.sync_with_grid(&grid);
        self.map.install(grid);
    }

    /// Read-only map access.
    #[must_use]
    pub fn map(&self) -> &MapService {
        &self.map
    }

    /// Mutable grid access for territory, fog and harvesting systems.
    pub fn grid_mut(&mut self) -> Option<&mut HexGrid> {
        self.map.grid_mut()
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> &GameStateManager {
        &self.state
    }

    /// Lifecycle state, mutably.
    pub fn state_mut(&mut self) -> &mut GameStateManager {
        &mut self.state
    }

    /// Shared tick manager; register tickables here.
    #[must_use]
    pub fn ticks(&self) -> &Rc<TickManager> {
        &self.ticks
    }

    /// Placed buildings.
    #[must_use]
    pub fn buildings(&self) -> &BuildingRegistry {
        &self.buildings
    }

    /// Building definitions.
    #[must_use]
    pub fn catalog(&self) -> &BuildingCatalog {
        &self.catalog
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    /// See [`GameStateManager::start_game`].
    pub fn start_game(&mut self) -> bool {
        self.state.start_game()
    }

    /// See [`GameStateManager::end_player_turn`].
    pub fn end_player_turn(&mut self) -> bool {
        self.state.end_player_turn()
    }

    /// Advance one frame.
    pub fn update(&mut self, frame_delta: Fixed) {
        self.state.update(frame_delta);
    }

    /// Place a catalog building for `owner`.
    pub fn place_building(&mut self, kind: &str, coord: HexCoord, owner: PlayerId) -> Result<BuildingId> {
        self.ensure_player_can_act()?;
        let Some(definition) = self.catalog.get(kind) else {
            return Err(GameError::InvalidState(format!("unknown building '{kind}'")));
        };
        let Some(grid) = self.map.grid_mut() else {
            return Err(GameError::InvalidState("map not ready".to_string()));
        };
        self.buildings.place(grid, definition, coord, owner)
    }

    /// Sell the building on `coord` and return the refund.
    pub fn sell_building(&mut self, coord: HexCoord) -> Result<i32> {
        self.ensure_player_can_act()?;
        let Some(grid) = self.map.grid_mut() else {
            return Err(GameError::InvalidState("map not ready".to_string()));
        };
        self.buildings.sell(grid, coord)
    }

    /// Capture the map.
    #[must_use]
    pub fn save_snapshot(&self, timestamp: u64) -> Option<GridSnapshot> {
        self.map.grid().map(|grid| grid.to_snapshot(timestamp))
    }

    /// Restore tile state from `snapshot`.
    ///
    /// Rejected snapshots leave the map untouched.
    pub fn load_snapshot(&mut self, snapshot: &GridSnapshot) -> Result<()> {
        let Some(grid) = self.map.grid_mut() else {
            return Err(GameError::InvalidState("map not ready".to_string()));
        };
        grid.apply_snapshot(snapshot)?;
        self.buildings.sync_with_grid(grid);
        Ok(())
    }

    fn ensure_player_can_act(&self) -> Result<()> {
        if self.state.can_player_act() {
            Ok(())
        } else {
            tracing::warn!(phase = ?self.state.phase(), "Player cannot act");
            Err(GameError::InvalidState("player cannot act".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BuildingData, GameModeKind};
    use crate::hex::HexLayout;

    fn catalog() -> BuildingCatalog {
        BuildingCatalog {
            buildings: vec![BuildingData {
                id: "depot".to_string(),
                name: "building.depot.name".to_string(),
                credits_cost: 100,
                vision_radius: 0,
                upgrade: None,
                production: None,
                storage: None,
            }],
        }
    }

    fn session(mode: GameModeKind) -> GameSession {
        GameSession::new(GameModeConfig::for_mode(mode))
            .with_catalog(catalog())
            .with_grid(HexGrid::generate(4, 4, HexLayout::default()))
    }

    #[test]
    fn test_buildings_need_running_game() {
        let mut session = session(GameModeKind::RealTime);
        let coord = HexCoord::new(1, 1);
        assert!(session.place_building("depot", coord, 0).is_err());

        session.start_game();
        assert!(session.place_building("depot", coord, 0).is_ok());
        assert_eq!(session.sell_building(coord).unwrap(), 50);
    }

    #[test]
    fn test_unknown_building_rejected() {
        let mut session = session(GameModeKind::RealTime);
        session.start_game();
        assert!(matches!(
            session.place_building("castle", HexCoord::ORIGIN, 0),
            Err(GameError::InvalidState(_))
        ));
    }

    #[test]
    fn test_no_map() {
        let mut session = GameSession::new(GameModeConfig::default()).with_catalog(catalog());
        session.start_game();
        assert!(session.place_building("depot", HexCoord::ORIGIN, 0).is_err());
        assert!(session.save_snapshot(0).is_none());
    }

    #[test]
    fn test_snapshot_round_trip_through_session() {
        let mut session = session(GameModeKind::TurnBased);
        session.start_game();
        session.place_building("depot", HexCoord::new(2, 2), 3).unwrap();
        let snapshot = session.save_snapshot(7).unwrap();

        let mut restored = self::session(GameModeKind::TurnBased);
        restored.load_snapshot(&snapshot).unwrap();
        let tile = restored.map().get_tile(HexCoord::new(2, 2)).unwrap();
        assert!(tile.is_occupied());
        assert!(tile.is_owned_by(3));
    }
}
