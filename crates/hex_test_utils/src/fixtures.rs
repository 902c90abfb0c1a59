//! Test fixtures and helpers.
//!
//! Recording subscribers for the tick and turn pipelines, plus pre-built
//! grids, catalogs and sessions for consistent testing.

use std::cell::RefCell;
use std::rc::Rc;

use fixed::types::I32F32;
use hex_core::data::{BuildingCatalog, BuildingData, GameModeConfig, GameModeKind, TerrainTable, TerrainType};
use hex_core::error::{GameError, Result};
use hex_core::grid::HexGrid;
use hex_core::hex::{HexCoord, HexLayout};
use hex_core::math::Fixed;
use hex_core::session::GameSession;
use hex_core::tick::Tickable;
use hex_core::turn::TurnListener;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Shared, ordered record of which subscriber ran.
pub type CallLog = Rc<RefCell<Vec<String>>>;

/// Create an empty [`CallLog`].
#[must_use]
pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Snapshot of a [`CallLog`]'s entries.
#[must_use]
pub fn entries(log: &CallLog) -> Vec<String> {
    log.borrow().clone()
}

// ============================================================================
// Tickables
// ============================================================================

/// Tickable that records every delta it receives.
#[derive(Debug)]
pub struct RecordingTickable {
    label: String,
    priority: i32,
    active: bool,
    failing: bool,
    deltas: Vec<Fixed>,
    log: CallLog,
}

impl RecordingTickable {
    /// Create a shared tickable writing `label` to `log` on each tick.
    #[must_use]
    pub fn new(label: &str, priority: i32, log: &CallLog) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            label: label.to_string(),
            priority,
            active: true,
            failing: false,
            deltas: Vec::new(),
            log: Rc::clone(log),
        }))
    }

    /// Toggle whether the manager should call this tickable.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Make every tick return an error after recording.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Deltas received so far.
    #[must_use]
    pub fn deltas(&self) -> &[Fixed] {
        &self.deltas
    }

    /// Number of ticks received.
    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.deltas.len()
    }
}

impl Tickable for RecordingTickable {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn tick(&mut self, delta: Fixed) -> Result<()> {
        self.deltas.push(delta);
        self.log.borrow_mut().push(self.label.clone());
        if self.failing {
            return Err(GameError::ListenerFailed(self.label.clone()));
        }
        Ok(())
    }
}

// ============================================================================
// Turn listeners
// ============================================================================

/// Turn listener that logs `"<label>:start:<turn>"` / `"<label>:end:<turn>"`.
#[derive(Debug)]
pub struct RecordingListener {
    label: String,
    failing: bool,
    log: CallLog,
}

impl RecordingListener {
    /// Create a shared listener writing to `log`.
    #[must_use]
    pub fn new(label: &str, log: &CallLog) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            label: label.to_string(),
            failing: false,
            log: Rc::clone(log),
        }))
    }

    /// Like [`new`](Self::new), but every notification fails after logging.
    #[must_use]
    pub fn failing(label: &str, log: &CallLog) -> Rc<RefCell<Self>> {
        let listener = Self::new(label, log);
        listener.borrow_mut().failing = true;
        listener
    }

    fn record(&self, event: &str, turn: u32) -> Result<()> {
        self.log
            .borrow_mut()
            .push(format!("{}:{event}:{turn}", self.label));
        if self.failing {
            return Err(GameError::ListenerFailed(self.label.clone()));
        }
        Ok(())
    }
}

impl TurnListener for RecordingListener {
    fn on_turn_start(&mut self, turn: u32) -> Result<()> {
        self.record("start", turn)
    }

    fn on_turn_end(&mut self, turn: u32) -> Result<()> {
        self.record("end", turn)
    }
}

// ============================================================================
// Grids and sessions
// ============================================================================

/// All-Grassland grid with unit-size hexes.
#[must_use]
pub fn grassland_grid(width: u32, height: u32) -> HexGrid {
    HexGrid::generate(width, height, HexLayout::default())
}

/// Grid whose column `wall_q` is Water except for a gap at row `gap_r`.
#[must_use]
pub fn walled_grid(width: u32, height: u32, wall_q: i32, gap_r: Option<i32>) -> HexGrid {
    HexGrid::generate_with(
        width,
        height,
        HexLayout::default(),
        &TerrainTable::fallback(),
        |coord: HexCoord| {
            if coord.q == wall_q && Some(coord.r) != gap_r {
                TerrainType::Water
            } else {
                TerrainType::Grassland
            }
        },
    )
}

/// Grid cycling through every terrain type in row-major order.
#[must_use]
pub fn mixed_terrain_grid(width: u32, height: u32) -> HexGrid {
    let terrains = TerrainType::ALL;
    HexGrid::generate_with(
        width,
        height,
        HexLayout::default(),
        &TerrainTable::fallback(),
        |coord: HexCoord| {
            let index = (coord.q + coord.r * 3).rem_euclid(terrains.len() as i32) as usize;
            terrains[index]
        },
    )
}

/// Catalog with a 100-credit `depot` and a 250-credit `watchtower`.
#[must_use]
pub fn test_catalog() -> BuildingCatalog {
    BuildingCatalog {
        buildings: vec![
            BuildingData {
                id: "depot".to_string(),
                name: "building.depot.name".to_string(),
                credits_cost: 100,
                vision_radius: 1,
                upgrade: None,
                production: None,
                storage: None,
            },
            BuildingData {
                id: "watchtower".to_string(),
                name: "building.watchtower.name".to_string(),
                credits_cost: 250,
                vision_radius: 3,
                upgrade: None,
                production: None,
                storage: None,
            },
        ],
    }
}

/// Session of the given mode over a Grassland grid, not yet started.
#[must_use]
pub fn test_session(mode: GameModeKind, width: u32, height: u32) -> GameSession {
    GameSession::new(GameModeConfig::for_mode(mode))
        .with_catalog(test_catalog())
        .with_grid(grassland_grid(width, height))
}

/// Session already in `Playing`.
#[must_use]
pub fn started_session(mode: GameModeKind, width: u32, height: u32) -> GameSession {
    let mut session = test_session(mode, width, height);
    if !session.start_game() {
        tracing::warn!("Fixture session failed to start");
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_core::tick::TickManager;

    #[test]
    fn test_recording_tickable_logs_label() {
        let log = call_log();
        let tickable = RecordingTickable::new("a", 1, &log);
        let manager = TickManager::new();
        manager.register(&tickable);
        manager.process_tick(fixed(2));
        assert_eq!(entries(&log), vec!["a"]);
        assert_eq!(tickable.borrow().deltas(), &[fixed(2)]);
    }

    #[test]
    fn test_walled_grid_has_gap() {
        let grid = walled_grid(5, 5, 2, Some(4));
        let blocked = grid.get_tile(HexCoord::new(2, 0)).unwrap();
        assert_eq!(blocked.terrain(), TerrainType::Water);
        let gap = grid.get_tile(HexCoord::new(2, 4)).unwrap();
        assert_eq!(gap.terrain(), TerrainType::Grassland);
    }

    #[test]
    fn test_started_session_is_playing() {
        let session = started_session(GameModeKind::TurnBased, 3, 3);
        assert!(session.state().can_player_act());
    }
}
