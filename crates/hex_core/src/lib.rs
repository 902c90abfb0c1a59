//! # Hex Core
//!
//! Simulation core for Hexfront, a hex-grid strategy game that plays in
//! real time or in turns.
//!
//! This crate contains **only** game logic:
//! - No rendering
//! - No input handling
//! - No floating-point simulation math (uses fixed-point)
//! - No global state (everything hangs off a [`session::GameSession`])
//!
//! The renderer and input layers read tiles, drain tile events and call
//! into the session; they never reach inside.
//!
//! ## Crate Structure
//!
//! - [`hex`] - Axial coordinates, directions and world-space layout
//! - [`tile`] / [`grid`] - Tile state and the tile collection
//! - [`pathfinding`] - Movement validation and A* search
//! - [`time`] / [`tick`] - Time providers and tick dispatch
//! - [`turn`] / [`game_mode`] / [`state`] - Turns, modes and lifecycle
//! - [`snapshot`] - Save data
//! - [`data`] - RON configuration tables

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod buildings;
pub mod data;
pub mod error;
pub mod game_mode;
pub mod grid;
pub mod hex;
pub mod map_service;
pub mod math;
pub mod observer;
pub mod pathfinding;
pub mod resources;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod tile;
pub mod time;
pub mod turn;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::buildings::{BuildingId, BuildingRegistry, PlacedBuilding};
    pub use crate::data::{
        BuildingCatalog, BuildingData, GameModeConfig, GameModeKind, TerrainConfig, TerrainTable,
        TerrainType,
    };
    pub use crate::error::{GameError, Result};
    pub use crate::game_mode::{GameMode, GameModeManager, GamePhase, RealTimeMode, TurnBasedMode};
    pub use crate::grid::HexGrid;
    pub use crate::hex::{HexCoord, HexDirection, HexLayout};
    pub use crate::map_service::MapService;
    pub use crate::math::{Fixed, Vec3Fixed};
    pub use crate::pathfinding::{find_path, HexPathValidator, PathValidator};
    pub use crate::resources::{ResourceAmount, ResourceType};
    pub use crate::session::GameSession;
    pub use crate::snapshot::GridSnapshot;
    pub use crate::state::GameStateManager;
    pub use crate::tick::{TickManager, Tickable};
    pub use crate::tile::{HexTile, PlayerId, TileEvent, VisibilityState};
    pub use crate::time::{RealTimeProvider, TimeProvider, TurnTimeProvider};
    pub use crate::turn::{TurnListener, TurnManager};
}
