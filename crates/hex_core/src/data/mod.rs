//! Data-driven configuration records.
//!
//! Terrain tables, building catalogs and mode settings are plain structs
//! deserialized from RON files at start-up. They carry no behaviour of
//! their own and are never mutated during a session.

mod building_data;
mod mode_config;
mod terrain_data;

pub use building_data::{
    sell_refund, BuildingCatalog, BuildingData, ProductionCapability, StorageCapability,
    UpgradeCapability, SELL_REFUND_RATIO,
};
pub use mode_config::{GameModeConfig, GameModeKind};
pub use terrain_data::{ResourceDeposit, TerrainConfig, TerrainTable, TerrainType};
