//! Save-game snapshots of the hex grid.
//!
//! A [`GridSnapshot`] is a versioned container of [`TileData`] records.
//! It round-trips through JSON text (the save-file format) or a compact
//! bincode form. Snapshots are validated as a whole before any tile is
//! touched, so a corrupt save is never partially applied.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::TerrainType;
use crate::error::{GameError, Result};
use crate::hex::HexCoord;
use crate::resources::ResourceType;
use crate::tile::{PlayerId, NO_BUILDING, UNOWNED};

/// Snapshot format version for compatibility.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One resource entry of a saved tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Resource type.
    pub resource: ResourceType,
    /// Amount available.
    pub current: i32,
    /// Capacity.
    pub max: i32,
}

/// One player's fog-of-war entry of a saved tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityData {
    /// Player index.
    pub player: PlayerId,
    /// Currently visible.
    pub is_visible: bool,
    /// Seen at some point.
    pub has_been_explored: bool,
}

/// Serializable state of one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileData {
    /// Axial column.
    pub q: i32,
    /// Axial row.
    pub r: i32,
    /// Terrain type.
    pub terrain: TerrainType,
    /// Terrain allows construction (ignoring occupancy).
    #[serde(default = "default_buildable")]
    pub buildable: bool,
    /// Owning player, `-1` when unowned.
    pub owner: i32,
    /// Resource deposits.
    #[serde(default)]
    pub resources: Vec<ResourceData>,
    /// Explicit fog-of-war entries.
    #[serde(default)]
    pub visibility: Vec<VisibilityData>,
    /// Occupying building, `-1` when empty.
    pub occupying_building_id: i32,
}

const fn default_buildable() -> bool {
    true
}

impl TileData {
    /// Coordinate this record belongs to.
    #[must_use]
    pub const fn coord(&self) -> HexCoord {
        HexCoord::new(self.q, self.r)
    }

    /// Check the record's internal consistency.
    pub fn validate(&self) -> Result<()> {
        let coord = self.coord();
        if self.owner < UNOWNED {
            return Err(GameError::SnapshotValidation(format!(
                "tile {coord}: owner {} is below -1",
                self.owner
            )));
        }
        if self.occupying_building_id < NO_BUILDING {
            return Err(GameError::SnapshotValidation(format!(
                "tile {coord}: building id {} is below -1",
                self.occupying_building_id
            )));
        }

        let mut seen_resources = HashSet::new();
        for entry in &self.resources {
            if !seen_resources.insert(entry.resource) {
                return Err(GameError::SnapshotValidation(format!(
                    "tile {coord}: duplicate {:?} entry",
                    entry.resource
                )));
            }
            if entry.max < 0 || entry.current < 0 || entry.current > entry.max {
                return Err(GameError::SnapshotValidation(format!(
                    "tile {coord}: {:?} amount {}/{} out of range",
                    entry.resource, entry.current, entry.max
                )));
            }
        }

        let mut seen_players = HashSet::new();
        for entry in &self.visibility {
            if !seen_players.insert(entry.player) {
                return Err(GameError::SnapshotValidation(format!(
                    "tile {coord}: duplicate visibility entry for player {}",
                    entry.player
                )));
            }
        }

        Ok(())
    }
}

/// Versioned container for a whole grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Snapshot format version.
    pub version: u32,
    /// Declared grid width.
    pub width: u32,
    /// Declared grid height.
    pub height: u32,
    /// Seconds since the Unix epoch when the snapshot was taken.
    pub timestamp: u64,
    /// Every tile, in row-major coordinate order.
    pub tiles: Vec<TileData>,
}

impl GridSnapshot {
    /// Create a snapshot at the current format version.
    #[must_use]
    pub fn new(width: u32, height: u32, timestamp: u64, tiles: Vec<TileData>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            width,
            height,
            timestamp,
            tiles,
        }
    }

    /// Check version, per-tile consistency and coordinate uniqueness.
    pub fn validate(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(GameError::SnapshotValidation(format!(
                "snapshot version mismatch: expected {}, got {}",
                SNAPSHOT_VERSION, self.version
            )));
        }

        let mut seen = HashSet::with_capacity(self.tiles.len());
        for tile in &self.tiles {
            tile.validate()?;
            if !seen.insert(tile.coord()) {
                return Err(GameError::SnapshotValidation(format!(
                    "duplicate tile {}",
                    tile.coord()
                )));
            }
        }

        Ok(())
    }

    /// Check that this snapshot was taken from a grid of the given size.
    pub fn validate_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if self.width != width || self.height != height {
            return Err(GameError::SnapshotValidation(format!(
                "dimension mismatch: grid is {width}x{height}, snapshot is {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| GameError::Serialization(e.to_string()))
    }

    /// Decode and validate JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(text).map_err(|e| GameError::Serialization(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Encode as compact binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GameError::Serialization(e.to_string()))
    }

    /// Decode and validate binary data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| GameError::Serialization(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Write the snapshot as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = self.to_json()?;
        std::fs::write(path.as_ref(), text).map_err(|e| {
            GameError::Serialization(format!("Failed to write snapshot file: {e}"))
        })?;
        tracing::info!(path = %path.as_ref().display(), tiles = self.tiles.len(), "Saved grid snapshot");
        Ok(())
    }

    /// Read and validate a JSON snapshot file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GameError::Serialization(format!("Failed to read snapshot file: {e}"))
        })?;
        Self::from_json(&text)
    }
}
