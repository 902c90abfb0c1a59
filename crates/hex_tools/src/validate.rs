//! Data validation utilities.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use hex_core::data::{BuildingCatalog, GameModeConfig, TerrainTable, TerrainType};
use hex_core::error::GameError;
use hex_core::grid::HexGrid;
use hex_core::hex::HexLayout;
use hex_core::snapshot::GridSnapshot;
use serde::Serialize;

use crate::error::{ToolError, ToolResult};

/// Summary of a save file that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    /// Snapshot format version.
    pub version: u32,
    /// Declared width.
    pub width: u32,
    /// Declared height.
    pub height: u32,
    /// Save time, seconds since the Unix epoch.
    pub timestamp: u64,
    /// Tiles stored.
    pub tiles: usize,
    /// Tiles outside the declared bounds (allowed, but unusual).
    pub outside_bounds: usize,
    /// Tiles with an owner.
    pub owned: usize,
    /// Tiles with a building.
    pub occupied: usize,
}

/// Validate a JSON save file and summarize it.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not decode, or fails
/// snapshot validation.
pub fn validate_save(path: &Path) -> ToolResult<SaveReport> {
    let snapshot = GridSnapshot::load(path)?;
    let grid = HexGrid::from_snapshot(&snapshot, HexLayout::default())?;
    grid.check_invariants()?;

    let outside_bounds = grid
        .tiles()
        .filter(|tile| !grid.in_declared_bounds(tile.coord()))
        .count();
    if outside_bounds > 0 {
        tracing::warn!(path = %path.display(), outside_bounds, "Save has tiles outside its declared bounds");
    }

    Ok(SaveReport {
        version: snapshot.version,
        width: snapshot.width,
        height: snapshot.height,
        timestamp: snapshot.timestamp,
        tiles: grid.len(),
        outside_bounds,
        owned: grid.tiles().filter(|tile| tile.owner().is_some()).count(),
        occupied: grid.tiles().filter(|tile| tile.is_occupied()).count(),
    })
}

/// Summary of a terrain table that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerrainReport {
    /// Terrain types configured.
    pub entries: usize,
    /// Terrain types without an entry; the built-in table covers them.
    pub missing: Vec<TerrainType>,
    /// Configured terrain types units cannot enter.
    pub impassable: Vec<TerrainType>,
}

/// Validate a RON terrain table and summarize it.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn validate_terrain(path: &Path) -> ToolResult<TerrainReport> {
    let table = TerrainTable::load(path)?;

    let missing: Vec<TerrainType> = TerrainType::ALL
        .into_iter()
        .filter(|terrain| table.get(*terrain).is_none())
        .collect();
    if !missing.is_empty() {
        tracing::warn!(path = %path.display(), ?missing, "Terrain table is incomplete; built-in values will be used");
    }

    let impassable = TerrainType::ALL
        .into_iter()
        .filter(|terrain| table.get(*terrain).is_some_and(|config| !config.passable))
        .collect();

    Ok(TerrainReport {
        entries: TerrainType::ALL.len() - missing.len(),
        missing,
        impassable,
    })
}

/// Validate a RON building catalog.
///
/// Ids must be unique and upgrade targets must exist in the catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or is inconsistent.
pub fn validate_catalog(path: &Path) -> ToolResult<usize> {
    let catalog = BuildingCatalog::load(path)?;
    check_catalog(&catalog).map_err(|message| GameError::DataParseError {
        path: path.display().to_string(),
        message,
    })?;
    Ok(catalog.buildings.len())
}

fn check_catalog(catalog: &BuildingCatalog) -> Result<(), String> {
    let mut ids = BTreeSet::new();
    for building in &catalog.buildings {
        if !ids.insert(building.id.as_str()) {
            return Err(format!("duplicate building id '{}'", building.id));
        }
        if building.credits_cost < 0 {
            return Err(format!("building '{}' has a negative cost", building.id));
        }
    }
    for building in &catalog.buildings {
        if let Some(upgrade) = &building.upgrade {
            if !ids.contains(upgrade.upgrades_to.as_str()) {
                return Err(format!(
                    "building '{}' upgrades to unknown '{}'",
                    building.id, upgrade.upgrades_to
                ));
            }
        }
    }
    Ok(())
}

/// Kind of data file, judged by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFileKind {
    /// `terrain*.ron`
    Terrain,
    /// `building*.ron`
    Buildings,
    /// `mode*.ron` or `game_mode*.ron`
    ModeConfig,
    /// `*.json` save
    Save,
}

/// Classify a file by name; `None` for files the validator ignores.
#[must_use]
pub fn classify(path: &Path) -> Option<DataFileKind> {
    let name = path.file_name()?.to_str()?;
    let extension = path.extension()?.to_str()?;
    match extension {
        "json" => Some(DataFileKind::Save),
        "ron" if name.starts_with("terrain") => Some(DataFileKind::Terrain),
        "ron" if name.starts_with("building") => Some(DataFileKind::Buildings),
        "ron" if name.starts_with("mode") || name.starts_with("game_mode") => {
            Some(DataFileKind::ModeConfig)
        }
        _ => None,
    }
}

fn validate_file(path: &Path, kind: DataFileKind) -> ToolResult<()> {
    match kind {
        DataFileKind::Terrain => validate_terrain(path).map(|_| ()),
        DataFileKind::Buildings => validate_catalog(path).map(|_| ()),
        DataFileKind::ModeConfig => GameModeConfig::load(path).map(|_| ()).map_err(ToolError::from),
        DataFileKind::Save => validate_save(path).map(|_| ()),
    }
}

/// Validate all recognised data files in a directory.
///
/// Returns the number of files checked.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or any data file
/// fails validation.
pub fn validate_data_directory(path: &Path) -> ToolResult<usize> {
    let read_dir = std::fs::read_dir(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut files: Vec<(PathBuf, DataFileKind)> = read_dir
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|file| classify(&file).map(|kind| (file, kind)))
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut failed = 0;
    for (file, kind) in &files {
        match validate_file(file, *kind) {
            Ok(()) => tracing::info!(file = %file.display(), ?kind, "Valid"),
            Err(error) => {
                tracing::error!(file = %file.display(), ?kind, %error, "Invalid");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(ToolError::ValidationFailed {
            checked: files.len(),
            failed,
        });
    }
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_core::buildings::BuildingId;
    use hex_core::hex::HexCoord;
    use hex_test_utils::fixtures::grassland_grid;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hex_tools_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_validate_save_summarizes_grid() {
        let dir = scratch_dir("save");
        let mut grid = grassland_grid(4, 3);
        grid.set_owner(HexCoord::new(1, 1), Some(2));
        grid.set_occupying_building(HexCoord::new(1, 1), Some(BuildingId(0)));
        let path = dir.join("save.json");
        grid.to_snapshot(99).save(&path).unwrap();

        let report = validate_save(&path).unwrap();
        assert_eq!(report.tiles, 12);
        assert_eq!(report.owned, 1);
        assert_eq!(report.occupied, 1);
        assert_eq!(report.outside_bounds, 0);
        assert_eq!(report.timestamp, 99);
    }

    #[test]
    fn test_validate_save_rejects_corrupt_file() {
        let dir = scratch_dir("corrupt");
        let path = dir.join("save.json");
        std::fs::write(&path, "{\"version\": 1}").unwrap();
        assert!(validate_save(&path).is_err());
    }

    #[test]
    fn test_validate_terrain_reports_missing_entries() {
        let dir = scratch_dir("terrain");
        let path = dir.join("terrain.ron");
        std::fs::write(
            &path,
            "(terrains: { Grassland: (buildable: true, passable: true, movement_cost: 1.0), \
             Water: (buildable: false, passable: false, movement_cost: 0.0) })",
        )
        .unwrap();

        let report = validate_terrain(&path).unwrap();
        assert_eq!(report.entries, 2);
        assert_eq!(report.missing.len(), 6);
        assert_eq!(report.impassable, vec![TerrainType::Water]);
    }

    #[test]
    fn test_catalog_upgrade_targets_must_exist() {
        let dir = scratch_dir("catalog");
        let path = dir.join("buildings.ron");
        std::fs::write(
            &path,
            "(buildings: [(id: \"hut\", name: \"hut\", credits_cost: 10, vision_radius: 1, \
             upgrade: Some((upgrades_to: \"hall\", credits_cost: 5)))])",
        )
        .unwrap();
        assert!(validate_catalog(&path).is_err());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(Path::new("terrain.ron")), Some(DataFileKind::Terrain));
        assert_eq!(classify(Path::new("buildings_base.ron")), Some(DataFileKind::Buildings));
        assert_eq!(classify(Path::new("game_mode.ron")), Some(DataFileKind::ModeConfig));
        assert_eq!(classify(Path::new("slot1.json")), Some(DataFileKind::Save));
        assert_eq!(classify(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_validate_directory_counts_failures() {
        let dir = scratch_dir("dir");
        std::fs::write(dir.join("mode.ron"), "(mode: TurnBased)").unwrap();
        std::fs::write(dir.join("readme.md"), "ignored").unwrap();
        assert_eq!(validate_data_directory(&dir).unwrap(), 1);

        std::fs::write(dir.join("mode_bad.ron"), "(initial_time_scale: -1.0)").unwrap();
        assert!(matches!(
            validate_data_directory(&dir),
            Err(ToolError::ValidationFailed { checked: 2, failed: 1 })
        ));
    }
}
