//! Terrain definitions for data-driven tile behaviour.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_decimal_serde, Fixed};
use crate::resources::ResourceType;

/// Terrain kinds a tile can have.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum TerrainType {
    /// Open grass. Every freshly generated tile starts here.
    #[default]
    Grassland,
    /// Flat open ground.
    Plains,
    /// Dry sand.
    Desert,
    /// Woodland.
    Forest,
    /// Rough high ground.
    Hills,
    /// Marsh and bog.
    Swamp,
    /// Impassable peaks.
    Mountains,
    /// Lakes and sea.
    Water,
}

impl TerrainType {
    /// Every terrain type, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Grassland,
        Self::Plains,
        Self::Desert,
        Self::Forest,
        Self::Hills,
        Self::Swamp,
        Self::Mountains,
        Self::Water,
    ];
}

/// Starting deposit of one resource on a terrain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDeposit {
    /// Which resource.
    pub resource: ResourceType,
    /// Starting and maximum amount.
    pub amount: i32,
}

/// Per-terrain configuration record. Pure data, no behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Whether buildings may be placed on an unoccupied tile of this terrain.
    pub buildable: bool,

    /// Whether ground units can enter this terrain.
    pub passable: bool,

    /// Cost to enter a tile of this terrain. Ignored when impassable.
    #[serde(with = "fixed_decimal_serde")]
    pub movement_cost: Fixed,

    /// Resources a tile of this terrain starts with.
    #[serde(default)]
    pub resources: Vec<ResourceDeposit>,
}

impl TerrainConfig {
    fn new(buildable: bool, passable: bool, movement_cost: Fixed) -> Self {
        Self {
            buildable,
            passable,
            movement_cost,
            resources: Vec::new(),
        }
    }

    fn with_resource(mut self, resource: ResourceType, amount: i32) -> Self {
        self.resources.push(ResourceDeposit { resource, amount });
        self
    }
}

/// Terrain type → configuration table.
///
/// Loaded once at startup and shared read-only afterwards.
///
/// # Example RON
///
/// ```ron
/// TerrainTable(
///     terrains: {
///         Grassland: (buildable: true, passable: true, movement_cost: 1.0),
///         Forest: (
///             buildable: false,
///             passable: true,
///             movement_cost: 2.0,
///             resources: [(resource: Wood, amount: 200)],
///         ),
///         Water: (buildable: false, passable: false, movement_cost: 0.0),
///     },
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TerrainTable {
    /// Configuration per terrain type. Missing entries have no data.
    pub terrains: BTreeMap<TerrainType, TerrainConfig>,
}

impl TerrainTable {
    /// Built-in table used when no data file is supplied.
    #[must_use]
    pub fn fallback() -> Self {
        let mut terrains = BTreeMap::new();
        terrains.insert(
            TerrainType::Grassland,
            TerrainConfig::new(true, true, Fixed::ONE).with_resource(ResourceType::Food, 50),
        );
        terrains.insert(
            TerrainType::Plains,
            TerrainConfig::new(true, true, Fixed::ONE).with_resource(ResourceType::Food, 100),
        );
        terrains.insert(
            TerrainType::Desert,
            TerrainConfig::new(true, true, Fixed::from_num(1.5)),
        );
        terrains.insert(
            TerrainType::Forest,
            TerrainConfig::new(false, true, Fixed::from_num(2)).with_resource(ResourceType::Wood, 200),
        );
        terrains.insert(
            TerrainType::Hills,
            TerrainConfig::new(true, true, Fixed::from_num(2))
                .with_resource(ResourceType::Minerals, 150),
        );
        terrains.insert(
            TerrainType::Swamp,
            TerrainConfig::new(false, true, Fixed::from_num(3)),
        );
        terrains.insert(
            TerrainType::Mountains,
            TerrainConfig::new(false, false, Fixed::ZERO).with_resource(ResourceType::Minerals, 400),
        );
        terrains.insert(
            TerrainType::Water,
            TerrainConfig::new(false, false, Fixed::ZERO),
        );
        Self { terrains }
    }

    /// Parse a table from RON text.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let table: Self = ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        table.validate()?;
        Ok(table)
    }

    /// Load a table from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let table: Self = ron::from_str(&source).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        table.validate()?;
        tracing::info!(path = %path.display(), entries = table.terrains.len(), "Loaded terrain table");
        Ok(table)
    }

    /// Check that every passable terrain has a positive movement cost and
    /// every deposit is non-negative.
    pub fn validate(&self) -> Result<()> {
        for (terrain, config) in &self.terrains {
            if config.passable && config.movement_cost <= Fixed::ZERO {
                return Err(GameError::DataParseError {
                    path: format!("{terrain:?}"),
                    message: "passable terrain needs a positive movement_cost".to_string(),
                });
            }
            if let Some(deposit) = config.resources.iter().find(|d| d.amount < 0) {
                return Err(GameError::DataParseError {
                    path: format!("{terrain:?}"),
                    message: format!("negative {:?} deposit", deposit.resource),
                });
            }
        }
        Ok(())
    }

    /// Configuration for a terrain type, if the table has one.
    #[must_use]
    pub fn get(&self, terrain: TerrainType) -> Option<&TerrainConfig> {
        self.terrains.get(&terrain)
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terrains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_covers_every_terrain() {
        let table = TerrainTable::fallback();
        for terrain in TerrainType::ALL {
            assert!(table.get(terrain).is_some(), "{terrain:?} missing");
        }
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_fallback_cost_ordering() {
        let table = TerrainTable::fallback();
        let plains = table.get(TerrainType::Plains).unwrap();
        let swamp = table.get(TerrainType::Swamp).unwrap();
        assert!(plains.movement_cost < swamp.movement_cost);
        assert!(!table.get(TerrainType::Water).unwrap().passable);
        assert!(!table.get(TerrainType::Mountains).unwrap().passable);
    }

    #[test]
    fn test_parse_ron_table() {
        let source = r"
            TerrainTable(
                terrains: {
                    Grassland: (buildable: true, passable: true, movement_cost: 1.0),
                    Forest: (
                        buildable: false,
                        passable: true,
                        movement_cost: 2.5,
                        resources: [(resource: Wood, amount: 120)],
                    ),
                },
            )
        ";
        let table = TerrainTable::from_ron_str(source).unwrap();
        let forest = table.get(TerrainType::Forest).unwrap();
        assert_eq!(forest.movement_cost, Fixed::from_num(2.5));
        assert_eq!(forest.resources[0].amount, 120);
        assert!(table.get(TerrainType::Water).is_none());
    }

    #[test]
    fn test_rejects_free_passable_terrain() {
        let source = "TerrainTable(terrains: { Plains: (buildable: true, passable: true, movement_cost: 0.0) })";
        assert!(matches!(
            TerrainTable::from_ron_str(source),
            Err(GameError::DataParseError { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_ron() {
        assert!(TerrainTable::from_ron_str("TerrainTable(terrains: {").is_err());
    }
}
