//! Building data structures for data-driven building definitions.
//!
//! A building type carries a fixed set of optional capability records.
//! Code asks "does this building have an upgrade record?" instead of
//! inspecting its concrete type.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::Fixed;
use crate::resources::ResourceType;

/// Fraction of the construction cost returned when a building is sold (0.5).
pub const SELL_REFUND_RATIO: Fixed = Fixed::from_bits(1 << 31);

/// Upgrade path to another building type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCapability {
    /// Building id this one turns into.
    pub upgrades_to: String,
    /// Credits charged for the upgrade.
    pub credits_cost: i32,
}

/// Ability to produce units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCapability {
    /// Unit ids this building can produce.
    pub produces: Vec<String>,
}

/// Extra storage for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageCapability {
    /// Resource stored.
    pub resource: ResourceType,
    /// Added capacity.
    pub capacity: i32,
}

/// Data-driven building definition.
///
/// # Example RON
///
/// ```ron
/// BuildingData(
///     id: "workshop",
///     name: "building.workshop.name",
///     credits_cost: 100,
///     vision_radius: 2,
///     upgrade: Some((upgrades_to: "factory", credits_cost: 150)),
///     production: Some((produces: ["engineer"])),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingData {
    /// Unique string identifier for this building type.
    pub id: String,

    /// Localization key for the building's display name.
    pub name: String,

    /// Credits cost to construct this building.
    pub credits_cost: i32,

    /// Radius of tiles revealed to the owner when placed.
    #[serde(default)]
    pub vision_radius: u32,

    /// Present if the building can be upgraded.
    #[serde(default)]
    pub upgrade: Option<UpgradeCapability>,

    /// Present if the building produces units.
    #[serde(default)]
    pub production: Option<ProductionCapability>,

    /// Present if the building adds resource storage.
    #[serde(default)]
    pub storage: Option<StorageCapability>,
}

impl BuildingData {
    /// Credits returned when this building is sold.
    ///
    /// `floor(credits_cost × 0.5)`; never negative.
    #[must_use]
    pub fn sell_refund(&self) -> i32 {
        sell_refund(self.credits_cost)
    }

    /// Check if this building has an upgrade path.
    #[must_use]
    pub fn is_upgradeable(&self) -> bool {
        self.upgrade.is_some()
    }

    /// Check if this building can produce the specified unit.
    #[must_use]
    pub fn can_produce(&self, unit_id: &str) -> bool {
        self.production
            .as_ref()
            .is_some_and(|p| p.produces.iter().any(|u| u == unit_id))
    }
}

/// Credits refunded for selling something that cost `credits_cost`.
#[must_use]
pub fn sell_refund(credits_cost: i32) -> i32 {
    let refund = (Fixed::from_num(credits_cost.max(0)) * SELL_REFUND_RATIO).floor();
    refund.to_num::<i32>()
}

/// All building definitions available in a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildingCatalog {
    /// Building definitions, looked up by `id`.
    pub buildings: Vec<BuildingData>,
}

impl BuildingCatalog {
    /// Parse a catalog from RON text.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load a catalog from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        ron::from_str(&source).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Find a definition by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BuildingData> {
        self.buildings.iter().find(|b| b.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_building() -> BuildingData {
        BuildingData {
            id: "workshop".to_string(),
            name: "building.workshop.name".to_string(),
            credits_cost: 100,
            vision_radius: 2,
            upgrade: Some(UpgradeCapability {
                upgrades_to: "factory".to_string(),
                credits_cost: 150,
            }),
            production: Some(ProductionCapability {
                produces: vec!["engineer".to_string()],
            }),
            storage: None,
        }
    }

    #[test]
    fn test_sell_refund_is_half_cost() {
        assert_eq!(create_test_building().sell_refund(), 50);
    }

    #[test]
    fn test_sell_refund_floors_odd_costs() {
        assert_eq!(sell_refund(101), 50);
        assert_eq!(sell_refund(1), 0);
        assert_eq!(sell_refund(0), 0);
        assert_eq!(sell_refund(-40), 0);
    }

    #[test]
    fn test_capabilities_queried_by_presence() {
        let mut building = create_test_building();
        assert!(building.is_upgradeable());
        assert!(building.can_produce("engineer"));
        assert!(!building.can_produce("tank"));

        building.upgrade = None;
        building.production = None;
        assert!(!building.is_upgradeable());
        assert!(!building.can_produce("engineer"));
    }

    #[test]
    fn test_catalog_from_ron() {
        let source = r#"
            BuildingCatalog(
                buildings: [
                    BuildingData(id: "depot", name: "building.depot.name", credits_cost: 80,
                        storage: Some((resource: Minerals, capacity: 500))),
                    BuildingData(id: "tower", name: "building.tower.name", credits_cost: 60,
                        vision_radius: 4),
                ],
            )
        "#;
        let catalog = BuildingCatalog::from_ron_str(source).unwrap();
        let depot = catalog.get("depot").unwrap();
        assert_eq!(depot.storage.unwrap().capacity, 500);
        assert_eq!(catalog.get("tower").unwrap().vision_radius, 4);
        assert!(catalog.get("castle").is_none());
    }
}
