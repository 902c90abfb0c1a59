//! Harvestable tile resources.
//!
//! Every amount is an integer and stays within `[0, max]`.

use serde::{Deserialize, Serialize};

/// Kinds of resource a tile can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    /// Spendable currency for construction.
    Credits,
    /// Timber from forests.
    Wood,
    /// Quarried stone and ore.
    Minerals,
    /// Farmland yield.
    Food,
    /// Generator output.
    Energy,
}

impl ResourceType {
    /// Every resource type, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Credits,
        Self::Wood,
        Self::Minerals,
        Self::Food,
        Self::Energy,
    ];
}

/// Current and maximum quantity of one resource on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceAmount {
    current: i32,
    max: i32,
}

impl ResourceAmount {
    /// Create an amount, clamping `current` into `[0, max]`.
    ///
    /// A negative `max` is treated as zero.
    #[must_use]
    pub fn new(current: i32, max: i32) -> Self {
        let max = max.max(0);
        Self {
            current: current.clamp(0, max),
            max,
        }
    }

    /// A full deposit of `max` units.
    #[must_use]
    pub fn full(max: i32) -> Self {
        Self::new(max, max)
    }

    /// Amount currently available.
    #[must_use]
    pub const fn current(&self) -> i32 {
        self.current
    }

    /// Capacity of the deposit.
    #[must_use]
    pub const fn max(&self) -> i32 {
        self.max
    }

    /// Check if nothing is left to harvest.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current <= 0
    }

    /// Overwrite the current amount, clamped into `[0, max]`.
    pub fn set_current(&mut self, value: i32) {
        self.current = value.clamp(0, self.max);
    }

    /// Take up to `requested` units.
    ///
    /// Returns the amount actually removed (less than requested if the
    /// deposit is nearly empty, zero for a non-positive request).
    pub fn harvest(&mut self, requested: i32) -> i32 {
        let taken = requested.clamp(0, self.current);
        self.current -= taken;
        taken
    }

    /// Add up to `amount` units without exceeding `max`.
    ///
    /// Returns the amount actually added.
    pub fn replenish(&mut self, amount: i32) -> i32 {
        let added = amount.clamp(0, self.max - self.current);
        self.current += added;
        added
    }
}
