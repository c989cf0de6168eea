//! Unit catalog and per-unit runtime state.

use crate::types::{FieldId, PlayerId, UnitId};
use serde::{Deserialize, Serialize};

/// A unit owned by a player.
///
/// A unit sits on at most one field. Freshly purchased units have no field
/// until they are placed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Owning player.
    pub owner: PlayerId,
    /// Catalog entry. Changes in place when two units merge.
    pub unit_type: UnitType,
    /// Field the unit occupies, `None` while unplaced.
    pub field: Option<FieldId>,
    /// May the unit still cross a territory border this turn?
    pub can_move: bool,
}

impl Unit {
    /// Create a new, unplaced unit.
    pub fn new(id: UnitId, owner: PlayerId, unit_type: UnitType) -> Self {
        Self {
            id,
            owner,
            unit_type,
            field: None,
            can_move: false,
        }
    }

    /// Shortcut for the catalog strength.
    pub fn strength(&self) -> u32 {
        self.unit_type.stats().strength
    }

    /// Has this unit been placed on the board?
    pub fn is_placed(&self) -> bool {
        self.field.is_some()
    }

    /// Is this the main building of its territory?
    pub fn is_main_building(&self) -> bool {
        self.unit_type == UnitType::MainBuilding
    }
}

/// Kinds of units in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    Peasant,
    Spearman,
    Knight,
    Baron,
    Tower,
    MainBuilding,
}

impl UnitType {
    /// Get the stats for this unit type.
    pub const fn stats(&self) -> UnitStats {
        match self {
            UnitType::Peasant => UnitStats::soldier(1, 10, 2),
            UnitType::Spearman => UnitStats::soldier(2, 20, 6),
            UnitType::Knight => UnitStats::soldier(3, 30, 18),
            UnitType::Baron => UnitStats::soldier(4, 40, 54),
            UnitType::Tower => UnitStats {
                strength: 2,
                cost: 15,
                salary: 1,
                buildable: true,
                movable: false,
            },
            UnitType::MainBuilding => UnitStats {
                strength: 1,
                cost: 0,
                salary: 0,
                buildable: false,
                movable: false,
            },
        }
    }

    /// Get all unit types.
    pub const fn all() -> &'static [UnitType] {
        &[
            UnitType::Peasant,
            UnitType::Spearman,
            UnitType::Knight,
            UnitType::Baron,
            UnitType::Tower,
            UnitType::MainBuilding,
        ]
    }

    /// Unit types a player can buy.
    pub fn buildable() -> impl Iterator<Item = UnitType> {
        Self::all().iter().copied().filter(|t| t.stats().buildable)
    }

    /// Find the type two merging units promote to.
    ///
    /// The result is the buildable, movable type whose cost equals the sum
    /// of the two merged units' costs.
    pub fn merged_for_cost(cost: u32) -> Option<UnitType> {
        Self::all().iter().copied().find(|t| {
            let stats = t.stats();
            stats.cost == cost && stats.buildable && stats.movable
        })
    }

    /// Can a unit of this type take part in a unit merge?
    pub const fn can_merge(&self) -> bool {
        let stats = self.stats();
        stats.buildable && stats.movable
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UnitType::Peasant => "Peasant",
            UnitType::Spearman => "Spearman",
            UnitType::Knight => "Knight",
            UnitType::Baron => "Baron",
            UnitType::Tower => "Tower",
            UnitType::MainBuilding => "Main Building",
        };
        f.write_str(name)
    }
}

/// Stats for a unit type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Combat rank. An attack needs strictly more than the defense.
    pub strength: u32,
    /// Purchase price.
    pub cost: u32,
    /// Upkeep paid from the territory treasury every turn.
    pub salary: u32,
    /// Can be bought.
    pub buildable: bool,
    /// Can be moved after placement.
    pub movable: bool,
}

impl UnitStats {
    const fn soldier(strength: u32, cost: u32, salary: u32) -> Self {
        Self {
            strength,
            cost,
            salary,
            buildable: true,
            movable: true,
        }
    }
}
