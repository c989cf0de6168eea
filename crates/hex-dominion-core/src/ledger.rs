//! Unit placement ledger.
//!
//! Owns every unit and the field occupancy index. A field holds at most one
//! unit; a unit occupies at most one field.

use crate::territory::Territory;
use crate::types::{FieldId, PlayerId, UnitId};
use crate::unit::{Unit, UnitType};
use std::collections::{BTreeMap, HashMap};

/// All units of a game and where they stand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitLedger {
    units: BTreeMap<UnitId, Unit>,
    occupancy: HashMap<FieldId, UnitId>,
    next_unit_id: UnitId,
}

impl UnitLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            units: BTreeMap::new(),
            occupancy: HashMap::new(),
            next_unit_id: 1,
        }
    }

    /// Create an unplaced unit.
    pub fn spawn(&mut self, owner: PlayerId, unit_type: UnitType) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        self.units.insert(id, Unit::new(id, owner, unit_type));
        id
    }

    /// Create a unit directly on an empty field.
    pub fn spawn_at(
        &mut self,
        owner: PlayerId,
        unit_type: UnitType,
        field: FieldId,
    ) -> Result<UnitId, LedgerError> {
        if let Some(&occupant) = self.occupancy.get(&field) {
            return Err(LedgerError::FieldOccupied { field, occupant });
        }
        let id = self.spawn(owner, unit_type);
        self.occupancy.insert(field, id);
        if let Some(unit) = self.units.get_mut(&id) {
            unit.field = Some(field);
        }
        Ok(id)
    }

    /// Get a unit by id.
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a mutable unit by id.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Iterate over all units in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Iterate over a player's units in id order.
    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |u| u.owner == player)
    }

    /// Number of units, placed or not.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Is the ledger empty?
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Id of the unit standing on a field.
    pub fn occupant_id(&self, field: FieldId) -> Option<UnitId> {
        self.occupancy.get(&field).copied()
    }

    /// The unit standing on a field.
    pub fn occupant(&self, field: FieldId) -> Option<&Unit> {
        self.occupancy
            .get(&field)
            .and_then(|id| self.units.get(id))
    }

    /// Put a unit on a field, vacating its previous field.
    ///
    /// Fails if another unit already stands there.
    pub fn place(&mut self, id: UnitId, field: FieldId) -> Result<(), LedgerError> {
        let Some(unit) = self.units.get_mut(&id) else {
            return Err(LedgerError::UnknownUnit(id));
        };
        match self.occupancy.get(&field) {
            Some(&occupant) if occupant != id => {
                return Err(LedgerError::FieldOccupied { field, occupant });
            }
            _ => {}
        }
        if let Some(previous) = unit.field.replace(field) {
            self.occupancy.remove(&previous);
        }
        self.occupancy.insert(field, id);
        Ok(())
    }

    /// Destroy a unit, freeing its field.
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        if let Some(field) = unit.field {
            self.occupancy.remove(&field);
        }
        Some(unit)
    }

    /// Units standing on a territory's fields, in field order.
    pub fn units_in<'a>(&'a self, territory: &'a Territory) -> impl Iterator<Item = &'a Unit> + 'a {
        territory.fields.iter().filter_map(|&f| self.occupant(f))
    }

    /// The territory's main building, if it has one.
    pub fn main_building(&self, territory: &Territory) -> Option<UnitId> {
        self.units_in(territory)
            .find(|u| u.is_main_building())
            .map(|u| u.id)
    }

    /// Total upkeep of the units standing in a territory.
    pub fn salaries(&self, territory: &Territory) -> i32 {
        self.units_in(territory)
            .map(|u| u.unit_type.stats().salary as i32)
            .sum()
    }

    /// Destroy every unit in a territory that draws a salary.
    pub fn remove_salaried(&mut self, territory: &Territory) -> Vec<Unit> {
        let doomed: Vec<UnitId> = self
            .units_in(territory)
            .filter(|u| u.unit_type.stats().salary > 0)
            .map(|u| u.id)
            .collect();
        doomed.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Destroy every unit in a territory.
    pub fn clear(&mut self, territory: &Territory) -> Vec<Unit> {
        let doomed: Vec<UnitId> = self.units_in(territory).map(|u| u.id).collect();
        doomed.into_iter().filter_map(|id| self.remove(id)).collect()
    }
}

impl Default for UnitLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from ledger operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Unit {0} does not exist")]
    UnknownUnit(UnitId),
    #[error("Field {field} is already occupied by unit {occupant}")]
    FieldOccupied { field: FieldId, occupant: UnitId },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn territory(fields: &[FieldId]) -> Territory {
        Territory::new(1, 0, fields.iter().copied().collect())
    }

    #[test]
    fn test_spawn_allocates_ids() {
        let mut ledger = UnitLedger::new();
        assert_eq!(ledger.spawn(0, UnitType::Peasant), 1);
        assert_eq!(ledger.spawn(0, UnitType::Peasant), 2);
        assert_eq!(ledger.len(), 2);
        assert!(!ledger.unit(1).unwrap().is_placed());
    }

    #[test]
    fn test_place_and_relocate() {
        let mut ledger = UnitLedger::new();
        let id = ledger.spawn(0, UnitType::Peasant);
        ledger.place(id, 3).unwrap();
        assert_eq!(ledger.occupant_id(3), Some(id));

        ledger.place(id, 4).unwrap();
        assert_eq!(ledger.occupant_id(3), None);
        assert_eq!(ledger.occupant_id(4), Some(id));
        assert_eq!(ledger.unit(id).unwrap().field, Some(4));

        // Placing on its own field is a no-op
        ledger.place(id, 4).unwrap();
        assert_eq!(ledger.occupant_id(4), Some(id));
    }

    #[test]
    fn test_one_unit_per_field() {
        let mut ledger = UnitLedger::new();
        let a = ledger.spawn_at(0, UnitType::Peasant, 1).unwrap();
        let b = ledger.spawn(0, UnitType::Knight);
        assert_eq!(
            ledger.place(b, 1),
            Err(LedgerError::FieldOccupied {
                field: 1,
                occupant: a
            })
        );
        assert!(!ledger.unit(b).unwrap().is_placed());
        assert!(ledger.spawn_at(1, UnitType::Tower, 1).is_err());
    }

    #[test]
    fn test_place_unknown_unit() {
        let mut ledger = UnitLedger::new();
        assert_eq!(ledger.place(9, 0), Err(LedgerError::UnknownUnit(9)));
    }

    #[test]
    fn test_remove_frees_field() {
        let mut ledger = UnitLedger::new();
        let id = ledger.spawn_at(0, UnitType::Peasant, 2).unwrap();
        let removed = ledger.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(ledger.occupant_id(2), None);
        assert!(ledger.remove(id).is_none());
    }

    #[test]
    fn test_main_building_and_salaries() {
        let mut ledger = UnitLedger::new();
        let t = territory(&[0, 1, 2, 3]);
        let mb = ledger.spawn_at(0, UnitType::MainBuilding, 0).unwrap();
        ledger.spawn_at(0, UnitType::Peasant, 1).unwrap();
        ledger.spawn_at(0, UnitType::Knight, 2).unwrap();
        // Outside the territory
        ledger.spawn_at(0, UnitType::Baron, 9).unwrap();

        assert_eq!(ledger.main_building(&t), Some(mb));
        assert_eq!(ledger.salaries(&t), 2 + 18);
        assert_eq!(ledger.units_in(&t).count(), 3);
    }

    #[test]
    fn test_remove_salaried_keeps_main_building() {
        let mut ledger = UnitLedger::new();
        let t = territory(&[0, 1, 2]);
        let mb = ledger.spawn_at(0, UnitType::MainBuilding, 0).unwrap();
        ledger.spawn_at(0, UnitType::Peasant, 1).unwrap();
        ledger.spawn_at(0, UnitType::Tower, 2).unwrap();

        let removed = ledger.remove_salaried(&t);
        assert_eq!(removed.len(), 2);
        assert_eq!(ledger.units_in(&t).map(|u| u.id).collect::<Vec<_>>(), vec![mb]);
    }

    #[test]
    fn test_clear() {
        let mut ledger = UnitLedger::new();
        let t = territory(&[0, 1]);
        ledger.spawn_at(0, UnitType::MainBuilding, 0).unwrap();
        ledger.spawn_at(0, UnitType::Peasant, 1).unwrap();
        assert_eq!(ledger.clear(&t).len(), 2);
        assert!(ledger.is_empty());
    }
}
