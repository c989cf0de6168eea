//! Structural invariants of the board and the unit ledger.
//!
//! These never trigger in a correctly implemented game. A violation means
//! the engine has a bug and the session cannot be trusted any more.

use crate::board::Board;
use crate::ledger::UnitLedger;
use std::collections::HashSet;

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl InvariantViolation {
    fn new(message: String) -> Self {
        Self { message }
    }
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check that the territories partition the board into maximal connected
/// same-owner regions.
#[must_use]
pub fn check_partition(board: &Board) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut seen = HashSet::new();

    for territory in board.territories() {
        let Some(&first) = territory.fields.iter().next() else {
            violations.push(InvariantViolation::new(format!(
                "Territory {} has no fields",
                territory.id
            )));
            continue;
        };

        for &id in &territory.fields {
            if !seen.insert(id) {
                violations.push(InvariantViolation::new(format!(
                    "Field {} belongs to more than one territory",
                    id
                )));
            }
            match board.field(id) {
                None => violations.push(InvariantViolation::new(format!(
                    "Territory {} lists missing field {}",
                    territory.id, id
                ))),
                Some(field) => {
                    if field.territory != territory.id {
                        violations.push(InvariantViolation::new(format!(
                            "Field {} points at territory {} but is listed by {}",
                            field.coord, field.territory, territory.id
                        )));
                    }
                    if field.owner != territory.owner {
                        violations.push(InvariantViolation::new(format!(
                            "Field {} is owned by {} inside territory {} of player {}",
                            field.coord, field.owner, territory.id, territory.owner
                        )));
                    }
                }
            }
        }

        // Connected and maximal at once: the flood fill from any member must
        // reproduce the field set exactly.
        if board.connected_component(first) != territory.fields {
            violations.push(InvariantViolation::new(format!(
                "Territory {} is not a maximal connected region",
                territory.id
            )));
        }
    }

    if seen.len() != board.len() {
        violations.push(InvariantViolation::new(format!(
            "{} of {} fields belong to a territory",
            seen.len(),
            board.len()
        )));
    }

    violations
}

/// Check every board and ledger invariant.
///
/// On top of [`check_partition`]: occupancy and unit positions agree, units
/// stand on their owner's fields, every controllable territory has exactly
/// one main building and single-field territories host no units.
#[must_use]
pub fn check_invariants(board: &Board, units: &UnitLedger) -> Vec<InvariantViolation> {
    let mut violations = check_partition(board);

    for unit in units.units() {
        let Some(field_id) = unit.field else {
            continue;
        };
        if units.occupant_id(field_id) != Some(unit.id) {
            violations.push(InvariantViolation::new(format!(
                "Unit {} claims field {} it does not occupy",
                unit.id, field_id
            )));
        }
        match board.field(field_id) {
            None => violations.push(InvariantViolation::new(format!(
                "Unit {} stands on missing field {}",
                unit.id, field_id
            ))),
            Some(field) if field.owner != unit.owner => {
                violations.push(InvariantViolation::new(format!(
                    "Unit {} of player {} stands on {} owned by {}",
                    unit.id, unit.owner, field.coord, field.owner
                )))
            }
            Some(_) => {}
        }
    }

    for territory in board.territories() {
        let hosted = units.units_in(territory).count();
        let main_buildings = units
            .units_in(territory)
            .filter(|u| u.is_main_building())
            .count();
        if territory.is_controllable() && main_buildings != 1 {
            violations.push(InvariantViolation::new(format!(
                "Territory {} has {} main buildings",
                territory.id, main_buildings
            )));
        }
        if !territory.is_controllable() && hosted > 0 {
            violations.push(InvariantViolation::new(format!(
                "Single-field territory {} hosts {} units",
                territory.id, hosted
            )));
        }
    }

    violations
}
