//! Movement and combat engine.
//!
//! A move is planned against an immutable view of the board and the ledger
//! first. Only a plan that passed every check is applied, so a rejected move
//! never leaves a partial mutation behind.
//!
//! Capturing a field can cascade:
//! - the attacker's territories that now touch through the captured field
//!   are merged into the attacking territory;
//! - the defender's territory may fall apart into several territories;
//! - every touched territory gets its main building renewed (or loses all
//!   units if it dropped to a single field).

use crate::board::Board;
use crate::ledger::UnitLedger;
use crate::types::{FieldId, PlayerId, TerritoryId, UnitId};
use crate::unit::UnitType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, error, info};

/// What a successful move did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// A freshly purchased unit was put on the board.
    Placed,
    /// A unit changed fields without fighting or merging.
    Relocated,
    /// Two units merged into a stronger one.
    Merged { into: UnitType },
    /// An enemy field was taken.
    Captured(CaptureReport),
}

/// Details of a successful capture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureReport {
    /// The captured field.
    pub field: FieldId,
    /// Previous owner of the field.
    pub defender: PlayerId,
    /// Type of the unit destroyed on the field, if any.
    pub destroyed: Option<UnitType>,
    /// The defender's main building fell and its treasury was wiped.
    pub treasury_lost: bool,
    /// The defender's territory that lost its last field.
    pub emptied: Option<TerritoryId>,
    /// Attacker territories merged into the attacking territory.
    pub absorbed: Vec<TerritoryId>,
    /// Territories carved out of the defender's disconnected remains.
    pub carved: Vec<TerritoryId>,
    /// Territories that received a new main building.
    pub renewed: Vec<TerritoryId>,
}

/// Reasons a move is rejected. A rejected move changes nothing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("Unit {0} does not exist")]
    UnknownUnit(UnitId),
    #[error("Field {0} does not exist")]
    UnknownField(FieldId),
    #[error("Unit is already on the target field")]
    AlreadyOnField,
    #[error("Unit has no origin territory")]
    NoOriginTerritory,
    #[error("Field {0} does not belong to a territory")]
    NoDestinationTerritory(FieldId),
    #[error("Target field is neither inside nor bordering the origin territory")]
    OutOfReach,
    #[error("Unit has already crossed a border this turn")]
    UnitExhausted,
    #[error("{0} cannot be moved once placed")]
    Immovable(UnitType),
    #[error("Attack strength {attack} does not exceed defense {defense}")]
    TooWeak { attack: u32, defense: u32 },
    #[error("{mover} cannot merge with {occupant}")]
    MergeNotAllowed { mover: UnitType, occupant: UnitType },
    #[error("No unit type costs {cost}")]
    NoMergedTier { cost: u32 },
}

/// A validated move, ready to apply.
#[derive(Debug)]
struct MovePlan {
    unit: UnitId,
    owner: PlayerId,
    destination: FieldId,
    origin: TerritoryId,
    /// The move leaves the origin territory.
    crossing: bool,
    action: Action,
}

#[derive(Debug)]
enum Action {
    Step { placed: bool },
    Merge { occupant: UnitId, into: UnitType },
    Capture { occupant: Option<UnitId> },
}

/// Strength an attacker must exceed to take `field`.
///
/// The highest strength among the unit on the field and the units of the
/// field's owner standing next to it.
pub fn defending_strength(board: &Board, units: &UnitLedger, field: FieldId) -> u32 {
    let Some(target) = board.field(field) else {
        return 0;
    };
    let own = units.occupant(field).map_or(0, |u| u.strength());
    board
        .neighbors(field)
        .into_iter()
        .filter(|&n| board.field(n).is_some_and(|f| f.owner == target.owner))
        .filter_map(|n| units.occupant(n))
        .map(|u| u.strength())
        .fold(own, u32::max)
}

/// Move `unit` onto `destination`.
///
/// `selected` is the acting player's selected territory. It serves as origin
/// for units that have not been placed yet.
pub fn execute_move(
    board: &mut Board,
    units: &mut UnitLedger,
    unit: UnitId,
    destination: FieldId,
    selected: Option<TerritoryId>,
) -> Result<MoveOutcome, MoveError> {
    let plan = plan_move(board, units, unit, destination, selected).inspect_err(|err| {
        debug!(unit, destination, %err, "move rejected");
    })?;
    Ok(apply_plan(board, units, plan))
}

fn plan_move(
    board: &Board,
    units: &UnitLedger,
    unit_id: UnitId,
    destination: FieldId,
    selected: Option<TerritoryId>,
) -> Result<MovePlan, MoveError> {
    let unit = units.unit(unit_id).ok_or(MoveError::UnknownUnit(unit_id))?;
    let target = board
        .field(destination)
        .ok_or(MoveError::UnknownField(destination))?;

    if unit.field == Some(destination) {
        return Err(MoveError::AlreadyOnField);
    }

    let origin = match unit.field {
        Some(field) => board.territory_of(field),
        None => selected.and_then(|t| board.territory(t)),
    }
    .filter(|t| t.owner == unit.owner)
    .map(|t| t.id)
    .ok_or(MoveError::NoOriginTerritory)?;

    let destination_territory = board
        .territory(target.territory)
        .ok_or(MoveError::NoDestinationTerritory(destination))?
        .id;

    let crossing = if destination_territory == origin {
        false
    } else if board.territory_neighbors(origin).contains(&destination) {
        if !unit.can_move {
            return Err(MoveError::UnitExhausted);
        }
        true
    } else {
        return Err(MoveError::OutOfReach);
    };

    if unit.is_placed() && !unit.unit_type.stats().movable {
        return Err(MoveError::Immovable(unit.unit_type));
    }

    let action = if target.owner == unit.owner {
        match units.occupant(destination) {
            None => Action::Step {
                placed: unit.is_placed(),
            },
            Some(occupant) => {
                if !unit.unit_type.can_merge() || !occupant.unit_type.can_merge() {
                    return Err(MoveError::MergeNotAllowed {
                        mover: unit.unit_type,
                        occupant: occupant.unit_type,
                    });
                }
                let cost = unit.unit_type.stats().cost + occupant.unit_type.stats().cost;
                let into =
                    UnitType::merged_for_cost(cost).ok_or(MoveError::NoMergedTier { cost })?;
                Action::Merge {
                    occupant: occupant.id,
                    into,
                }
            }
        }
    } else {
        let attack = unit.strength();
        let defense = defending_strength(board, units, destination);
        if attack <= defense {
            return Err(MoveError::TooWeak { attack, defense });
        }
        Action::Capture {
            occupant: units.occupant_id(destination),
        }
    };

    Ok(MovePlan {
        unit: unit_id,
        owner: unit.owner,
        destination,
        origin,
        crossing,
        action,
    })
}

fn apply_plan(board: &mut Board, units: &mut UnitLedger, plan: MovePlan) -> MoveOutcome {
    let outcome = match plan.action {
        Action::Step { placed } => {
            settle(units, plan.unit, plan.destination);
            debug!(unit = plan.unit, field = plan.destination, "unit moved");
            if placed {
                MoveOutcome::Relocated
            } else {
                MoveOutcome::Placed
            }
        }
        Action::Merge { occupant, into } => {
            // The merged unit inherits the mobility of the unit it absorbed.
            let carried = units.remove(occupant).is_some_and(|u| u.can_move);
            if let Some(unit) = units.unit_mut(plan.unit) {
                unit.unit_type = into;
                unit.can_move = carried;
            }
            settle(units, plan.unit, plan.destination);
            info!(unit = plan.unit, %into, "units merged");
            MoveOutcome::Merged { into }
        }
        Action::Capture { occupant } => {
            MoveOutcome::Captured(capture(board, units, &plan, occupant))
        }
    };

    if plan.crossing {
        if let Some(unit) = units.unit_mut(plan.unit) {
            unit.can_move = false;
        }
    }
    outcome
}

/// Put a unit on a field the plan already verified to be free.
fn settle(units: &mut UnitLedger, unit: UnitId, field: FieldId) {
    let placed = units.place(unit, field);
    if let Err(err) = &placed {
        error!(unit, field, %err, "validated placement failed");
    }
    debug_assert!(placed.is_ok(), "validated placement failed");
}

fn capture(
    board: &mut Board,
    units: &mut UnitLedger,
    plan: &MovePlan,
    occupant: Option<UnitId>,
) -> CaptureReport {
    let field = plan.destination;
    let attacker = plan.owner;
    let origin = plan.origin;
    let (defender, lost_territory) = board
        .field(field)
        .map_or((attacker, origin), |f| (f.owner, f.territory));

    // Destroy the defending unit. Losing the main building wipes the treasury.
    let mut destroyed = None;
    let mut treasury_lost = false;
    if let Some(unit) = occupant.and_then(|id| units.remove(id)) {
        destroyed = Some(unit.unit_type);
        if unit.is_main_building() {
            if let Some(territory) = board.territory_mut(lost_territory) {
                territory.money = 0;
            }
            treasury_lost = true;
        }
    }

    let emptied = board.transfer_field(field, attacker, origin);
    settle(units, plan.unit, field);

    let absorbed = merge_cascade(board, units, field, attacker, origin);
    let (affected, carved) = split_cascade(board, field, attacker);

    let mut renewed = Vec::new();
    for territory in affected.into_iter().chain(std::iter::once(origin)) {
        if renew_main_building(board, units, territory).is_some() {
            renewed.push(territory);
        }
    }

    info!(
        attacker,
        defender,
        field,
        absorbed = absorbed.len(),
        carved = carved.len(),
        "field captured"
    );

    CaptureReport {
        field,
        defender,
        destroyed,
        treasury_lost,
        emptied,
        absorbed,
        carved,
        renewed,
    }
}

/// Merge the attacker's territories now touching `field` into `origin`.
fn merge_cascade(
    board: &mut Board,
    units: &mut UnitLedger,
    field: FieldId,
    attacker: PlayerId,
    origin: TerritoryId,
) -> Vec<TerritoryId> {
    let mut absorbed = Vec::new();
    for neighbor in board.neighbors(field) {
        let Some(donor) = board
            .field(neighbor)
            .filter(|f| f.owner == attacker && f.territory != origin)
            .map(|f| f.territory)
        else {
            continue;
        };

        // Only one main building survives a merge.
        let surviving = board
            .territory(origin)
            .and_then(|t| units.main_building(t));
        let doomed = board.territory(donor).and_then(|t| units.main_building(t));
        if let (Some(_), Some(doomed)) = (surviving, doomed) {
            units.remove(doomed);
        }

        board.absorb_territory(origin, donor);
        absorbed.push(donor);
        debug!(origin, donor, "territories merged");
    }
    absorbed
}

/// Split the defender territories around `field` into connected pieces.
///
/// Returns every defender territory next to the field (including new ones)
/// and the ids of the carved-out territories.
fn split_cascade(
    board: &mut Board,
    field: FieldId,
    attacker: PlayerId,
) -> (Vec<TerritoryId>, Vec<TerritoryId>) {
    let mut groups: Vec<(TerritoryId, Vec<FieldId>)> = Vec::new();
    for neighbor in board.neighbors(field) {
        let Some(f) = board.field(neighbor).filter(|f| f.owner != attacker) else {
            continue;
        };
        match groups.iter_mut().find(|(t, _)| *t == f.territory) {
            Some((_, members)) => members.push(neighbor),
            None => groups.push((f.territory, vec![neighbor])),
        }
    }

    // Components found in this pass are never rediscovered from another
    // starting field, so no piece is carved twice.
    let mut visited: HashSet<FieldId> = HashSet::new();
    let mut affected = Vec::new();
    let mut carved = Vec::new();
    for (territory, members) in groups {
        affected.push(territory);
        let mut kept = false;
        for start in members {
            if visited.contains(&start) {
                continue;
            }
            let component = board.connected_component(start);
            visited.extend(component.iter().copied());
            if !kept {
                // The first piece keeps the territory's identity and treasury.
                kept = true;
                continue;
            }
            if let Some(new_id) = board.split_off(territory, component) {
                debug!(from = territory, into = new_id, "territory split");
                affected.push(new_id);
                carved.push(new_id);
            }
        }
    }
    (affected, carved)
}

/// Make sure a territory's units fit its size.
///
/// A controllable territory without a main building gets one: on an empty
/// field if there is one, otherwise replacing its weakest unit. A territory
/// of a single field loses every unit. Returns the new main building.
pub fn renew_main_building(
    board: &Board,
    units: &mut UnitLedger,
    id: TerritoryId,
) -> Option<UnitId> {
    let territory = board.territory(id)?;

    if !territory.is_controllable() {
        let removed = units.clear(territory);
        if !removed.is_empty() {
            debug!(territory = id, count = removed.len(), "units lost on stranded field");
        }
        return None;
    }

    if units.main_building(territory).is_some() {
        return None;
    }

    let site = territory
        .fields
        .iter()
        .copied()
        .find(|&f| units.occupant_id(f).is_none())
        .or_else(|| {
            units
                .units_in(territory)
                .min_by_key(|u| (u.strength(), u.id))
                .and_then(|u| u.field)
        })?;

    if let Some(replaced) = units.occupant_id(site) {
        units.remove(replaced);
    }
    let spawned = units.spawn_at(territory.owner, UnitType::MainBuilding, site);
    if let Err(err) = &spawned {
        error!(territory = id, site, %err, "main building site still occupied");
    }
    debug_assert!(spawned.is_ok(), "main building site still occupied");
    spawned.ok()
}

/// Give every territory on the board the units its size allows.
pub fn renew_all_main_buildings(board: &Board, units: &mut UnitLedger) {
    let ids: Vec<TerritoryId> = board.territories().map(|t| t.id).collect();
    for id in ids {
        renew_main_building(board, units, id);
    }
}
