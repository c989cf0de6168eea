//! Game board: the field arena, adjacency and the territory partition.
//!
//! Fields are addressed by [`FieldId`] (their index in the arena) and never
//! move, appear or disappear once the board is built. Only their owner and
//! territory back-reference change. Territories are addressed by
//! [`TerritoryId`] and hold field ids rather than fields.

use crate::hex::HexCoord;
use crate::territory::Territory;
use crate::types::{FieldId, PlayerId, TerritoryId};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Placeholder back-reference used only while territories are discovered.
const UNASSIGNED: TerritoryId = 0;

/// A single cell of the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// Index in the board's field arena.
    pub id: FieldId,
    /// Position on the board.
    pub coord: HexCoord,
    /// Player owning this field.
    pub owner: PlayerId,
    /// Territory this field belongs to.
    pub territory: TerritoryId,
}

/// The game board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    fields: Vec<Field>,
    index: HashMap<HexCoord, FieldId>,
    territories: BTreeMap<TerritoryId, Territory>,
    next_territory_id: TerritoryId,
}

impl Board {
    /// Build a board from `(coordinate, owner)` pairs and discover its
    /// territories.
    pub fn from_owners<I>(cells: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = (HexCoord, PlayerId)>,
    {
        let mut board = Self {
            fields: Vec::new(),
            index: HashMap::new(),
            territories: BTreeMap::new(),
            next_territory_id: UNASSIGNED + 1,
        };

        for (coord, owner) in cells {
            if board.index.contains_key(&coord) {
                return Err(BoardError::DuplicateCoordinate(coord));
            }
            let id = board.fields.len();
            board.fields.push(Field {
                id,
                coord,
                owner,
                territory: UNASSIGNED,
            });
            board.index.insert(coord, id);
        }

        if board.fields.is_empty() {
            return Err(BoardError::Empty);
        }

        board.discover_territories();
        Ok(board)
    }

    /// Build a board from rows of owner digits (useful for testing).
    ///
    /// Row `r`, column `q` of the input becomes `HexCoord::new(q, r)`. A `.`
    /// leaves a hole in the board.
    pub fn from_rows(rows: &[&str]) -> Result<Self, BoardError> {
        let mut cells = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            for (q, ch) in row.chars().enumerate() {
                if ch == '.' {
                    continue;
                }
                let owner = ch
                    .to_digit(10)
                    .ok_or(BoardError::InvalidOwnerChar(ch))? as PlayerId;
                cells.push((HexCoord::new(q as i32, r as i32), owner));
            }
        }
        Self::from_owners(cells)
    }

    /// Partition all fields into maximal same-owner connected territories.
    fn discover_territories(&mut self) {
        let mut assigned = vec![false; self.fields.len()];
        for id in 0..self.fields.len() {
            if assigned[id] {
                continue;
            }
            let component = self.connected_component(id);
            for &field in &component {
                assigned[field] = true;
            }
            let owner = self.fields[id].owner;
            self.create_territory(owner, component);
        }
    }

    /// Number of fields on the board.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Boards are never empty once built.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a field by id.
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(id)
    }

    /// Look up the field at a coordinate.
    pub fn field_id(&self, coord: &HexCoord) -> Option<FieldId> {
        self.index.get(coord).copied()
    }

    /// Iterate over all fields in arena order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Pixel position of a field's center for cells of the given radius.
    pub fn field_position(&self, id: FieldId, size: f32) -> Option<(f32, f32)> {
        self.field(id).map(|f| f.coord.to_pixel(size))
    }

    /// Fields adjacent to `id`. Positions off the board are omitted.
    pub fn neighbors(&self, id: FieldId) -> Vec<FieldId> {
        let Some(field) = self.fields.get(id) else {
            return Vec::new();
        };
        field
            .coord
            .neighbors()
            .iter()
            .filter_map(|c| self.index.get(c).copied())
            .collect()
    }

    /// All fields reachable from `start` through adjacent fields with the
    /// same owner, `start` included.
    pub fn connected_component(&self, start: FieldId) -> BTreeSet<FieldId> {
        let mut component = BTreeSet::new();
        let Some(origin) = self.fields.get(start) else {
            return component;
        };
        let owner = origin.owner;

        let mut stack = vec![start];
        component.insert(start);
        while let Some(current) = stack.pop() {
            for next in self.neighbors(current) {
                if self.fields[next].owner == owner && component.insert(next) {
                    stack.push(next);
                }
            }
        }
        component
    }

    /// Fields bordering a territory from the outside, in first-seen order.
    ///
    /// The order only depends on the board layout, so automated players
    /// iterating it behave deterministically.
    pub fn territory_neighbors(&self, id: TerritoryId) -> Vec<FieldId> {
        let Some(territory) = self.territories.get(&id) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for &field in &territory.fields {
            for next in self.neighbors(field) {
                if !territory.contains(next) && seen.insert(next) {
                    result.push(next);
                }
            }
        }
        result
    }

    /// Get a territory by id.
    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(&id)
    }

    /// Get a mutable territory by id.
    pub fn territory_mut(&mut self, id: TerritoryId) -> Option<&mut Territory> {
        self.territories.get_mut(&id)
    }

    /// Territory containing a field.
    pub fn territory_of(&self, field: FieldId) -> Option<&Territory> {
        self.field(field)
            .and_then(|f| self.territories.get(&f.territory))
    }

    /// Iterate over all territories in id order.
    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.territories.values()
    }

    /// Iterate over a player's territories in id order.
    pub fn territories_of(&self, player: PlayerId) -> impl Iterator<Item = &Territory> {
        self.territories.values().filter(move |t| t.owner == player)
    }

    /// Number of territories on the board.
    pub fn territory_count(&self) -> usize {
        self.territories.len()
    }

    /// Number of fields a player owns.
    pub fn field_count(&self, player: PlayerId) -> usize {
        self.fields.iter().filter(|f| f.owner == player).count()
    }

    /// Number of a player's territories with more than one field.
    pub fn controllable_count(&self, player: PlayerId) -> usize {
        self.territories_of(player)
            .filter(|t| t.is_controllable())
            .count()
    }

    // ------------------------------------------------------------------
    // Mutation primitives. Callers guarantee the ids they pass exist.
    // ------------------------------------------------------------------

    /// Register a new territory over `fields` and point their back-references
    /// at it.
    pub(crate) fn create_territory(
        &mut self,
        owner: PlayerId,
        fields: BTreeSet<FieldId>,
    ) -> TerritoryId {
        let id = self.next_territory_id;
        self.next_territory_id += 1;
        for &field in &fields {
            self.fields[field].territory = id;
        }
        self.territories
            .insert(id, Territory::new(id, owner, fields));
        id
    }

    /// Hand a field to `new_owner` and move it into territory `to`.
    ///
    /// Returns the id of the field's previous territory if it was left empty
    /// and therefore removed.
    pub(crate) fn transfer_field(
        &mut self,
        field: FieldId,
        new_owner: PlayerId,
        to: TerritoryId,
    ) -> Option<TerritoryId> {
        let old = self.fields[field].territory;
        let mut emptied = None;
        if let Some(territory) = self.territories.get_mut(&old) {
            territory.fields.remove(&field);
            if territory.fields.is_empty() {
                self.territories.remove(&old);
                emptied = Some(old);
            }
        }

        self.fields[field].owner = new_owner;
        self.fields[field].territory = to;
        if let Some(territory) = self.territories.get_mut(&to) {
            territory.fields.insert(field);
        }
        emptied
    }

    /// Move every field and all money of `donor` into `into`, then discard
    /// `donor`.
    pub(crate) fn absorb_territory(&mut self, into: TerritoryId, donor: TerritoryId) {
        if into == donor {
            return;
        }
        let Some(donor) = self.territories.remove(&donor) else {
            return;
        };
        for &field in &donor.fields {
            self.fields[field].territory = into;
        }
        if let Some(target) = self.territories.get_mut(&into) {
            target.money += donor.money;
            target.fields.extend(donor.fields);
        }
    }

    /// Carve `fields` out of territory `from` into a new territory with an
    /// empty treasury.
    pub(crate) fn split_off(
        &mut self,
        from: TerritoryId,
        fields: BTreeSet<FieldId>,
    ) -> Option<TerritoryId> {
        let territory = self.territories.get_mut(&from)?;
        territory.fields.retain(|f| !fields.contains(f));
        let owner = territory.owner;
        Some(self.create_territory(owner, fields))
    }
}

/// Errors from building a board.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("Board has no fields")]
    Empty,
    #[error("Coordinate {0} appears more than once")]
    DuplicateCoordinate(HexCoord),
    #[error("Invalid owner character '{0}'")]
    InvalidOwnerChar(char),
}
