//! Player state.

use crate::types::{PlayerId, TerritoryId};
use serde::{Deserialize, Serialize};

/// A player in the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player index, also the owner index of its fields.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Whether this player has been removed from the rotation.
    pub eliminated: bool,
    /// Territory the player is currently working with.
    pub selected: Option<TerritoryId>,
    /// Number of turns this player has completed.
    pub turns_taken: u32,
}

impl Player {
    /// Create a new player with default values.
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            eliminated: false,
            selected: None,
            turns_taken: 0,
        }
    }

    /// Still taking part in the rotation?
    pub fn is_active(&self) -> bool {
        !self.eliminated
    }

    /// The first turn pays start income instead of regular income.
    pub fn is_first_turn(&self) -> bool {
        self.turns_taken == 0
    }
}
