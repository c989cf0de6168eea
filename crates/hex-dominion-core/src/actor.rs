//! Actors: whoever drives a player's turns.
//!
//! Human actors are driven from the outside (input handling calls into a
//! [`TurnContext`] and finally ends the turn). Automated actors get their
//! whole turn in [`Actor::do_turn`].

use crate::board::Board;
use crate::game_state::{GameError, GameState};
use crate::ledger::UnitLedger;
use crate::movement::MoveOutcome;
use crate::types::{FieldId, PlayerId, TerritoryId, UnitId};
use crate::unit::UnitType;
use serde::{Deserialize, Serialize};

/// Who controls a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Human,
    Automated,
}

/// Controls one player. Every hook is optional.
pub trait Actor: Send {
    /// Human or automated.
    fn kind(&self) -> ActorKind;

    /// Called after income and mobility were refreshed for the player.
    fn on_turn_start(&mut self, _ctx: &mut TurnContext<'_>) {}

    /// Called before the turn-end bookkeeping.
    fn on_turn_end(&mut self, _ctx: &mut TurnContext<'_>) {}

    /// Play the whole turn. Only called for automated actors.
    fn do_turn(&mut self, _ctx: &mut TurnContext<'_>) {}
}

/// Actor for a player sitting at the board.
#[derive(Debug, Default)]
pub struct HumanActor;

impl Actor for HumanActor {
    fn kind(&self) -> ActorKind {
        ActorKind::Human
    }
}

/// Automated actor that never does anything.
#[derive(Debug, Default)]
pub struct PassiveActor;

impl Actor for PassiveActor {
    fn kind(&self) -> ActorKind {
        ActorKind::Automated
    }
}

/// What an actor may see and do during its player's turn.
pub struct TurnContext<'a> {
    state: &'a mut GameState,
    player: PlayerId,
}

impl<'a> TurnContext<'a> {
    pub(crate) fn new(state: &'a mut GameState, player: PlayerId) -> Self {
        Self { state, player }
    }

    /// The acting player.
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Current round.
    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn units(&self) -> &UnitLedger {
        &self.state.units
    }

    /// The acting player's selected territory.
    pub fn selected_territory(&self) -> Option<TerritoryId> {
        self.state.selected_territory(self.player)
    }

    /// Move one of the acting player's units.
    pub fn move_unit(
        &mut self,
        unit: UnitId,
        destination: FieldId,
    ) -> Result<MoveOutcome, GameError> {
        self.state.move_unit(self.player, unit, destination)
    }

    /// Buy a unit with the selected territory's money.
    pub fn purchase(&mut self, unit_type: UnitType) -> Result<UnitId, GameError> {
        self.state.purchase(self.player, unit_type)
    }

    /// Change the acting player's selection.
    pub fn select_territory(&mut self, territory: Option<TerritoryId>) -> Result<(), GameError> {
        self.state.select_territory(self.player, territory)
    }

    /// Ask for the acting player's panel to be redrawn.
    pub fn refresh_panel(&mut self) {
        self.state.refresh_panel(self.player);
    }
}
