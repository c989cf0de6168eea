//! Root game state and the operations a player performs during a turn.

use crate::board::{Board, BoardError};
use crate::invariants::{check_invariants, InvariantViolation};
use crate::ledger::UnitLedger;
use crate::mapgen::BoardGenerator;
use crate::movement::{self, CaptureReport, MoveError, MoveOutcome};
use crate::player::Player;
use crate::settings::{GameSettings, SettingsError};
use crate::snapshot::{BoardSnapshot, SnapshotError};
use crate::types::{FieldId, PlayerId, TerritoryId, UnitId};
use crate::unit::UnitType;
use crate::victory::VictoryType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Receives notifications meant for panels and other presentation layers.
///
/// All methods default to doing nothing.
pub trait GameObserver: Send {
    /// A player's selected territory changed or its contents may have.
    fn selection_changed(&mut self, _player: PlayerId, _territory: Option<TerritoryId>) {}

    /// The panel showing a player's state should be redrawn.
    fn refresh_panel(&mut self, _player: PlayerId) {}

    /// The game has been won.
    fn game_won(&mut self, _player: PlayerId) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default)]
pub struct NullObserver;

impl GameObserver for NullObserver {}

/// A unit bought this turn that has not been placed yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPurchase {
    pub unit: UnitId,
    /// Territory that paid for the unit and receives the refund.
    pub territory: TerritoryId,
    pub cost: u32,
}

/// The complete state of a game.
pub struct GameState {
    /// Game configuration (immutable after start).
    pub settings: GameSettings,
    /// The board and its territories.
    pub board: Board,
    /// Every unit and where it stands.
    pub units: UnitLedger,
    /// All players, indexed by id.
    pub players: Vec<Player>,
    /// Game phase.
    pub phase: GamePhase,
    /// Current round (starts at 1, increments when the rotation wraps).
    pub round: u32,
    /// Which player's turn it currently is.
    pub current_player: PlayerId,
    /// Victor (if game has ended).
    pub winner: Option<(PlayerId, VictoryType)>,
    pending: BTreeMap<PlayerId, PendingPurchase>,
    observer: Box<dyn GameObserver>,
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("settings", &self.settings)
            .field("phase", &self.phase)
            .field("round", &self.round)
            .field("current_player", &self.current_player)
            .field("winner", &self.winner)
            .field("fields", &self.board.len())
            .field("territories", &self.board.territory_count())
            .field("units", &self.units.len())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// Create a new game on a freshly generated board.
    pub fn new(settings: GameSettings, seed: [u8; 32]) -> Result<Self, GameError> {
        settings.validate()?;
        let board = BoardGenerator::new(seed, &settings).generate()?;
        Ok(Self::with_board(settings, board))
    }

    /// Create a game on a saved board layout.
    pub fn from_snapshot(
        settings: GameSettings,
        snapshot: &BoardSnapshot,
    ) -> Result<Self, GameError> {
        settings.validate()?;
        let board = Board::from_snapshot(snapshot, settings.player_count)?;
        Ok(Self::with_board(settings, board))
    }

    /// Create a game around an existing board.
    ///
    /// Every controllable territory receives its main building. Field owners
    /// at or above `settings.player_count` belong to nobody in the rotation.
    pub fn with_board(settings: GameSettings, board: Board) -> Self {
        let players = (0..settings.player_count)
            .map(|id| Player::new(id, format!("Player {}", id + 1)))
            .collect();
        let mut units = UnitLedger::new();
        movement::renew_all_main_buildings(&board, &mut units);
        Self {
            settings,
            board,
            units,
            players,
            phase: GamePhase::Setup,
            round: 0,
            current_player: 0,
            winner: None,
            pending: BTreeMap::new(),
            observer: Box::new(NullObserver),
        }
    }

    /// Install the observer receiving panel and selection notifications.
    pub fn set_observer(&mut self, observer: Box<dyn GameObserver>) {
        self.observer = observer;
    }

    /// Get a player by ID.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// Get a mutable player by ID.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id as usize)
    }

    /// Get the current player.
    pub fn current_player(&self) -> Option<&Player> {
        self.player(self.current_player)
    }

    /// Players still in the rotation.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }

    /// Check if the game has ended.
    pub fn is_ended(&self) -> bool {
        self.phase == GamePhase::Ended
    }

    /// Check if it's a specific player's turn.
    pub fn is_player_turn(&self, player: PlayerId) -> bool {
        self.phase == GamePhase::Playing && self.current_player == player
    }

    fn ensure_turn(&self, player: PlayerId) -> Result<(), GameError> {
        if self.phase != GamePhase::Playing {
            return Err(GameError::InvalidPhase);
        }
        if self.current_player != player {
            return Err(GameError::NotPlayerTurn(player));
        }
        Ok(())
    }

    /// The territory a player has selected.
    pub fn selected_territory(&self, player: PlayerId) -> Option<TerritoryId> {
        self.player(player).and_then(|p| p.selected)
    }

    /// The player's bought but unplaced unit.
    pub fn pending_purchase(&self, player: PlayerId) -> Option<&PendingPurchase> {
        self.pending.get(&player)
    }

    /// Select one of the player's own territories, or clear the selection.
    ///
    /// Changing the selection cancels a pending purchase and refunds it.
    pub fn select_territory(
        &mut self,
        player: PlayerId,
        territory: Option<TerritoryId>,
    ) -> Result<(), GameError> {
        let current = self.player(player).ok_or(GameError::UnknownPlayer(player))?.selected;
        if let Some(id) = territory {
            if !self.board.territory(id).is_some_and(|t| t.owner == player) {
                return Err(GameError::NotOwnTerritory(id));
            }
        }

        if current != territory {
            self.cancel_purchase(player);
        }
        if let Some(p) = self.player_mut(player) {
            p.selected = territory;
        }
        self.observer.selection_changed(player, territory);
        Ok(())
    }

    /// Buy a unit with the selected territory's money.
    ///
    /// The unit starts unplaced and is put on the board with
    /// [`GameState::move_unit`], using the selected territory as origin.
    pub fn purchase(&mut self, player: PlayerId, unit_type: UnitType) -> Result<UnitId, GameError> {
        self.ensure_turn(player)?;
        if let Some(pending) = self.pending.get(&player) {
            return Err(GameError::PurchasePending(pending.unit));
        }
        let stats = unit_type.stats();
        if !stats.buildable {
            return Err(GameError::NotBuildable(unit_type));
        }

        let selected = self.selected_territory(player).ok_or(GameError::NoSelection)?;
        let territory = self
            .board
            .territory_mut(selected)
            .filter(|t| t.owner == player)
            .ok_or(GameError::NoSelection)?;
        if !territory.is_controllable() {
            return Err(GameError::NotControllable(selected));
        }
        if !territory.can_afford(stats.cost) {
            return Err(GameError::InsufficientFunds {
                unit_type,
                cost: stats.cost,
                available: territory.money,
            });
        }
        territory.money -= stats.cost as i32;

        let unit = self.units.spawn(player, unit_type);
        if let Some(u) = self.units.unit_mut(unit) {
            u.can_move = stats.movable;
        }
        self.pending.insert(
            player,
            PendingPurchase {
                unit,
                territory: selected,
                cost: stats.cost,
            },
        );
        debug!(player, unit, %unit_type, territory = selected, "unit purchased");
        self.observer.refresh_panel(player);
        Ok(unit)
    }

    /// Cancel the player's pending purchase and refund its cost.
    ///
    /// Returns the discarded unit. The refund is lost if the paying
    /// territory no longer exists.
    pub fn cancel_purchase(&mut self, player: PlayerId) -> Option<UnitId> {
        let pending = self.pending.remove(&player)?;
        if !self.units.unit(pending.unit).is_some_and(|u| !u.is_placed()) {
            return None;
        }
        self.units.remove(pending.unit);
        match self.board.territory_mut(pending.territory) {
            Some(territory) => {
                territory.money += pending.cost as i32;
                debug!(player, unit = pending.unit, "purchase refunded");
            }
            None => {
                warn!(
                    player,
                    territory = pending.territory,
                    cost = pending.cost,
                    "refund lost, paying territory is gone"
                );
            }
        }
        Some(pending.unit)
    }

    /// Move one of the player's units.
    pub fn move_unit(
        &mut self,
        player: PlayerId,
        unit: UnitId,
        destination: FieldId,
    ) -> Result<MoveOutcome, GameError> {
        self.ensure_turn(player)?;
        let owner = self
            .units
            .unit(unit)
            .map(|u| u.owner)
            .ok_or(MoveError::UnknownUnit(unit))?;
        if owner != player {
            return Err(GameError::NotUnitOwner { unit, player });
        }

        let selected = self.selected_territory(player);
        let outcome = movement::execute_move(
            &mut self.board,
            &mut self.units,
            unit,
            destination,
            selected,
        )?;

        if self.pending.get(&player).is_some_and(|p| p.unit == unit) {
            self.pending.remove(&player);
        }
        if let MoveOutcome::Captured(report) = &outcome {
            self.after_capture(player, report);
        }
        Ok(outcome)
    }

    /// Re-point references to territories a capture merged away.
    fn after_capture(&mut self, attacker: PlayerId, report: &CaptureReport) {
        let origin = self.board.field(report.field).map(|f| f.territory);

        for player in &mut self.players {
            let Some(selected) = player.selected else {
                continue;
            };
            if report.absorbed.contains(&selected) {
                player.selected = origin;
            } else if self.board.territory(selected).is_none() {
                player.selected = None;
            }
        }
        for pending in self.pending.values_mut() {
            if let Some(origin) = origin.filter(|_| report.absorbed.contains(&pending.territory)) {
                pending.territory = origin;
            }
        }

        if let Some(selected) = self.selected_territory(attacker) {
            self.observer.selection_changed(attacker, Some(selected));
        }
    }

    /// Ask the observer to redraw a player's panel.
    pub fn refresh_panel(&mut self, player: PlayerId) {
        self.observer.refresh_panel(player);
    }

    /// Give every territory the main building its size calls for.
    pub fn renew_all_main_buildings(&mut self) {
        movement::renew_all_main_buildings(&self.board, &mut self.units);
    }

    /// Number of fields on the board.
    pub fn total_fields(&self) -> usize {
        self.board.len()
    }

    /// Save the board layout.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    /// Run every structural check on the board and the units.
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        check_invariants(&self.board, &self.units)
    }

    pub(crate) fn mark_won(&mut self, winner: PlayerId, victory: VictoryType) {
        self.phase = GamePhase::Ended;
        self.winner = Some((winner, victory));
        info!(winner, ?victory, round = self.round, "game won");
        self.observer.game_won(winner);
    }
}

/// Current phase of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Board is set up, no turn has started yet.
    #[default]
    Setup,
    /// Turns are being played.
    Playing,
    /// A winner has been determined.
    Ended,
}

/// Errors that can occur during game operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Invalid operation for current game phase")]
    InvalidPhase,
    #[error("It's not player {0}'s turn")]
    NotPlayerTurn(PlayerId),
    #[error("Player {0} does not exist")]
    UnknownPlayer(PlayerId),
    #[error("Unit {unit} does not belong to player {player}")]
    NotUnitOwner { unit: UnitId, player: PlayerId },
    #[error("Territory {0} does not belong to the player")]
    NotOwnTerritory(TerritoryId),
    #[error("No territory selected")]
    NoSelection,
    #[error("Territory {0} is too small to host units")]
    NotControllable(TerritoryId),
    #[error("{0} cannot be bought")]
    NotBuildable(UnitType),
    #[error("{unit_type} costs {cost}, only {available} available")]
    InsufficientFunds {
        unit_type: UnitType,
        cost: u32,
        available: i32,
    },
    #[error("Unit {0} is still waiting to be placed")]
    PurchasePending(UnitId),
    #[error("Player {0} is not controlled automatically")]
    NotAutomated(PlayerId),
    #[error("Expected {expected} actors, got {actual}")]
    ActorCountMismatch { expected: usize, actual: usize },
    #[error("No player left to take the next turn")]
    RotationExhausted,
    #[error(transparent)]
    InvariantViolated(InvariantViolation),
    #[error("Move rejected: {0}")]
    Move(#[from] MoveError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Board(#[from] BoardError),
}
