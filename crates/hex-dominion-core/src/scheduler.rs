//! Turn and economy scheduler.
//!
//! Drives the turn cycle of a game:
//!
//! ```text
//! TurnStart -> ActorActing -> TurnEnd -> (win | next player) -> TurnStart ...
//! ```
//!
//! `TurnStart` books the active player's income, enforces bankruptcy and
//! refreshes unit mobility. `TurnEnd` refunds unplaced purchases, checks the
//! board partition, eliminates players without a controllable territory and
//! looks for a winner before handing the turn to the next active player.

use crate::actor::{Actor, ActorKind, TurnContext};
use crate::game_state::{GameError, GamePhase, GameState};
use crate::invariants::check_partition;
use crate::types::{PlayerId, TerritoryId, UnitId};
use crate::victory::{VictoryChecker, VictoryType};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What happens after a turn ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextTurn {
    /// Another player's turn has started.
    Player { player: PlayerId, round: u32 },
    /// The game is over.
    GameOver {
        winner: PlayerId,
        victory: VictoryType,
    },
}

/// Summary of a finished turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Player whose turn just ended.
    pub finished: PlayerId,
    /// Players removed from the rotation at this turn end.
    pub eliminated: Vec<PlayerId>,
    pub next: NextTurn,
}

/// Owns a game and the actors playing it.
pub struct TurnScheduler {
    state: GameState,
    actors: Vec<Box<dyn Actor>>,
    victory: VictoryChecker,
}

impl TurnScheduler {
    /// Pair a game with one actor per player, in player order.
    pub fn new(state: GameState, actors: Vec<Box<dyn Actor>>) -> Result<Self, GameError> {
        if actors.len() != state.players.len() {
            return Err(GameError::ActorCountMismatch {
                expected: state.players.len(),
                actual: actors.len(),
            });
        }
        let victory = VictoryChecker::new(state.settings.win_percentage);
        Ok(Self {
            state,
            actors,
            victory,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for setup and for human input handling.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Kind of the actor whose turn it is.
    pub fn current_actor_kind(&self) -> Option<ActorKind> {
        self.actors
            .get(self.state.current_player as usize)
            .map(|a| a.kind())
    }

    /// Minimum wall-clock duration of an automated turn.
    pub fn min_turn_duration(&self) -> Duration {
        Duration::from_millis(self.state.settings.min_turn_duration_ms)
    }

    pub fn is_over(&self) -> bool {
        self.state.is_ended()
    }

    /// Context for acting on behalf of the current player.
    pub fn context(&mut self) -> Result<TurnContext<'_>, GameError> {
        if self.state.phase != GamePhase::Playing {
            return Err(GameError::InvalidPhase);
        }
        let player = self.state.current_player;
        Ok(TurnContext::new(&mut self.state, player))
    }

    /// Start the game and the first player's turn.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.state.phase != GamePhase::Setup {
            return Err(GameError::InvalidPhase);
        }
        let first = self
            .state
            .active_players()
            .next()
            .map(|p| p.id)
            .ok_or(GameError::RotationExhausted)?;
        self.state.phase = GamePhase::Playing;
        self.state.round = 1;
        self.state.current_player = first;
        info!(players = self.state.players.len(), "game started");
        self.begin_turn();
        Ok(())
    }

    /// Let the current automated actor play its turn.
    ///
    /// The turn is not ended; call [`TurnScheduler::end_turn`] afterwards.
    pub fn play_automated_turn(&mut self) -> Result<(), GameError> {
        if self.state.phase != GamePhase::Playing {
            return Err(GameError::InvalidPhase);
        }
        let player = self.state.current_player;
        let actor = self
            .actors
            .get_mut(player as usize)
            .ok_or(GameError::UnknownPlayer(player))?;
        if actor.kind() != ActorKind::Automated {
            return Err(GameError::NotAutomated(player));
        }
        let mut ctx = TurnContext::new(&mut self.state, player);
        actor.do_turn(&mut ctx);
        Ok(())
    }

    /// End the current turn and start the next one.
    pub fn end_turn(&mut self) -> Result<TurnOutcome, GameError> {
        if self.state.phase != GamePhase::Playing {
            return Err(GameError::InvalidPhase);
        }
        let player = self.state.current_player;

        if let Some(actor) = self.actors.get_mut(player as usize) {
            let mut ctx = TurnContext::new(&mut self.state, player);
            actor.on_turn_end(&mut ctx);
        }
        if let Some(unit) = self.state.cancel_purchase(player) {
            debug!(player, unit, "unplaced unit refunded at turn end");
        }
        rest_units(&mut self.state, player);
        if let Some(p) = self.state.player_mut(player) {
            p.turns_taken += 1;
        }

        if let Some(violation) = check_partition(&self.state.board).into_iter().next() {
            error!(%violation, "board partition is broken");
            return Err(GameError::InvariantViolated(violation));
        }

        let eliminated = VictoryChecker::find_eliminated(&self.state.board, &self.state.players);
        for &id in &eliminated {
            if let Some(p) = self.state.player_mut(id) {
                p.eliminated = true;
                p.selected = None;
            }
            info!(player = id, round = self.state.round, "player eliminated");
        }

        if let Some((winner, victory)) = self
            .victory
            .check_all(&self.state.board, &self.state.players)
        {
            self.state.mark_won(winner, victory);
            return Ok(TurnOutcome {
                finished: player,
                eliminated,
                next: NextTurn::GameOver { winner, victory },
            });
        }

        let (next, wrapped) = self.next_player()?;
        if wrapped {
            self.state.round += 1;
        }
        self.state.current_player = next;
        self.begin_turn();

        Ok(TurnOutcome {
            finished: player,
            eliminated,
            next: NextTurn::Player {
                player: next,
                round: self.state.round,
            },
        })
    }

    /// Next active player after the current one, and whether the rotation
    /// wrapped around.
    fn next_player(&self) -> Result<(PlayerId, bool), GameError> {
        let count = self.state.players.len();
        let current = self.state.current_player as usize;
        (1..=count)
            .map(|step| (current + step) % count)
            .find(|&i| self.state.players.get(i).is_some_and(|p| p.is_active()))
            .map(|i| (i as PlayerId, i <= current))
            .ok_or_else(|| {
                error!(current, "no active player left in the rotation");
                GameError::RotationExhausted
            })
    }

    fn begin_turn(&mut self) {
        let player = self.state.current_player;
        collect_income(&mut self.state, player);
        refresh_mobility(&mut self.state, player);
        debug!(player, round = self.state.round, "turn started");

        if let Some(actor) = self.actors.get_mut(player as usize) {
            let mut ctx = TurnContext::new(&mut self.state, player);
            actor.on_turn_start(&mut ctx);
        }
    }
}

/// Book the player's income and enforce bankruptcy.
fn collect_income(state: &mut GameState, player: PlayerId) {
    let first_turn = state.player(player).is_some_and(|p| p.is_first_turn());
    let rates = state.settings.economy;
    let ids: Vec<TerritoryId> = state.board.territories_of(player).map(|t| t.id).collect();

    for id in ids {
        let salaries = state
            .board
            .territory(id)
            .map_or(0, |t| state.units.salaries(t));
        let Some(territory) = state.board.territory_mut(id) else {
            continue;
        };
        if first_turn {
            territory.on_turn_start(&rates);
        } else {
            territory.on_turn(&rates, salaries);
        }

        if territory.is_bankrupt() {
            let debt = territory.money;
            territory.money = 0;
            let removed = state.units.remove_salaried(territory);
            warn!(
                player,
                territory = id,
                debt,
                removed = removed.len(),
                "territory bankrupt"
            );
        }
    }
}

/// Units of the player may cross a border this turn if they can move at all
/// and stand on the player's own field.
fn refresh_mobility(state: &mut GameState, player: PlayerId) {
    let flags: Vec<(UnitId, bool)> = state
        .units
        .units_of(player)
        .map(|u| {
            let on_own_field = u
                .field
                .and_then(|f| state.board.field(f))
                .is_some_and(|f| f.owner == player);
            (u.id, u.unit_type.stats().movable && on_own_field)
        })
        .collect();
    for (id, can_move) in flags {
        if let Some(unit) = state.units.unit_mut(id) {
            unit.can_move = can_move;
        }
    }
}

fn rest_units(state: &mut GameState, player: PlayerId) {
    let ids: Vec<UnitId> = state.units.units_of(player).map(|u| u.id).collect();
    for id in ids {
        if let Some(unit) = state.units.unit_mut(id) {
            unit.can_move = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{HumanActor, PassiveActor};
    use crate::board::Board;
    use crate::hex::HexCoord;
    use crate::settings::GameSettings;
    use crate::types::FieldId;
    use crate::unit::UnitType;
    use std::sync::{Arc, Mutex};

    struct Scripted {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Actor for Scripted {
        fn kind(&self) -> ActorKind {
            ActorKind::Automated
        }
        fn on_turn_start(&mut self, ctx: &mut TurnContext<'_>) {
            self.log.lock().unwrap().push(format!("start {}", ctx.player()));
        }
        fn on_turn_end(&mut self, ctx: &mut TurnContext<'_>) {
            self.log.lock().unwrap().push(format!("end {}", ctx.player()));
        }
        fn do_turn(&mut self, ctx: &mut TurnContext<'_>) {
            self.log.lock().unwrap().push(format!("play {}", ctx.player()));
        }
    }

    fn create_scheduler(rows: &[&str]) -> TurnScheduler {
        let board = Board::from_rows(rows).unwrap();
        let state = GameState::with_board(GameSettings::duel("Test".to_string()), board);
        TurnScheduler::new(state, vec![Box::new(PassiveActor), Box::new(PassiveActor)]).unwrap()
    }

    fn field(s: &TurnScheduler, q: i32, r: i32) -> FieldId {
        s.state().board.field_id(&HexCoord::new(q, r)).unwrap()
    }

    fn money_at(s: &TurnScheduler, q: i32, r: i32) -> i32 {
        s.state().board.territory_of(field(s, q, r)).unwrap().money
    }

    #[test]
    fn test_actor_count_must_match() {
        let board = Board::from_rows(&["0011"]).unwrap();
        let state = GameState::with_board(GameSettings::duel("Test".to_string()), board);
        assert!(matches!(
            TurnScheduler::new(state, vec![Box::new(PassiveActor)]),
            Err(GameError::ActorCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_start_pays_start_income() {
        let mut s = create_scheduler(&["0000", "1111"]);
        s.start().unwrap();
        assert_eq!(s.state().phase, GamePhase::Playing);
        assert_eq!(s.state().round, 1);
        assert_eq!(money_at(&s, 0, 0), 20);
        assert_eq!(money_at(&s, 0, 1), 0);
        assert!(matches!(s.start(), Err(GameError::InvalidPhase)));
    }

    #[test]
    fn test_rotation_and_regular_income() {
        let mut s = create_scheduler(&["0000", "1111"]);
        s.start().unwrap();

        let outcome = s.end_turn().unwrap();
        assert_eq!(outcome.finished, 0);
        assert_eq!(outcome.next, NextTurn::Player { player: 1, round: 1 });
        assert_eq!(money_at(&s, 0, 1), 20);

        let outcome = s.end_turn().unwrap();
        assert_eq!(outcome.next, NextTurn::Player { player: 0, round: 2 });
        // Second turn: 4 fields of income, the main building draws no salary
        assert_eq!(money_at(&s, 0, 0), 24);
    }

    #[test]
    fn test_bankruptcy_removes_salaried_units() {
        let mut s = create_scheduler(&["0000", "1111"]);
        s.start().unwrap();
        let site = field(&s, 2, 0);
        let baron = s
            .state_mut()
            .units
            .spawn_at(0, UnitType::Baron, site)
            .unwrap();
        s.end_turn().unwrap();
        s.end_turn().unwrap();

        // 20 + 4 - 54 < 0
        assert!(s.state().units.unit(baron).is_none());
        assert_eq!(money_at(&s, 0, 0), 0);
        let home = s.state().board.territory_of(field(&s, 0, 0)).unwrap();
        assert!(s.state().units.main_building(home).is_some());
    }

    #[test]
    fn test_mobility_refresh_and_rest() {
        let mut s = create_scheduler(&["0000", "1111"]);
        let (a, b, c) = (field(&s, 1, 0), field(&s, 2, 0), field(&s, 1, 1));
        let units = &mut s.state_mut().units;
        let peasant = units.spawn_at(0, UnitType::Peasant, a).unwrap();
        let tower = units.spawn_at(0, UnitType::Tower, b).unwrap();
        let enemy = units.spawn_at(1, UnitType::Peasant, c).unwrap();

        s.start().unwrap();
        let units = &s.state().units;
        assert!(units.unit(peasant).unwrap().can_move);
        assert!(!units.unit(tower).unwrap().can_move);
        assert!(!units.unit(enemy).unwrap().can_move);

        s.end_turn().unwrap();
        let units = &s.state().units;
        assert!(!units.unit(peasant).unwrap().can_move);
        assert!(units.unit(enemy).unwrap().can_move);
    }

    #[test]
    fn test_turn_end_refunds_unplaced_purchase() {
        let mut s = create_scheduler(&["0000", "1111"]);
        s.start().unwrap();
        let home = s.state().board.territory_of(field(&s, 0, 0)).unwrap().id;
        {
            let mut ctx = s.context().unwrap();
            ctx.select_territory(Some(home)).unwrap();
            ctx.purchase(UnitType::Knight).unwrap_err();
            ctx.purchase(UnitType::Peasant).unwrap();
        }
        assert_eq!(money_at(&s, 0, 0), 10);

        s.end_turn().unwrap();
        assert_eq!(money_at(&s, 0, 0), 20);
        assert!(s.state().pending_purchase(0).is_none());
        assert_eq!(s.state().units.units_of(0).count(), 1);
    }

    #[test]
    fn test_actor_hooks_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let board = Board::from_rows(&["0000", "1111"]).unwrap();
        let state = GameState::with_board(GameSettings::duel("Test".to_string()), board);
        let actors: Vec<Box<dyn Actor>> = vec![
            Box::new(Scripted { log: log.clone() }),
            Box::new(Scripted { log: log.clone() }),
        ];
        let mut s = TurnScheduler::new(state, actors).unwrap();

        s.start().unwrap();
        s.play_automated_turn().unwrap();
        s.end_turn().unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["start 0", "play 0", "end 0", "start 1"]
        );
    }

    #[test]
    fn test_human_turn_is_not_automated() {
        let board = Board::from_rows(&["0000", "1111"]).unwrap();
        let state = GameState::with_board(GameSettings::duel("Test".to_string()), board);
        let mut s =
            TurnScheduler::new(state, vec![Box::new(HumanActor), Box::new(PassiveActor)]).unwrap();
        assert!(matches!(
            s.play_automated_turn(),
            Err(GameError::InvalidPhase)
        ));
        s.start().unwrap();
        assert_eq!(s.current_actor_kind(), Some(ActorKind::Human));
        assert!(matches!(
            s.play_automated_turn(),
            Err(GameError::NotAutomated(0))
        ));
    }

    #[test]
    fn test_elimination_and_domination() {
        // Player 1 holds a single field: no controllable territory.
        let mut s = create_scheduler(&["0000", "0001"]);
        s.start().unwrap();
        let outcome = s.end_turn().unwrap();
        assert_eq!(outcome.eliminated, vec![1]);
        assert_eq!(
            outcome.next,
            NextTurn::GameOver {
                winner: 0,
                victory: VictoryType::Domination
            }
        );
        assert!(s.is_over());
        assert!(s.state().player(1).unwrap().eliminated);
        assert!(matches!(s.end_turn(), Err(GameError::InvalidPhase)));
    }

    #[test]
    fn test_eliminated_players_are_skipped() {
        let board = Board::from_rows(&["000000", "111111", "222222"]).unwrap();
        let settings = GameSettings {
            player_count: 3,
            ..GameSettings::duel("Three".to_string())
        };
        let state = GameState::with_board(settings, board);
        let actors: Vec<Box<dyn Actor>> = vec![
            Box::new(PassiveActor),
            Box::new(PassiveActor),
            Box::new(PassiveActor),
        ];
        let mut s = TurnScheduler::new(state, actors).unwrap();
        s.start().unwrap();
        s.state_mut().player_mut(1).unwrap().eliminated = true;

        let outcome = s.end_turn().unwrap();
        assert_eq!(outcome.next, NextTurn::Player { player: 2, round: 1 });
        let outcome = s.end_turn().unwrap();
        assert_eq!(outcome.next, NextTurn::Player { player: 0, round: 2 });
    }

    #[test]
    fn test_rotation_exhausted_is_reported() {
        let mut s = create_scheduler(&["0000", "1111"]);
        s.start().unwrap();
        for p in &mut s.state_mut().players {
            p.eliminated = true;
        }
        assert!(matches!(s.end_turn(), Err(GameError::RotationExhausted)));
    }

    #[test]
    fn test_min_turn_duration() {
        let s = create_scheduler(&["0011"]);
        assert_eq!(s.min_turn_duration(), Duration::from_millis(250));
    }
}
