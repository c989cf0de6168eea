//! Hex Dominion Core Library
//!
//! This crate contains the core game logic for Hex Dominion, a turn-based
//! territorial conquest game on a hexagonal board. Players own connected
//! groups of fields ("territories"), buy and move strength-ranked units and
//! fight over border fields.
//!
//! # Design Principles
//!
//! - **No UI dependencies**: rendering and input live elsewhere and talk to
//!   the engine through [`Actor`], [`TurnContext`] and [`GameObserver`]
//! - **Deterministic**: same seed and same moves give the same game
//! - **Validate, then mutate**: a rejected move leaves no trace
//! - **Arena entities**: fields, territories and units refer to each other
//!   through ids, never through owning pointers

// Core modules
pub mod hex;
pub mod types;

// Board and economy
pub mod board;
pub mod territory;

// Units
pub mod ledger;
pub mod unit;

// Moves and combat
pub mod movement;

// Game state and turn cycle
pub mod actor;
pub mod game_state;
pub mod player;
pub mod scheduler;
pub mod settings;
pub mod victory;

// Board generation and persistence
pub mod mapgen;
pub mod snapshot;

// Consistency checks
pub mod invariants;

// Re-exports for convenience
pub use actor::{Actor, ActorKind, HumanActor, PassiveActor, TurnContext};
pub use board::{Board, BoardError, Field};
pub use game_state::{
    GameError, GameObserver, GamePhase, GameState, NullObserver, PendingPurchase,
};
pub use hex::HexCoord;
pub use invariants::{check_invariants, check_partition, InvariantViolation};
pub use ledger::{LedgerError, UnitLedger};
pub use mapgen::{BoardGenerator, SeededRng};
pub use movement::{
    defending_strength, execute_move, renew_all_main_buildings, renew_main_building,
    CaptureReport, MoveError, MoveOutcome,
};
pub use player::Player;
pub use scheduler::{NextTurn, TurnOutcome, TurnScheduler};
pub use settings::{BoardSize, EconomyRates, GameSettings, SettingsError};
pub use snapshot::{BoardSnapshot, FieldRecord, SnapshotError};
pub use territory::Territory;
pub use types::{FieldId, PlayerId, TerritoryId, UnitId};
pub use unit::{Unit, UnitStats, UnitType};
pub use victory::{VictoryChecker, VictoryType};
