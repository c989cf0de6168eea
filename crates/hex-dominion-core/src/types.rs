//! Core type aliases used throughout the crate.

/// Player index (0-7).
pub type PlayerId = u8;

/// Index of a field in the board's field arena.
pub type FieldId = usize;

/// Unique identifier for a territory. Never reused within one board.
pub type TerritoryId = u64;

/// Unique identifier for a unit. Never reused within one ledger.
pub type UnitId = u64;
