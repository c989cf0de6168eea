//! Flat board snapshots for persistence.
//!
//! A snapshot only records who owns which coordinate. Territories, money and
//! units are not stored; loading rediscovers the territories from scratch.

use crate::board::{Board, BoardError};
use crate::hex::HexCoord;
use crate::types::PlayerId;
use serde::{Deserialize, Serialize};

/// One field of a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub q: i32,
    pub r: i32,
    pub owner: PlayerId,
}

/// A saved board layout, serialized as a flat JSON array of records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardSnapshot(pub Vec<FieldRecord>);

impl BoardSnapshot {
    /// Records in board order.
    pub fn records(&self) -> &[FieldRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Board {
    /// Capture the owner of every field.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot(
            self.fields()
                .map(|f| FieldRecord {
                    q: f.coord.q,
                    r: f.coord.r,
                    owner: f.owner,
                })
                .collect(),
        )
    }

    /// Rebuild a board from a snapshot taken in a game of `player_count`
    /// players.
    pub fn from_snapshot(
        snapshot: &BoardSnapshot,
        player_count: u8,
    ) -> Result<Self, SnapshotError> {
        if let Some(bad) = snapshot.0.iter().find(|rec| rec.owner >= player_count) {
            return Err(SnapshotError::UnknownOwner {
                coord: HexCoord::new(bad.q, bad.r),
                owner: bad.owner,
            });
        }
        let cells = snapshot
            .0
            .iter()
            .map(|rec| (HexCoord::new(rec.q, rec.r), rec.owner));
        Ok(Board::from_owners(cells)?)
    }
}

/// Errors from loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Field {coord} is owned by unknown player {owner}")]
    UnknownOwner { coord: HexCoord, owner: PlayerId },
    #[error(transparent)]
    Board(#[from] BoardError),
}
