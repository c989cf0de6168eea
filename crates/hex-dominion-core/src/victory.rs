//! Victory and elimination conditions.

use crate::board::Board;
use crate::player::Player;
use crate::types::PlayerId;
use serde::{Deserialize, Serialize};

/// How a game was won.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VictoryType {
    /// Owns more than the winning share of the board.
    Domination,
    /// Every other player has been eliminated.
    LastStanding,
}

/// Configuration and methods for checking victory conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryChecker {
    /// Share of all fields (in percent) a player must exceed.
    pub win_percentage: u32,
}

impl Default for VictoryChecker {
    fn default() -> Self {
        Self { win_percentage: 60 }
    }
}

impl VictoryChecker {
    /// Create a checker with the given winning share.
    pub fn new(win_percentage: u32) -> Self {
        Self { win_percentage }
    }

    /// Check for domination: an active player owns more than the winning
    /// share of all fields.
    pub fn check_domination(&self, board: &Board, players: &[Player]) -> Option<PlayerId> {
        let total = board.len() as u64;
        players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id)
            .find(|&id| board.field_count(id) as u64 * 100 > total * u64::from(self.win_percentage))
    }

    /// Check whether exactly one active player is left.
    pub fn check_last_standing(players: &[Player]) -> Option<PlayerId> {
        let mut active = players.iter().filter(|p| p.is_active());
        match (active.next(), active.next()) {
            (Some(last), None) => Some(last.id),
            _ => None,
        }
    }

    /// Active players without a single controllable territory.
    pub fn find_eliminated(board: &Board, players: &[Player]) -> Vec<PlayerId> {
        players
            .iter()
            .filter(|p| p.is_active() && board.controllable_count(p.id) == 0)
            .map(|p| p.id)
            .collect()
    }

    /// Check all victory conditions. Domination takes precedence.
    pub fn check_all(&self, board: &Board, players: &[Player]) -> Option<(PlayerId, VictoryType)> {
        if let Some(winner) = self.check_domination(board, players) {
            return Some((winner, VictoryType::Domination));
        }
        Self::check_last_standing(players).map(|winner| (winner, VictoryType::LastStanding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(n: u8) -> Vec<Player> {
        (0..n).map(|i| Player::new(i, format!("P{}", i))).collect()
    }

    #[test]
    fn test_domination_needs_strictly_more() {
        let checker = VictoryChecker::default();
        // 6 of 10 fields is exactly 60%
        let board = Board::from_rows(&["0000001111"]).unwrap();
        assert_eq!(checker.check_domination(&board, &players(2)), None);

        let board = Board::from_rows(&["0000000111"]).unwrap();
        assert_eq!(checker.check_domination(&board, &players(2)), Some(0));
    }

    #[test]
    fn test_domination_ignores_eliminated() {
        let checker = VictoryChecker::new(51);
        let board = Board::from_rows(&["0001"]).unwrap();
        let mut ps = players(2);
        ps[0].eliminated = true;
        assert_eq!(checker.check_domination(&board, &ps), None);
    }

    #[test]
    fn test_last_standing() {
        let mut ps = players(3);
        assert_eq!(VictoryChecker::check_last_standing(&ps), None);
        ps[0].eliminated = true;
        ps[2].eliminated = true;
        assert_eq!(VictoryChecker::check_last_standing(&ps), Some(1));
        ps[1].eliminated = true;
        assert_eq!(VictoryChecker::check_last_standing(&ps), None);
    }

    #[test]
    fn test_find_eliminated() {
        // Player 1 owns two separate single fields
        let board = Board::from_rows(&["01000", "00010"]).unwrap();
        assert_eq!(VictoryChecker::find_eliminated(&board, &players(3)), vec![1, 2]);
    }

    #[test]
    fn test_check_all_prefers_domination() {
        let checker = VictoryChecker::default();
        let board = Board::from_rows(&["0000000011"]).unwrap();
        let mut ps = players(2);
        ps[1].eliminated = true;
        assert_eq!(
            checker.check_all(&board, &ps),
            Some((0, VictoryType::Domination))
        );

        let board = Board::from_rows(&["0011"]).unwrap();
        assert_eq!(
            checker.check_all(&board, &ps),
            Some((0, VictoryType::LastStanding))
        );
    }
}
