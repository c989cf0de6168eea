//! Procedural board generation.
//!
//! The generator uses a seed to create reproducible boards: the same seed and
//! settings always produce the same owners on the same coordinates.

use crate::board::{Board, BoardError};
use crate::hex::HexCoord;
use crate::settings::GameSettings;
use crate::types::PlayerId;
use std::collections::BTreeMap;
use tracing::debug;

/// A deterministic random number generator using xorshift.
///
/// This simple PRNG ensures that the same seed always produces
/// the same sequence of random numbers across all platforms.
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a new RNG from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        // FNV-1a over the seed bytes
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for &byte in seed {
            state ^= u64::from(byte);
            state = state.wrapping_mul(0x0100_0000_01b3);
        }
        // xorshift gets stuck on zero
        if state == 0 {
            state = 0x853c_49e6_748f_ea9b;
        }
        Self { state }
    }

    /// Generate next random u64 (xorshift64*).
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Generate a random u32.
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Generate a random number in range [0, max).
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.next_u32() % max
    }
}

/// Generates boards from a seed.
pub struct BoardGenerator {
    rng: SeededRng,
    width: u32,
    height: u32,
    player_count: u8,
}

impl BoardGenerator {
    /// Create a generator for the board described by `settings`.
    pub fn new(seed: [u8; 32], settings: &GameSettings) -> Self {
        let (width, height) = settings.board_dimensions();
        Self {
            rng: SeededRng::from_seed(&seed),
            width,
            height,
            player_count: settings.player_count,
        }
    }

    /// Centers of the start clusters, spaced evenly along the middle row.
    pub fn start_positions(&self) -> Vec<HexCoord> {
        let n = u32::from(self.player_count);
        let row = (self.height / 2) as i32;
        (0..n)
            .map(|p| HexCoord::new(((2 * p + 1) * self.width / (2 * n)) as i32, row))
            .collect()
    }

    fn in_bounds(&self, coord: &HexCoord) -> bool {
        (0..self.width as i32).contains(&coord.q) && (0..self.height as i32).contains(&coord.r)
    }

    /// Generate a complete board.
    ///
    /// Every field gets a random owner, then each player receives a radius-1
    /// cluster around its start position so it begins with at least one
    /// controllable territory.
    pub fn generate(&mut self) -> Result<Board, BoardError> {
        let players = u32::from(self.player_count);
        let mut owners: BTreeMap<HexCoord, PlayerId> = BTreeMap::new();
        for r in 0..self.height as i32 {
            for q in 0..self.width as i32 {
                let owner = self.rng.next_range(players) as PlayerId;
                owners.insert(HexCoord::new(q, r), owner);
            }
        }

        for (player, center) in self.start_positions().into_iter().enumerate() {
            for coord in center.hexes_in_radius(1) {
                if self.in_bounds(&coord) {
                    owners.insert(coord, player as PlayerId);
                }
            }
        }

        let board = Board::from_owners(owners)?;
        debug!(
            width = self.width,
            height = self.height,
            territories = board.territory_count(),
            "board generated"
        );
        Ok(board)
    }
}
