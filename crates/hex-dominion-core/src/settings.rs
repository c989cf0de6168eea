//! Game settings and configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Display name for the game.
    pub name: String,
    /// Board size preset.
    pub board_size: BoardSize,
    /// Number of players (2-8).
    pub player_count: u8,
    /// Per-field income rates.
    #[serde(default)]
    pub economy: EconomyRates,
    /// Share of all fields (in percent) a player must exceed to win.
    #[serde(default = "default_win_percentage")]
    pub win_percentage: u32,
    /// Minimum wall-clock duration of an automated turn, in milliseconds.
    #[serde(default = "default_turn_delay_ms")]
    pub min_turn_duration_ms: u64,
}

fn default_win_percentage() -> u32 {
    60
}

fn default_turn_delay_ms() -> u64 {
    500
}

impl GameSettings {
    /// Create default settings for a new game.
    pub fn new(name: String) -> Self {
        Self {
            name,
            board_size: BoardSize::Standard,
            player_count: 4,
            economy: EconomyRates::default(),
            win_percentage: default_win_percentage(),
            min_turn_duration_ms: default_turn_delay_ms(),
        }
    }

    /// Create settings for a quick 2-player duel.
    pub fn duel(name: String) -> Self {
        Self {
            name,
            board_size: BoardSize::Duel,
            player_count: 2,
            economy: EconomyRates::default(),
            win_percentage: default_win_percentage(),
            min_turn_duration_ms: 250,
        }
    }

    /// Parse settings from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to pretty JSON.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate settings and return any errors.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.name.is_empty() {
            return Err(SettingsError::EmptyName);
        }
        if self.name.len() > 64 {
            return Err(SettingsError::NameTooLong);
        }
        if self.player_count < 2 {
            return Err(SettingsError::TooFewPlayers);
        }
        if self.player_count > 8 {
            return Err(SettingsError::TooManyPlayers);
        }
        // Start clusters are spaced along the middle row and must not overlap.
        let (width, height) = self.board_size.dimensions();
        if width < 3 * u32::from(self.player_count) || height < 3 {
            return Err(SettingsError::BoardTooSmallForPlayers);
        }
        if !(51..=100).contains(&self.win_percentage) {
            return Err(SettingsError::InvalidWinPercentage(self.win_percentage));
        }
        Ok(())
    }

    /// Get the board dimensions based on settings.
    pub fn board_dimensions(&self) -> (u32, u32) {
        self.board_size.dimensions()
    }

    /// Number of fields a player must exceed to win on a board of `total` fields.
    pub fn fields_to_win(&self, total: usize) -> usize {
        total * self.win_percentage as usize / 100
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new("New Game".to_string())
    }
}

/// Board size presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BoardSize {
    Duel,
    Small,
    #[default]
    Standard,
    Large,
    /// Explicit width and height.
    Custom { width: u32, height: u32 },
}

impl BoardSize {
    /// Get the dimensions (width, height) for this board size.
    pub const fn dimensions(&self) -> (u32, u32) {
        match self {
            BoardSize::Duel => (10, 8),
            BoardSize::Small => (16, 12),
            BoardSize::Standard => (24, 16),
            BoardSize::Large => (32, 22),
            BoardSize::Custom { width, height } => (*width, *height),
        }
    }
}

impl std::fmt::Display for BoardSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (w, h) = self.dimensions();
        match self {
            BoardSize::Duel => write!(f, "Duel ({}x{})", w, h),
            BoardSize::Small => write!(f, "Small ({}x{})", w, h),
            BoardSize::Standard => write!(f, "Standard ({}x{})", w, h),
            BoardSize::Large => write!(f, "Large ({}x{})", w, h),
            BoardSize::Custom { .. } => write!(f, "Custom ({}x{})", w, h),
        }
    }
}

/// Per-field income rates of a territory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyRates {
    /// Money earned per field on every regular turn.
    pub income_per_field: i32,
    /// Money granted per field on a player's first turn.
    pub start_income_per_field: i32,
}

impl Default for EconomyRates {
    fn default() -> Self {
        Self {
            income_per_field: 1,
            start_income_per_field: 5,
        }
    }
}

/// Errors from invalid game settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Game name cannot be empty")]
    EmptyName,
    #[error("Game name must be 64 characters or less")]
    NameTooLong,
    #[error("Need at least 2 players")]
    TooFewPlayers,
    #[error("Maximum 8 players allowed")]
    TooManyPlayers,
    #[error("Board is too small for this many players")]
    BoardTooSmallForPlayers,
    #[error("Win percentage must be between 51 and 100, got {0}")]
    InvalidWinPercentage(u32),
    #[error("Malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}
