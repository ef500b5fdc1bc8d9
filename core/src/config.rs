use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Largest width or height accepted for a custom field.
pub const MAX_SIDE: Coord = 100;

/// Dimensions and mine count of a field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    /// Checks what mine placement needs to terminate: a non-empty field with at least one safe cell.
    pub fn validate(&self) -> Result<()> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(GameError::InvalidSize);
        }
        if self.mines >= self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

/// Difficulty tier, which also decides whether a finished game has a score slot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Custom(GameConfig),
}

impl Difficulty {
    /// Tiers that keep a best time, in score-slot order.
    pub const PRESETS: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Builds a custom tier with sides in `[1, MAX_SIDE]` and at least one mine and one safe cell.
    pub fn custom(size: Coord2, mines: CellCount) -> Result<Self> {
        let difficulty = Self::Custom(GameConfig::new_unchecked(size, mines));
        difficulty.validate()?;
        Ok(difficulty)
    }

    /// Presets are always valid, a custom field must pass the same checks as [`Difficulty::custom`].
    pub fn validate(self) -> Result<()> {
        let Self::Custom(config) = self else {
            return Ok(());
        };
        let side_range = 1..=MAX_SIDE;
        if !side_range.contains(&config.size.0) || !side_range.contains(&config.size.1) {
            return Err(GameError::InvalidSize);
        }
        if config.mines == 0 {
            return Err(GameError::NoMines);
        }
        config.validate()
    }

    pub const fn config(self) -> GameConfig {
        use Difficulty::*;
        match self {
            Easy => GameConfig::new_unchecked((9, 9), 10),
            Medium => GameConfig::new_unchecked((16, 16), 40),
            Hard => GameConfig::new_unchecked((30, 16), 99),
            Custom(config) => config,
        }
    }

    /// Index into the best-time record, `None` for custom fields which never keep a score.
    pub const fn score_slot(self) -> Option<usize> {
        use Difficulty::*;
        match self {
            Easy => Some(0),
            Medium => Some(1),
            Hard => Some(2),
            Custom(_) => None,
        }
    }

    pub const fn name(self) -> &'static str {
        use Difficulty::*;
        match self {
            Easy => "Easy",
            Medium => "Medium",
            Hard => "Hard",
            Custom(_) => "Custom",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let GameConfig {
            size: (width, height),
            mines,
        } = self.config();
        write!(f, "{}: {} X {}, {} mines", self.name(), width, height, mines)
    }
}
