use core::time::Duration;
use serde::{Deserialize, Serialize};
use web_time::Instant;

/// Valid transitions:
/// - BeforeGame -> DuringGame, when the clock starts
/// - DuringGame -> AfterGame, on a win or a loss
/// - any -> BeforeGame, on reset
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    BeforeGame,
    DuringGame,
    AfterGame,
}

impl GamePhase {
    /// Whether reveal, flag and chord intents are still processed
    pub const fn accepts_moves(self) -> bool {
        !matches!(self, Self::AfterGame)
    }

    pub const fn is_over(self) -> bool {
        matches!(self, Self::AfterGame)
    }
}

/// Phase of the game together with the elapsed-time clock that drives it.
#[derive(Clone, Debug, Default)]
pub struct GameClock {
    phase: GamePhase,
    started_at: Option<Instant>,
    finish_time: Duration,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Starts the clock, a no-op unless the game has not started yet.
    pub fn start(&mut self, now: Instant) {
        if matches!(self.phase, GamePhase::BeforeGame) {
            log::debug!("Game started");
            self.started_at = Some(now);
            self.phase = GamePhase::DuringGame;
        }
    }

    /// Freezes the elapsed time and ends the game, returning the finish time.
    pub fn finish(&mut self, now: Instant) -> Duration {
        if !self.phase.is_over() {
            self.finish_time = self.elapsed(now);
            self.phase = GamePhase::AfterGame;
            log::debug!("Game ended after {:?}", self.finish_time);
        }
        self.finish_time
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Zero before the game, live while playing, frozen afterwards.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match (self.phase, self.started_at) {
            (GamePhase::BeforeGame, _) | (_, None) => Duration::ZERO,
            (GamePhase::DuringGame, Some(started_at)) => now.saturating_duration_since(started_at),
            (GamePhase::AfterGame, Some(_)) => self.finish_time,
        }
    }
}
