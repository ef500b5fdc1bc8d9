use core::time::Duration;
use web_time::Instant;

use crate::*;

/// What a player intent did to the game.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    /// Out of bounds, after the game ended, or a chord whose flags do not match.
    Ignored,
    /// The game goes on.
    Continued,
    Won { seconds: f64, new_best: bool },
    Lost { seconds: f64 },
}

impl ActionOutcome {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won { .. } | Self::Lost { .. })
    }
}

/// How a cell should be drawn, given the phase of the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    /// Opened mine that lost the game.
    TriggeredMine,
    /// Unflagged mine shown after a loss.
    Mine,
    /// Flag on a safe cell, shown once the game is over.
    Misflagged,
}

/// A running game: the minefield, its phase clock and the best-time record.
#[derive(Debug)]
pub struct Session<S> {
    difficulty: Difficulty,
    minefield: Minefield,
    clock: GameClock,
    scores: ScoreBoard<S>,
}

impl<S: ScoreStore> Session<S> {
    pub fn new(difficulty: Difficulty, scores: ScoreBoard<S>) -> Result<Self> {
        difficulty.validate()?;
        Ok(Self::from_minefield(
            difficulty,
            Minefield::new(difficulty.config())?,
            scores,
        ))
    }

    pub fn with_seed(difficulty: Difficulty, scores: ScoreBoard<S>, seed: u64) -> Result<Self> {
        difficulty.validate()?;
        Ok(Self::from_minefield(
            difficulty,
            Minefield::with_seed(difficulty.config(), seed)?,
            scores,
        ))
    }

    /// Wraps an already built field, scores are kept under `difficulty`.
    pub fn from_minefield(difficulty: Difficulty, minefield: Minefield, scores: ScoreBoard<S>) -> Self {
        Self {
            difficulty,
            minefield,
            clock: GameClock::new(),
            scores,
        }
    }

    /// Resets the field for `difficulty` and returns to [`GamePhase::BeforeGame`].
    pub fn new_game(&mut self, difficulty: Difficulty) -> Result<()> {
        difficulty.validate()?;
        self.minefield.reset(difficulty.config())?;
        self.difficulty = difficulty;
        self.clock.reset();
        log::info!("New game: {}", difficulty);
        Ok(())
    }

    pub fn restart(&mut self) -> Result<()> {
        self.new_game(self.difficulty)
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn minefield(&self) -> &Minefield {
        &self.minefield
    }

    pub fn scores(&self) -> &ScoreBoard<S> {
        &self.scores
    }

    pub fn phase(&self) -> GamePhase {
        self.clock.phase()
    }

    pub fn mines_remaining(&self) -> isize {
        self.minefield.mines_remaining()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        self.clock.elapsed(now)
    }

    pub fn reveal(&mut self, coords: Coord2) -> ActionOutcome {
        self.reveal_at(coords, Instant::now())
    }

    pub fn reveal_at(&mut self, coords: Coord2, now: Instant) -> ActionOutcome {
        if !self.accepts_moves("reveal", coords) {
            return ActionOutcome::Ignored;
        }
        if let Err(err) = self.minefield.disclose(coords) {
            log::debug!("Ignoring reveal at {:?}: {}", coords, err);
            return ActionOutcome::Ignored;
        }
        self.clock.start(now);
        self.finish_check(now)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> ActionOutcome {
        self.toggle_flag_at(coords, Instant::now())
    }

    pub fn toggle_flag_at(&mut self, coords: Coord2, now: Instant) -> ActionOutcome {
        if !self.accepts_moves("flag", coords) {
            return ActionOutcome::Ignored;
        }
        match self.minefield.toggle_flag(coords) {
            Ok(flagged) => log::debug!("Flag at {:?}: {}", coords, flagged),
            Err(err) => {
                log::debug!("Ignoring flag at {:?}: {}", coords, err);
                return ActionOutcome::Ignored;
            }
        }
        self.clock.start(now);
        self.finish_check(now)
    }

    pub fn chord(&mut self, coords: Coord2) -> ActionOutcome {
        self.chord_at(coords, Instant::now())
    }

    /// Discloses every neighbor at once when the flags around match the mines around.
    pub fn chord_at(&mut self, coords: Coord2, now: Instant) -> ActionOutcome {
        if !self.accepts_moves("chord", coords) {
            return ActionOutcome::Ignored;
        }
        let Ok(coords) = self.minefield.validate_coords(coords) else {
            log::debug!("Ignoring chord outside the field at {:?}", coords);
            return ActionOutcome::Ignored;
        };
        if self.minefield.flags_around(coords) != self.minefield.mines_around(coords) {
            return ActionOutcome::Ignored;
        }

        let outcome = self
            .minefield
            .neighbors(coords)
            .filter_map(|neighbor| self.minefield.disclose(neighbor).ok())
            .fold(RevealOutcome::NoChange, |acc, outcome| acc | outcome);
        log::debug!("Chord at {:?}: {:?}", coords, outcome);

        self.clock.start(now);
        self.finish_check(now)
    }

    fn accepts_moves(&self, intent: &str, coords: Coord2) -> bool {
        let accepts = self.clock.phase().accepts_moves();
        if !accepts {
            log::debug!("Ignoring {} at {:?}, game is over", intent, coords);
        }
        accepts
    }

    /// Evaluates the field after every move, a loss takes precedence over a win.
    fn finish_check(&mut self, now: Instant) -> ActionOutcome {
        if self.minefield.is_loser() {
            let seconds = self.clock.finish(now).as_secs_f64();
            log::info!("Lost after {:.2} seconds", seconds);
            return ActionOutcome::Lost { seconds };
        }

        if self.minefield.is_winner() {
            let seconds = self.clock.finish(now).as_secs_f64();
            self.minefield.mark_all_flagged();
            let new_best = self.scores.is_new_best(seconds, self.difficulty);
            if new_best {
                self.scores.record_best(seconds, self.difficulty);
            }
            log::info!("Won after {:.2} seconds", seconds);
            return ActionOutcome::Won { seconds, new_best };
        }

        ActionOutcome::Continued
    }

    /// What the render layer should show at `coords`, `None` outside the field.
    pub fn cell_view(&self, coords: Coord2) -> Option<CellView> {
        let cell = self.minefield.get(coords)?;
        let over = self.phase().is_over();
        let lost = over && self.minefield.is_loser();

        Some(match (cell.is_open(), cell.is_flag(), cell.is_mine()) {
            (true, _, true) => CellView::TriggeredMine,
            (true, _, false) => CellView::Revealed(self.minefield.mines_around(coords)),
            (false, true, false) if over => CellView::Misflagged,
            (false, false, true) if lost => CellView::Mine,
            (false, true, _) => CellView::Flagged,
            (false, false, _) => CellView::Hidden,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(size: Coord2, mines: &[Coord2]) -> Session<MemoryStore> {
        session_with(Difficulty::Easy, size, mines, MemoryStore::new())
    }

    fn session_with(
        difficulty: Difficulty,
        size: Coord2,
        mines: &[Coord2],
        store: MemoryStore,
    ) -> Session<MemoryStore> {
        let minefield = Minefield::from_mine_coords(size, mines).unwrap();
        Session::from_minefield(difficulty, minefield, ScoreBoard::load(store))
    }

    fn secs(t0: Instant, secs: u64) -> Instant {
        t0 + Duration::from_secs(secs)
    }

    #[test]
    fn first_reveal_starts_the_game() {
        let mines = [(8, 0), (8, 2), (8, 4), (8, 6), (8, 8), (0, 8), (2, 8), (4, 8), (6, 8), (8, 7)];
        let mut session = session((9, 9), &mines);
        let t0 = Instant::now();
        assert_eq!(session.phase(), GamePhase::BeforeGame);
        assert_eq!(session.elapsed_at(secs(t0, 3)), Duration::ZERO);

        let outcome = session.reveal_at((0, 0), t0);

        assert_eq!(outcome, ActionOutcome::Continued);
        assert_eq!(session.phase(), GamePhase::DuringGame);
        assert!(session.minefield()[(3, 3)].is_open());
        assert_eq!(session.elapsed_at(secs(t0, 3)), Duration::from_secs(3));
    }

    #[test]
    fn flag_starts_the_clock_too() {
        let mut session = session((3, 3), &[(0, 0)]);
        let t0 = Instant::now();

        assert_eq!(session.toggle_flag_at((0, 0), t0), ActionOutcome::Continued);

        assert_eq!(session.phase(), GamePhase::DuringGame);
        assert_eq!(session.mines_remaining(), 0);
        assert_eq!(session.cell_view((0, 0)), Some(CellView::Flagged));
    }

    #[test]
    fn win_freezes_time_flags_everything_and_records_best() {
        let store = MemoryStore::new();
        let mut session = session_with(Difficulty::Easy, (3, 1), &[(1, 0)], store.clone());
        let t0 = Instant::now();

        let outcome = session.reveal_at((0, 0), t0);
        assert_eq!(outcome, ActionOutcome::Continued);
        let outcome = session.reveal_at((2, 0), secs(t0, 4));

        assert_eq!(
            outcome,
            ActionOutcome::Won {
                seconds: 4.0,
                new_best: true
            }
        );
        assert_eq!(session.phase(), GamePhase::AfterGame);
        assert_eq!(session.elapsed_at(secs(t0, 100)), Duration::from_secs(4));
        assert_eq!(session.mines_remaining(), 0);
        assert_eq!(session.cell_view((1, 0)), Some(CellView::Flagged));
        assert_eq!(session.cell_view((2, 0)), Some(CellView::Revealed(1)));
        assert_eq!(session.scores().best_time(Difficulty::Easy), 4.0);
        assert_eq!(ScoreBoard::load(store).best_time(Difficulty::Easy), 4.0);
    }

    #[test]
    fn slower_win_is_not_a_new_best() {
        let store = MemoryStore::new();
        ScoreBoard::load(store.clone()).record_best(2.0, Difficulty::Easy);
        let mut session = session_with(Difficulty::Easy, (2, 1), &[(1, 0)], store.clone());
        let t0 = Instant::now();
        session.toggle_flag_at((1, 0), t0);

        let outcome = session.reveal_at((0, 0), secs(t0, 5));

        assert_eq!(
            outcome,
            ActionOutcome::Won {
                seconds: 5.0,
                new_best: false
            }
        );
        assert_eq!(ScoreBoard::load(store).best_time(Difficulty::Easy), 2.0);
    }

    #[test]
    fn custom_win_records_nothing() {
        let store = MemoryStore::new();
        let custom = Difficulty::custom((2, 1), 1).unwrap();
        let mut session = session_with(custom, (2, 1), &[(1, 0)], store.clone());
        session.toggle_flag((1, 0));

        let outcome = session.reveal((0, 0));

        assert!(matches!(outcome, ActionOutcome::Won { new_best: false, .. }));
        assert_eq!(store.blob(), None);
    }

    #[test]
    fn opening_a_mine_loses_without_score() {
        let store = MemoryStore::new();
        let mut session = session_with(Difficulty::Easy, (3, 3), &[(0, 0), (2, 2)], store.clone());
        let t0 = Instant::now();
        session.toggle_flag_at((1, 1), t0);
        session.reveal_at((2, 0), t0);
        session.toggle_flag_at((1, 1), t0);

        let outcome = session.reveal_at((0, 0), secs(t0, 2));

        assert_eq!(outcome, ActionOutcome::Lost { seconds: 2.0 });
        assert_eq!(session.phase(), GamePhase::AfterGame);
        assert_eq!(session.cell_view((0, 0)), Some(CellView::TriggeredMine));
        assert_eq!(session.cell_view((2, 2)), Some(CellView::Mine));
        assert_eq!(store.blob(), None);
    }

    #[test]
    fn wrong_flags_show_after_loss() {
        let mut session = session((3, 1), &[(0, 0)]);
        session.toggle_flag((2, 0));

        session.reveal((0, 0));

        assert_eq!(session.phase(), GamePhase::AfterGame);
        assert_eq!(session.cell_view((2, 0)), Some(CellView::Misflagged));
    }

    #[test]
    fn moves_after_the_end_are_ignored() {
        let mut session = session((2, 1), &[(1, 0)]);
        session.toggle_flag((1, 0));
        session.reveal((0, 0));
        assert_eq!(session.phase(), GamePhase::AfterGame);

        assert_eq!(session.reveal((1, 0)), ActionOutcome::Ignored);
        assert_eq!(session.toggle_flag((0, 0)), ActionOutcome::Ignored);
        assert_eq!(session.chord((0, 0)), ActionOutcome::Ignored);
        assert!(!session.minefield()[(1, 0)].is_open());
    }

    #[test]
    fn out_of_bounds_intents_are_ignored() {
        let mut session = session((2, 2), &[(0, 0)]);

        assert_eq!(session.reveal((2, 0)), ActionOutcome::Ignored);
        assert_eq!(session.toggle_flag((0, 9)), ActionOutcome::Ignored);
        assert_eq!(session.chord((7, 7)), ActionOutcome::Ignored);
        assert_eq!(session.phase(), GamePhase::BeforeGame);
        assert_eq!(session.cell_view((2, 2)), None);
    }

    #[test]
    fn chord_needs_matching_flags() {
        let mut session = session((3, 3), &[(0, 1), (2, 1)]);
        session.reveal((1, 1));
        session.toggle_flag((0, 1));
        let before = session.minefield().open_count();

        assert_eq!(session.chord((1, 1)), ActionOutcome::Ignored);
        assert_eq!(session.minefield().open_count(), before);

        session.toggle_flag((2, 1));
        let outcome = session.chord((1, 1));

        assert!(matches!(outcome, ActionOutcome::Won { .. }));
        assert_eq!(session.cell_view((1, 0)), Some(CellView::Revealed(2)));
        assert_eq!(session.cell_view((1, 2)), Some(CellView::Revealed(2)));
    }

    #[test]
    fn chord_with_wrong_flag_loses() {
        let mut session = session((3, 3), &[(0, 0)]);
        session.reveal((1, 1));
        session.toggle_flag((2, 2));

        let outcome = session.chord((1, 1));

        assert!(matches!(outcome, ActionOutcome::Lost { .. }));
        assert_eq!(session.cell_view((2, 2)), Some(CellView::Misflagged));
    }

    #[test]
    fn new_game_resets_phase_and_field() {
        let mut session = session((2, 1), &[(1, 0)]);
        session.toggle_flag((1, 0));
        session.reveal((0, 0));

        session.new_game(Difficulty::Hard).unwrap();

        assert_eq!(session.phase(), GamePhase::BeforeGame);
        assert_eq!(session.difficulty(), Difficulty::Hard);
        assert_eq!(session.minefield().game_config(), Difficulty::Hard.config());
        assert_eq!(session.mines_remaining(), 99);
        assert_eq!(session.elapsed(), Duration::ZERO);
    }

    #[test]
    fn invalid_new_game_keeps_current_game() {
        let mut session = session((2, 1), &[(1, 0)]);
        let full = Difficulty::Custom(GameConfig::new_unchecked((2, 2), 4));
        let oversized = Difficulty::Custom(GameConfig::new_unchecked((200, 200), 10));
        let no_mines = Difficulty::Custom(GameConfig::new_unchecked((5, 5), 0));

        assert_eq!(session.new_game(full), Err(GameError::TooManyMines));
        assert_eq!(session.new_game(oversized), Err(GameError::InvalidSize));
        assert_eq!(session.new_game(no_mines), Err(GameError::NoMines));
        assert!(Session::new(oversized, ScoreBoard::load(MemoryStore::new())).is_err());
        assert_eq!(session.difficulty(), Difficulty::Easy);
        assert_eq!(session.minefield().game_config(), GameConfig::new_unchecked((2, 1), 1));
    }

    #[test]
    fn exhausted_rerolls_lose_on_first_reveal() {
        let dense = Difficulty::custom((10, 10), 99).unwrap();
        let mut losses = 0;

        for seed in 0..50 {
            let store = MemoryStore::new();
            let mut session = Session::with_seed(dense, ScoreBoard::load(store.clone()), seed).unwrap();
            let on_mine = (0..10)
                .flat_map(|y| (0..10).map(move |x| (x, y)))
                .find(|&coords| session.minefield()[coords].is_mine())
                .unwrap();

            let outcome = session.reveal(on_mine);

            if let ActionOutcome::Lost { .. } = outcome {
                losses += 1;
                assert!(outcome.is_finished());
                assert_eq!(session.phase(), GamePhase::AfterGame);
                assert_eq!(session.cell_view(on_mine), Some(CellView::TriggeredMine));
            }
            assert_eq!(session.minefield().mine_count(), 99);
            assert_eq!(store.blob(), None);
        }

        assert!(losses > 0);
    }

    #[test]
    fn seeded_sessions_play_out_alike() {
        let mut a = Session::with_seed(Difficulty::Medium, ScoreBoard::load(MemoryStore::new()), 9).unwrap();
        let mut b = Session::with_seed(Difficulty::Medium, ScoreBoard::load(MemoryStore::new()), 9).unwrap();

        assert_eq!(a.reveal((8, 8)), b.reveal((8, 8)));
        assert_eq!(a.minefield().to_string(), b.minefield().to_string());
        assert_eq!(a.minefield().open_count(), b.minefield().open_count());
    }
}
