use std::collections::VecDeque;
use std::fmt;
use std::ops::{BitOr, Index};

use ndarray::Array2;
use rand::prelude::*;

use crate::*;

/// How many times an untouched field is regenerated when the first disclosure lands on a mine.
pub const FIRST_DISCLOSURE_REROLLS: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Merges outcomes when several cells are opened by one action, hitting a mine wins.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) | (_, HitMine) => HitMine,
            (Revealed, _) | (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// The grid of cells together with its mine placement.
///
/// Mines are placed once per [`Minefield::reset`] and stay fixed afterwards, with one exception: while the field is
/// untouched (nothing disclosed or flagged since the reset) a first disclosure on a mine regenerates the whole field,
/// up to [`FIRST_DISCLOSURE_REROLLS`] times.
#[derive(Clone, Debug)]
pub struct Minefield {
    cells: Array2<Cell>,
    mine_count: CellCount,
    untouched: bool,
    rng: SmallRng,
}

impl Minefield {
    /// Builds a randomly seeded field.
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_seed(config, rand::random())
    }

    /// Builds a field whose placements, re-rolls included, are reproducible from `seed`.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        let mut minefield = Self {
            cells: Array2::default([0, 0]),
            mine_count: 0,
            untouched: true,
            rng: SmallRng::seed_from_u64(seed),
        };
        minefield.reset(config)?;
        Ok(minefield)
    }

    /// Builds a field with mines at exactly the given coordinates, duplicates collapse into one mine.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        GameConfig::new_unchecked(size, 0).validate()?;

        let mut cells: Array2<Cell> = Array2::default(size.to_nd_index());
        for &coords in mine_coords {
            if !cells.contains2(coords) {
                return Err(GameError::InvalidCoords);
            }
            cells[coords.to_nd_index()].is_mine = true;
        }

        let mine_count = cells.iter().filter(|cell| cell.is_mine).count();
        let mine_count = CellCount::try_from(mine_count).map_err(|_| GameError::TooManyMines)?;
        GameConfig::new(size, mine_count)?;

        Ok(Self {
            cells,
            mine_count,
            untouched: true,
            rng: SmallRng::seed_from_u64(0),
        })
    }

    /// Reallocates the grid for `config` and scatters its mines, validating before anything changes.
    pub fn reset(&mut self, config: GameConfig) -> Result<()> {
        config.validate()?;
        self.cells = Array2::default(config.size.to_nd_index());
        self.mine_count = config.mines;
        self.untouched = true;
        self.scatter_mines();
        log::debug!(
            "Reset minefield to {:?} with {} mines",
            config.size,
            config.mines
        );
        Ok(())
    }

    /// Clears the grid and places `mine_count` mines by rejection sampling.
    fn scatter_mines(&mut self) {
        self.cells.fill(Cell::default());
        let (width, height) = self.size();

        // terminates because validation keeps at least one safe cell
        let mut placed = 0;
        while placed < self.mine_count {
            let coords = (
                self.rng.random_range(0..width),
                self.rng.random_range(0..height),
            );
            let cell = &mut self.cells[coords.to_nd_index()];
            if !cell.is_mine {
                cell.is_mine = true;
                placed += 1;
            }
        }
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn size(&self) -> Coord2 {
        self.cells.size2()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn is_untouched(&self) -> bool {
        self.untouched
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.cells.contains2(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<Cell> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    pub fn neighbors(&self, coords: Coord2) -> Neighbors {
        self.cells.neighbors(coords)
    }

    pub fn mines_around(&self, coords: Coord2) -> u8 {
        self.count_around(coords, |cell| cell.is_mine)
    }

    /// Flags around a cell, ignoring stale flags on open cells.
    pub fn flags_around(&self, coords: Coord2) -> u8 {
        self.count_around(coords, Cell::is_closed_flag)
    }

    fn count_around(&self, coords: Coord2, pred: impl Fn(Cell) -> bool) -> u8 {
        // at most 8 neighbors
        self.neighbors(coords).filter(|&pos| pred(self[pos])).count() as u8
    }

    /// Mines minus closed flags, negative when the player over-flags.
    pub fn mines_remaining(&self) -> isize {
        let flags = self.cells.iter().filter(|cell| cell.is_closed_flag()).count();
        self.mine_count as isize - flags as isize
    }

    pub fn open_count(&self) -> CellCount {
        let open = self.cells.iter().filter(|cell| cell.is_open).count();
        CellCount::try_from(open).unwrap_or(CellCount::MAX)
    }

    /// Every safe cell is open.
    pub fn is_winner(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_mine || cell.is_open)
    }

    /// Some mine is open.
    pub fn is_loser(&self) -> bool {
        self.cells.iter().any(|cell| cell.is_mine && cell.is_open)
    }

    /// Opens a cell, flooding through zero-count regions.
    ///
    /// Flagged cells are never opened, neither directly nor by the flood.
    pub fn disclose(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;

        if self.untouched {
            self.untouched = false;
            let mut rerolls = 0;
            while self[coords].is_mine && rerolls < FIRST_DISCLOSURE_REROLLS {
                self.scatter_mines();
                rerolls += 1;
            }
            if rerolls > 0 {
                log::debug!("Re-rolled minefield {} times for first disclosure", rerolls);
            }
            if self[coords].is_mine {
                log::warn!(
                    "First disclosure at {:?} still on a mine after {} re-rolls",
                    coords,
                    rerolls
                );
            }
        }

        Ok(self.open_from(coords))
    }

    fn open_from(&mut self, start: Coord2) -> RevealOutcome {
        let mut outcome = RevealOutcome::NoChange;
        let mut to_visit = VecDeque::from([start]);

        while let Some(coords) = to_visit.pop_front() {
            let cell = &mut self.cells[coords.to_nd_index()];
            if cell.is_flag {
                continue;
            }
            if cell.is_open {
                // an open start cell still floods its closed neighbors, queued duplicates do not
                if coords != start {
                    continue;
                }
            } else {
                cell.is_open = true;
                outcome = outcome
                    | if cell.is_mine {
                        RevealOutcome::HitMine
                    } else {
                        RevealOutcome::Revealed
                    };
                log::trace!("Opened cell at {:?}", coords);
            }

            if self.mines_around(coords) == 0 {
                to_visit.extend(self.neighbors(coords).filter(|&pos| {
                    let cell = self[pos];
                    !cell.is_open && !cell.is_flag
                }));
            }
        }

        if outcome.has_update() {
            log::debug!("Disclosed from {:?}: {:?}", start, outcome);
        }
        outcome
    }

    /// Flips the flag on a cell, open or not.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<bool> {
        let coords = self.validate_coords(coords)?;
        self.untouched = false;
        let cell = &mut self.cells[coords.to_nd_index()];
        cell.is_flag = !cell.is_flag;
        Ok(cell.is_flag)
    }

    /// Forces a flag onto every cell, done when the field is won.
    pub fn mark_all_flagged(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.is_flag = true;
        }
    }
}

impl Index<Coord2> for Minefield {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

/// Debug dump of the layout: `X` for mines, the adjacency count elsewhere.
impl fmt::Display for Minefield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.size();
        for y in 0..height {
            for x in 0..width {
                if self[(x, y)].is_mine {
                    write!(f, "X")?;
                } else {
                    write!(f, "{}", self.mines_around((x, y)))?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
