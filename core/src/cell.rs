use serde::{Deserialize, Serialize};

/// State of a single field cell, only ever mutated by [`crate::Minefield`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) is_mine: bool,
    pub(crate) is_open: bool,
    pub(crate) is_flag: bool,
}

impl Cell {
    pub const fn is_mine(self) -> bool {
        self.is_mine
    }

    pub const fn is_open(self) -> bool {
        self.is_open
    }

    pub const fn is_flag(self) -> bool {
        self.is_flag
    }

    /// A flag that still counts: flags left on open cells are stale.
    pub const fn is_closed_flag(self) -> bool {
        self.is_flag && !self.is_open
    }
}
