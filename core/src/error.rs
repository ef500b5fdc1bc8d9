use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Field dimensions must be between 1 and {max}", max = crate::MAX_SIDE)]
    InvalidSize,
    #[error("Too many mines, at least one cell must be safe")]
    TooManyMines,
    #[error("Custom fields need at least one mine")]
    NoMines,
}

pub type Result<T> = core::result::Result<T, GameError>;
