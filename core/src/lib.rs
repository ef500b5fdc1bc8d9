//! Game model for a single-player minefield: placement, disclosure, flags, the
//! phase clock and the per-tier best-time record.

pub use cell::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use minefield::*;
pub use score::*;
pub use session::*;
pub use types::*;

mod cell;
mod clock;
mod config;
mod error;
mod minefield;
mod score;
mod session;
mod types;
