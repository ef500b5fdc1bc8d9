use std::fmt::Write;
use std::time::Duration;

use minefield_core::{CellView, GamePhase, ScoreBoard, ScoreStore, Session};

fn cell_char(view: CellView) -> char {
    use CellView::*;
    match view {
        Hidden => '#',
        Flagged => 'F',
        Revealed(0) => '.',
        Revealed(count) => char::from(b'0' + count),
        TriggeredMine => '@',
        Mine => '*',
        Misflagged => 'x',
    }
}

/// Elapsed time as `m:ss`.
pub fn format_time(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// The field with column digits on top and row numbers on the left.
pub fn board<S: ScoreStore>(session: &Session<S>) -> String {
    let (width, height) = session.minefield().size();
    let mut out = String::new();

    if width > 10 {
        out.push_str("    ");
        out.extend((0..width).map(|x| if x % 10 == 0 { char::from(b'0' + x / 10 % 10) } else { ' ' }));
        out.push('\n');
    }
    out.push_str("    ");
    out.extend((0..width).map(|x| char::from(b'0' + x % 10)));
    out.push('\n');

    for y in 0..height {
        let _ = write!(out, "{:>3} ", y);
        out.extend((0..width).filter_map(|x| session.cell_view((x, y)).map(cell_char)));
        out.push('\n');
    }
    out
}

/// Mines left, the game state and the clock, like the header of a classic window.
pub fn status<S: ScoreStore>(session: &Session<S>) -> String {
    let state = match session.phase() {
        GamePhase::BeforeGame | GamePhase::DuringGame => "Reset",
        GamePhase::AfterGame if session.minefield().is_winner() && !session.minefield().is_loser() => {
            "Win!"
        }
        GamePhase::AfterGame => "Lose!",
    };
    format!(
        "Mines: {}  [{}]  Time: {}",
        session.mines_remaining(),
        state,
        format_time(session.elapsed())
    )
}

pub fn scores<S: ScoreStore>(scores: &ScoreBoard<S>) -> String {
    let mut out = String::from("Difficulty  Seconds\n");
    for (difficulty, best) in scores.entries() {
        let best = if best.is_finite() {
            format!("{:.2}", best)
        } else {
            "-".to_string()
        };
        let _ = writeln!(out, "{:<10}  {}", difficulty.name(), best);
    }
    out
}
