use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use minefield_core::{
    ActionOutcome, Difficulty, FileStore, MemoryStore, ScoreBoard, ScoreStore, Session, StoreError,
};

use command::Command;

mod command;
mod render;

#[derive(Parser, Debug)]
#[command(version, about = "Clear a minefield from the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// easy, medium, hard, or a custom field as WIDTHxHEIGHT:MINES
    #[arg(short, long, default_value = "medium", value_parser = command::parse_difficulty)]
    difficulty: Difficulty,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// File keeping the best times, defaults to ~/.minescores
    #[arg(long)]
    scores: Option<PathBuf>,
}

fn init_logging(verbose: &Verbosity<WarnLevel>) {
    use tracing_subscriber::filter::LevelFilter;

    let level = match verbose.log_level() {
        None => LevelFilter::OFF,
        Some(log::Level::Error) => LevelFilter::ERROR,
        Some(log::Level::Warn) => LevelFilter::WARN,
        Some(log::Level::Info) => LevelFilter::INFO,
        Some(log::Level::Debug) => LevelFilter::DEBUG,
        Some(log::Level::Trace) => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

/// Picks where best times live, a missing home directory only costs persistence.
fn open_store(
    path: Option<PathBuf>,
    in_home: impl FnOnce() -> Result<FileStore, StoreError>,
) -> Box<dyn ScoreStore> {
    match path.map(FileStore::new).map_or_else(in_home, Ok) {
        Ok(store) => {
            log::debug!("Scores kept in {}", store.path().display());
            Box::new(store)
        }
        Err(err) => {
            log::warn!("Best times will not be saved: {}", err);
            Box::new(MemoryStore::new())
        }
    }
}

fn describe(outcome: ActionOutcome, difficulty: Difficulty) -> Option<String> {
    let message = describe_move(outcome, difficulty)?;
    if outcome.is_finished() {
        Some(format!("{}\nType `n` for a new game.", message))
    } else {
        Some(message)
    }
}

fn describe_move(outcome: ActionOutcome, difficulty: Difficulty) -> Option<String> {
    match outcome {
        ActionOutcome::Ignored => Some("Nothing to do there.".to_string()),
        ActionOutcome::Continued => None,
        ActionOutcome::Won {
            seconds,
            new_best: true,
        } => Some(format!(
            "New top score for {} difficulty: {:.2} seconds!",
            difficulty.name(),
            seconds
        )),
        ActionOutcome::Won { seconds, .. } => Some(format!("Cleared in {:.2} seconds.", seconds)),
        ActionOutcome::Lost { seconds } => Some(format!("Boom! Lost after {:.2} seconds.", seconds)),
    }
}

/// Reads one intent per line until `q` or end of input, printing the field after each.
fn play<S: ScoreStore>(
    session: &mut Session<S>,
    input: impl BufRead,
    mut out: impl Write,
) -> anyhow::Result<()> {
    writeln!(out, "{}\n{}", session.difficulty(), render::board(session))?;
    writeln!(out, "{}", render::status(session))?;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let line = line.context("Could not read input")?;
        if line.trim().is_empty() {
            write!(out, "> ")?;
            out.flush()?;
            continue;
        }

        let outcome = match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => {
                writeln!(out, "{}", command::HELP)?;
                None
            }
            Ok(Command::Scores) => {
                write!(out, "{}", render::scores(session.scores()))?;
                None
            }
            Ok(Command::NewGame(difficulty)) => {
                let difficulty = difficulty.unwrap_or(session.difficulty());
                match session.new_game(difficulty) {
                    Ok(()) => Some(difficulty.to_string()),
                    Err(err) => Some(err.to_string()),
                }
            }
            Ok(Command::Reveal(coords)) => describe(session.reveal(coords), session.difficulty()),
            Ok(Command::Flag(coords)) => describe(session.toggle_flag(coords), session.difficulty()),
            Ok(Command::Chord(coords)) => describe(session.chord(coords), session.difficulty()),
            Err(err) => {
                writeln!(out, "{:#}", err)?;
                write!(out, "> ")?;
                out.flush()?;
                continue;
            }
        };

        write!(out, "{}", render::board(session))?;
        writeln!(out, "{}", render::status(session))?;
        if let Some(message) = outcome {
            writeln!(out, "{}", message)?;
        }
        write!(out, "> ")?;
        out.flush()?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.verbose);
    log::debug!("seed: {:?}", args.seed);

    let scores = ScoreBoard::load(open_store(args.scores, FileStore::in_home));

    let mut session = match args.seed {
        Some(seed) => Session::with_seed(args.difficulty, scores, seed)?,
        None => Session::new(args.difficulty, scores)?,
    };

    play(&mut session, io::stdin().lock(), io::stdout().lock())
}
