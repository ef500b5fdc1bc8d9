use std::str::FromStr;

use anyhow::{Context, anyhow, bail};
use minefield_core::{CellCount, Coord, Coord2, Difficulty};

pub const HELP: &str = "\
Commands (coordinates are zero-based, x then y):
  r X Y          reveal a cell
  f X Y          toggle a flag
  c X Y          reveal all neighbors when the flags around match the count
  n [DIFFICULTY] new game, optionally easy, medium, hard or WIDTHxHEIGHT:MINES
  s              show best times
  h              this help
  q              quit";

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    Reveal(Coord2),
    Flag(Coord2),
    Chord(Coord2),
    NewGame(Option<Difficulty>),
    Scores,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("Empty command, try `h` for help");
        };
        let rest: Vec<&str> = words.collect();

        let command = match verb.to_ascii_lowercase().as_str() {
            "r" | "reveal" => Self::Reveal(parse_coords(&rest)?),
            "f" | "flag" => Self::Flag(parse_coords(&rest)?),
            "c" | "chord" => Self::Chord(parse_coords(&rest)?),
            "n" | "new" => match rest.as_slice() {
                [] => Self::NewGame(None),
                [difficulty] => Self::NewGame(Some(parse_difficulty(difficulty)?)),
                _ => bail!("Usage: n [DIFFICULTY]"),
            },
            "s" | "scores" => Self::Scores,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            other => bail!("Unknown command `{}`, try `h` for help", other),
        };
        Ok(command)
    }
}

fn parse_coords(args: &[&str]) -> anyhow::Result<Coord2> {
    let [x, y] = args else {
        bail!("Expected two coordinates, X and Y");
    };
    let x: Coord = x.parse().with_context(|| format!("Bad X coordinate `{}`", x))?;
    let y: Coord = y.parse().with_context(|| format!("Bad Y coordinate `{}`", y))?;
    Ok((x, y))
}

/// Parses a preset name or a custom field written as `WIDTHxHEIGHT:MINES`.
pub fn parse_difficulty(value: &str) -> anyhow::Result<Difficulty> {
    match value.to_ascii_lowercase().as_str() {
        "easy" => return Ok(Difficulty::Easy),
        "medium" => return Ok(Difficulty::Medium),
        "hard" => return Ok(Difficulty::Hard),
        _ => {}
    }

    let (size, mines) = value
        .split_once(':')
        .ok_or_else(|| anyhow!("Expected easy, medium, hard or WIDTHxHEIGHT:MINES, got `{}`", value))?;
    let (width, height) = size
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("Expected the field size as WIDTHxHEIGHT, got `{}`", size))?;
    let width: Coord = width.trim().parse().context("Bad width")?;
    let height: Coord = height.trim().parse().context("Bad height")?;
    let mines: CellCount = mines.trim().parse().context("Bad mine count")?;

    Ok(Difficulty::custom((width, height), mines)?)
}
