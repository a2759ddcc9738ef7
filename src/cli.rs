//! Command implementations for the `petri` binary.
//!
//! Each submodule backs one subcommand. Shared plumbing lives here:
//! board and strategy resolution, seed derivation, and the error type
//! every command returns.

pub(crate) mod replay;
pub(crate) mod run;
pub(crate) mod series;
pub(crate) mod validate;
pub(crate) mod watch;

mod output;

use std::error::Error;
use std::fmt;
use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;

use petri::GameError;
use petri::maps;
use petri::replay::ReplayError;
use petri::runner::{STRATEGY_NAMES, Strategy, strategy_by_name};

/// Output format for match results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text with the final board.
    Text,
    /// Machine-readable JSON.
    Json,
    /// Plain-text digest for language models.
    Llm,
}

/// Output format for replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReplayFormat {
    /// Interactive terminal player.
    Tui,
    /// Board render of every turn.
    Text,
    /// Turn-by-turn digest for language models.
    Llm,
}

/// Output format for series results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SeriesFormat {
    /// Human-readable summary.
    Text,
    /// Machine-readable JSON.
    Json,
    /// Comma-separated per-seat rows.
    Csv,
}

/// Error type for CLI operations.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::new(format!("IO error: {e}"))
    }
}

impl From<GameError> for CliError {
    fn from(e: GameError) -> Self {
        Self::new(format!("Game error: {e}"))
    }
}

impl From<ReplayError> for CliError {
    fn from(e: ReplayError) -> Self {
        Self::new(format!("Replay error: {e}"))
    }
}

/// Resolve a board argument: bundled board names first, file paths second.
pub(crate) fn load_board_text(board: &str) -> Result<String, CliError> {
    if let Some(text) = maps::builtin_board(board) {
        return Ok(text.to_owned());
    }
    match std::fs::read_to_string(board) {
        Ok(text) => Ok(text),
        Err(e) => {
            let bundled = maps::board_names().collect::<Vec<_>>().join(", ");
            Err(CliError::new(format!(
                "cannot read board `{board}`: {e} (bundled boards: {bundled})"
            )))
        }
    }
}

/// Build the two seats from strategy names. The second seat gets a
/// different seed so mirror matchups do not mirror their tie-breaks.
pub(crate) fn build_seats(
    one: &str,
    two: &str,
    seed: u64,
) -> Result<[Box<dyn Strategy>; 2], CliError> {
    let first = strategy_by_name(one, seed).ok_or_else(|| unknown_strategy(one))?;
    let second =
        strategy_by_name(two, seed.wrapping_add(1)).ok_or_else(|| unknown_strategy(two))?;
    Ok([first, second])
}

fn unknown_strategy(name: &str) -> CliError {
    CliError::new(format!(
        "unknown strategy `{name}` (available: {})",
        STRATEGY_NAMES.join(", ")
    ))
}

/// The given seed, or one derived from the wall clock.
// Seeds only need the low bits of the nanosecond clock.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn pick_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_board_text_resolves_bundled_names() {
        for name in maps::board_names() {
            let text = load_board_text(name).unwrap();
            assert!(!text.is_empty());
        }
    }

    #[test]
    fn test_load_board_text_lists_bundled_on_failure() {
        let err = load_board_text("no-such-board-anywhere").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("no-such-board-anywhere"));
        assert!(message.contains("meadow"));
    }

    #[test]
    fn test_build_seats_rejects_unknown_names() {
        let err = build_seats("expander", "mystery", 1).unwrap_err();
        assert!(err.to_string().contains("mystery"));
        assert!(err.to_string().contains("idler"));
    }

    #[test]
    fn test_pick_seed_prefers_the_given_seed() {
        assert_eq!(pick_seed(Some(7)), 7);
    }
}
