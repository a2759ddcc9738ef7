//! Run command implementation.

use std::path::PathBuf;

use petri::game::Verdict;
use petri::replay::{Recording, SeatSpec, render_ascii, render_llm};
use petri::runner::{MatchConfig, run_match};

use super::output::{JsonMatch, format_match_text};
use super::{CliError, OutputFormat};

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the board or the strategy names do not resolve,
/// or if writing the recording fails.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    one: &str,
    two: &str,
    board: &str,
    seed: Option<u64>,
    format: OutputFormat,
    save: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let map_text = super::load_board_text(board)?;
    let seed = super::pick_seed(seed);
    let strategies = super::build_seats(one, two, seed)?;
    let config = MatchConfig::default();

    if !quiet && format == OutputFormat::Text {
        println!("Running match on `{board}` with seed {seed}...");
        println!("Players: {one} vs {two}");
        println!();
    }

    let result = run_match(&map_text, strategies, &config)?;

    // Save recording if requested
    if let Some(save_path) = save {
        let seats = [
            SeatSpec::new(one, seed),
            SeatSpec::new(two, seed.wrapping_add(1)),
        ];
        let recording = Recording::from_match(map_text, seats, &config, &result);
        recording
            .save(&save_path)
            .map_err(|e| CliError::new(format!("Failed to save recording: {e}")))?;
        if !quiet && format == OutputFormat::Text {
            println!("Recording saved to: {}", save_path.display());
            println!();
        }
    }

    // The runner splits the verdict into winner and reason; the renderers
    // want it whole again.
    let verdict = result.reason.map(|reason| Verdict {
        winner: result.winner,
        reason,
    });
    let names = [one.to_owned(), two.to_owned()];

    match format {
        OutputFormat::Text => {
            if !quiet {
                print!("{}", render_ascii(&result.state, verdict.as_ref()));
                println!();
            }
            print!("{}", format_match_text(&result, &names, seed));
        }
        OutputFormat::Json => {
            let json_result = JsonMatch::from_result(board, seed, &names, &result);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Llm => {
            print!("{}", render_llm(&result.state, verdict.as_ref()));
            println!();
            println!("=== FINAL RESULT ===");
            println!();
            print!("{}", format_match_text(&result, &names, seed));
        }
    }

    Ok(())
}
