//! Replay command implementation.

use std::path::PathBuf;

use petri::replay::{Recording, ReplayEngine, ReplayError};

use super::{CliError, ReplayFormat};

/// Auto-play delay the TUI starts with.
const DEFAULT_SPEED_MS: u64 = 500;

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if the recording cannot be loaded or the replay fails.
pub(crate) fn execute(
    recording_path: PathBuf,
    format: ReplayFormat,
    turn: Option<u32>,
) -> Result<(), CliError> {
    // Load recording
    let recording = Recording::load(&recording_path).map_err(|e| {
        CliError::new(format!(
            "Failed to load recording {}: {e}",
            recording_path.display()
        ))
    })?;

    let names = [
        recording.seats[0].strategy.clone(),
        recording.seats[1].strategy.clone(),
    ];

    // Create replay engine
    let engine = if let Some(target_turn) = turn {
        ReplayEngine::new_at_turn(recording, target_turn)?
    } else {
        ReplayEngine::new(recording)?
    };

    match format {
        ReplayFormat::Tui => {
            // Same viewer the watch command uses
            super::watch::run_tui(engine, names, DEFAULT_SPEED_MS)
        }
        ReplayFormat::Text => {
            // Output the board rendering for each turn
            print_text_replay(engine, &names)
        }
        ReplayFormat::Llm => {
            // Output the LLM digest for each turn
            print_llm_replay(engine, &names)
        }
    }
}

fn print_text_replay(mut engine: ReplayEngine, names: &[String; 2]) -> Result<(), CliError> {
    println!(
        "Replay: {} vs {} ({} turns recorded)",
        names[0],
        names[1],
        engine.recording().turns
    );
    println!();

    loop {
        println!("{}", engine.render_ascii());
        println!();

        if engine.is_over() {
            println!("=== MATCH OVER ===");
            break;
        }

        if let Err(e) = engine.step_forward() {
            if matches!(e, ReplayError::MatchOver) {
                println!("=== MATCH OVER ===");
                break;
            }
            return Err(e.into());
        }
    }

    Ok(())
}

fn print_llm_replay(mut engine: ReplayEngine, names: &[String; 2]) -> Result<(), CliError> {
    println!("# Match Replay");
    println!("Seats: {} vs {}", names[0], names[1]);
    println!("Turns recorded: {}", engine.recording().turns);
    println!();

    loop {
        println!("{}", engine.render_llm());
        println!();
        println!("---");
        println!();

        if engine.is_over() {
            println!("# MATCH OVER");
            break;
        }

        if let Err(e) = engine.step_forward() {
            if matches!(e, ReplayError::MatchOver) {
                println!("# MATCH OVER");
                break;
            }
            return Err(e.into());
        }
    }

    Ok(())
}
