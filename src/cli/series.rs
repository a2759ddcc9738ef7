//! Series command implementation.

// Timing and rate reporting rounds through f64.
#![allow(clippy::cast_precision_loss)]

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use petri::runner::{MatchConfig, run_match};

use super::output::{JsonSeries, SeriesStats, format_series_csv, format_series_text};
use super::{CliError, SeriesFormat};

/// Execute the series command.
///
/// # Errors
///
/// Returns an error if the board or the strategy names do not resolve.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    one: &str,
    two: &str,
    board: &str,
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    format: SeriesFormat,
    progress: bool,
) -> Result<(), CliError> {
    let map_text = super::load_board_text(board)?;
    let base_seed = super::pick_seed(seed);

    // Surface bad strategy names before any worker starts
    super::build_seats(one, two, base_seed)?;

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    // The per-action log is dead weight across thousands of matches
    let config = MatchConfig {
        record_actions: false,
        ..MatchConfig::default()
    };

    if format == SeriesFormat::Text {
        println!("Running {games} games on `{board}`: {one} vs {two} (base seed {base_seed})");
    }

    // Progress bar
    let pb = if progress {
        let pb = ProgressBar::new(games);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
                .expect("valid template")
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Run matches in parallel using lock-free fold/reduce pattern.
    // Each thread accumulates into its own SeriesStats, then we merge at
    // the end. Strategies are stateful, so every match builds its own pair.
    let stats = (0..games)
        .into_par_iter()
        .fold(SeriesStats::default, |mut local_stats, i| {
            let game_seed = base_seed.wrapping_add(i);

            if let Ok(strategies) = super::build_seats(one, two, game_seed)
                && let Ok(result) = run_match(&map_text, strategies, &config)
            {
                local_stats.add(&result);
            }

            local_stats
        })
        .reduce(SeriesStats::default, |mut a, b| {
            a.merge(&b);
            a
        });

    // Update progress bar after completion (no atomic overhead in hot path)
    if let Some(pb) = pb {
        pb.set_position(stats.games);
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();

    // Calculate games per second
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.games as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    let names = [one.to_owned(), two.to_owned()];

    // Output based on format
    match format {
        SeriesFormat::Text => {
            println!();
            print!("{}", format_series_text(&stats, &names, board));
            println!();
            println!(
                "Duration: {:.2}s ({:.0} games/sec)",
                duration.as_secs_f64(),
                games_per_sec
            );
        }
        SeriesFormat::Json => {
            let json_result = JsonSeries::from_stats(&stats, &names, board);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        SeriesFormat::Csv => {
            print!("{}", format_series_csv(&stats, &names));
        }
    }

    Ok(())
}
