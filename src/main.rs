//! Petri CLI - Command-line interface for running and viewing matches.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// Petri - a deterministic organism battle engine
#[derive(Parser, Debug)]
#[command(name = "petri")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single match between two strategies
    Run {
        /// Strategy seated as player one
        #[arg(default_value = "expander")]
        one: String,

        /// Strategy seated as player two
        #[arg(default_value = "forager")]
        two: String,

        /// Bundled board name or a board file path
        #[arg(short, long, default_value = "meadow")]
        board: String,

        /// Tie-break seed (default: derived from the clock)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format: text, json, or llm
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save a replayable recording to this file
        #[arg(long)]
        save: Option<std::path::PathBuf>,

        /// Suppress everything but the result summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Interactive TUI to watch a match
    Watch {
        /// Strategy seated as player one
        #[arg(default_value = "expander")]
        one: String,

        /// Strategy seated as player two
        #[arg(default_value = "forager")]
        two: String,

        /// Bundled board name or a board file path
        #[arg(short, long, default_value = "meadow")]
        board: String,

        /// Tie-break seed (default: derived from the clock)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Turn delay in milliseconds (default: 500)
        #[arg(long, default_value = "500")]
        speed: u64,
    },

    /// Replay a recorded match
    Replay {
        /// Recording file (.json)
        #[arg(required = true)]
        recording: std::path::PathBuf,

        /// Output format: tui, text, or llm
        #[arg(short, long, default_value = "tui")]
        format: cli::ReplayFormat,

        /// Start at a specific turn
        #[arg(short, long)]
        turn: Option<u32>,
    },

    /// Run mass parallel matches and aggregate statistics
    Series {
        /// Strategy seated as player one
        #[arg(default_value = "expander")]
        one: String,

        /// Strategy seated as player two
        #[arg(default_value = "forager")]
        two: String,

        /// Bundled board name or a board file path
        #[arg(short, long, default_value = "meadow")]
        board: String,

        /// Number of matches to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        games: u64,

        /// Starting seed (increments for each match)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::SeriesFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Validate a board file and report its properties
    Validate {
        /// Bundled board name or a board file path
        #[arg(required = true)]
        board: String,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            one,
            two,
            board,
            seed,
            format,
            save,
            quiet,
        } => cli::run::execute(&one, &two, &board, seed, format, save, quiet),

        Commands::Watch {
            one,
            two,
            board,
            seed,
            speed,
        } => cli::watch::execute(&one, &two, &board, seed, speed),

        Commands::Replay {
            recording,
            format,
            turn,
        } => cli::replay::execute(recording, format, turn),

        Commands::Series {
            one,
            two,
            board,
            games,
            seed,
            threads,
            format,
            progress,
        } => cli::series::execute(&one, &two, &board, games, seed, threads, format, progress),

        Commands::Validate { board } => cli::validate::execute(&board),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
