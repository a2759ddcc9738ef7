//! Board validation command implementation.

use petri::maps::{DEFAULT_STARTING_PROTEINS, MapSummary, load_map};

use super::CliError;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the board cannot be read, does not parse, or is
/// missing a root for either player.
pub(crate) fn execute(board: &str) -> Result<(), CliError> {
    let text = super::load_board_text(board)?;

    println!("Validating: {board}");
    println!();

    // Parse into a first-turn state
    let state = match load_map(&text, DEFAULT_STARTING_PROTEINS) {
        Ok(state) => {
            print_check("board file parses", true);
            state
        }
        Err(e) => {
            print_check("board file parses", false);
            return Err(CliError::new(format!("Invalid board: {e}")));
        }
    };

    let summary = MapSummary::of(&state);

    // A playable board seats both players
    let rooted = summary.roots_one > 0 && summary.roots_two > 0;
    print_check("both players have a root", rooted);
    if !rooted {
        return Err(CliError::new("Board is missing a root for one player"));
    }

    // Symmetry keeps the matchup fair but is not required
    print_check("terrain is mirror-symmetric", summary.symmetric);

    println!();
    println!("Summary:");
    println!("  Size:     {}x{}", summary.width, summary.height);
    println!("  Roots:    {} vs {}", summary.roots_one, summary.roots_two);
    println!("  Walls:    {}", summary.walls);
    println!("  Proteins: {}", summary.proteins);

    println!();
    if summary.symmetric {
        println!("Validation successful!");
    } else {
        println!("Validation successful (asymmetric terrain: the matchup is uneven).");
    }

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
