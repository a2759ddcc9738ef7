//! ASCII renderer for terminal viewing with ANSI colors.

use crate::game::{CellKind, Dir, Player, Point, Protein, State, TURN_LIMIT, Verdict};

/// ANSI color codes for the two players.
const PLAYER_COLORS: [&str; 2] = [
    "\x1b[31m", // Player one: Red
    "\x1b[34m", // Player two: Blue
];

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const WHITE: &str = "\x1b[37m";
const GRAY: &str = "\x1b[90m";
const GREEN: &str = "\x1b[32m";

/// Player display names.
const PLAYER_NAMES: [&str; 2] = ["Red", "Blue"];

/// Render the board to ASCII with ANSI colors.
///
/// Output format:
/// ```text
/// Turn 12/50                              [P1: 9] [P2: 6]
/// ┌─────────────────────────────────┐
/// │ R B H>a .  .  #  .  .  .  T^.  │
/// │ .  .  .  .  .  #  .  .  b  .  │
/// └─────────────────────────────────┘
///
/// Legend: R=Root B=Basic H=Harvester T=Tentacle S=Sporer ...
///
/// Player 1 (Red):   Cells: 9   Stock: A:9 B:10 C:8 D:9   Income: +2/turn
/// Player 2 (Blue):  Cells: 6   Stock: A:7 B:10 C:10 D:8  Income: +1/turn
/// ```
#[must_use]
pub fn render_ascii(state: &State, verdict: Option<&Verdict>) -> String {
    let mut output = String::new();

    render_header(&mut output, state);
    render_board(&mut output, state);
    output.push_str(
        "\nLegend: R=Root  B=Basic  H=Harvester  T=Tentacle  S=Sporer  \
         a-d=Protein  #=Wall  ^>v<=Facing\n\n",
    );
    render_player_stats(&mut output, state);
    render_verdict(&mut output, verdict);

    output
}

/// Render the header line with the turn number and cell counts.
fn render_header(output: &mut String, state: &State) {
    let turn = state.turn();
    output.push_str(&format!("Turn {turn}/{TURN_LIMIT}"));

    // Pad to align the counts on the right
    let padding = 40usize.saturating_sub(format!("Turn {turn}/{TURN_LIMIT}").len());
    for _ in 0..padding {
        output.push(' ');
    }

    for player in Player::ALL {
        let color = player_color(player);
        let label = player.index() + 1;
        let cells = state.cell_count(player);
        output.push_str(&format!("{color}[P{label}: {cells}]{RESET} "));
    }
    output.push('\n');
}

/// Render the board grid.
fn render_board(output: &mut String, state: &State) {
    let width = state.width();
    let height = state.height();

    // Top border
    output.push('┌');
    for _ in 0..(width * 2 + 1) {
        output.push('─');
    }
    output.push_str("┐\n");

    // Board rows
    for y in 0..height {
        output.push_str("│ ");
        for x in 0..width {
            render_cell(output, state, Point::new(x, y));
        }
        output.push_str("│\n");
    }

    // Bottom border
    output.push('└');
    for _ in 0..(width * 2 + 1) {
        output.push('─');
    }
    output.push_str("┘\n");
}

/// Render one cell as two characters: a glyph and a facing arrow (or a
/// space for everything undirected).
fn render_cell(output: &mut String, state: &State, point: Point) {
    let Some(cell) = state.get(point) else {
        output.push_str("? ");
        return;
    };

    match cell.kind {
        CellKind::Empty => output.push_str(&format!("{GRAY}{DIM}.{RESET} ")),
        CellKind::Wall => output.push_str(&format!("{WHITE}{BOLD}#{RESET} ")),
        CellKind::Protein(protein) => {
            output.push_str(&format!("{GREEN}{}{RESET} ", protein_glyph(protein)));
        }
        kind => {
            let color = cell.owner.map_or(WHITE, player_color);
            let glyph = organ_glyph(kind);
            let trailer = cell.facing.map_or(' ', facing_arrow);
            let weight = if kind == CellKind::Root { BOLD } else { "" };
            output.push_str(&format!("{color}{weight}{glyph}{RESET}{color}{trailer}{RESET}"));
        }
    }
}

/// Single-character glyph for an organ cell.
fn organ_glyph(kind: CellKind) -> char {
    match kind {
        CellKind::Root => 'R',
        CellKind::Basic => 'B',
        CellKind::Harvester => 'H',
        CellKind::Tentacle => 'T',
        CellKind::Sporer => 'S',
        _ => '?',
    }
}

/// Lowercase glyph for a protein source.
const fn protein_glyph(protein: Protein) -> char {
    match protein {
        Protein::A => 'a',
        Protein::B => 'b',
        Protein::C => 'c',
        Protein::D => 'd',
    }
}

/// Arrow character for an organ's facing.
const fn facing_arrow(dir: Dir) -> char {
    match dir {
        Dir::North => '^',
        Dir::East => '>',
        Dir::South => 'v',
        Dir::West => '<',
    }
}

/// ANSI color for a player.
fn player_color(player: Player) -> &'static str {
    PLAYER_COLORS[player.index()]
}

/// Render the per-player stat lines.
fn render_player_stats(output: &mut String, state: &State) {
    for player in Player::ALL {
        let color = player_color(player);
        let label = player.index() + 1;
        let name = PLAYER_NAMES[player.index()];
        let cells = state.cell_count(player);
        let stock = state.proteins(player);
        let income = state.gains(player).total();

        output.push_str(&format!(
            "{color}Player {label} ({name:>4}):{RESET}  Cells: {cells:<3}  Stock: A:{} B:{} C:{} D:{}  Income: +{income}/turn\n",
            stock.of(Protein::A),
            stock.of(Protein::B),
            stock.of(Protein::C),
            stock.of(Protein::D),
        ));
    }
}

/// Render the outcome line once a rule has fired.
fn render_verdict(output: &mut String, verdict: Option<&Verdict>) {
    let Some(verdict) = verdict else { return };
    match verdict.winner {
        Some(winner) => {
            let color = player_color(winner);
            let label = winner.index() + 1;
            output.push_str(&format!(
                "\n{color}{BOLD}Winner: Player {label}{RESET} ({})\n",
                verdict.reason
            ));
        }
        None => output.push_str(&format!("\n{BOLD}Draw{RESET} ({})\n", verdict.reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{EndReason, Entity, OrganKind, ProteinCounts};

    fn create_test_state() -> State {
        let mut state = State::new(8, 4).unwrap();
        state.set_proteins(Player::One, ProteinCounts::splat(10));
        state.set_proteins(Player::Two, ProteinCounts::splat(10));
        state.place(Entity::organ(
            Point::new(1, 1),
            OrganKind::Root,
            Player::One,
            1,
            None,
            0,
            0,
        ));
        state.place(Entity::organ(
            Point::new(6, 2),
            OrganKind::Root,
            Player::Two,
            2,
            None,
            0,
            0,
        ));
        state.place(Entity::organ(
            Point::new(2, 1),
            OrganKind::Harvester,
            Player::One,
            3,
            Some(Dir::East),
            1,
            1,
        ));
        state.place(Entity::protein(Point::new(3, 1), Protein::A));
        state.place(Entity::wall(Point::new(4, 0)));
        state
    }

    #[test]
    fn test_render_ascii_basic() {
        let state = create_test_state();
        let output = render_ascii(&state, None);

        assert!(output.contains("Turn 1/50"));
        assert!(output.contains("┌"));
        assert!(output.contains("┘"));
        assert!(output.contains("Legend"));
        assert!(output.contains("Player 1"));
        assert!(output.contains("Player 2"));
        assert!(output.contains("H>"));
        assert!(output.contains('#'));
        assert!(output.contains('a'));
        assert!(!output.contains("Winner"));
    }

    #[test]
    fn test_render_ascii_verdict_lines() {
        let state = create_test_state();

        let won = Verdict {
            winner: Some(Player::Two),
            reason: EndReason::Elimination,
        };
        let output = render_ascii(&state, Some(&won));
        assert!(output.contains("Winner: Player 2"));
        assert!(output.contains("Killed the opponent"));

        let drawn = Verdict {
            winner: None,
            reason: EndReason::TurnLimit,
        };
        let output = render_ascii(&state, Some(&drawn));
        assert!(output.contains("Draw"));
        assert!(output.contains("More cells after 50 turns"));
    }

    #[test]
    fn test_organ_glyphs() {
        assert_eq!(organ_glyph(CellKind::Root), 'R');
        assert_eq!(organ_glyph(CellKind::Basic), 'B');
        assert_eq!(organ_glyph(CellKind::Harvester), 'H');
        assert_eq!(organ_glyph(CellKind::Tentacle), 'T');
        assert_eq!(organ_glyph(CellKind::Sporer), 'S');
    }

    #[test]
    fn test_facing_arrows() {
        assert_eq!(facing_arrow(Dir::North), '^');
        assert_eq!(facing_arrow(Dir::East), '>');
        assert_eq!(facing_arrow(Dir::South), 'v');
        assert_eq!(facing_arrow(Dir::West), '<');
    }

    #[test]
    fn test_protein_glyphs() {
        assert_eq!(protein_glyph(Protein::A), 'a');
        assert_eq!(protein_glyph(Protein::D), 'd');
    }
}
