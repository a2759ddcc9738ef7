//! Board files and the bundled demo boards.
//!
//! A board file uses the same line format the engine speaks each turn: a
//! `W H` size line followed by one entity descriptor per non-empty cell.
//! Boards carry only terrain (ROOT organs, walls, protein sources);
//! inventories and turn bookkeeping come from the caller.

use serde::Serialize;

use crate::error::{GameError, GameResult};
use crate::game::{CellKind, Player, ProteinCounts, State};
use crate::protocol::{EntityLine, LineReader};

/// Inventory both players start with unless configured otherwise.
pub const DEFAULT_STARTING_PROTEINS: ProteinCounts = ProteinCounts::splat(10);

/// Parse a board file into a playable first-turn state.
///
/// The first line is the board size; every following non-blank line is one
/// entity descriptor. Both inventories start at `starting_proteins`, the
/// required-action count is player one's ROOT count, and `next_organ_id`
/// sits past every ingested organ id.
///
/// No harvest pass runs here. Gains stay zero until the first turn
/// resolves, so a freshly loaded board and a recording replayed from turn
/// one agree cell for cell.
///
/// # Errors
///
/// [`GameError::MalformedInput`] if the size line or an entity line is
/// malformed, or an entity lies outside the board.
pub fn load_map(text: &str, starting_proteins: ProteinCounts) -> GameResult<State> {
    let mut lines = LineReader::new(text);
    let mut state = State::default();
    state.set_map_size(lines.next_line()?)?;

    while let Some(raw) = lines.try_next_line() {
        if raw.trim().is_empty() {
            continue;
        }
        let parsed = EntityLine::parse(raw, lines.line_no())?;
        if state.get(parsed.pos).is_none() {
            return Err(GameError::malformed(
                lines.line_no(),
                format!(
                    "entity at {} is outside the {}x{} board",
                    parsed.pos,
                    state.width(),
                    state.height()
                ),
            ));
        }
        state.place(parsed.into_entity());
    }

    for player in Player::ALL {
        state.set_proteins(player, starting_proteins);
    }
    let roots = state.roots_of(Player::One).count();
    state.set_required_actions(u32::try_from(roots).unwrap_or(u32::MAX));
    Ok(state)
}

/// An open 16x8 board: sparse walls, generous protein spread.
const MEADOW: &str = "\
16 8
1 1 ROOT 0 1 X 0 0
14 6 ROOT 1 2 X 0 0
7 3 WALL -1 0 X 0 0
8 4 WALL -1 0 X 0 0
4 2 WALL -1 0 X 0 0
11 5 WALL -1 0 X 0 0
4 5 WALL -1 0 X 0 0
11 2 WALL -1 0 X 0 0
3 1 A -1 0 X 0 0
12 6 A -1 0 X 0 0
2 4 A -1 0 X 0 0
13 3 A -1 0 X 0 0
6 6 B -1 0 X 0 0
9 1 B -1 0 X 0 0
7 0 C -1 0 X 0 0
8 7 C -1 0 X 0 0
5 4 D -1 0 X 0 0
10 3 D -1 0 X 0 0
";

/// A 12x6 board with a walled center block forcing flank routes.
const CROSSROADS: &str = "\
12 6
1 2 ROOT 0 1 X 0 0
10 3 ROOT 1 2 X 0 0
5 2 WALL -1 0 X 0 0
6 3 WALL -1 0 X 0 0
5 3 WALL -1 0 X 0 0
6 2 WALL -1 0 X 0 0
3 0 WALL -1 0 X 0 0
8 5 WALL -1 0 X 0 0
0 4 WALL -1 0 X 0 0
11 1 WALL -1 0 X 0 0
2 1 A -1 0 X 0 0
9 4 A -1 0 X 0 0
4 4 B -1 0 X 0 0
7 1 B -1 0 X 0 0
1 5 C -1 0 X 0 0
10 0 C -1 0 X 0 0
3 3 D -1 0 X 0 0
8 2 D -1 0 X 0 0
";

/// A tight 10x5 board with little protein; starvation decides it.
const SCARCITY: &str = "\
10 5
0 2 ROOT 0 1 X 0 0
9 2 ROOT 1 2 X 0 0
4 0 WALL -1 0 X 0 0
5 4 WALL -1 0 X 0 0
4 4 WALL -1 0 X 0 0
5 0 WALL -1 0 X 0 0
4 2 A -1 0 X 0 0
5 2 A -1 0 X 0 0
2 0 B -1 0 X 0 0
7 4 B -1 0 X 0 0
";

const BUILTIN_BOARDS: [(&str, &str); 3] = [
    ("meadow", MEADOW),
    ("crossroads", CROSSROADS),
    ("scarcity", SCARCITY),
];

/// The board text for a bundled board name, if there is one.
#[must_use]
pub fn builtin_board(name: &str) -> Option<&'static str> {
    BUILTIN_BOARDS
        .iter()
        .find(|&&(board, _)| board == name)
        .map(|&(_, text)| text)
}

/// Names of the bundled boards, in listing order.
pub fn board_names() -> impl Iterator<Item = &'static str> {
    BUILTIN_BOARDS.iter().map(|&(name, _)| name)
}

/// Headline facts about a loaded board, for listings and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MapSummary {
    /// Board width in cells.
    pub width: i32,
    /// Board height in cells.
    pub height: i32,
    /// ROOT count for player one.
    pub roots_one: u32,
    /// ROOT count for player two.
    pub roots_two: u32,
    /// Wall cells.
    pub walls: u32,
    /// Protein source cells.
    pub proteins: u32,
    /// Whether the terrain maps onto itself under a half turn.
    pub symmetric: bool,
}

impl MapSummary {
    /// Summarize a loaded board.
    #[must_use]
    pub fn of(state: &State) -> Self {
        let mut walls = 0;
        let mut proteins = 0;
        for cell in state.entities() {
            match cell.kind {
                CellKind::Wall => walls += 1,
                CellKind::Protein(_) => proteins += 1,
                _ => {}
            }
        }
        let roots = |player| u32::try_from(state.roots_of(player).count()).unwrap_or(u32::MAX);
        Self {
            width: state.width(),
            height: state.height(),
            roots_one: roots(Player::One),
            roots_two: roots(Player::Two),
            walls,
            proteins,
            symmetric: state.is_symmetric(),
        }
    }
}
