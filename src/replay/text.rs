//! Structured text output for tooling.
//!
//! This format is optimized for machine readability while remaining
//! human-parseable. It reports the full game state without ANSI escapes
//! or box drawing.

use crate::game::{
    CellKind, Dir, Player, Point, Protein, State, TURN_LIMIT, Verdict, secure_cell_count,
    total_non_wall_cells,
};

/// Render the game state to structured text.
///
/// Output format:
/// ```text
/// === TURN 12 OF 50 ===
///
/// BOARD (16x8):
/// Terrain: 6 walls, 10 protein sources (4 A, 2 B, 2 C, 2 D)
/// Notable positions:
/// - P1 roots at [(1, 1)]
/// - P2 roots at [(14, 6)]
///
/// PLAYER 1 STATUS:
/// - Organs: 5 (1 ROOT, 3 BASIC, 1 HARVESTER)
/// - Stock: A:9 B:10 C:9 D:9 (total 37)
/// ...
/// ```
#[must_use]
pub fn render_llm(state: &State, verdict: Option<&Verdict>) -> String {
    let mut output = String::new();

    render_header(&mut output, state);
    render_board_overview(&mut output, state);
    for player in Player::ALL {
        render_player_status(&mut output, state, player);
    }
    render_game_status(&mut output, state, verdict);

    output
}

/// Render the header.
fn render_header(output: &mut String, state: &State) {
    output.push_str(&format!("=== TURN {} OF {TURN_LIMIT} ===\n\n", state.turn()));
}

/// Render the board overview.
fn render_board_overview(output: &mut String, state: &State) {
    let width = state.width();
    let height = state.height();
    output.push_str(&format!("BOARD ({width}x{height}):\n"));

    // Count terrain
    let mut walls = 0u32;
    let mut sources = [0u32; 4];
    for cell in state.entities() {
        match cell.kind {
            CellKind::Wall => walls += 1,
            CellKind::Protein(protein) => sources[protein.index()] += 1,
            _ => {}
        }
    }
    let total_sources: u32 = sources.iter().sum();
    let breakdown: Vec<String> = Protein::ALL
        .iter()
        .filter(|protein| sources[protein.index()] > 0)
        .map(|protein| format!("{} {}", sources[protein.index()], protein.token()))
        .collect();
    output.push_str(&format!(
        "Terrain: {walls} walls, {total_sources} protein sources ({})\n",
        breakdown.join(", ")
    ));

    // Notable positions
    output.push_str("Notable positions:\n");
    for player in Player::ALL {
        let roots: Vec<String> = state
            .roots_of(player)
            .map(|root| root.pos.to_string())
            .collect();
        output.push_str(&format!(
            "- P{} roots at [{}]\n",
            player.index() + 1,
            roots.join(", ")
        ));
    }

    // Frontier cells both organisms could grow into next
    let frontier = find_frontier(state);
    if !frontier.is_empty() {
        output.push_str("Contested frontier: ");
        let coords: Vec<String> = frontier.iter().take(5).map(Point::to_string).collect();
        output.push_str(&coords.join(", "));
        if frontier.len() > 5 {
            output.push_str(&format!(" and {} more", frontier.len() - 5));
        }
        output.push('\n');
    }

    output.push('\n');
}

/// Empty or protein cells with organ neighbors of both players.
fn find_frontier(state: &State) -> Vec<Point> {
    let mut frontier = Vec::new();
    for cell in state.entities() {
        if !(cell.kind == CellKind::Empty || cell.kind.is_protein()) {
            continue;
        }
        let mut near = [false; 2];
        for dir in Dir::ALL {
            if let Some(neighbor) = state.get(cell.pos.step(dir))
                && neighbor.is_organ()
                && let Some(owner) = neighbor.owner
            {
                near[owner.index()] = true;
            }
        }
        if near[0] && near[1] {
            frontier.push(cell.pos);
        }
    }
    frontier
}

/// Render a single player's status block.
fn render_player_status(output: &mut String, state: &State, player: Player) {
    output.push_str(&format!("PLAYER {} STATUS:\n", player.index() + 1));

    // Organ census
    let mut counts: [(CellKind, &str, u32); 5] = [
        (CellKind::Root, "ROOT", 0),
        (CellKind::Basic, "BASIC", 0),
        (CellKind::Harvester, "HARVESTER", 0),
        (CellKind::Tentacle, "TENTACLE", 0),
        (CellKind::Sporer, "SPORER", 0),
    ];
    for cell in state.cells_of(player) {
        for entry in &mut counts {
            if entry.0 == cell.kind {
                entry.2 += 1;
            }
        }
    }
    let total: u32 = counts.iter().map(|entry| entry.2).sum();
    if total == 0 {
        output.push_str("- ELIMINATED\n\n");
        return;
    }
    let census: Vec<String> = counts
        .iter()
        .filter(|entry| entry.2 > 0)
        .map(|entry| format!("{} {}", entry.2, entry.1))
        .collect();
    output.push_str(&format!("- Organs: {total} ({})\n", census.join(", ")));

    // Stock
    let stock = state.proteins(player);
    output.push_str(&format!(
        "- Stock: A:{} B:{} C:{} D:{} (total {})\n",
        stock.of(Protein::A),
        stock.of(Protein::B),
        stock.of(Protein::C),
        stock.of(Protein::D),
        stock.total()
    ));

    // Income from the latest harvest pass
    let gains = state.gains(player);
    output.push_str(&format!("- Income: +{}/turn", gains.total()));
    if gains.total() > 0 {
        let breakdown: Vec<String> = gains
            .entries()
            .filter(|(_, amount)| *amount > 0)
            .map(|(protein, amount)| format!("{}:+{amount}", protein.token()))
            .collect();
        output.push_str(&format!(" ({})", breakdown.join(", ")));
    }
    output.push('\n');

    // Secure territory
    let secure = secure_cell_count(state, player);
    let reachable = total_non_wall_cells(state);
    output.push_str(&format!("- Secure territory: {secure} of {reachable} cells\n"));

    output.push('\n');
}

/// Render the overall game status.
fn render_game_status(output: &mut String, state: &State, verdict: Option<&Verdict>) {
    output.push_str("GAME STATUS:\n");
    output.push_str(&format!(
        "- Cells: P1 {} vs P2 {}\n",
        state.cell_count(Player::One),
        state.cell_count(Player::Two)
    ));

    match verdict {
        Some(verdict) => {
            output.push_str("- GAME OVER\n");
            match verdict.winner {
                Some(winner) => output.push_str(&format!(
                    "- Winner: Player {} ({})\n",
                    winner.index() + 1,
                    verdict.reason
                )),
                None => output.push_str(&format!("- Draw ({})\n", verdict.reason)),
            }
        }
        None => {
            let remaining = TURN_LIMIT.saturating_sub(state.turn());
            output.push_str(&format!("- Turns remaining: {remaining}\n"));
        }
    }
}
