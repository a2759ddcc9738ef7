//! End-of-game evaluation.
//!
//! Evaluated once per completed turn; the first matching rule decides.
//! Elimination, then the turn limit, then territory majority, then
//! immobilization. Territory majority rests on the secure score: the
//! non-wall cells the opponent's organism cannot reach by flooding
//! outward from its own cells, where walls are impassable and cells
//! defended by the evaluated player's tentacles block passage.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use crate::game::entity::CellKind;
use crate::game::geometry::Point;
use crate::game::player::{Player, Protein, ProteinCounts};
use crate::game::state::State;

/// First turn at which the cell-count rule applies.
pub const TURN_LIMIT: u32 = 50;

/// The rule that ended a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// A player lost every cell.
    Elimination,
    /// The turn limit compared cell counts, then protein stocks.
    TurnLimit,
    /// A player locked down more than half of the reachable board.
    TerritoryMajority,
    /// Only one player could still act.
    Immobilization,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Elimination => "Killed the opponent",
            Self::TurnLimit => "More cells after 50 turns",
            Self::TerritoryMajority => "Secured more than half of the map",
            Self::Immobilization => "Immobilized opponent",
        };
        f.write_str(text)
    }
}

/// The outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// The winner, `None` for a draw.
    pub winner: Option<Player>,
    /// The rule that ended the game.
    pub reason: EndReason,
}

/// Whether a protein ledger covers at least one organ kind: `A` alone
/// pays for a basic, and any two of `B`, `C`, `D` pay for one of the
/// directed organs.
#[must_use]
pub fn supports_growth(counts: ProteinCounts) -> bool {
    let b = counts.of(Protein::B) > 0;
    let c = counts.of(Protein::C) > 0;
    let d = counts.of(Protein::D) > 0;
    counts.of(Protein::A) > 0 || (b && c) || (b && d) || (c && d)
}

/// Whether the player's current stock can pay for any organ.
#[must_use]
pub fn can_grow_any_organ(state: &State, player: Player) -> bool {
    supports_growth(state.proteins(player))
}

/// Whether the player's harvest income alone can keep paying for organs.
#[must_use]
pub fn can_sustain_growth(state: &State, player: Player) -> bool {
    supports_growth(state.gains(player))
}

/// Non-wall cells on the board.
#[must_use]
pub fn total_non_wall_cells(state: &State) -> u32 {
    let count = state
        .entities()
        .filter(|cell| cell.kind != CellKind::Wall)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// A player's secure score: non-wall cells minus everything the
/// opponent can reach. The reachable set is a flood fill seeded at every
/// opponent cell, run with an explicit stack; it may cross any non-wall
/// cell not owned by the opponent, except cells the evaluated player's
/// tentacles defend.
#[must_use]
pub fn secure_cell_count(state: &State, player: Player) -> u32 {
    let opponent = player.opponent();
    let mut visited: HashSet<Point> = HashSet::new();
    let mut stack: Vec<Point> = state.cells_of(opponent).map(|cell| cell.pos).collect();

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        for next in state.neighbours_but_wall(current) {
            let into_opponent = state
                .get(next)
                .is_some_and(|cell| cell.owner == Some(opponent));
            if !into_opponent && !state.is_already_defended(next, player) {
                stack.push(next);
            }
        }
    }

    let reached = u32::try_from(visited.len()).unwrap_or(u32::MAX);
    total_non_wall_cells(state).saturating_sub(reached)
}

fn check_elimination(state: &State) -> Option<Option<Player>> {
    let one_dead = state.cell_count(Player::One) == 0;
    let two_dead = state.cell_count(Player::Two) == 0;
    match (one_dead, two_dead) {
        (true, true) => Some(None),
        (true, false) => Some(Some(Player::Two)),
        (false, true) => Some(Some(Player::One)),
        (false, false) => None,
    }
}

fn check_turn_limit(state: &State) -> Option<Option<Player>> {
    if state.turn() < TURN_LIMIT {
        return None;
    }
    let one = state.cell_count(Player::One);
    let two = state.cell_count(Player::Two);
    match one.cmp(&two) {
        Ordering::Greater => return Some(Some(Player::One)),
        Ordering::Less => return Some(Some(Player::Two)),
        Ordering::Equal => {}
    }
    let stock_one = state.proteins(Player::One).total();
    let stock_two = state.proteins(Player::Two).total();
    match stock_one.cmp(&stock_two) {
        Ordering::Greater => Some(Some(Player::One)),
        Ordering::Less => Some(Some(Player::Two)),
        Ordering::Equal => Some(None),
    }
}

fn check_territory(state: &State) -> Option<Option<Player>> {
    let secure_one = secure_cell_count(state, Player::One);
    let secure_two = secure_cell_count(state, Player::Two);
    let total = total_non_wall_cells(state);

    let over_half = |score: u32| 2 * score > total;
    let qualified =
        |player: Player| can_sustain_growth(state, player) && can_grow_any_organ(state, player);

    if over_half(secure_one) && secure_one > secure_two && qualified(Player::One) {
        return Some(Some(Player::One));
    }
    if over_half(secure_two) && secure_two > secure_one && qualified(Player::Two) {
        return Some(Some(Player::Two));
    }
    if over_half(secure_one)
        && over_half(secure_two)
        && secure_one == secure_two
        && qualified(Player::One)
        && qualified(Player::Two)
    {
        return Some(None);
    }
    None
}

fn check_immobilization(state: &State) -> Option<Player> {
    let mobile =
        |player: Player| can_sustain_growth(state, player) || can_grow_any_organ(state, player);
    match (mobile(Player::One), mobile(Player::Two)) {
        (true, false) => Some(Player::One),
        (false, true) => Some(Player::Two),
        _ => None,
    }
}

/// Evaluate the board against the end-of-game rules, first match wins.
/// `None` while the game is still running; a [`Verdict`] with no winner
/// is a finished draw.
#[must_use]
pub fn evaluate(state: &State) -> Option<Verdict> {
    if let Some(winner) = check_elimination(state) {
        return Some(Verdict {
            winner,
            reason: EndReason::Elimination,
        });
    }
    if let Some(winner) = check_turn_limit(state) {
        return Some(Verdict {
            winner,
            reason: EndReason::TurnLimit,
        });
    }
    if let Some(winner) = check_territory(state) {
        return Some(Verdict {
            winner,
            reason: EndReason::TerritoryMajority,
        });
    }
    if let Some(winner) = check_immobilization(state) {
        return Some(Verdict {
            winner: Some(winner),
            reason: EndReason::Immobilization,
        });
    }
    None
}
