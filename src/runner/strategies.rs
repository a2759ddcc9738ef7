//! Built-in baseline strategies.
//!
//! Each seat is deterministic given its seed; tie-breaks run through a
//! seeded xorshift64 generator so a match replays move for move.

// Strategies use intentional casts for RNG index selection
#![allow(clippy::cast_possible_truncation)]

use std::collections::HashSet;

use crate::game::{
    Action, CellKind, Dir, OrganId, OrganKind, Player, Point, ProteinCounts, State,
};

/// The action-supplying half of a match seat.
pub trait Strategy: std::fmt::Debug {
    /// Actions for this turn, one per organism the player controls.
    /// Lookahead must run on [`State::snapshot`], never on `state`.
    fn act(&mut self, state: &State, player: Player) -> Vec<Action>;

    /// Short name for reports and recordings.
    fn name(&self) -> &'static str;
}

/// Names [`strategy_by_name`] accepts, in listing order.
pub const STRATEGY_NAMES: [&str; 3] = ["idler", "expander", "forager"];

/// Build a strategy seat from its name and tie-break seed.
#[must_use]
pub fn strategy_by_name(name: &str, seed: u64) -> Option<Box<dyn Strategy>> {
    match name {
        "idler" => Some(Box::new(Idler)),
        "expander" => Some(Box::new(Expander::new(seed))),
        "forager" => Some(Box::new(Forager::new(seed))),
        _ => None,
    }
}

/// Deterministic PRNG using xorshift64.
#[derive(Debug, Clone, Copy)]
struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed.
    const fn new(seed: u64) -> Self {
        // Ensure non-zero state
        let state = if seed == 0 { 0x5555_5555_5555_5555 } else { seed };
        Self { state }
    }

    /// Generate next random u64.
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a random index in `[0, len)`.
    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u64() % len as u64) as usize
    }
}

/// A growable cell and the organ to grow it from.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    source: OrganId,
    target: Point,
}

/// Growable neighbors of one organism's organs, each paired with a source
/// organ. First-seen order, deduplicated by target.
fn growth_candidates(state: &State, player: Player, root_id: OrganId) -> Vec<Candidate> {
    let organs: Vec<(OrganId, Point)> = state
        .cells_of(player)
        .filter(|cell| cell.organ_id == root_id || cell.root_id == root_id)
        .map(|cell| (cell.organ_id, cell.pos))
        .collect();

    let mut seen: HashSet<Point> = HashSet::new();
    let mut out = Vec::new();
    for (source, pos) in organs {
        for dir in Dir::ALL {
            let target = pos.step(dir);
            let open = state
                .get(target)
                .is_some_and(|cell| cell.kind == CellKind::Empty || cell.kind.is_protein());
            if open && state.can_grow_here(target, player) && seen.insert(target) {
                out.push(Candidate { source, target });
            }
        }
    }
    out
}

fn manhattan(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// The candidate whose target sits closest to any protein source, ties
/// broken by the generator. Falls back to any candidate on a board with
/// no proteins left.
fn pick_nearest_to_protein(
    state: &State,
    candidates: &[Candidate],
    rng: &mut Rng,
) -> Option<Candidate> {
    if candidates.is_empty() {
        return None;
    }
    let proteins: Vec<Point> = state
        .entities()
        .filter(|cell| cell.kind.is_protein())
        .map(|cell| cell.pos)
        .collect();
    let score = |target: Point| {
        proteins
            .iter()
            .map(|&protein| manhattan(target, protein))
            .min()
            .unwrap_or(0)
    };

    let best = candidates.iter().map(|c| score(c.target)).min()?;
    let tied: Vec<Candidate> = candidates
        .iter()
        .copied()
        .filter(|c| score(c.target) == best)
        .collect();
    Some(tied[rng.next_index(tied.len())])
}

/// A BASIC grown toward the nearest protein, if the budget allows.
fn pick_expansion(
    state: &State,
    player: Player,
    root_id: OrganId,
    budget: &mut ProteinCounts,
    rng: &mut Rng,
) -> Option<Action> {
    let cost = OrganKind::Basic.cost();
    if !budget.covers(cost) {
        return None;
    }
    let candidates = growth_candidates(state, player, root_id);
    let pick = pick_nearest_to_protein(state, &candidates, rng)?;
    budget.deduct(cost);
    Some(Action::Grow {
        player,
        turn: state.turn(),
        organ_id: pick.source,
        target: pick.target,
        kind: OrganKind::Basic,
        facing: None,
        message: None,
    })
}

/// Does nothing, forever. The control seat.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idler;

impl Strategy for Idler {
    fn act(&mut self, state: &State, player: Player) -> Vec<Action> {
        let turn = state.turn();
        state
            .roots_of(player)
            .map(|_| Action::Wait {
                player,
                turn,
                message: None,
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "idler"
    }
}

/// Grows BASIC organs toward the nearest protein source.
#[derive(Debug, Clone, Copy)]
pub struct Expander {
    rng: Rng,
}

impl Expander {
    /// A new expander with its tie-break seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            rng: Rng::new(seed),
        }
    }
}

impl Strategy for Expander {
    fn act(&mut self, state: &State, player: Player) -> Vec<Action> {
        let turn = state.turn();
        let mut budget = state.proteins(player);
        let roots: Vec<OrganId> = state.roots_of(player).map(|root| root.organ_id).collect();

        roots
            .into_iter()
            .map(|root_id| {
                pick_expansion(state, player, root_id, &mut budget, &mut self.rng).unwrap_or(
                    Action::Wait {
                        player,
                        turn,
                        message: None,
                    },
                )
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "expander"
    }
}

/// Plants harvesters beside fresh protein sources, expands otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Forager {
    rng: Rng,
}

impl Forager {
    /// A new forager with its tie-break seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            rng: Rng::new(seed),
        }
    }

    /// A HARVESTER on a growable cell facing a protein this player does
    /// not collect yet.
    fn pick_harvest(
        &mut self,
        state: &State,
        player: Player,
        root_id: OrganId,
        budget: &mut ProteinCounts,
    ) -> Option<Action> {
        let cost = OrganKind::Harvester.cost();
        if !budget.covers(cost) {
            return None;
        }

        let mut plants: Vec<(Candidate, Dir)> = Vec::new();
        for candidate in growth_candidates(state, player, root_id) {
            for dir in Dir::ALL {
                let fresh = state.get(candidate.target.step(dir)).is_some_and(|cell| {
                    cell.kind.is_protein() && !cell.harvested.contains(player)
                });
                if fresh {
                    plants.push((candidate, dir));
                    break;
                }
            }
        }
        if plants.is_empty() {
            return None;
        }

        let (pick, facing) = plants[self.rng.next_index(plants.len())];
        budget.deduct(cost);
        Some(Action::Grow {
            player,
            turn: state.turn(),
            organ_id: pick.source,
            target: pick.target,
            kind: OrganKind::Harvester,
            facing: Some(facing),
            message: None,
        })
    }
}

impl Strategy for Forager {
    fn act(&mut self, state: &State, player: Player) -> Vec<Action> {
        let turn = state.turn();
        let mut budget = state.proteins(player);
        let roots: Vec<OrganId> = state.roots_of(player).map(|root| root.organ_id).collect();

        roots
            .into_iter()
            .map(|root_id| {
                self.pick_harvest(state, player, root_id, &mut budget)
                    .or_else(|| pick_expansion(state, player, root_id, &mut budget, &mut self.rng))
                    .unwrap_or(Action::Wait {
                        player,
                        turn,
                        message: None,
                    })
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "forager"
    }
}
