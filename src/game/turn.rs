//! Per-turn resolution pipeline.
//!
//! After both players submit their actions, the shared phases run in a
//! fixed order: harvest, wall collisions, overgrowth bonuses, tentacle
//! combat. The order is load-bearing. Harvesting must see the board as
//! committed after growth but before combat, walls must resolve before
//! bonuses so a contested cell cannot also pay out, and combat runs
//! last over the finalized layout.

use crate::error::GameError;
use crate::game::state::{BonusReport, CombatReport, HarvestReport, State, WallReport};
use crate::game::{Action, Player};

/// An action that failed validation. The state was not touched by it.
#[derive(Debug, Clone)]
pub struct RejectedAction {
    /// Who submitted it.
    pub player: Player,
    /// Its wire form, for logs.
    pub action: String,
    /// Why it was rejected.
    pub error: GameError,
}

/// What one call to [`resolve_turn`] did.
#[derive(Debug, Clone, Default)]
pub struct TurnReport {
    /// The 1-based turn that was resolved.
    pub turn: u32,
    /// Actions rejected during application, in submission order.
    pub rejected: Vec<RejectedAction>,
    /// Income from the harvest phase.
    pub harvest: HarvestReport,
    /// Growth collisions that decayed to walls.
    pub walls: WallReport,
    /// Bonuses for organs grown over protein sources.
    pub bonus: BonusReport,
    /// Combat destruction.
    pub combat: CombatReport,
}

impl TurnReport {
    /// True if the turn changed nothing but the counter: every action was
    /// rejected or a wait, and no phase touched the board.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.walls.walls.is_empty()
            && self.combat.destroyed.is_empty()
            && self.bonus.bonus.entries().all(|(_, counts)| counts.total() == 0)
    }
}

/// Apply both players' submitted actions in submission order, run the
/// four shared phases, then clear growth flags and advance the turn
/// counter.
///
/// A rejected action is skipped and recorded; the remaining actions and
/// the phases still run. The phases themselves are total and never fail.
pub fn resolve_turn(state: &mut State, actions: &[Action]) -> TurnReport {
    let mut report = TurnReport {
        turn: state.turn(),
        ..TurnReport::default()
    };
    for action in actions {
        if let Err(error) = state.apply_action(action) {
            report.rejected.push(RejectedAction {
                player: action.player(),
                action: action.output(),
                error,
            });
        }
    }

    report.harvest = state.refresh_proteins();
    report.walls = state.do_wall_collisions();
    report.bonus = state.retrieve_proteins_bonus();
    report.combat = state.do_tentacle_attacks();

    state.clean_growing_organs();
    state.advance_turn();
    report
}

/// Count the cells a report says a player lost to combat, for logging.
#[must_use]
pub fn cells_lost(report: &TurnReport, player: Player) -> u32 {
    report.combat.losses[player]
}
