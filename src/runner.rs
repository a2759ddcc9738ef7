//! Match hosting: two strategies on one board.
//!
//! Provides a pure function interface: `(board text, strategies, config)
//! -> MatchResult`. The runner loads the board, collects each seat's
//! actions, applies them in player order, resolves the turn, and checks
//! the end-of-game rules, looping until a verdict or the safety cap.

mod strategies;

pub use strategies::{Expander, Forager, Idler, STRATEGY_NAMES, Strategy, strategy_by_name};

use crate::error::GameResult;
use crate::game::{
    Action, EndReason, PerPlayer, Player, ProteinCounts, State, TurnReport, Verdict, cells_lost,
    evaluate, resolve_turn,
};
use crate::maps::{DEFAULT_STARTING_PROTEINS, load_map};
use crate::record::ActionRecord;

/// Configuration for one match.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    /// Inventory both players start with.
    pub starting_proteins: ProteinCounts,
    /// Hard cap on resolved turns, above the rules' own 50-turn limit.
    pub max_turns: u32,
    /// Whether to keep the per-action log in the result.
    pub record_actions: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            starting_proteins: DEFAULT_STARTING_PROTEINS,
            max_turns: 60,
            record_actions: true,
        }
    }
}

/// Final per-player numbers for one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerTally {
    /// Cells on the final board.
    pub cells: u32,
    /// Final protein stock.
    pub proteins: ProteinCounts,
    /// Final per-pass harvest income.
    pub gains: ProteinCounts,
    /// Actions the engine rejected; each resolved as a WAIT.
    pub rejected_actions: u32,
    /// Organs lost to combat over the whole match.
    pub cells_lost: u32,
}

/// Everything a finished match produced.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The winner, `None` on a draw or a cap cutoff.
    pub winner: Option<Player>,
    /// The rule that ended the game. `None` only when the safety cap cut
    /// the match before any rule matched.
    pub reason: Option<EndReason>,
    /// Turns fully resolved.
    pub turns: u32,
    /// Final per-player numbers.
    pub tallies: PerPlayer<PlayerTally>,
    /// Every action the strategies issued, in application order. Empty
    /// when the config disabled recording.
    pub actions: Vec<ActionRecord>,
    /// One report per resolved turn.
    pub reports: Vec<TurnReport>,
    /// The final board.
    pub state: State,
}

/// Run one match to completion.
///
/// # Determinism
///
/// The engine and the built-in strategies are deterministic, so identical
/// board text, strategies (with identical seeds), and config produce an
/// identical result.
///
/// # Errors
///
/// [`crate::error::GameError::MalformedInput`] when the board text does
/// not parse.
pub fn run_match(
    map_text: &str,
    strategies: [Box<dyn Strategy>; 2],
    config: &MatchConfig,
) -> GameResult<MatchResult> {
    let state = load_map(map_text, config.starting_proteins)?;
    Ok(MatchRunner::new(state, strategies, *config).run())
}

/// The loop driving one match.
struct MatchRunner {
    state: State,
    strategies: [Box<dyn Strategy>; 2],
    config: MatchConfig,
    reports: Vec<TurnReport>,
    actions: Vec<ActionRecord>,
    rejected: PerPlayer<u32>,
    lost: PerPlayer<u32>,
}

impl MatchRunner {
    fn new(state: State, strategies: [Box<dyn Strategy>; 2], config: MatchConfig) -> Self {
        Self {
            state,
            strategies,
            config,
            reports: Vec::new(),
            actions: Vec::new(),
            rejected: PerPlayer::splat(0),
            lost: PerPlayer::splat(0),
        }
    }

    fn run(mut self) -> MatchResult {
        let verdict = loop {
            if let Some(verdict) = evaluate(&self.state) {
                break Some(verdict);
            }
            if self.reports.len() >= self.config.max_turns as usize {
                break None;
            }
            self.execute_turn();
        };
        self.build_result(verdict)
    }

    /// One full turn: both seats act against the same pre-turn board,
    /// player one's actions apply first.
    fn execute_turn(&mut self) {
        let mut batch: Vec<Action> = Vec::new();
        for (slot, player) in Player::ALL.into_iter().enumerate() {
            batch.extend(self.strategies[slot].act(&self.state, player));
        }

        if self.config.record_actions {
            let turn = self.state.turn();
            for (index, action) in batch.iter().enumerate() {
                let id = format!("{turn}-{index}");
                self.actions.push(ActionRecord::from_action(id, action));
            }
        }

        let report = resolve_turn(&mut self.state, &batch);
        for player in Player::ALL {
            let rejects = report
                .rejected
                .iter()
                .filter(|rejected| rejected.player == player)
                .count();
            self.rejected[player] += u32::try_from(rejects).unwrap_or(u32::MAX);
            self.lost[player] += cells_lost(&report, player);
        }
        self.reports.push(report);
    }

    fn build_result(self, verdict: Option<Verdict>) -> MatchResult {
        let tallies = PerPlayer::new(self.tally_for(Player::One), self.tally_for(Player::Two));
        MatchResult {
            winner: verdict.and_then(|v| v.winner),
            reason: verdict.map(|v| v.reason),
            turns: u32::try_from(self.reports.len()).unwrap_or(u32::MAX),
            tallies,
            actions: self.actions,
            reports: self.reports,
            state: self.state,
        }
    }

    fn tally_for(&self, player: Player) -> PlayerTally {
        PlayerTally {
            cells: self.state.cell_count(player),
            proteins: self.state.proteins(player),
            gains: self.state.gains(player),
            rejected_actions: self.rejected[player],
            cells_lost: self.lost[player],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::builtin_board;

    fn board(name: &str) -> &'static str {
        builtin_board(name).unwrap()
    }

    fn seats(one: &str, two: &str, seed: u64) -> [Box<dyn Strategy>; 2] {
        [
            strategy_by_name(one, seed).unwrap(),
            strategy_by_name(two, seed.wrapping_add(1)).unwrap(),
        ]
    }

    #[test]
    fn test_idlers_draw_at_the_turn_limit() {
        let result = run_match(
            board("scarcity"),
            seats("idler", "idler", 1),
            &MatchConfig::default(),
        )
        .unwrap();

        assert_eq!(result.winner, None);
        assert_eq!(result.reason, Some(EndReason::TurnLimit));
        assert_eq!(result.turns, 49);
        assert_eq!(result.state.turn(), 50);
        for player in Player::ALL {
            assert_eq!(result.tallies[player].cells, 1);
            assert_eq!(result.tallies[player].rejected_actions, 0);
        }
    }

    #[test]
    fn test_expander_outgrows_an_idler() {
        let result = run_match(
            board("meadow"),
            seats("expander", "idler", 11),
            &MatchConfig::default(),
        )
        .unwrap();

        assert_eq!(result.winner, Some(Player::One));
        assert_eq!(result.reason, Some(EndReason::TurnLimit));
        assert_eq!(result.tallies[Player::Two].cells, 1);
        assert!(result.tallies[Player::One].cells > 1);
    }

    #[test]
    fn test_match_is_deterministic() {
        let config = MatchConfig::default();
        let first = run_match(board("meadow"), seats("expander", "forager", 7), &config).unwrap();
        let second = run_match(board("meadow"), seats("expander", "forager", 7), &config).unwrap();

        assert_eq!(first.winner, second.winner);
        assert_eq!(first.reason, second.reason);
        assert_eq!(first.turns, second.turns);
        assert_eq!(first.actions, second.actions);
        for player in Player::ALL {
            assert_eq!(first.tallies[player], second.tallies[player]);
        }
    }

    #[test]
    fn test_safety_cap_cuts_an_unfinished_match() {
        let config = MatchConfig {
            max_turns: 5,
            ..MatchConfig::default()
        };
        let result = run_match(board("scarcity"), seats("idler", "idler", 1), &config).unwrap();

        assert_eq!(result.winner, None);
        assert_eq!(result.reason, None);
        assert_eq!(result.turns, 5);
    }

    #[test]
    fn test_action_log_toggle() {
        let config = MatchConfig {
            record_actions: false,
            max_turns: 5,
            ..MatchConfig::default()
        };
        let result = run_match(board("meadow"), seats("expander", "idler", 3), &config).unwrap();
        assert!(result.actions.is_empty());
        assert_eq!(result.reports.len(), 5);

        let config = MatchConfig {
            max_turns: 5,
            ..MatchConfig::default()
        };
        let result = run_match(board("meadow"), seats("expander", "idler", 3), &config).unwrap();
        // Two seats, one organism each, five turns.
        assert_eq!(result.actions.len(), 10);
    }

    #[test]
    fn test_reports_carry_consecutive_turns() {
        let config = MatchConfig {
            max_turns: 4,
            ..MatchConfig::default()
        };
        let result = run_match(board("meadow"), seats("forager", "forager", 5), &config).unwrap();
        let turns: Vec<u32> = result.reports.iter().map(|report| report.turn).collect();
        assert_eq!(turns, vec![1, 2, 3, 4]);
    }
}
