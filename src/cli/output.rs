//! Output shaping for the run and series commands.

// Statistics fold integer counters through f64 for rates and averages.
#![allow(clippy::cast_precision_loss)]

use serde::Serialize;

use petri::game::{EndReason, Player, Protein, ProteinCounts};
use petri::runner::MatchResult;

/// JSON-serializable match result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JsonMatch {
    /// Board the match was played on.
    board: String,
    /// Seed the seats were built from.
    seed: u64,
    /// 1-based number of the winning player (null if draw).
    winner: Option<usize>,
    /// The rule that ended the game (null if the safety cap cut it).
    reason: Option<String>,
    /// Total turns resolved.
    turns: u32,
    /// Per-seat results.
    players: Vec<JsonSeat>,
}

/// JSON-serializable per-seat result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSeat {
    /// 1-based player number.
    player: usize,
    /// Strategy name.
    strategy: String,
    /// Cells on the final board.
    cells: u32,
    /// Final protein stock, A through D.
    proteins: [u32; 4],
    /// Final harvest income per turn.
    income: u32,
    /// Actions the engine rejected.
    rejected_actions: u32,
    /// Organs lost to combat.
    cells_lost: u32,
}

impl JsonMatch {
    /// Create from a finished match.
    pub(super) fn from_result(
        board: &str,
        seed: u64,
        names: &[String; 2],
        result: &MatchResult,
    ) -> Self {
        let players = Player::ALL
            .iter()
            .map(|&player| {
                let tally = &result.tallies[player];
                JsonSeat {
                    player: player.index() + 1,
                    strategy: names[player.index()].clone(),
                    cells: tally.cells,
                    proteins: protein_array(&tally.proteins),
                    income: tally.gains.total(),
                    rejected_actions: tally.rejected_actions,
                    cells_lost: tally.cells_lost,
                }
            })
            .collect();

        Self {
            board: board.to_owned(),
            seed,
            winner: result.winner.map(|w| w.index() + 1),
            reason: result.reason.map(|r| r.to_string()),
            turns: result.turns,
            players,
        }
    }
}

fn protein_array(counts: &ProteinCounts) -> [u32; 4] {
    [
        counts.of(Protein::A),
        counts.of(Protein::B),
        counts.of(Protein::C),
        counts.of(Protein::D),
    ]
}

fn stock_line(counts: &ProteinCounts) -> String {
    counts
        .entries()
        .map(|(protein, amount)| format!("{}:{amount}", protein.token()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a match result as human-readable text.
pub(super) fn format_match_text(result: &MatchResult, names: &[String; 2], seed: u64) -> String {
    let mut output = String::new();

    output.push_str(&format!("Match Result (seed: {seed})\n"));
    match (result.winner, result.reason) {
        (Some(winner), Some(reason)) => {
            let idx = winner.index();
            output.push_str(&format!(
                "  Winner: Player {} ({}) - {reason}\n",
                idx + 1,
                names[idx]
            ));
        }
        (None, Some(reason)) => output.push_str(&format!("  Winner: Draw - {reason}\n")),
        _ => output.push_str("  Winner: None - safety cap cut the match\n"),
    }
    output.push_str(&format!("  Turns: {}\n\n", result.turns));

    for player in Player::ALL {
        let tally = &result.tallies[player];
        output.push_str(&format!(
            "  Player {} ({}): {} cells, stock {}, income +{}/turn",
            player.index() + 1,
            names[player.index()],
            tally.cells,
            stock_line(&tally.proteins),
            tally.gains.total(),
        ));
        if tally.rejected_actions > 0 {
            output.push_str(&format!(" [{} rejected]", tally.rejected_actions));
        }
        if tally.cells_lost > 0 {
            output.push_str(&format!(" [{} lost]", tally.cells_lost));
        }
        output.push('\n');
    }

    output
}

/// Labels for the end-rule histogram, in slot order.
const REASON_LABELS: [&str; 4] = ["elimination", "turn limit", "territory", "immobilized"];

const fn reason_slot(reason: EndReason) -> usize {
    match reason {
        EndReason::Elimination => 0,
        EndReason::TurnLimit => 1,
        EndReason::TerritoryMajority => 2,
        EndReason::Immobilization => 3,
    }
}

/// Series statistics for aggregated results.
#[derive(Debug, Clone, Default)]
pub(super) struct SeriesStats {
    /// Total matches resolved.
    pub(super) games: u64,
    /// Win count per seat.
    wins: [u64; 2],
    /// Draw count.
    draws: u64,
    /// Matches the safety cap cut before any end rule matched.
    capped: u64,
    /// How often each end rule fired, indexed by `reason_slot`.
    reasons: [u64; 4],
    /// Total turns across all matches.
    total_turns: u64,
    /// Final cell counts per seat.
    total_cells: [u64; 2],
    /// Cell count sum of squares for std dev calculation.
    total_cells_sq: [u64; 2],
    /// Organs lost to combat per seat.
    total_lost: [u64; 2],
}

impl SeriesStats {
    /// Add a match result to the stats.
    pub(super) fn add(&mut self, result: &MatchResult) {
        self.games += 1;
        self.total_turns += u64::from(result.turns);

        for player in Player::ALL {
            let idx = player.index();
            let cells = u64::from(result.tallies[player].cells);
            self.total_cells[idx] += cells;
            self.total_cells_sq[idx] += cells * cells;
            self.total_lost[idx] += u64::from(result.tallies[player].cells_lost);
        }

        match result.reason {
            Some(reason) => {
                self.reasons[reason_slot(reason)] += 1;
                match result.winner {
                    Some(winner) => self.wins[winner.index()] += 1,
                    None => self.draws += 1,
                }
            }
            None => self.capped += 1,
        }
    }

    /// Fold another accumulator in. The series command shards stats per
    /// worker thread and merges them at the end.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games += other.games;
        self.draws += other.draws;
        self.capped += other.capped;
        self.total_turns += other.total_turns;
        for idx in 0..2 {
            self.wins[idx] += other.wins[idx];
            self.total_cells[idx] += other.total_cells[idx];
            self.total_cells_sq[idx] += other.total_cells_sq[idx];
            self.total_lost[idx] += other.total_lost[idx];
        }
        for slot in 0..self.reasons.len() {
            self.reasons[slot] += other.reasons[slot];
        }
    }

    /// Get win rate for a seat (0.0-1.0).
    fn win_rate(&self, player: Player) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins[player.index()] as f64 / self.games as f64
    }

    /// Get average match length.
    fn avg_turns(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games as f64
    }

    /// Get average final cell count for a seat.
    fn avg_cells(&self, player: Player) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_cells[player.index()] as f64 / self.games as f64
    }

    /// Get average combat losses for a seat.
    fn avg_lost(&self, player: Player) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_lost[player.index()] as f64 / self.games as f64
    }

    /// Get cell count standard deviation for a seat.
    fn cells_std_dev(&self, player: Player) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        let n = self.games as f64;
        let mean = self.avg_cells(player);
        let mean_sq = self.total_cells_sq[player.index()] as f64 / n;
        let variance = mean_sq - mean * mean;
        if variance < 0.0 { 0.0 } else { variance.sqrt() }
    }
}

/// JSON-serializable series result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JsonSeries {
    /// Board the series was played on.
    board: String,
    /// Total matches resolved.
    games: u64,
    /// Number of draws.
    draws: u64,
    /// Matches the safety cap cut.
    capped: u64,
    /// Average match length in turns.
    avg_turns: f64,
    /// End-rule histogram.
    end_rules: Vec<JsonReasonCount>,
    /// Per-seat statistics.
    players: Vec<JsonSeriesSeat>,
}

/// One end-rule histogram bucket.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReasonCount {
    rule: String,
    count: u64,
}

/// JSON-serializable per-seat series stats.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSeriesSeat {
    /// 1-based player number.
    player: usize,
    /// Strategy name.
    strategy: String,
    /// Number of wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Average final cell count.
    avg_cells: f64,
    /// Cell count standard deviation.
    cells_std_dev: f64,
    /// Average organs lost to combat.
    avg_cells_lost: f64,
}

impl JsonSeries {
    /// Create from stats and seat names.
    pub(super) fn from_stats(stats: &SeriesStats, names: &[String; 2], board: &str) -> Self {
        let players = Player::ALL
            .iter()
            .map(|&player| JsonSeriesSeat {
                player: player.index() + 1,
                strategy: names[player.index()].clone(),
                wins: stats.wins[player.index()],
                win_rate: stats.win_rate(player),
                avg_cells: stats.avg_cells(player),
                cells_std_dev: stats.cells_std_dev(player),
                avg_cells_lost: stats.avg_lost(player),
            })
            .collect();

        let end_rules = REASON_LABELS
            .iter()
            .zip(stats.reasons.iter())
            .map(|(&rule, &count)| JsonReasonCount {
                rule: rule.to_owned(),
                count,
            })
            .collect();

        Self {
            board: board.to_owned(),
            games: stats.games,
            draws: stats.draws,
            capped: stats.capped,
            avg_turns: stats.avg_turns(),
            end_rules,
            players,
        }
    }
}

/// Format series stats as human-readable text.
pub(super) fn format_series_text(stats: &SeriesStats, names: &[String; 2], board: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Series Results ({} games on {board})\n",
        stats.games
    ));
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for player in Player::ALL {
        let idx = player.index();
        output.push_str(&format!(
            "  Player {} ({}): {:.1}% ({} wins)\n",
            idx + 1,
            names[idx],
            stats.win_rate(player) * 100.0,
            stats.wins[idx],
        ));
    }
    let draw_rate = if stats.games == 0 {
        0.0
    } else {
        stats.draws as f64 / stats.games as f64 * 100.0
    };
    output.push_str(&format!("  Draws: {} ({draw_rate:.1}%)\n", stats.draws));
    if stats.capped > 0 {
        output.push_str(&format!("  Cut by safety cap: {}\n", stats.capped));
    }
    output.push('\n');

    output.push_str("Final Cells:\n");
    for player in Player::ALL {
        let idx = player.index();
        output.push_str(&format!(
            "  Player {} ({}): {:.1} (+/- {:.1}), {:.1} lost to combat\n",
            idx + 1,
            names[idx],
            stats.avg_cells(player),
            stats.cells_std_dev(player),
            stats.avg_lost(player),
        ));
    }
    output.push('\n');

    output.push_str("End Rules:\n");
    for (label, count) in REASON_LABELS.iter().zip(stats.reasons.iter()) {
        output.push_str(&format!("  {label:<12} {count}\n"));
    }

    output.push_str(&format!("\nAverage Match Length: {:.0} turns\n", stats.avg_turns()));

    output
}

/// Format series stats as CSV.
pub(super) fn format_series_csv(stats: &SeriesStats, names: &[String; 2]) -> String {
    let mut output = String::new();

    // Header
    output.push_str("player,strategy,wins,win_rate,avg_cells,cells_std_dev,avg_cells_lost\n");

    // Data rows
    for player in Player::ALL {
        let idx = player.index();
        output.push_str(&format!(
            "{},{},{},{:.4},{:.2},{:.2},{:.2}\n",
            idx + 1,
            names[idx],
            stats.wins[idx],
            stats.win_rate(player),
            stats.avg_cells(player),
            stats.cells_std_dev(player),
            stats.avg_lost(player),
        ));
    }

    output
}
