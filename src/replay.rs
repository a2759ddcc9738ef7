//! Match recording and deterministic replay.
//!
//! Because matches are fully deterministic, a recording stores only the
//! inputs and the action log:
//! - the board text the match was loaded from
//! - the starting inventories
//! - the two seat specs (strategy name and seed), as provenance
//! - every action in application order, tagged with its turn
//!
//! No state deltas are stored. To view turn N, re-run the simulation from
//! the start, applying the logged actions turn by turn.
//!
//! # Time travel
//!
//! - **Forward**: resolve the next logged turn
//! - **Backward**: re-run from the start to (`position` - 1)
//! - **Jump to turn N**: re-run from the start to N

mod render;
mod text;

pub use render::render_ascii;
pub use text::render_llm;

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::{Action, ProteinCounts, State, Verdict, evaluate, resolve_turn};
use crate::maps::load_map;
use crate::record::{ActionRecord, RecordError};
use crate::runner::{MatchConfig, MatchResult};

/// One seat of a recorded match: a strategy name and its tie-break seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatSpec {
    /// Built-in strategy name.
    pub strategy: String,
    /// Seed the seat was constructed with.
    pub seed: u64,
}

impl SeatSpec {
    /// Build a seat spec.
    #[must_use]
    pub fn new(strategy: impl Into<String>, seed: u64) -> Self {
        Self {
            strategy: strategy.into(),
            seed,
        }
    }
}

/// Everything needed to replay one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    /// The board file text the match was played on.
    pub map_text: String,
    /// Inventory both players started with.
    pub starting_proteins: ProteinCounts,
    /// The two seats, in player order.
    pub seats: [SeatSpec; 2],
    /// How many turns the match resolved.
    pub turns: u32,
    /// Every action in application order. Each record carries the turn it
    /// was issued on.
    pub actions: Vec<ActionRecord>,
}

impl Recording {
    /// Capture a finished match.
    ///
    /// The match must have been run with action recording enabled;
    /// without the log every seat replays as idle.
    #[must_use]
    pub fn from_match(
        map_text: impl Into<String>,
        seats: [SeatSpec; 2],
        config: &MatchConfig,
        result: &MatchResult,
    ) -> Self {
        Self {
            map_text: map_text.into(),
            starting_proteins: config.starting_proteins,
            seats,
            turns: result.turns,
            actions: result.actions.clone(),
        }
    }

    /// Save the recording to a file as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file I/O fails.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    /// Load a recording from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if file I/O fails or the JSON does not parse.
    pub fn load(path: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Error type for replay operations.
#[derive(Debug)]
pub enum ReplayError {
    /// The recording's board text failed to parse.
    BadBoard(GameError),
    /// An action in the log cannot be converted back into a command.
    BadAction {
        /// Index into the recording's action log.
        index: usize,
        /// Error details.
        error: RecordError,
    },
    /// Turn number out of bounds.
    TurnOutOfBounds {
        /// Requested turn.
        requested: u32,
        /// Last turn the recording holds.
        last: u32,
    },
    /// The match already reached its verdict.
    MatchOver,
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadBoard(e) => write!(f, "recorded board failed to parse: {e}"),
            Self::BadAction { index, error } => {
                write!(f, "logged action {index} cannot be replayed: {error}")
            }
            Self::TurnOutOfBounds { requested, last } => {
                write!(f, "turn {requested} out of bounds (last: {last})")
            }
            Self::MatchOver => write!(f, "the match is already over"),
        }
    }
}

impl std::error::Error for ReplayError {}

/// Replay engine stepping through a recorded match deterministically.
///
/// Forward steps resolve the next logged turn. Backward steps and jumps
/// re-run from the start, which is cheap at this board scale.
#[derive(Debug)]
pub struct ReplayEngine {
    /// The recording being replayed.
    recording: Recording,
    /// Current board.
    state: State,
    /// Turns resolved so far. The board shows the moment before turn
    /// `position + 1` is applied.
    position: u32,
    /// The verdict, once an end-of-game rule has fired.
    verdict: Option<Verdict>,
}

impl ReplayEngine {
    /// Create a replay engine positioned before the first turn.
    ///
    /// # Errors
    ///
    /// [`ReplayError::BadBoard`] when the recorded board text does not
    /// parse.
    pub fn new(recording: Recording) -> Result<Self, ReplayError> {
        let state =
            load_map(&recording.map_text, recording.starting_proteins).map_err(ReplayError::BadBoard)?;
        let verdict = evaluate(&state);
        Ok(Self {
            recording,
            state,
            position: 0,
            verdict,
        })
    }

    /// Create a replay engine positioned after `target` resolved turns.
    ///
    /// # Errors
    ///
    /// [`ReplayError::TurnOutOfBounds`] when `target` exceeds the recorded
    /// match length, or any error the stepping produces.
    pub fn new_at_turn(recording: Recording, target: u32) -> Result<Self, ReplayError> {
        if target > recording.turns {
            return Err(ReplayError::TurnOutOfBounds {
                requested: target,
                last: recording.turns,
            });
        }
        let mut engine = Self::new(recording)?;
        while engine.position < target && engine.verdict.is_none() {
            engine.step_forward()?;
        }
        Ok(engine)
    }

    /// The recording being replayed.
    #[must_use]
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Turns resolved so far.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.position
    }

    /// The current board.
    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// The verdict, once an end-of-game rule has fired.
    #[must_use]
    pub const fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    /// Whether no further forward step is possible: a rule fired or the
    /// log is exhausted.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.verdict.is_some() || self.position >= self.recording.turns
    }

    /// Resolve the next logged turn.
    ///
    /// # Errors
    ///
    /// [`ReplayError::MatchOver`] when a verdict already fired,
    /// [`ReplayError::TurnOutOfBounds`] at the end of the log, and
    /// [`ReplayError::BadAction`] on a corrupt log entry.
    pub fn step_forward(&mut self) -> Result<(), ReplayError> {
        if self.verdict.is_some() {
            return Err(ReplayError::MatchOver);
        }
        if self.position >= self.recording.turns {
            return Err(ReplayError::TurnOutOfBounds {
                requested: self.position + 1,
                last: self.recording.turns,
            });
        }

        let actions = self.actions_for(self.state.turn())?;
        resolve_turn(&mut self.state, &actions);
        self.position += 1;
        self.verdict = evaluate(&self.state);
        Ok(())
    }

    /// Step backward one turn by re-running from the start.
    ///
    /// # Errors
    ///
    /// [`ReplayError::TurnOutOfBounds`] when already at the start, or any
    /// error the re-run produces.
    pub fn step_backward(&mut self) -> Result<(), ReplayError> {
        if self.position == 0 {
            return Err(ReplayError::TurnOutOfBounds {
                requested: 0,
                last: 0,
            });
        }
        let target = self.position - 1;
        self.goto_turn(target)
    }

    /// Jump to a specific position by re-running from the start.
    ///
    /// # Errors
    ///
    /// [`ReplayError::TurnOutOfBounds`] when the target exceeds the
    /// recorded match length, or any error the re-run produces.
    pub fn goto_turn(&mut self, target: u32) -> Result<(), ReplayError> {
        if target > self.recording.turns {
            return Err(ReplayError::TurnOutOfBounds {
                requested: target,
                last: self.recording.turns,
            });
        }
        let recording = self.recording.clone();
        *self = Self::new_at_turn(recording, target)?;
        Ok(())
    }

    /// Render the current board to ASCII for terminal viewing.
    #[must_use]
    pub fn render_ascii(&self) -> String {
        render_ascii(&self.state, self.verdict.as_ref())
    }

    /// Render the current board to structured text for tooling.
    #[must_use]
    pub fn render_llm(&self) -> String {
        render_llm(&self.state, self.verdict.as_ref())
    }

    /// The logged actions for one turn, in application order.
    fn actions_for(&self, turn: u32) -> Result<Vec<Action>, ReplayError> {
        let mut actions = Vec::new();
        for (index, record) in self.recording.actions.iter().enumerate() {
            if record.turn != turn {
                continue;
            }
            let action = record
                .to_action()
                .map_err(|error| ReplayError::BadAction { index, error })?;
            actions.push(action);
        }
        Ok(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::{DEFAULT_STARTING_PROTEINS, builtin_board};
    use crate::protocol::write_turn_input;
    use crate::runner::{run_match, strategy_by_name};
    use crate::game::Player;
    use tempfile::NamedTempFile;

    fn recorded_match(board: &str, one: &str, two: &str) -> (Recording, MatchResult) {
        let map_text = builtin_board(board).unwrap();
        let config = MatchConfig::default();
        let seats = [SeatSpec::new(one, 7), SeatSpec::new(two, 8)];
        let strategies = [
            strategy_by_name(one, 7).unwrap(),
            strategy_by_name(two, 8).unwrap(),
        ];
        let result = run_match(map_text, strategies, &config).unwrap();
        let recording = Recording::from_match(map_text, seats, &config, &result);
        (recording, result)
    }

    fn frame(state: &State) -> String {
        write_turn_input(state, Player::One).join("\n")
    }

    #[test]
    fn test_recording_save_load_roundtrip() {
        let (recording, _) = recorded_match("scarcity", "expander", "idler");

        let temp_file = NamedTempFile::new().expect("create temp file");
        recording.save(temp_file.path()).expect("save recording");
        let loaded = Recording::load(temp_file.path()).expect("load recording");

        assert_eq!(loaded.map_text, recording.map_text);
        assert_eq!(loaded.starting_proteins, recording.starting_proteins);
        assert_eq!(loaded.seats, recording.seats);
        assert_eq!(loaded.turns, recording.turns);
        assert_eq!(loaded.actions, recording.actions);
    }

    #[test]
    fn test_recording_captures_the_match() {
        let (recording, result) = recorded_match("scarcity", "expander", "idler");

        assert_eq!(recording.turns, result.turns);
        assert_eq!(recording.actions.len(), result.actions.len());
        assert!(!recording.actions.is_empty());
        assert_eq!(recording.seats[0].strategy, "expander");
        assert_eq!(recording.seats[1].strategy, "idler");
    }

    #[test]
    fn test_replay_reaches_the_recorded_outcome() {
        let (recording, result) = recorded_match("scarcity", "expander", "idler");

        let mut engine = ReplayEngine::new(recording).unwrap();
        while !engine.is_over() {
            engine.step_forward().unwrap();
        }

        assert_eq!(engine.turn(), result.turns);
        let verdict = engine.verdict().expect("a rule fired during the match");
        assert_eq!(verdict.winner, result.winner);
        assert_eq!(Some(verdict.reason), result.reason);
        for player in Player::ALL {
            assert_eq!(
                engine.state().cell_count(player),
                result.tallies[player].cells
            );
            assert_eq!(engine.state().proteins(player), result.tallies[player].proteins);
        }
    }

    #[test]
    fn test_step_backward_re_simulates() {
        let (recording, _) = recorded_match("meadow", "expander", "forager");

        let mut engine = ReplayEngine::new_at_turn(recording.clone(), 5).unwrap();
        assert_eq!(engine.turn(), 5);
        assert_eq!(engine.state().turn(), 6);

        engine.step_backward().unwrap();
        assert_eq!(engine.turn(), 4);

        let fresh = ReplayEngine::new_at_turn(recording, 4).unwrap();
        assert_eq!(frame(engine.state()), frame(fresh.state()));
    }

    #[test]
    fn test_goto_turn_bounds() {
        let (recording, _) = recorded_match("scarcity", "idler", "idler");
        let last = recording.turns;

        let mut engine = ReplayEngine::new(recording).unwrap();
        let err = engine.goto_turn(last + 1).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::TurnOutOfBounds { requested, .. } if requested == last + 1
        ));

        engine.goto_turn(last).unwrap();
        assert!(engine.is_over());
        assert!(matches!(engine.step_forward().unwrap_err(), ReplayError::MatchOver));
    }

    #[test]
    fn test_corrupt_log_entry_is_reported() {
        let map_text = builtin_board("scarcity").unwrap();
        let mut bogus = ActionRecord::from_action(
            "1-0",
            &Action::Wait {
                player: Player::One,
                turn: 1,
                message: None,
            },
        );
        bogus.action_type = "SLEEP".to_owned();
        let recording = Recording {
            map_text: map_text.to_owned(),
            starting_proteins: DEFAULT_STARTING_PROTEINS,
            seats: [SeatSpec::new("idler", 1), SeatSpec::new("idler", 2)],
            turns: 3,
            actions: vec![bogus],
        };

        let mut engine = ReplayEngine::new(recording).unwrap();
        let err = engine.step_forward().unwrap_err();
        assert!(matches!(err, ReplayError::BadAction { index: 0, .. }));
    }

    #[test]
    fn test_replay_error_display() {
        let err = ReplayError::TurnOutOfBounds {
            requested: 70,
            last: 49,
        };
        assert!(format!("{err}").contains("70"));
        assert!(format!("{err}").contains("49"));

        let err = ReplayError::MatchOver;
        assert!(format!("{err}").contains("over"));
    }
}
