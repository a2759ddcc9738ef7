//! Hosting-layer document shapes.
//!
//! The engine runs under a session host that stores games and actions as
//! JSON documents. These types mirror those documents field for field
//! (camelCase on the wire) so a stored action replays losslessly and a
//! stored game carries a full turn frame.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::game::{
    Action, OrganId, OrganKind, Player, Point, State, facing_from_token,
};
use crate::protocol::write_turn_input;

/// Why a stored record could not be turned back into an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A field the action type requires was absent.
    MissingField {
        /// The absent field's wire name.
        field: &'static str,
    },
    /// The stored action type is not `GROW`, `SPORE`, or `WAIT`.
    UnknownActionType(String),
    /// The stored player id is not a player wire id.
    BadPlayer(i32),
    /// The stored organ type token is unknown.
    UnknownOrganType(String),
    /// The stored direction token is unknown.
    UnknownDirection(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "record is missing `{field}`"),
            Self::UnknownActionType(verb) => write!(f, "unknown action type `{verb}`"),
            Self::BadPlayer(id) => write!(f, "`{id}` is not a player wire id"),
            Self::UnknownOrganType(token) => write!(f, "unknown organ type `{token}`"),
            Self::UnknownDirection(token) => write!(f, "unknown direction `{token}`"),
        }
    }
}

impl std::error::Error for RecordError {}

/// One stored action document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    /// Document id, assigned by the store.
    pub id: String,
    /// `GROW`, `SPORE`, or `WAIT`.
    pub action_type: String,
    /// Wire id of the acting player.
    pub player_id: i32,
    /// Turn the action was issued on.
    pub turn: u32,
    /// Facing token, present when the action carries one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub direction: Option<String>,
    /// Source organ (GROW) or shooting sporer (SPORE).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub organ_id: Option<OrganId>,
    /// Target column, for GROW and SPORE.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub x: Option<i32>,
    /// Target row, for GROW and SPORE.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub y: Option<i32>,
    /// Organ type token: what a GROW grows. A SPORE always plants ROOT.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<String>,
    /// Banter attached to the action.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl ActionRecord {
    /// Capture an action as a storable document.
    #[must_use]
    pub fn from_action(id: impl Into<String>, action: &Action) -> Self {
        let base = Self {
            id: id.into(),
            action_type: String::new(),
            player_id: action.player().wire(),
            turn: action.turn(),
            direction: None,
            organ_id: None,
            x: None,
            y: None,
            kind: None,
            message: action.message().map(str::to_owned),
        };
        match action {
            Action::Grow {
                organ_id,
                target,
                kind,
                facing,
                ..
            } => Self {
                action_type: "GROW".to_owned(),
                direction: facing.map(|dir| dir.token().to_owned()),
                organ_id: Some(*organ_id),
                x: Some(target.x),
                y: Some(target.y),
                kind: Some(kind.token().to_owned()),
                ..base
            },
            Action::Spore {
                sporer_id, target, ..
            } => Self {
                action_type: "SPORE".to_owned(),
                organ_id: Some(*sporer_id),
                x: Some(target.x),
                y: Some(target.y),
                kind: Some(OrganKind::Root.token().to_owned()),
                ..base
            },
            Action::Wait { .. } => Self {
                action_type: "WAIT".to_owned(),
                ..base
            },
        }
    }

    /// Rebuild the action this record stores. Inverse of
    /// [`Self::from_action`].
    ///
    /// # Errors
    ///
    /// [`RecordError`] when the record is internally inconsistent: an
    /// unknown action type, a wire id that is not a player, or a
    /// GROW/SPORE missing its organ, coordinates, or type.
    pub fn to_action(&self) -> Result<Action, RecordError> {
        let player =
            Player::from_wire(self.player_id).ok_or(RecordError::BadPlayer(self.player_id))?;
        let message = self.message.clone();
        match self.action_type.as_str() {
            "GROW" => {
                let organ_id = self.require(self.organ_id, "organId")?;
                let target = self.require_target()?;
                let kind_token = self
                    .kind
                    .as_deref()
                    .ok_or(RecordError::MissingField { field: "type" })?;
                let kind = OrganKind::from_token(kind_token)
                    .ok_or_else(|| RecordError::UnknownOrganType(kind_token.to_owned()))?;
                let facing = match self.direction.as_deref() {
                    None => None,
                    Some(token) => facing_from_token(token)
                        .ok_or_else(|| RecordError::UnknownDirection(token.to_owned()))?,
                };
                Ok(Action::Grow {
                    player,
                    turn: self.turn,
                    organ_id,
                    target,
                    kind,
                    facing,
                    message,
                })
            }
            "SPORE" => Ok(Action::Spore {
                player,
                turn: self.turn,
                sporer_id: self.require(self.organ_id, "organId")?,
                target: self.require_target()?,
                message,
            }),
            "WAIT" => Ok(Action::Wait {
                player,
                turn: self.turn,
                message,
            }),
            other => Err(RecordError::UnknownActionType(other.to_owned())),
        }
    }

    fn require<T>(&self, field: Option<T>, name: &'static str) -> Result<T, RecordError> {
        field.ok_or(RecordError::MissingField { field: name })
    }

    fn require_target(&self) -> Result<Point, RecordError> {
        let x = self.require(self.x, "x")?;
        let y = self.require(self.y, "y")?;
        Ok(Point::new(x, y))
    }
}

/// A per-player flag pair, keyed the way the session documents key them:
/// an object with `"0"` and `"1"` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerFlags {
    /// Player one's flag.
    #[serde(rename = "0")]
    pub one: bool,
    /// Player two's flag.
    #[serde(rename = "1")]
    pub two: bool,
}

impl PlayerFlags {
    /// Both flags set the same way.
    #[must_use]
    pub const fn splat(value: bool) -> Self {
        Self {
            one: value,
            two: value,
        }
    }

    /// The flag for one player.
    #[must_use]
    pub const fn get(self, player: Player) -> bool {
        match player {
            Player::One => self.one,
            Player::Two => self.two,
        }
    }

    /// Set the flag for one player.
    pub const fn set(&mut self, player: Player, value: bool) {
        match player {
            Player::One => self.one = value,
            Player::Two => self.two = value,
        }
    }
}

/// One stored game document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Document id.
    pub id: String,
    /// Board seed or bundled board name the game was set up from.
    pub seed: String,
    /// Session mode label.
    pub mode: String,
    /// Session key to player slot (wire id) assignments.
    pub player_ids: BTreeMap<String, i32>,
    /// Which slots have a connected session.
    pub connected_players: PlayerFlags,
    /// Which slots the host still expects an action from.
    pub waiting_for_actions: PlayerFlags,
    /// Turn counter at capture time.
    pub turn: u32,
    /// Winner's wire id. Absent while running and on a draw.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub winner: Option<i32>,
    /// Capture time, seconds since the Unix epoch.
    pub created_at: u64,
    /// The full turn frame, rendered for player one.
    pub serialized_state: String,
    /// Name of the scripted opponent, when one is seated.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bot_name: Option<String>,
}

impl GameRecord {
    /// Capture the current game as a storable document. Session fields
    /// (player keys, connection flags, winner, bot name) start at their
    /// just-created defaults; the host fills them in.
    #[must_use]
    pub fn capture(
        state: &State,
        id: impl Into<String>,
        seed: impl Into<String>,
        mode: impl Into<String>,
    ) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            id: id.into(),
            seed: seed.into(),
            mode: mode.into(),
            player_ids: BTreeMap::new(),
            connected_players: PlayerFlags::splat(false),
            waiting_for_actions: PlayerFlags::splat(true),
            turn: state.turn(),
            winner: None,
            created_at,
            serialized_state: write_turn_input(state, Player::One).join("\n"),
            bot_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Dir;
    use crate::maps::{DEFAULT_STARTING_PROTEINS, builtin_board, load_map};

    fn sample_actions() -> [Action; 4] {
        [
            Action::Grow {
                player: Player::One,
                turn: 3,
                organ_id: 7,
                target: Point::new(4, 2),
                kind: OrganKind::Tentacle,
                facing: Some(Dir::North),
                message: Some("en garde".to_owned()),
            },
            Action::Grow {
                player: Player::Two,
                turn: 8,
                organ_id: 2,
                target: Point::new(1, 1),
                kind: OrganKind::Basic,
                facing: None,
                message: None,
            },
            Action::Spore {
                player: Player::Two,
                turn: 12,
                sporer_id: 9,
                target: Point::new(10, 0),
                message: None,
            },
            Action::Wait {
                player: Player::One,
                turn: 50,
                message: Some("gg".to_owned()),
            },
        ]
    }

    #[test]
    fn test_action_records_round_trip() {
        for action in sample_actions() {
            let record = ActionRecord::from_action("doc-1", &action);
            assert_eq!(record.to_action().unwrap(), action);

            let json = serde_json::to_string(&record).unwrap();
            let reloaded: ActionRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(reloaded, record);
            assert_eq!(reloaded.to_action().unwrap(), action);
        }
    }

    #[test]
    fn test_action_record_wire_shape() {
        let [grow, undirected, spore, wait] = sample_actions();

        let value = serde_json::to_value(ActionRecord::from_action("a", &grow)).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["actionType"], "GROW");
        assert_eq!(object["playerId"], 0);
        assert_eq!(object["organId"], 7);
        assert_eq!(object["type"], "TENTACLE");
        assert_eq!(object["direction"], "N");
        assert!(!object.contains_key("kind"));

        let value = serde_json::to_value(ActionRecord::from_action("b", &undirected)).unwrap();
        assert!(!value.as_object().unwrap().contains_key("direction"));
        assert!(!value.as_object().unwrap().contains_key("message"));

        let value = serde_json::to_value(ActionRecord::from_action("c", &spore)).unwrap();
        assert_eq!(value.as_object().unwrap()["type"], "ROOT");

        let value = serde_json::to_value(ActionRecord::from_action("d", &wait)).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("x"));
        assert!(!object.contains_key("y"));
        assert!(!object.contains_key("organId"));
        assert_eq!(object["message"], "gg");
    }

    #[test]
    fn test_to_action_rejects_inconsistent_records() {
        let grow = ActionRecord::from_action("a", &sample_actions()[0]);

        let mut bad = grow.clone();
        bad.player_id = 5;
        assert_eq!(bad.to_action().unwrap_err(), RecordError::BadPlayer(5));

        let mut bad = grow.clone();
        bad.x = None;
        assert_eq!(
            bad.to_action().unwrap_err(),
            RecordError::MissingField { field: "x" }
        );

        let mut bad = grow.clone();
        bad.kind = Some("BLOB".to_owned());
        assert_eq!(
            bad.to_action().unwrap_err(),
            RecordError::UnknownOrganType("BLOB".to_owned())
        );

        let mut bad = grow.clone();
        bad.direction = Some("Q".to_owned());
        assert_eq!(
            bad.to_action().unwrap_err(),
            RecordError::UnknownDirection("Q".to_owned())
        );

        let mut bad = grow;
        bad.action_type = "SLEEP".to_owned();
        assert_eq!(
            bad.to_action().unwrap_err(),
            RecordError::UnknownActionType("SLEEP".to_owned())
        );
    }

    #[test]
    fn test_explicit_x_direction_reads_as_undirected() {
        let mut record = ActionRecord::from_action("a", &sample_actions()[1]);
        record.direction = Some("X".to_owned());
        let Action::Grow { facing, .. } = record.to_action().unwrap() else {
            panic!("expected a grow");
        };
        assert_eq!(facing, None);
    }

    #[test]
    fn test_game_record_round_trips_json() {
        let state = load_map(builtin_board("scarcity").unwrap(), DEFAULT_STARTING_PROTEINS)
            .unwrap();
        let mut record = GameRecord::capture(&state, "game-1", "scarcity", "local");
        record.player_ids.insert("session-a".to_owned(), 0);
        record.player_ids.insert("session-b".to_owned(), 1);
        record.connected_players.set(Player::One, true);
        record.winner = Some(1);
        record.bot_name = Some("idler".to_owned());

        let json = serde_json::to_string_pretty(&record).unwrap();
        let reloaded: GameRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, record);
    }

    #[test]
    fn test_game_record_wire_shape() {
        let state = load_map(builtin_board("scarcity").unwrap(), DEFAULT_STARTING_PROTEINS)
            .unwrap();
        let record = GameRecord::capture(&state, "game-1", "scarcity", "local");

        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["connectedPlayers"]["0"], false);
        assert_eq!(object["waitingForActions"]["1"], true);
        assert!(object.contains_key("serializedState"));
        assert!(object.contains_key("createdAt"));
        assert!(!object.contains_key("winner"));
        assert!(!object.contains_key("botName"));
    }

    #[test]
    fn test_captured_frame_reloads_into_the_engine() {
        let state = load_map(builtin_board("meadow").unwrap(), DEFAULT_STARTING_PROTEINS)
            .unwrap();
        let record = GameRecord::capture(&state, "game-1", "meadow", "local");

        let mut replayed = State::new(state.width(), state.height()).unwrap();
        let mut lines = crate::protocol::LineReader::new(&record.serialized_state);
        replayed.refresh_state(&mut lines).unwrap();

        assert_eq!(replayed.cell_count(Player::One), 1);
        assert_eq!(replayed.cell_count(Player::Two), 1);
        assert_eq!(replayed.proteins(Player::One), DEFAULT_STARTING_PROTEINS);
        assert_eq!(replayed.required_actions(), 1);
    }
}
