//! Player commands and their wire format.
//!
//! One command is issued per organism per turn. Commands are immutable; the
//! engine applies them through [`crate::game::State::apply_action`].

use crate::error::{GameError, GameResult};
use crate::game::entity::{OrganId, OrganKind};
use crate::game::geometry::{Dir, Point, facing_from_token, facing_token};
use crate::game::player::Player;

/// A player command, bound to the acting player and the turn it was issued
/// on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Grow one organ from an existing organ of the acting player.
    Grow {
        /// Who acts.
        player: Player,
        /// Turn the command was issued on.
        turn: u32,
        /// Source organ to grow from.
        organ_id: OrganId,
        /// Cell to grow into.
        target: Point,
        /// What to grow. Never [`OrganKind::Root`] (that is a spore's job).
        kind: OrganKind,
        /// Requested facing; undirected kinds ignore it.
        facing: Option<Dir>,
        /// Optional banter shown by viewers.
        message: Option<String>,
    },
    /// Shoot a new root from a sporer onto a distant cell.
    Spore {
        /// Who acts.
        player: Player,
        /// Turn the command was issued on.
        turn: u32,
        /// The shooting sporer.
        sporer_id: OrganId,
        /// Cell the new root lands on.
        target: Point,
        /// Optional banter shown by viewers.
        message: Option<String>,
    },
    /// Do nothing this turn.
    Wait {
        /// Who acts.
        player: Player,
        /// Turn the command was issued on.
        turn: u32,
        /// Optional banter shown by viewers.
        message: Option<String>,
    },
}

impl Action {
    /// The acting player.
    #[must_use]
    pub const fn player(&self) -> Player {
        match self {
            Self::Grow { player, .. } | Self::Spore { player, .. } | Self::Wait { player, .. } => {
                *player
            }
        }
    }

    /// The turn the command was issued on.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        match self {
            Self::Grow { turn, .. } | Self::Spore { turn, .. } | Self::Wait { turn, .. } => *turn,
        }
    }

    /// The attached message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Grow { message, .. }
            | Self::Spore { message, .. }
            | Self::Wait { message, .. } => message.as_deref(),
        }
    }

    /// The exact wire line for this command. No trailing space is emitted
    /// when there is no message.
    #[must_use]
    pub fn output(&self) -> String {
        let head = match self {
            Self::Grow {
                organ_id,
                target,
                kind,
                facing,
                ..
            } => format!(
                "GROW {organ_id} {} {} {} {}",
                target.x,
                target.y,
                kind.token(),
                facing_token(*facing)
            ),
            Self::Spore {
                sporer_id, target, ..
            } => format!("SPORE {sporer_id} {} {}", target.x, target.y),
            Self::Wait { .. } => "WAIT".to_string(),
        };
        match self.message() {
            Some(message) => format!("{head} {message}"),
            None => head,
        }
    }

    /// Parse a wire line back into a command. Inverse of [`Self::output`].
    ///
    /// # Errors
    ///
    /// [`GameError::MalformedInput`] (at `line_no`) on an unknown verb, a
    /// missing or non-numeric field, or an unknown type/direction token.
    pub fn parse(line: &str, player: Player, turn: u32, line_no: usize) -> GameResult<Self> {
        let line = line.trim_end();
        let verb = line.split(' ').next().unwrap_or_default();
        match verb {
            "GROW" => {
                let mut parts = line.splitn(7, ' ');
                let _ = parts.next();
                let organ_id = parse_field::<OrganId>(parts.next(), "organ id", line_no)?;
                let x = parse_field::<i32>(parts.next(), "x", line_no)?;
                let y = parse_field::<i32>(parts.next(), "y", line_no)?;
                let kind_token = require_field(parts.next(), "type", line_no)?;
                let kind = OrganKind::from_token(kind_token).ok_or_else(|| {
                    GameError::malformed(line_no, format!("unknown organ type `{kind_token}`"))
                })?;
                let dir_token = require_field(parts.next(), "direction", line_no)?;
                let facing = facing_from_token(dir_token).ok_or_else(|| {
                    GameError::malformed(line_no, format!("unknown direction `{dir_token}`"))
                })?;
                Ok(Self::Grow {
                    player,
                    turn,
                    organ_id,
                    target: Point::new(x, y),
                    kind,
                    facing,
                    message: parts.next().map(str::to_string),
                })
            }
            "SPORE" => {
                let mut parts = line.splitn(5, ' ');
                let _ = parts.next();
                let sporer_id = parse_field::<OrganId>(parts.next(), "sporer id", line_no)?;
                let x = parse_field::<i32>(parts.next(), "x", line_no)?;
                let y = parse_field::<i32>(parts.next(), "y", line_no)?;
                Ok(Self::Spore {
                    player,
                    turn,
                    sporer_id,
                    target: Point::new(x, y),
                    message: parts.next().map(str::to_string),
                })
            }
            "WAIT" => {
                let mut parts = line.splitn(2, ' ');
                let _ = parts.next();
                Ok(Self::Wait {
                    player,
                    turn,
                    message: parts.next().map(str::to_string),
                })
            }
            other => Err(GameError::malformed(
                line_no,
                format!("unknown action verb `{other}`"),
            )),
        }
    }
}

fn require_field<'a>(field: Option<&'a str>, name: &str, line_no: usize) -> GameResult<&'a str> {
    match field {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(GameError::malformed(line_no, format!("missing {name}"))),
    }
}

fn parse_field<T: std::str::FromStr>(
    field: Option<&str>,
    name: &str,
    line_no: usize,
) -> GameResult<T> {
    let raw = require_field(field, name, line_no)?;
    raw.parse().map_err(|_| {
        GameError::malformed(line_no, format!("{name} is not a number: `{raw}`"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grow_output_format() {
        let action = Action::Grow {
            player: Player::One,
            turn: 3,
            organ_id: 7,
            target: Point::new(4, 2),
            kind: OrganKind::Tentacle,
            facing: Some(Dir::North),
            message: None,
        };
        assert_eq!(action.output(), "GROW 7 4 2 TENTACLE N");
    }

    #[test]
    fn test_output_has_no_trailing_space_without_message() {
        let wait = Action::Wait {
            player: Player::Two,
            turn: 1,
            message: None,
        };
        assert_eq!(wait.output(), "WAIT");

        let spore = Action::Spore {
            player: Player::One,
            turn: 9,
            sporer_id: 12,
            target: Point::new(10, 0),
            message: None,
        };
        assert_eq!(spore.output(), "SPORE 12 10 0");
    }

    #[test]
    fn test_output_appends_message() {
        let action = Action::Wait {
            player: Player::One,
            turn: 1,
            message: Some("biding time".to_string()),
        };
        assert_eq!(action.output(), "WAIT biding time");
    }

    #[test]
    fn test_parse_round_trips_output() {
        let actions = [
            Action::Grow {
                player: Player::Two,
                turn: 5,
                organ_id: 3,
                target: Point::new(1, 6),
                kind: OrganKind::Harvester,
                facing: Some(Dir::West),
                message: Some("nom".to_string()),
            },
            Action::Grow {
                player: Player::One,
                turn: 2,
                organ_id: 1,
                target: Point::new(2, 2),
                kind: OrganKind::Basic,
                facing: None,
                message: None,
            },
            Action::Spore {
                player: Player::One,
                turn: 11,
                sporer_id: 8,
                target: Point::new(0, 4),
                message: None,
            },
            Action::Wait {
                player: Player::Two,
                turn: 50,
                message: Some("gg".to_string()),
            },
        ];
        for action in actions {
            let parsed =
                Action::parse(&action.output(), action.player(), action.turn(), 1).unwrap();
            assert_eq!(parsed, action);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Action::parse("SLEEP", Player::One, 1, 1).is_err());
        assert!(Action::parse("GROW 1 2", Player::One, 1, 1).is_err());
        assert!(Action::parse("GROW x 2 3 BASIC X", Player::One, 1, 1).is_err());
        assert!(Action::parse("GROW 1 2 3 BLOB X", Player::One, 1, 1).is_err());
        assert!(Action::parse("GROW 1 2 3 BASIC Q", Player::One, 1, 1).is_err());
        assert!(Action::parse("SPORE 1", Player::One, 1, 1).is_err());
    }

    #[test]
    fn test_parse_keeps_message_spacing() {
        let parsed = Action::parse("WAIT thinking about lunch", Player::One, 4, 1).unwrap();
        assert_eq!(parsed.message(), Some("thinking about lunch"));
        assert_eq!(parsed.output(), "WAIT thinking about lunch");
    }
}
