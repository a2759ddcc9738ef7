//! Error types for the engine.
//!
//! Three categories cross the public boundary: malformed input (fatal for
//! the frame being parsed), rejected actions (the state is untouched), and
//! unaffordable actions (all-or-nothing, nothing is deducted).

use std::fmt;

use crate::game::entity::{OrganId, OrganKind};
use crate::game::geometry::Point;

/// Why an action was rejected. The state is never mutated by a rejected
/// action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidAction {
    /// Roots are grown by spores, never by GROW.
    RootViaGrow,
    /// The target cell is outside the board.
    OutOfBounds {
        /// The rejected target.
        target: Point,
    },
    /// The target cell is defended by an opponent tentacle facing it.
    Defended {
        /// The rejected target.
        target: Point,
    },
    /// No organ with the given id exists.
    UnknownOrgan {
        /// The id that matched nothing.
        organ_id: OrganId,
    },
    /// The source organ belongs to the other player.
    NotYourOrgan {
        /// The foreign organ's id.
        organ_id: OrganId,
    },
    /// The target cell is occupied by a live owned entity.
    Occupied {
        /// The rejected target.
        target: Point,
    },
}

impl fmt::Display for InvalidAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootViaGrow => write!(f, "cannot grow a new root, use a spore"),
            Self::OutOfBounds { target } => write!(f, "target {target} is outside the board"),
            Self::Defended { target } => {
                write!(f, "target {target} is defended by an opponent tentacle")
            }
            Self::UnknownOrgan { organ_id } => write!(f, "no organ with id {organ_id}"),
            Self::NotYourOrgan { organ_id } => {
                write!(f, "organ {organ_id} belongs to the other player")
            }
            Self::Occupied { target } => {
                write!(f, "target {target} is occupied by another organ")
            }
        }
    }
}

impl std::error::Error for InvalidAction {}

/// Any error the engine surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A raw input line could not be parsed. Fatal for the frame.
    MalformedInput {
        /// 1-based line number within the frame or file.
        line: usize,
        /// What went wrong.
        reason: String,
    },
    /// An action failed validation and was not applied.
    InvalidAction(InvalidAction),
    /// The acting player cannot afford the organ. Nothing was deducted.
    InsufficientResources {
        /// The organ kind that was too expensive.
        kind: OrganKind,
    },
}

impl GameError {
    /// Build a malformed-input error.
    #[must_use]
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput { line, reason } => {
                write!(f, "malformed input at line {line}: {reason}")
            }
            Self::InvalidAction(invalid) => write!(f, "invalid action: {invalid}"),
            Self::InsufficientResources { kind } => {
                write!(f, "not enough proteins to grow a {}", kind.token())
            }
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidAction(invalid) => Some(invalid),
            _ => None,
        }
    }
}

impl From<InvalidAction> for GameError {
    fn from(invalid: InvalidAction) -> Self {
        Self::InvalidAction(invalid)
    }
}

/// Result alias used throughout the engine.
pub type GameResult<T> = Result<T, GameError>;
