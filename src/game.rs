//! Rules core for the organism battle game.
//!
//! Implements the simulation layer:
//! - Board geometry and facing directions
//! - The cell/organ entity model and protein ledgers
//! - The authoritative state with action application
//! - The ordered turn resolution pipeline
//! - End-of-game evaluation with secure-territory scoring

pub mod action;
pub mod endgame;
pub mod entity;
pub mod geometry;
pub mod player;
pub mod state;
pub mod turn;

pub use action::Action;
pub use endgame::{
    EndReason, TURN_LIMIT, Verdict, can_grow_any_organ, can_sustain_growth, evaluate,
    secure_cell_count, supports_growth, total_non_wall_cells,
};
pub use entity::{CellKind, Entity, Ghost, HarvestMask, OrganId, OrganKind};
pub use geometry::{Dir, Point, direction_between, facing_from_token, facing_token};
pub use player::{PerPlayer, Player, Protein, ProteinCounts, owner_from_wire, owner_wire};
pub use state::{BonusReport, CombatReport, HarvestReport, MAX_DIM, State, WallReport};
pub use turn::{RejectedAction, TurnReport, cells_lost, resolve_turn};
