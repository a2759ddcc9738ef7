// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Petri: a deterministic engine for a two-player organism battle game.
//!
//! Two organisms grow organ by organ across a shared grid, harvest
//! proteins, and attack with tentacles until one side is wiped out, locks
//! down the board, or outgrows the other at the turn limit. The whole
//! pipeline is deterministic: identical inputs replay to identical
//! matches.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     Match Runner / Replay / CLI     │
//! ├─────────────────────────────────────┤
//! │         Rules Core (game)           │
//! ├─────────────────────────────────────┤
//! │   Wire Protocol / Board Files       │
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod game;
pub mod maps;
pub mod protocol;
pub mod record;
pub mod replay;
pub mod runner;

pub use error::{GameError, GameResult, InvalidAction};

// Re-export key game types at crate root for convenience
pub use game::{
    Action, CellKind, Dir, EndReason, Entity, OrganKind, Player, Point, Protein, ProteinCounts,
    State, Verdict, evaluate, resolve_turn,
};
