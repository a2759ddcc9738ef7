#![no_main]

//! Full turn-resolution fuzzer.
//!
//! Exercises the complete per-turn sequence on a generated board:
//! 1. Apply both players' commands
//! 2. Harvest
//! 3. Wall collisions
//! 4. Overgrowth bonuses
//! 5. Tentacle combat
//! 6. End-of-game evaluation
//!
//! This catches integration bugs the action and board fuzzers miss.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use petri::game::{
    evaluate, resolve_turn, secure_cell_count, total_non_wall_cells, Action, CellKind, Dir, Entity,
    OrganKind, Player, Point, Protein, ProteinCounts, State,
};

/// A fuzzer-generated command.
#[derive(Arbitrary, Debug, Clone)]
enum FuzzCommand {
    /// Grow an organ from some organ id onto some cell.
    Grow {
        organ_id: u8,
        x: u8,
        y: u8,
        kind: u8,
        facing: u8,
    },
    /// Shoot a root from some organ id onto some cell.
    Spore { sporer_id: u8, x: u8, y: u8 },
    /// Do nothing.
    Wait,
}

/// Structured input for turn-resolution fuzzing.
#[derive(Arbitrary, Debug)]
struct TurnInput {
    /// Board width seed.
    width: u8,
    /// Board height seed.
    height: u8,
    /// Wall positions.
    walls: Vec<(u8, u8)>,
    /// Protein source positions and types.
    sources: Vec<(u8, u8, u8)>,
    /// Starting stock, shared by both players.
    stock: [u8; 4],
    /// Commands replayed every turn, alternating players.
    commands: Vec<FuzzCommand>,
    /// Number of turns to resolve.
    turns: u8,
}

fuzz_target!(|input: TurnInput| {
    // Cap the board and the workload to keep cases fast.
    let width = 4 + i32::from(input.width % 13);
    let height = 4 + i32::from(input.height % 9);
    let turns = (input.turns % 8).max(1);
    let commands: Vec<_> = input.commands.into_iter().take(8).collect();

    let Ok(mut state) = State::new(width, height) else {
        return;
    };

    // Both roots sit in opposite corners; terrain never overwrites them.
    let root_one = Point::new(1, 1);
    let root_two = Point::new(width - 2, height - 2);
    state.place(Entity::organ(root_one, OrganKind::Root, Player::One, 1, None, 0, 0));
    state.place(Entity::organ(root_two, OrganKind::Root, Player::Two, 2, None, 0, 0));

    for (x, y) in input.walls.into_iter().take(20) {
        let pos = Point::new(i32::from(x) % width, i32::from(y) % height);
        if pos != root_one && pos != root_two {
            state.place(Entity::wall(pos));
        }
    }
    for (x, y, which) in input.sources.into_iter().take(20) {
        let pos = Point::new(i32::from(x) % width, i32::from(y) % height);
        let protein = Protein::ALL[usize::from(which) % 4];
        if pos != root_one && pos != root_two && state.entity_at(pos).kind == CellKind::Empty {
            state.place(Entity::protein(pos, protein));
        }
    }

    let stock = ProteinCounts::new(
        u32::from(input.stock[0]),
        u32::from(input.stock[1]),
        u32::from(input.stock[2]),
        u32::from(input.stock[3]),
    );
    state.set_proteins(Player::One, stock);
    state.set_proteins(Player::Two, stock);

    let cells = (width * height) as u32;
    let mut last_id = state.next_organ_id();

    for _ in 0..turns {
        let turn = state.turn();
        let batch: Vec<Action> = commands
            .iter()
            .enumerate()
            .map(|(i, cmd)| {
                let player = if i % 2 == 0 { Player::One } else { Player::Two };
                build_action(player, turn, cmd)
            })
            .collect();

        let report = resolve_turn(&mut state, &batch);

        // Resolution is total: rejects are reported, never amplified.
        assert!(report.rejected.len() <= batch.len());
        assert_eq!(report.turn, turn);
        assert_eq!(state.turn(), turn + 1);

        // Ids only move forward, boards never overfill.
        assert!(state.next_organ_id() >= last_id, "organ ids went backwards");
        last_id = state.next_organ_id();
        for player in Player::ALL {
            assert!(
                state.cell_count(player) <= cells,
                "player {player:?} holds more cells than the board"
            );
        }

        // Endgame scans are total over any reachable state.
        let open = total_non_wall_cells(&state);
        for player in Player::ALL {
            assert!(secure_cell_count(&state, player) <= open);
        }
        if evaluate(&state).is_some() {
            break;
        }
    }
});

/// Turn a fuzzer command into an engine action.
fn build_action(player: Player, turn: u32, cmd: &FuzzCommand) -> Action {
    match *cmd {
        FuzzCommand::Grow {
            organ_id,
            x,
            y,
            kind,
            facing,
        } => Action::Grow {
            player,
            turn,
            organ_id: u32::from(organ_id),
            target: Point::new(i32::from(x), i32::from(y)),
            kind: match kind % 4 {
                0 => OrganKind::Basic,
                1 => OrganKind::Harvester,
                2 => OrganKind::Tentacle,
                _ => OrganKind::Sporer,
            },
            facing: match facing % 5 {
                0 => None,
                1 => Some(Dir::North),
                2 => Some(Dir::East),
                3 => Some(Dir::South),
                _ => Some(Dir::West),
            },
            message: None,
        },
        FuzzCommand::Spore { sporer_id, x, y } => Action::Spore {
            player,
            turn,
            sporer_id: u32::from(sporer_id),
            target: Point::new(i32::from(x), i32::from(y)),
            message: None,
        },
        FuzzCommand::Wait => Action::Wait {
            player,
            turn,
            message: None,
        },
    }
}
