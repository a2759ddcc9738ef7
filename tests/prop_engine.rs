//! Property-based tests for the engine invariants.
//!
//! Run with: cargo test --release prop_engine

// Test code unwraps freely.
#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use petri::game::{
    Action, CellKind, Dir, Entity, OrganKind, Player, Point, Protein, ProteinCounts, State,
    TURN_LIMIT, resolve_turn, secure_cell_count, total_non_wall_cells,
};
use petri::maps::builtin_board;
use petri::record::ActionRecord;
use petri::runner::{MatchConfig, run_match, strategy_by_name};

/// An open board with both roots placed in opposite corners and the same
/// stock on both sides.
fn arena(width: i32, height: i32, stock: ProteinCounts) -> State {
    let mut state = State::new(width, height).unwrap();
    state.place(Entity::organ(
        Point::new(0, 0),
        OrganKind::Root,
        Player::One,
        1,
        None,
        0,
        0,
    ));
    state.place(Entity::organ(
        Point::new(width - 1, height - 1),
        OrganKind::Root,
        Player::Two,
        2,
        None,
        0,
        0,
    ));
    state.set_proteins(Player::One, stock);
    state.set_proteins(Player::Two, stock);
    state
}

fn growable_kinds() -> impl Strategy<Value = OrganKind> {
    prop::sample::select(vec![
        OrganKind::Basic,
        OrganKind::Harvester,
        OrganKind::Tentacle,
        OrganKind::Sporer,
    ])
}

fn players() -> impl Strategy<Value = Player> {
    prop::sample::select(vec![Player::One, Player::Two])
}

fn facings() -> impl Strategy<Value = Dir> {
    prop::sample::select(vec![Dir::North, Dir::East, Dir::South, Dir::West])
}

fn points() -> impl Strategy<Value = Point> {
    (0i32..24, 0i32..24).prop_map(|(x, y)| Point::new(x, y))
}

fn action_messages() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-z ]{1,12}")
}

/// Any of the three commands, with arbitrary but plausible fields.
fn actions() -> impl Strategy<Value = Action> {
    let grow = (
        players(),
        1u32..60,
        1u32..20,
        points(),
        growable_kinds(),
        prop::option::of(facings()),
        action_messages(),
    )
        .prop_map(
            |(player, turn, organ_id, target, kind, facing, message)| Action::Grow {
                player,
                turn,
                organ_id,
                target,
                kind,
                facing,
                message,
            },
        );
    let spore = (players(), 1u32..60, 1u32..20, points(), action_messages()).prop_map(
        |(player, turn, sporer_id, target, message)| Action::Spore {
            player,
            turn,
            sporer_id,
            target,
            message,
        },
    );
    let wait = (players(), 1u32..60, action_messages())
        .prop_map(|(player, turn, message)| Action::Wait { player, turn, message });
    prop_oneof![grow, spore, wait]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10000))]

    /// Growing an organ removes exactly its cost from the stock, no more
    /// and no less, and the organ lands on the board.
    #[test]
    fn prop_grow_deducts_the_exact_organ_cost(
        kind in growable_kinds(),
        extra_a in 0u32..4,
        extra_b in 0u32..4,
        extra_c in 0u32..4,
        extra_d in 0u32..4,
    ) {
        let cost = kind.cost();
        let extra = ProteinCounts::new(extra_a, extra_b, extra_c, extra_d);
        let stock = ProteinCounts::new(
            cost.of(Protein::A) + extra_a,
            cost.of(Protein::B) + extra_b,
            cost.of(Protein::C) + extra_c,
            cost.of(Protein::D) + extra_d,
        );
        let mut state = arena(5, 5, stock);

        let action = Action::Grow {
            player: Player::One,
            turn: state.turn(),
            organ_id: 1,
            target: Point::new(1, 0),
            kind,
            facing: Some(Dir::East),
            message: None,
        };
        prop_assert!(state.apply_action(&action).is_ok());
        prop_assert_eq!(state.proteins(Player::One), extra, "leftover stock must be the surplus");
        prop_assert_eq!(state.entity_at(Point::new(1, 0)).kind, kind.cell_kind());
        // The other side pays nothing.
        prop_assert_eq!(state.proteins(Player::Two), stock);
    }

    /// An unaffordable grow is rejected and leaves the board and both
    /// inventories untouched.
    #[test]
    fn prop_grow_with_empty_stock_is_rejected(kind in growable_kinds()) {
        let mut state = arena(5, 5, ProteinCounts::splat(0));
        let action = Action::Grow {
            player: Player::One,
            turn: state.turn(),
            organ_id: 1,
            target: Point::new(1, 0),
            kind,
            facing: None,
            message: None,
        };
        prop_assert!(state.apply_action(&action).is_err());
        prop_assert_eq!(state.entity_at(Point::new(1, 0)).kind, CellKind::Empty);
        prop_assert_eq!(state.proteins(Player::One), ProteinCounts::splat(0));
        prop_assert_eq!(state.cell_count(Player::One), 1);
    }

    /// Turn resolution never panics on arbitrary action batches. Rejected
    /// actions are reported, the counter advances exactly once, and organ
    /// ids never move backwards.
    #[test]
    fn prop_resolve_turn_is_total(
        raw in prop::collection::vec((0u32..8, 0i32..10, 0i32..10, any::<bool>()), 0..8)
    ) {
        let mut state = arena(6, 6, ProteinCounts::splat(9));
        let turn = state.turn();
        let batch: Vec<Action> = raw
            .into_iter()
            .map(|(id, x, y, grow)| {
                if grow {
                    Action::Grow {
                        player: Player::One,
                        turn,
                        organ_id: id,
                        target: Point::new(x, y),
                        kind: OrganKind::Basic,
                        facing: None,
                        message: None,
                    }
                } else {
                    Action::Spore {
                        player: Player::Two,
                        turn,
                        sporer_id: id,
                        target: Point::new(x, y),
                        message: None,
                    }
                }
            })
            .collect();

        let ids_before = state.next_organ_id();
        let report = resolve_turn(&mut state, &batch);

        prop_assert!(report.rejected.len() <= batch.len());
        prop_assert_eq!(report.turn, turn);
        prop_assert_eq!(state.turn(), turn + 1);
        prop_assert!(state.next_organ_id() >= ids_before);
    }

    /// Each grown organ takes a fresh id, strictly above every id already
    /// on the board.
    #[test]
    fn prop_new_organ_ids_climb(steps in 1i32..7) {
        let mut state = arena(10, 1, ProteinCounts::splat(9));
        for x in 1..=steps {
            let tip = state.entity_at(Point::new(x - 1, 0)).organ_id;
            let action = Action::Grow {
                player: Player::One,
                turn: state.turn(),
                organ_id: tip,
                target: Point::new(x, 0),
                kind: OrganKind::Basic,
                facing: None,
                message: None,
            };
            prop_assert!(state.apply_action(&action).is_ok());
        }
        for x in 1..=steps {
            let prev = state.entity_at(Point::new(x - 1, 0)).organ_id;
            let here = state.entity_at(Point::new(x, 0)).organ_id;
            prop_assert!(here > prev, "organ at x={x} has id {here}, its parent {prev}");
        }
        prop_assert_eq!(state.next_organ_id(), state.entity_at(Point::new(steps, 0)).organ_id + 1);
    }

    /// Flood-fill territory never counts more cells than the board has
    /// outside its walls.
    #[test]
    fn prop_secure_cells_stay_within_the_open_board(
        walls in prop::collection::vec((0i32..8, 0i32..6), 0..16)
    ) {
        let mut state = arena(8, 6, ProteinCounts::splat(10));
        for (x, y) in walls {
            let pos = Point::new(x, y);
            if state.entity_at(pos).kind == CellKind::Empty {
                state.place(Entity::wall(pos));
            }
        }
        let open = total_non_wall_cells(&state);
        for player in Player::ALL {
            let secure = secure_cell_count(&state, player);
            prop_assert!(
                secure <= open,
                "player {player:?} secures {secure} of {open} open cells"
            );
        }
    }

    /// A stored action document rebuilds the exact command it captured,
    /// including after a trip through JSON.
    #[test]
    fn prop_action_records_survive_storage(action in actions()) {
        let record = ActionRecord::from_action("doc-1", &action);
        prop_assert_eq!(record.to_action().unwrap(), action.clone());

        let json = serde_json::to_string(&record).unwrap();
        let reloaded: ActionRecord = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&reloaded, &record);
        prop_assert_eq!(reloaded.to_action().unwrap(), action);
    }
}

fn seat_names() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["idler", "expander", "forager"])
}

fn boards() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["meadow", "crossroads", "scarcity"])
}

fn seats(one: &str, two: &str, seed: u64) -> [Box<dyn petri::runner::Strategy>; 2] {
    [
        strategy_by_name(one, seed).unwrap(),
        strategy_by_name(two, seed.wrapping_add(1)).unwrap(),
    ]
}

proptest! {
    // Every case resolves one or two full matches, so these run far fewer
    // cases than the state-level properties above.
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The same board, seats, and seed always produce the same match.
    #[test]
    fn prop_matches_are_deterministic(
        board in boards(),
        one in seat_names(),
        two in seat_names(),
        seed in any::<u64>(),
    ) {
        let text = builtin_board(board).unwrap();
        let config = MatchConfig::default();
        let first = run_match(text, seats(one, two, seed), &config).unwrap();
        let second = run_match(text, seats(one, two, seed), &config).unwrap();

        prop_assert_eq!(first.winner, second.winner);
        prop_assert_eq!(first.reason, second.reason);
        prop_assert_eq!(first.turns, second.turns);
        prop_assert_eq!(first.actions, second.actions);
        for player in Player::ALL {
            prop_assert_eq!(first.tallies[player], second.tallies[player]);
        }
    }

    /// Every match on a bundled board ends by a rule before the safety
    /// cap, and the reported tallies match the final board.
    #[test]
    fn prop_matches_end_by_rule(
        board in boards(),
        one in seat_names(),
        two in seat_names(),
        seed in any::<u64>(),
    ) {
        let text = builtin_board(board).unwrap();
        let config = MatchConfig::default();
        let result = run_match(text, seats(one, two, seed), &config).unwrap();

        prop_assert!(result.reason.is_some(), "the safety cap cut the match");
        prop_assert!(result.turns < TURN_LIMIT);
        for player in Player::ALL {
            prop_assert_eq!(result.tallies[player].cells, result.state.cell_count(player));
            prop_assert_eq!(result.tallies[player].proteins, result.state.proteins(player));
        }
    }
}
