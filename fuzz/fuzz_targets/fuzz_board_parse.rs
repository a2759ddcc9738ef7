#![no_main]

use libfuzzer_sys::fuzz_target;
use petri::maps::{load_map, DEFAULT_STARTING_PROTEINS, MapSummary};

fuzz_target!(|text: &str| {
    // Parsing must reject garbage with an error, never a panic.
    let Ok(state) = load_map(text, DEFAULT_STARTING_PROTEINS) else {
        return;
    };

    // Anything that parsed must describe a coherent board.
    let width = state.width();
    let height = state.height();
    assert!(width > 0 && height > 0, "parsed board has no area");
    let cells = (width as u32) * (height as u32);

    let summary = MapSummary::of(&state);
    assert_eq!(summary.width, width);
    assert_eq!(summary.height, height);
    assert!(
        summary.walls + summary.proteins + summary.roots_one + summary.roots_two <= cells,
        "summary counts more cells than the board holds"
    );

    // Every organ on a parsed board sits below the next free id.
    for entity in state.entities() {
        if entity.is_organ() {
            assert!(
                entity.organ_id < state.next_organ_id(),
                "organ id {} not below next id {}",
                entity.organ_id,
                state.next_organ_id()
            );
        }
    }

    // Symmetry detection walks the whole board; it must be total.
    let _ = state.is_symmetric();
});
