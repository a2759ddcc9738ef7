#![no_main]

use libfuzzer_sys::fuzz_target;
use petri::game::{Action, Player};

fuzz_target!(|line: &str| {
    // The parser sees raw strategy output; it must never panic.
    let Ok(action) = Action::parse(line, Player::One, 1, 0) else {
        return;
    };

    // Whatever parsed must print back to a line the parser accepts, and
    // the printed form must be a fixed point.
    let wire = action.output();
    let reparsed = Action::parse(&wire, Player::One, 1, 0)
        .unwrap_or_else(|e| panic!("own output {wire:?} rejected: {e}"));
    assert_eq!(
        reparsed.output(),
        wire,
        "printing is not stable for {line:?}"
    );

    // The stored form must also survive a round trip.
    let record = petri::record::ActionRecord::from_action("fuzz", &action);
    let rebuilt = record
        .to_action()
        .unwrap_or_else(|e| panic!("own record for {wire:?} rejected: {e:?}"));
    assert_eq!(rebuilt, action);
});
