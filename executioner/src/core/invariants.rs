//! World-state invariants that must hold around every applied action.

use crate::core::types::Location;
use crate::core::world::WorldState;

/// Check the blocks-world invariants:
/// - `position` and `clear` describe the same set of blocks
/// - `table`/`hand` are never used as block names
/// - at most one block is in the hand, and it is the one `holding` names
/// - a block is clear iff nothing rests on it and it is not held
/// - every block a position refers to is known
pub fn validate_invariants(state: &WorldState) -> Vec<String> {
    let mut errors = Vec::new();

    for block in state.position.keys() {
        if !state.clear.contains_key(block) {
            errors.push(format!("{}: missing clear flag", block));
        }
        if block == "table" || block == "hand" {
            errors.push(format!("'{}' is a location, not a block", block));
        }
    }
    for block in state.clear.keys() {
        if !state.position.contains_key(block) {
            errors.push(format!("{}: clear flag for unknown block", block));
        }
    }

    let in_hand: Vec<&String> = state
        .position
        .iter()
        .filter(|(_, loc)| **loc == Location::Hand)
        .map(|(block, _)| block)
        .collect();
    match (in_hand.as_slice(), state.holding.as_ref()) {
        ([], None) => {}
        ([held], Some(holding)) if *held == holding => {}
        ([], Some(holding)) => errors.push(format!(
            "hand holds '{}' but no block is positioned in the hand",
            holding
        )),
        (blocks, holding) => errors.push(format!(
            "blocks in hand {:?} disagree with holding {:?}",
            blocks, holding
        )),
    }

    for (block, loc) in &state.position {
        if let Location::Block(below) = loc {
            if below == block {
                errors.push(format!("{}: rests on itself", block));
            } else if !state.position.contains_key(below) {
                errors.push(format!("{}: rests on unknown block '{}'", block, below));
            }
        }
    }

    for (block, clear) in &state.clear {
        let covered = state
            .position
            .values()
            .any(|loc| matches!(loc, Location::Block(below) if below == block));
        let held = state.position.get(block) == Some(&Location::Hand);
        let expected = !covered && !held;
        if *clear != expected {
            errors.push(format!(
                "{}: clear is {} but should be {}",
                block, clear, expected
            ));
        }
    }

    errors
}
