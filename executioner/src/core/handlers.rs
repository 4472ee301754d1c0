//! Domain action handlers for the blocks world.
//!
//! Each handler checks every precondition before touching the state, so a
//! precondition violation never mutates it. `injected_failure` selects the
//! divergent branch for the two fallible kinds:
//!
//! - `pickup` diverges by doing nothing (failed grasp).
//! - `stack` diverges by placing the block on a wrong clear spot (failed
//!   placement). The block still lands somewhere valid.

use tracing::info;

use crate::core::error::{ActionError, require};
use crate::core::sampler::Sampler;
use crate::core::types::Location;
use crate::core::world::WorldState;

/// `pickup(x)`: take a clear block off the table with an empty hand.
pub fn pickup(state: &mut WorldState, x: &str, injected_failure: bool) -> Result<(), ActionError> {
    require(state.position(x) == Some(&Location::Table), || {
        format!("pickup({x}): block '{x}' is not on the table")
    })?;
    require(state.is_clear(x), || {
        format!("pickup({x}): block '{x}' is not clear")
    })?;
    require(state.holding.is_none(), || {
        format!("pickup({x}): hand is not empty")
    })?;

    if injected_failure {
        return Err(ActionError::ExecutionFailure(format!(
            "no object detected in hand after pickup of {x}"
        )));
    }

    take_into_hand(state, x);
    Ok(())
}

/// `unstack(b1, b2)`: lift a clear block off the block it rests on.
pub fn unstack(state: &mut WorldState, b1: &str, b2: &str) -> Result<(), ActionError> {
    require(b2 != "table", || {
        format!("unstack({b1}, {b2}): cannot unstack from the table")
    })?;
    require(state.position(b1) == Some(&Location::block(b2)), || {
        format!("unstack({b1}, {b2}): block '{b1}' is not on '{b2}'")
    })?;
    require(state.is_clear(b1), || {
        format!("unstack({b1}, {b2}): block '{b1}' is not clear")
    })?;
    require(state.holding.is_none(), || {
        format!("unstack({b1}, {b2}): hand is not empty")
    })?;

    take_into_hand(state, b1);
    state.clear.insert(b2.to_string(), true);
    Ok(())
}

/// `putdown(b1)`: place the held block on the table.
pub fn putdown(state: &mut WorldState, b1: &str) -> Result<(), ActionError> {
    require(state.position(b1) == Some(&Location::Hand), || {
        format!("putdown({b1}): block '{b1}' is not in hand")
    })?;

    release_onto(state, b1, Location::Table);
    Ok(())
}

/// `stack(b1, b2)`: place the held block on a clear block.
///
/// On injected failure the block is placed on a uniformly chosen clear block
/// other than `b2` (or the table when there is none) and the failure is
/// reported after the state has changed.
pub fn stack(
    state: &mut WorldState,
    b1: &str,
    b2: &str,
    injected_failure: bool,
    sampler: &mut dyn Sampler,
) -> Result<(), ActionError> {
    require(state.position(b1) == Some(&Location::Hand), || {
        format!("stack({b1}, {b2}): block '{b1}' is not in hand")
    })?;
    require(state.is_clear(b2), || {
        format!("stack({b1}, {b2}): block '{b2}' is not clear")
    })?;

    if !injected_failure {
        release_onto(state, b1, Location::block(b2));
        return Ok(());
    }

    let target = wrong_target(state, b2, sampler);
    info!(block = b1, intended = b2, actual = %target, "stack diverged");
    release_onto(state, b1, target);
    Err(ActionError::ExecutionFailure(format!(
        "unexpected stack height after stack({b1}, {b2}): the stack height of '{b2}' did not increase"
    )))
}

/// A clear block other than `exclude`, chosen uniformly; the table if none.
fn wrong_target(state: &WorldState, exclude: &str, sampler: &mut dyn Sampler) -> Location {
    let candidates = state.clear_blocks_except(exclude);
    if candidates.is_empty() {
        return Location::Table;
    }
    let index = sampler.choose_index(candidates.len());
    Location::Block(candidates[index].clone())
}

fn take_into_hand(state: &mut WorldState, block: &str) {
    state.position.insert(block.to_string(), Location::Hand);
    state.clear.insert(block.to_string(), false);
    state.holding = Some(block.to_string());
}

fn release_onto(state: &mut WorldState, block: &str, target: Location) {
    if let Location::Block(below) = &target {
        state.clear.insert(below.clone(), false);
    }
    state.position.insert(block.to_string(), target);
    state.clear.insert(block.to_string(), true);
    state.holding = None;
}
