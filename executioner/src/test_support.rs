//! Test-only helpers for building world states, plans and deterministic samplers.

use std::collections::{BTreeMap, VecDeque};

use crate::core::sampler::Sampler;
use crate::core::types::{Action, Location};
use crate::core::world::WorldState;

/// `a` on `b`, `b` and `c` on the table, hand empty.
pub fn three_blocks() -> WorldState {
    state(
        "state1",
        &[("a", "b"), ("b", "table"), ("c", "table")],
        None,
    )
}

/// `block` in hand; the remaining blocks of `a`, `b`, `c` on the table.
pub fn holding_state(block: &str) -> WorldState {
    let positions: Vec<(&str, &str)> = ["a", "b", "c"]
        .into_iter()
        .map(|b| (b, if b == block { "hand" } else { "table" }))
        .collect();
    state("holding", &positions, Some(block))
}

/// Build a valid state from `(block, location)` pairs, deriving clear flags.
pub fn state(name: &str, positions: &[(&str, &str)], holding: Option<&str>) -> WorldState {
    let position: BTreeMap<String, Location> = positions
        .iter()
        .map(|(block, loc)| (block.to_string(), loc.parse().expect("location")))
        .collect();
    let clear = position
        .iter()
        .map(|(block, loc)| {
            let covered = position
                .values()
                .any(|other| matches!(other, Location::Block(below) if below == block));
            (block.clone(), !covered && *loc != Location::Hand)
        })
        .collect();
    WorldState::new(name, position, clear, holding.map(str::to_string)).expect("valid state")
}

/// The plan that turns [`three_blocks`] into the tower `c` on `b` on `a`.
pub fn tower_plan() -> Vec<Action> {
    vec![
        Action::unstack("a", "b"),
        Action::putdown("a"),
        Action::pickup("b"),
        Action::stack("b", "a"),
        Action::pickup("c"),
        Action::stack("c", "b"),
    ]
}

/// Sampler returning a fixed script of samples; panics when exhausted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSampler {
    samples: VecDeque<f64>,
}

impl ScriptedSampler {
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl Sampler for ScriptedSampler {
    fn sample(&mut self) -> f64 {
        self.samples
            .pop_front()
            .expect("scripted sampler exhausted")
    }
}

/// Sampler that always draws `0.0`, forcing every fallible action to fail
/// whenever the probability is above zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFail;

impl Sampler for AlwaysFail {
    fn sample(&mut self) -> f64 {
        0.0
    }
}

/// Sampler that always draws just below `1.0`, so nothing ever fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverFail;

impl Sampler for NeverFail {
    fn sample(&mut self) -> f64 {
        1.0 - f64::EPSILON
    }
}
