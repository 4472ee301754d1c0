//! The blocks-world fact base.

use std::collections::BTreeMap;

use crate::core::error::ConfigError;
use crate::core::invariants::validate_invariants;
use crate::core::types::Location;

/// Block positions, clearness and hand occupancy.
///
/// Fields are only writable inside the crate: all mutation flows through the
/// domain action handlers. Maps are ordered so rendering is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldState {
    pub(crate) name: String,
    pub(crate) position: BTreeMap<String, Location>,
    pub(crate) clear: BTreeMap<String, bool>,
    pub(crate) holding: Option<String>,
}

impl WorldState {
    /// Build a state from caller-supplied facts, rejecting any that break the
    /// world invariants.
    pub fn new(
        name: impl Into<String>,
        position: BTreeMap<String, Location>,
        clear: BTreeMap<String, bool>,
        holding: Option<String>,
    ) -> Result<Self, ConfigError> {
        let state = Self {
            name: name.into(),
            position,
            clear,
            holding,
        };
        let errors = validate_invariants(&state);
        if !errors.is_empty() {
            return Err(ConfigError::InvalidState(errors));
        }
        Ok(state)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self, block: &str) -> Option<&Location> {
        self.position.get(block)
    }

    /// Unknown blocks are never clear.
    pub fn is_clear(&self, block: &str) -> bool {
        self.clear.get(block).copied().unwrap_or(false)
    }

    pub fn holding(&self) -> Option<&str> {
        self.holding.as_deref()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.position.keys().map(String::as_str)
    }

    pub fn positions(&self) -> &BTreeMap<String, Location> {
        &self.position
    }

    pub fn clear_flags(&self) -> &BTreeMap<String, bool> {
        &self.clear
    }

    /// Clear blocks other than `exclude`, in name order.
    pub(crate) fn clear_blocks_except(&self, exclude: &str) -> Vec<String> {
        self.clear
            .iter()
            .filter(|(block, clear)| **clear && block.as_str() != exclude)
            .map(|(block, _)| block.clone())
            .collect()
    }

    /// Render the state under `heading`.
    ///
    /// ```text
    /// <heading> state1:
    ///   - pos = {a: b, b: table, c: table}
    ///   - clear = {a: true, b: false, c: true}
    ///   - holding = {hand: false}
    /// ```
    pub fn display(&self, heading: &str) -> String {
        let pos = self
            .position
            .iter()
            .map(|(block, loc)| format!("{block}: {loc}"))
            .collect::<Vec<_>>()
            .join(", ");
        let clear = self
            .clear
            .iter()
            .map(|(block, clear)| format!("{block}: {clear}"))
            .collect::<Vec<_>>()
            .join(", ");
        let holding = self.holding.as_deref().unwrap_or("false");

        format!(
            "{heading} {name}:\n  - pos = {{{pos}}}\n  - clear = {{{clear}}}\n  - holding = {{hand: {holding}}}",
            name = self.name
        )
    }
}
