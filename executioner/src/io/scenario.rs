//! Scenario files: an initial world state plus the plan to run against it.
//!
//! ```toml
//! plan = [["unstack", "a", "b"], ["putdown", "a"]]
//!
//! [state]
//! name = "state1"
//!
//! [state.position]
//! a = "b"
//! b = "table"
//!
//! [state.clear]
//! a = true
//! b = false
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{Action, Location};
use crate::core::world::WorldState;
use crate::io::config::write_atomic;

/// On-disk form of a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioFile {
    /// Planner tuples, e.g. `["stack", "b", "a"]`.
    pub plan: Vec<Vec<String>>,
    pub state: StateFacts,
}

/// Raw world facts as a caller supplies them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateFacts {
    pub name: String,
    /// Held block; absent when the hand is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holding: Option<String>,
    pub position: BTreeMap<String, String>,
    pub clear: BTreeMap<String, bool>,
}

/// A parsed, validated scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub state: WorldState,
    pub plan: Vec<Action>,
}

impl ScenarioFile {
    /// Validate the facts and parse every plan entry.
    pub fn into_scenario(self) -> Result<Scenario> {
        let position = self
            .state
            .position
            .iter()
            .map(|(block, loc)| (block.clone(), Location::from(loc.as_str())))
            .collect();
        let state = WorldState::new(
            self.state.name,
            position,
            self.state.clear,
            self.state.holding,
        )?;

        let plan = self
            .plan
            .iter()
            .enumerate()
            .map(|(index, parts)| {
                Action::from_parts(parts).map_err(|err| anyhow!("plan step {}: {}", index + 1, err))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Scenario { state, plan })
    }

    pub fn from_scenario(scenario: &Scenario) -> Self {
        let state = &scenario.state;
        Self {
            plan: scenario.plan.iter().map(Action::to_parts).collect(),
            state: StateFacts {
                name: state.name().to_string(),
                holding: state.holding().map(str::to_string),
                position: state
                    .positions()
                    .iter()
                    .map(|(block, loc)| (block.clone(), loc.to_string()))
                    .collect(),
                clear: state.clear_flags().clone(),
            },
        }
    }
}

/// Load and validate a scenario from a TOML file.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    debug!(path = %path.display(), "loading scenario");
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let file: ScenarioFile =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    let scenario = file
        .into_scenario()
        .with_context(|| format!("validate {}", path.display()))?;
    debug!(actions = scenario.plan.len(), "scenario loaded");
    Ok(scenario)
}

/// Atomically write a scenario to disk.
pub fn write_scenario(path: &Path, scenario: &Scenario) -> Result<()> {
    let mut buf = toml::to_string_pretty(&ScenarioFile::from_scenario(scenario))
        .context("serialize scenario toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

/// Three blocks, `a` on `b`, and the plan that builds `c` on `b` on `a`.
pub fn sample_scenario() -> Scenario {
    let state = WorldState {
        name: "state1".to_string(),
        position: BTreeMap::from([
            ("a".to_string(), Location::block("b")),
            ("b".to_string(), Location::Table),
            ("c".to_string(), Location::Table),
        ]),
        clear: BTreeMap::from([
            ("a".to_string(), true),
            ("b".to_string(), false),
            ("c".to_string(), true),
        ]),
        holding: None,
    };
    let plan = vec![
        Action::unstack("a", "b"),
        Action::putdown("a"),
        Action::pickup("b"),
        Action::stack("b", "a"),
        Action::pickup("c"),
        Action::stack("c", "b"),
    ];
    Scenario { state, plan }
}
