//! Shared deterministic types for the executioner core.
//!
//! These types define stable contracts between the handlers, the executioners
//! and their callers. They carry no I/O and render deterministically.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a block rests: on another block, on the table, or in the hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    Block(String),
    Table,
    Hand,
}

impl Location {
    pub fn block(id: impl Into<String>) -> Self {
        Location::Block(id.into())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Block(id) => f.write_str(id),
            Location::Table => f.write_str("table"),
            Location::Hand => f.write_str("hand"),
        }
    }
}

impl From<&str> for Location {
    fn from(raw: &str) -> Self {
        match raw {
            "table" => Location::Table,
            "hand" => Location::Hand,
            other => Location::Block(other.to_string()),
        }
    }
}

impl FromStr for Location {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Location::from(raw))
    }
}

/// One step of a plan.
///
/// The four known kinds are closed; anything else the planner hands over is
/// kept as [`Action::Unknown`] so the executioner can reject it at the step
/// where it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Pickup(String),
    Putdown(String),
    /// `Stack(block, onto)`
    Stack(String, String),
    /// `Unstack(block, from)`
    Unstack(String, String),
    Unknown { kind: String, args: Vec<String> },
}

impl Action {
    pub fn pickup(block: impl Into<String>) -> Self {
        Action::Pickup(block.into())
    }

    pub fn putdown(block: impl Into<String>) -> Self {
        Action::Putdown(block.into())
    }

    pub fn stack(block: impl Into<String>, onto: impl Into<String>) -> Self {
        Action::Stack(block.into(), onto.into())
    }

    pub fn unstack(block: impl Into<String>, from: impl Into<String>) -> Self {
        Action::Unstack(block.into(), from.into())
    }

    /// Build an action from a planner tuple such as `["stack", "b", "a"]`.
    ///
    /// Known kinds with the wrong number of arguments are rejected; unknown
    /// kinds are preserved as [`Action::Unknown`].
    pub fn from_parts(parts: &[String]) -> Result<Self, String> {
        let Some((kind, args)) = parts.split_first() else {
            return Err("empty action tuple".to_string());
        };
        let arity = |expected: usize| {
            format!(
                "action '{}' takes {} argument(s), got {}",
                kind,
                expected,
                args.len()
            )
        };
        match (kind.as_str(), args) {
            ("pickup", [x]) => Ok(Action::pickup(x.as_str())),
            ("putdown", [x]) => Ok(Action::putdown(x.as_str())),
            ("stack", [b1, b2]) => Ok(Action::stack(b1.as_str(), b2.as_str())),
            ("unstack", [b1, b2]) => Ok(Action::unstack(b1.as_str(), b2.as_str())),
            ("pickup" | "putdown", _) => Err(arity(1)),
            ("stack" | "unstack", _) => Err(arity(2)),
            _ => Ok(Action::Unknown {
                kind: kind.clone(),
                args: args.to_vec(),
            }),
        }
    }

    /// Planner-facing tuple form, the inverse of [`Action::from_parts`].
    pub fn to_parts(&self) -> Vec<String> {
        let mut parts = vec![self.kind().to_string()];
        match self {
            Action::Pickup(x) | Action::Putdown(x) => parts.push(x.clone()),
            Action::Stack(b1, b2) | Action::Unstack(b1, b2) => {
                parts.push(b1.clone());
                parts.push(b2.clone());
            }
            Action::Unknown { args, .. } => parts.extend(args.iter().cloned()),
        }
        parts
    }

    pub fn kind(&self) -> &str {
        match self {
            Action::Pickup(_) => "pickup",
            Action::Putdown(_) => "putdown",
            Action::Stack(..) => "stack",
            Action::Unstack(..) => "unstack",
            Action::Unknown { kind, .. } => kind,
        }
    }

    /// Only grasping and placing can diverge from their nominal effect.
    pub fn is_fallible(&self) -> bool {
        matches!(self, Action::Pickup(_) | Action::Stack(..))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self.to_parts();
        write!(f, "{}({})", parts[0], parts[1..].join(", "))
    }
}

/// Result of attempting a single action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Succeeded,
    FailedPrecondition(String),
    FailedExecution(String),
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Succeeded)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Succeeded => None,
            ExecutionOutcome::FailedPrecondition(reason)
            | ExecutionOutcome::FailedExecution(reason) => Some(reason),
        }
    }
}

/// Result of executing a whole plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanResult {
    Completed,
    /// `step` is 1-based, matching the numbering of the emitted events.
    Aborted {
        step: usize,
        outcome: ExecutionOutcome,
    },
}

impl PlanResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, PlanResult::Completed)
    }
}
