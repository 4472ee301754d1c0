//! Error taxonomy for plan execution.
//!
//! [`ActionError`] is recoverable at the plan level: the executioner turns it
//! into an [`ExecutionOutcome`] and stops the plan. [`MalformedPlan`] is a
//! defect in whoever produced the plan and is returned to the caller as-is.

use thiserror::Error;

use crate::core::types::ExecutionOutcome;

/// Failure of a single, well-formed action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// A required predicate was false before any mutation; state is untouched.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// Preconditions held but the simulated effect diverged.
    #[error("execution failed: {0}")]
    ExecutionFailure(String),
}

impl From<ActionError> for ExecutionOutcome {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::PreconditionViolation(reason) => {
                ExecutionOutcome::FailedPrecondition(reason)
            }
            ActionError::ExecutionFailure(reason) => ExecutionOutcome::FailedExecution(reason),
        }
    }
}

/// The plan contains an action kind outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed plan: step {step} has unknown action '{action}'")]
pub struct MalformedPlan {
    /// 1-based position of the offending action.
    pub step: usize,
    pub action: String,
}

/// Rejected construction parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("failure probability must be in [0, 1), got {0}")]
    InvalidProbability(f64),

    #[error("invalid world state:\n- {}", .0.join("\n- "))]
    InvalidState(Vec<String>),
}

/// Turn a false predicate into a [`ActionError::PreconditionViolation`].
pub(crate) fn require(predicate: bool, reason: impl FnOnce() -> String) -> Result<(), ActionError> {
    if predicate {
        Ok(())
    } else {
        Err(ActionError::PreconditionViolation(reason()))
    }
}
