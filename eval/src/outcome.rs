use executioner::core::error::MalformedPlan;
use executioner::core::types::{ExecutionOutcome, PlanResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    PreconditionFailure,
    ExecutionFailure,
    Malformed,
}

/// Classify one trial, returning the 1-based step it stopped at, if any.
pub fn classify_outcome(result: &Result<PlanResult, MalformedPlan>) -> (Outcome, Option<usize>) {
    match result {
        Ok(PlanResult::Completed) => (Outcome::Completed, None),
        Ok(PlanResult::Aborted { step, outcome }) => match outcome {
            ExecutionOutcome::FailedPrecondition(_) => (Outcome::PreconditionFailure, Some(*step)),
            // A succeeded outcome never aborts a plan.
            ExecutionOutcome::FailedExecution(_) | ExecutionOutcome::Succeeded => {
                (Outcome::ExecutionFailure, Some(*step))
            }
        },
        Err(malformed) => (Outcome::Malformed, Some(malformed.step)),
    }
}
