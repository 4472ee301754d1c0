//! Executioner that tracks no world state and fails any action at random.
//!
//! Useful for exercising whoever consumes the event stream without caring
//! about the domain: every known action kind is fallible with the same
//! probability and a failure changes nothing.

use tracing::{error, instrument, warn};

use crate::core::error::{ConfigError, MalformedPlan};
use crate::core::sampler::{FailureInjector, RandSampler, Sampler};
use crate::core::types::{Action, ExecutionOutcome, PlanResult};
use crate::executor::{
    COMPLETE_BANNER, EventSink, PlanExecutor, PostActionHook, STOP_BANNER, emit, start_banner,
    step_failed, step_succeeded,
};

const RANDOM_FAILURE: &str = "simulated random failure";

pub struct RandomFailingExecutioner<S: Sampler = RandSampler> {
    injector: FailureInjector,
    sampler: S,
    sink: Box<dyn EventSink>,
    post_action: Option<PostActionHook>,
    failed_plans: u32,
}

impl<S: Sampler> RandomFailingExecutioner<S> {
    pub fn new(
        failure_probability: f64,
        sampler: S,
        sink: Box<dyn EventSink>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            injector: FailureInjector::new(failure_probability)?,
            sampler,
            sink,
            post_action: None,
            failed_plans: 0,
        })
    }

    pub fn with_post_action(mut self, hook: PostActionHook) -> Self {
        self.post_action = Some(hook);
        self
    }
}

impl<S: Sampler> PlanExecutor for RandomFailingExecutioner<S> {
    #[instrument(skip_all, fields(actions = plan.len(), p = self.injector.probability()))]
    fn execute(&mut self, plan: &[Action]) -> Result<PlanResult, MalformedPlan> {
        emit(self.sink.as_mut(), &start_banner(plan.len()));

        for (index, action) in plan.iter().enumerate() {
            let step = index + 1;
            if let Action::Unknown { .. } = action {
                error!(step, %action, "malformed plan");
                emit(
                    self.sink.as_mut(),
                    &step_failed(step, action, "unknown action kind"),
                );
                emit(self.sink.as_mut(), STOP_BANNER);
                return Err(MalformedPlan {
                    step,
                    action: action.to_string(),
                });
            }

            if self.injector.should_fail(&mut self.sampler) {
                warn!(step, %action, "action failed; stopping plan");
                emit(
                    self.sink.as_mut(),
                    &step_failed(step, action, RANDOM_FAILURE),
                );
                emit(self.sink.as_mut(), STOP_BANNER);
                self.failed_plans += 1;
                return Ok(PlanResult::Aborted {
                    step,
                    outcome: ExecutionOutcome::FailedExecution(RANDOM_FAILURE.to_string()),
                });
            }

            emit(self.sink.as_mut(), &step_succeeded(step, action));
            if let Some(hook) = self.post_action.as_mut() {
                hook();
            }
        }

        emit(self.sink.as_mut(), COMPLETE_BANNER);
        Ok(PlanResult::Completed)
    }

    fn failed_plans(&self) -> u32 {
        self.failed_plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::EventLog;
    use crate::test_support::{NeverFail, ScriptedSampler, tower_plan};

    #[test]
    fn every_kind_can_fail() {
        // putdown is never fallible in the tracking executioner; here it is.
        let log = EventLog::new();
        let mut exec = RandomFailingExecutioner::new(
            0.5,
            ScriptedSampler::new([0.9, 0.2]),
            Box::new(log.clone()),
        )
        .expect("executioner");

        let result = exec.execute(&tower_plan()).expect("execute");
        assert_eq!(
            result,
            PlanResult::Aborted {
                step: 2,
                outcome: ExecutionOutcome::FailedExecution(RANDOM_FAILURE.to_string()),
            }
        );
        assert_eq!(exec.failed_plans(), 1);
        assert_eq!(log.events().len(), 4);
    }

    #[test]
    fn completes_when_nothing_fails() {
        let log = EventLog::new();
        let mut exec = RandomFailingExecutioner::new(0.9, NeverFail, Box::new(log.clone()))
            .expect("executioner");
        assert_eq!(exec.execute(&tower_plan()), Ok(PlanResult::Completed));
        assert_eq!(log.events().last().map(String::as_str), Some(COMPLETE_BANNER));
        assert_eq!(exec.failed_plans(), 0);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let mut exec =
            RandomFailingExecutioner::new(0.0, NeverFail, Box::new(EventLog::new())).expect("executioner");
        let plan = vec![Action::Unknown {
            kind: "fly".to_string(),
            args: Vec::new(),
        }];
        let err = exec.execute(&plan).expect_err("malformed");
        assert_eq!(err.step, 1);
        assert_eq!(exec.failed_plans(), 0);
    }
}
