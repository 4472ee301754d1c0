//! State-tracking blocks-world executioner.
//!
//! Walks a plan one action at a time: dispatches to the domain handler,
//! consults the failure injector for fallible kinds, reports the outcome and
//! either runs the post-action hook or stops. Execution is strictly
//! sequential; the hook blocks the executioner for as long as it runs.

use tracing::{debug, error, info, instrument, warn};

use crate::core::error::{ConfigError, MalformedPlan};
use crate::core::handlers;
use crate::core::sampler::{FailureInjector, RandSampler, Sampler};
use crate::core::types::{Action, ExecutionOutcome, PlanResult};
use crate::core::world::WorldState;
use crate::executor::{
    COMPLETE_BANNER, EventSink, PlanExecutor, PostActionHook, STOP_BANNER, emit, start_banner,
    step_failed, step_succeeded,
};

const STATE_HEADING: &str = "Here is the state after the action was executed:";

/// Lifecycle of an executioner. Terminal phases are left again only by a new
/// call to `execute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Completed,
    /// A plan stopped at a failed action; counted in `failed_plans`.
    Aborted,
    /// A plan was rejected at an unknown action kind; not counted.
    Malformed,
}

/// Executes plans against an exclusively owned [`WorldState`].
pub struct BlocksExecutioner<S: Sampler = RandSampler> {
    state: WorldState,
    injector: FailureInjector,
    sampler: S,
    sink: Box<dyn EventSink>,
    post_action: Option<PostActionHook>,
    log_state: bool,
    phase: Phase,
    failed_plans: u32,
}

impl<S: Sampler> BlocksExecutioner<S> {
    /// Take a private copy of `initial` and validate the failure probability.
    pub fn new(
        failure_probability: f64,
        initial: &WorldState,
        sampler: S,
        sink: Box<dyn EventSink>,
    ) -> Result<Self, ConfigError> {
        let injector = FailureInjector::new(failure_probability)?;
        Ok(Self {
            state: initial.clone(),
            injector,
            sampler,
            sink,
            post_action: None,
            log_state: false,
            phase: Phase::Idle,
            failed_plans: 0,
        })
    }

    pub fn with_post_action(mut self, hook: PostActionHook) -> Self {
        self.post_action = Some(hook);
        self
    }

    /// Emit the world state to the sink after every attempted action.
    pub fn with_state_logging(mut self, enabled: bool) -> Self {
        self.log_state = enabled;
        self
    }

    /// Snapshot of the working state.
    pub fn current_state(&self) -> WorldState {
        self.state.clone()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn failure_probability(&self) -> f64 {
        self.injector.probability()
    }

    /// Attempt one action against the working state.
    fn attempt(&mut self, step: usize, action: &Action) -> Result<ExecutionOutcome, MalformedPlan> {
        let injected_failure =
            action.is_fallible() && self.injector.should_fail(&mut self.sampler);
        if injected_failure {
            debug!(step, %action, "failure injected");
        }

        let result = match action {
            Action::Pickup(x) => handlers::pickup(&mut self.state, x, injected_failure),
            Action::Unstack(b1, b2) => handlers::unstack(&mut self.state, b1, b2),
            Action::Putdown(b1) => handlers::putdown(&mut self.state, b1),
            Action::Stack(b1, b2) => {
                handlers::stack(&mut self.state, b1, b2, injected_failure, &mut self.sampler)
            }
            Action::Unknown { .. } => {
                return Err(MalformedPlan {
                    step,
                    action: action.to_string(),
                });
            }
        };

        Ok(match result {
            Ok(()) => ExecutionOutcome::Succeeded,
            Err(err) => err.into(),
        })
    }

    fn abort(&mut self) {
        emit(self.sink.as_mut(), STOP_BANNER);
        self.failed_plans += 1;
        self.phase = Phase::Aborted;
    }
}

impl<S: Sampler> PlanExecutor for BlocksExecutioner<S> {
    #[instrument(skip_all, fields(actions = plan.len(), p = self.injector.probability()))]
    fn execute(&mut self, plan: &[Action]) -> Result<PlanResult, MalformedPlan> {
        self.phase = Phase::Running;
        emit(self.sink.as_mut(), &start_banner(plan.len()));

        for (index, action) in plan.iter().enumerate() {
            let step = index + 1;
            let outcome = match self.attempt(step, action) {
                Ok(outcome) => outcome,
                Err(malformed) => {
                    error!(step, action = %action, "malformed plan");
                    emit(
                        self.sink.as_mut(),
                        &step_failed(step, action, "unknown action kind"),
                    );
                    emit(self.sink.as_mut(), STOP_BANNER);
                    self.phase = Phase::Malformed;
                    return Err(malformed);
                }
            };

            let event = match outcome.reason() {
                None => step_succeeded(step, action),
                Some(reason) => step_failed(step, action, reason),
            };
            emit(self.sink.as_mut(), &event);
            if self.log_state {
                emit(self.sink.as_mut(), &self.state.display(STATE_HEADING));
            }

            if !outcome.is_success() {
                warn!(step, %action, ?outcome, "action failed; stopping plan");
                self.abort();
                return Ok(PlanResult::Aborted { step, outcome });
            }

            if let Some(hook) = self.post_action.as_mut() {
                hook();
            }
        }

        emit(self.sink.as_mut(), COMPLETE_BANNER);
        self.phase = Phase::Completed;
        info!("plan completed");
        Ok(PlanResult::Completed)
    }

    fn failed_plans(&self) -> u32 {
        self.failed_plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Location;
    use crate::executor::EventLog;
    use crate::test_support::{AlwaysFail, NeverFail, ScriptedSampler, three_blocks, tower_plan};
    use std::cell::Cell;
    use std::rc::Rc;

    fn executioner<S: Sampler>(p: f64, sampler: S) -> (BlocksExecutioner<S>, EventLog) {
        let log = EventLog::new();
        let exec = BlocksExecutioner::new(p, &three_blocks(), sampler, Box::new(log.clone()))
            .expect("executioner");
        (exec, log)
    }

    #[test]
    fn zero_probability_completes_tower() {
        let (mut exec, log) = executioner(0.0, AlwaysFail);
        let result = exec.execute(&tower_plan()).expect("execute");

        assert_eq!(result, PlanResult::Completed);
        assert_eq!(exec.phase(), Phase::Completed);
        let state = exec.current_state();
        assert_eq!(state.position("a"), Some(&Location::Table));
        assert_eq!(state.position("b"), Some(&Location::block("a")));
        assert_eq!(state.position("c"), Some(&Location::block("b")));
        assert!(!state.is_clear("a"));
        assert!(!state.is_clear("b"));
        assert!(state.is_clear("c"));
        assert_eq!(state.holding(), None);
        assert_eq!(exec.failed_plans(), 0);

        let events = log.events();
        assert_eq!(events.len(), 8);
        assert!(events.iter().all(|event| !event.contains("failed")));
        assert_eq!(events.last().map(String::as_str), Some(COMPLETE_BANNER));
    }

    #[test]
    fn forced_pickup_failure_aborts_at_step_three() {
        // unstack and putdown draw nothing; pickup(b) draws the failing sample.
        let (mut exec, log) = executioner(0.5, ScriptedSampler::new([0.1]));
        let result = exec.execute(&tower_plan()).expect("execute");

        assert_eq!(
            result,
            PlanResult::Aborted {
                step: 3,
                outcome: ExecutionOutcome::FailedExecution(
                    "no object detected in hand after pickup of b".to_string()
                ),
            }
        );
        let state = exec.current_state();
        assert_eq!(state.position("b"), Some(&Location::Table));
        assert_eq!(state.holding(), None);
        assert_eq!(exec.failed_plans(), 1);
        assert_eq!(exec.phase(), Phase::Aborted);

        let events = log.events();
        assert_eq!(events.len(), 5);
        assert!(events[3].starts_with(" 3. The action pickup(b) failed to execute"));
        assert_eq!(events[4], STOP_BANNER);
    }

    #[test]
    fn precondition_violation_is_reported_not_raised() {
        let (mut exec, log) = executioner(0.0, NeverFail);
        let before = exec.current_state();
        let result = exec.execute(&[Action::pickup("b")]).expect("execute");

        assert!(matches!(
            result,
            PlanResult::Aborted {
                step: 1,
                outcome: ExecutionOutcome::FailedPrecondition(_)
            }
        ));
        assert_eq!(exec.current_state(), before);
        assert_eq!(log.events()[2], STOP_BANNER);
    }

    #[test]
    fn hook_runs_after_each_success_only() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        // pickup(b) draws 0.9 and succeeds; stack(b, a) draws 0.1 and fails,
        // then draws 0.0 to pick the wrong target (c, the only other clear block).
        let (exec, _log) = executioner(0.5, ScriptedSampler::new([0.9, 0.1, 0.0]));
        let mut exec = exec.with_post_action(Box::new(move || counter.set(counter.get() + 1)));

        let result = exec.execute(&tower_plan()).expect("execute");
        assert!(matches!(
            result,
            PlanResult::Aborted {
                step: 4,
                outcome: ExecutionOutcome::FailedExecution(_)
            }
        ));
        assert_eq!(calls.get(), 3);
        assert_eq!(
            exec.current_state().position("b"),
            Some(&Location::block("c"))
        );
    }

    #[test]
    fn hook_sees_events_up_to_the_action_just_taken() {
        let log = EventLog::new();
        let observed = Rc::new(Cell::new(Vec::<usize>::new()));
        let (seen, view) = (observed.clone(), log.clone());
        let mut exec = BlocksExecutioner::new(0.0, &three_blocks(), NeverFail, Box::new(log))
            .expect("executioner")
            .with_post_action(Box::new(move || {
                let mut lens = seen.take();
                lens.push(view.len());
                seen.set(lens);
            }));

        exec.execute(&tower_plan()).expect("execute");
        assert_eq!(observed.take(), vec![2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn unknown_action_is_fatal_and_not_counted() {
        let (mut exec, log) = executioner(0.0, NeverFail);
        let plan = vec![
            Action::unstack("a", "b"),
            Action::Unknown {
                kind: "juggle".to_string(),
                args: vec!["a".to_string()],
            },
            Action::putdown("a"),
        ];

        let err = exec.execute(&plan).expect_err("malformed");
        assert_eq!(err.step, 2);
        assert_eq!(err.action, "juggle(a)");
        assert_eq!(exec.failed_plans(), 0);
        assert_eq!(exec.phase(), Phase::Malformed);
        assert_eq!(exec.current_state().holding(), Some("a"));
        assert_eq!(log.events().last().map(String::as_str), Some(STOP_BANNER));
    }

    #[test]
    fn state_logging_emits_snapshot_after_each_action() {
        let (exec, log) = executioner(0.0, NeverFail);
        let mut exec = exec.with_state_logging(true);
        exec.execute(&[Action::unstack("a", "b")]).expect("execute");

        let events = log.events();
        assert_eq!(events.len(), 4);
        assert!(events[2].starts_with(STATE_HEADING));
        assert!(events[2].contains("holding = {hand: a}"));
    }

    #[test]
    fn caller_state_is_never_mutated() {
        let initial = three_blocks();
        let mut exec =
            BlocksExecutioner::new(0.0, &initial, NeverFail, Box::new(EventLog::new()))
                .expect("executioner");
        exec.execute(&tower_plan()).expect("execute");
        assert_eq!(initial, three_blocks());
        assert_ne!(exec.current_state(), initial);
    }

    #[test]
    fn counter_accumulates_over_sequential_runs() {
        let (mut exec, _log) = executioner(0.5, AlwaysFail);
        exec.execute(&[Action::pickup("c")]).expect("first");
        exec.execute(&[Action::pickup("c")]).expect("second");
        assert_eq!(exec.failed_plans(), 2);
    }

    #[test]
    fn failing_sink_does_not_stop_the_plan() {
        struct Broken;

        impl EventSink for Broken {
            fn log_event(&mut self, _event: &str) -> anyhow::Result<()> {
                Err(anyhow::anyhow!("disk full"))
            }
        }

        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut exec = BlocksExecutioner::new(0.0, &three_blocks(), NeverFail, Box::new(Broken))
            .expect("executioner")
            .with_state_logging(true)
            .with_post_action(Box::new(move || counter.set(counter.get() + 1)));

        assert_eq!(exec.execute(&tower_plan()), Ok(PlanResult::Completed));
        assert_eq!(calls.get(), 6);
        assert_eq!(exec.phase(), Phase::Completed);
        assert_eq!(
            exec.current_state().position("c"),
            Some(&Location::block("b"))
        );
    }

    #[test]
    fn rejects_invalid_probability() {
        let result = BlocksExecutioner::new(1.0, &three_blocks(), NeverFail, Box::new(EventLog::new()));
        assert!(matches!(result, Err(ConfigError::InvalidProbability(_))));
    }
}
