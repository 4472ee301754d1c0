//! Orchestration for `executioner run`: wire config, sinks and hooks around
//! one executioner and execute a scenario's plan.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::blocks::BlocksExecutioner;
use crate::core::sampler::RandSampler;
use crate::core::types::PlanResult;
use crate::core::world::WorldState;
use crate::executor::{ConsoleSink, EventSink, FanOut, PlanExecutor, PostActionHook};
use crate::io::config::{ExecutionConfig, Mode};
use crate::io::pause::stdin_pause;
use crate::io::scenario::{Scenario, ScenarioFile, StateFacts};
use crate::io::transcript::TranscriptSink;
use crate::random_failing::RandomFailingExecutioner;

/// Inputs for a single run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: ExecutionConfig,
    /// Append every event to this file.
    pub transcript: Option<PathBuf>,
    /// Pause for operator questions after each successful action.
    pub interactive: bool,
}

/// Machine-readable result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: Mode,
    pub failure_probability: f64,
    pub seed: Option<u64>,
    pub actions: usize,
    pub result: PlanResult,
    pub failed_plans: u32,
    /// Final world state; absent in `random` mode, which tracks none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_state: Option<StateFacts>,
    #[serde(skip)]
    pub final_world: Option<WorldState>,
}

/// Execute `scenario` once.
///
/// A malformed plan is returned as an error wrapping
/// [`MalformedPlan`](crate::core::error::MalformedPlan), so callers can
/// downcast it.
pub fn run_scenario(scenario: &Scenario, options: &RunOptions) -> Result<RunSummary> {
    let cfg = &options.config;
    cfg.validate()?;
    debug!(mode = ?cfg.mode, p = cfg.failure_probability, seed = ?cfg.seed, "starting run");

    let sink = build_sink(cfg, options.transcript.as_ref())?;
    let sampler = RandSampler::from_seed_option(cfg.seed);
    let hook: Option<PostActionHook> = options.interactive.then(stdin_pause);

    let (result, failed_plans, final_world) = match cfg.mode {
        Mode::Tracking => {
            let mut exec =
                BlocksExecutioner::new(cfg.failure_probability, &scenario.state, sampler, sink)?
                    .with_state_logging(cfg.log_state);
            if let Some(hook) = hook {
                exec = exec.with_post_action(hook);
            }
            let result = exec.execute(&scenario.plan)?;
            (result, exec.failed_plans(), Some(exec.current_state()))
        }
        Mode::Random => {
            let mut exec = RandomFailingExecutioner::new(cfg.failure_probability, sampler, sink)?;
            if let Some(hook) = hook {
                exec = exec.with_post_action(hook);
            }
            let result = exec.execute(&scenario.plan)?;
            (result, exec.failed_plans(), None)
        }
    };
    info!(?result, failed_plans, "run finished");

    let final_state = final_world.as_ref().map(|state| {
        ScenarioFile::from_scenario(&Scenario {
            state: state.clone(),
            plan: Vec::new(),
        })
        .state
    });

    Ok(RunSummary {
        mode: cfg.mode,
        failure_probability: cfg.failure_probability,
        seed: cfg.seed,
        actions: scenario.plan.len(),
        result,
        failed_plans,
        final_state,
        final_world,
    })
}

fn build_sink(cfg: &ExecutionConfig, transcript: Option<&PathBuf>) -> Result<Box<dyn EventSink>> {
    let mut sink = FanOut::new();
    if cfg.echo_events {
        sink = sink.with(ConsoleSink);
    }
    if let Some(path) = transcript {
        let file = TranscriptSink::open(path).context("open transcript")?;
        sink = sink.with(file);
    }
    Ok(Box::new(sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::MalformedPlan;
    use crate::core::types::{Action, Location};
    use crate::io::scenario::sample_scenario;

    fn quiet(p: f64, mode: Mode) -> RunOptions {
        RunOptions {
            config: ExecutionConfig {
                failure_probability: p,
                seed: Some(1),
                log_state: false,
                echo_events: false,
                mode,
            },
            transcript: None,
            interactive: false,
        }
    }

    #[test]
    fn tracking_run_reports_final_state() {
        let summary = run_scenario(&sample_scenario(), &quiet(0.0, Mode::Tracking)).expect("run");
        assert_eq!(summary.result, PlanResult::Completed);
        assert_eq!(summary.failed_plans, 0);
        let state = summary.final_world.expect("state");
        assert_eq!(state.position("c"), Some(&Location::block("b")));
        let facts = summary.final_state.expect("facts");
        assert_eq!(facts.position.get("b").map(String::as_str), Some("a"));
    }

    #[test]
    fn random_run_has_no_state() {
        let summary = run_scenario(&sample_scenario(), &quiet(0.0, Mode::Random)).expect("run");
        assert!(summary.result.is_completed());
        assert!(summary.final_state.is_none());
    }

    #[test]
    fn malformed_plan_can_be_downcast() {
        let mut scenario = sample_scenario();
        scenario.plan.insert(
            1,
            Action::Unknown {
                kind: "juggle".to_string(),
                args: Vec::new(),
            },
        );
        let err = run_scenario(&scenario, &quiet(0.0, Mode::Tracking)).expect_err("malformed");
        let malformed = err.downcast_ref::<MalformedPlan>().expect("malformed plan");
        assert_eq!(malformed.step, 2);
    }

    #[test]
    fn transcript_is_written() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("transcript.txt");
        let mut options = quiet(0.0, Mode::Tracking);
        options.transcript = Some(path.clone());
        run_scenario(&sample_scenario(), &options).expect("run");
        let contents = std::fs::read_to_string(&path).expect("read");
        assert!(contents.starts_with("The robot is now executing the plan."));
    }

    #[test]
    fn summary_serializes_result() {
        let summary = run_scenario(&sample_scenario(), &quiet(0.0, Mode::Tracking)).expect("run");
        let json = serde_json::to_value(&summary).expect("json");
        assert_eq!(json["result"], "completed");
        assert_eq!(json["mode"], "tracking");
        assert_eq!(json["final_state"]["position"]["c"], "b");
    }
}
