//! Trial orchestration.
//!
//! Runs a case's scenario `trials` times, each with a fresh executioner,
//! a silent sink and its own seed.

use std::path::Path;

use anyhow::{Context, Result};
use executioner::blocks::BlocksExecutioner;
use executioner::core::error::MalformedPlan;
use executioner::core::sampler::RandSampler;
use executioner::core::types::PlanResult;
use executioner::executor::{NullSink, PlanExecutor};
use executioner::io::config::Mode;
use executioner::io::scenario::{Scenario, load_scenario};
use executioner::random_failing::RandomFailingExecutioner;
use rand::Rng;
use tracing::{debug, info, instrument};

use crate::case::CaseFile;
use crate::outcome::classify_outcome;
use crate::report::TrialReport;

/// Load the case's scenario relative to `repo_root` and run all trials.
#[instrument(skip_all, fields(case_id = %case.case.id))]
pub fn run_case(repo_root: &Path, case: &CaseFile) -> Result<TrialReport> {
    let scenario_path = repo_root.join(&case.case.scenario);
    let scenario = load_scenario(&scenario_path).context("load case scenario")?;
    let base_seed = case
        .config
        .seed
        .unwrap_or_else(|| rand::thread_rng().r#gen::<u32>() as u64);
    info!(trials = case.config.trials, base_seed, "case run started");
    let report = run_trials(&scenario, case, base_seed)?;
    info!(
        completed = report.completed,
        aborted = report.aborted(),
        "case run finished"
    );
    Ok(report)
}

/// Run `case.config.trials` executions with seeds `base_seed, base_seed + 1, ...`.
pub fn run_trials(scenario: &Scenario, case: &CaseFile, base_seed: u64) -> Result<TrialReport> {
    let cfg = &case.config;
    let mut report = TrialReport::new(&case.case.id, cfg.mode, cfg.failure_probability, base_seed);
    for trial in 0..u64::from(cfg.trials) {
        let seed = base_seed.wrapping_add(trial);
        let result = run_trial(scenario, cfg.mode, cfg.failure_probability, seed)?;
        let (outcome, step) = classify_outcome(&result);
        debug!(trial, seed, ?outcome, ?step, "trial finished");
        report.record(outcome, step);
    }
    Ok(report)
}

fn run_trial(
    scenario: &Scenario,
    mode: Mode,
    failure_probability: f64,
    seed: u64,
) -> Result<Result<PlanResult, MalformedPlan>> {
    let sampler = RandSampler::seeded(seed);
    let result = match mode {
        Mode::Tracking => {
            let mut exec = BlocksExecutioner::new(
                failure_probability,
                &scenario.state,
                sampler,
                Box::new(NullSink),
            )?;
            exec.execute(&scenario.plan)
        }
        Mode::Random => {
            let mut exec =
                RandomFailingExecutioner::new(failure_probability, sampler, Box::new(NullSink))?;
            exec.execute(&scenario.plan)
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{CaseConfig, CaseMeta};
    use executioner::core::types::Action;
    use executioner::io::scenario::{sample_scenario, write_scenario};

    fn case(trials: u32, failure_probability: f64, mode: Mode) -> CaseFile {
        CaseFile {
            case: CaseMeta {
                id: "tower".to_string(),
                scenario: "scenarios/tower.toml".into(),
            },
            config: CaseConfig {
                trials,
                failure_probability,
                seed: Some(7),
                mode,
            },
        }
    }

    #[test]
    fn zero_probability_always_completes() {
        let report = run_trials(&sample_scenario(), &case(25, 0.0, Mode::Tracking), 7)
            .expect("trials");
        assert_eq!(report.trials, 25);
        assert_eq!(report.completed, 25);
        assert_eq!(report.aborted(), 0);
        assert!(report.aborts_by_step.is_empty());
    }

    #[test]
    fn tracking_aborts_only_at_fallible_steps() {
        let report = run_trials(&sample_scenario(), &case(200, 0.5, Mode::Tracking), 3)
            .expect("trials");
        assert_eq!(report.completed + report.aborted(), 200);
        assert_eq!(report.malformed, 0);
        assert!(report.aborted() > 0);
        // Steps 3 and 5 are pickups, 4 and 6 are stacks.
        assert!(report.aborts_by_step.keys().all(|step| [3, 4, 5, 6].contains(step)));
        assert_eq!(report.precondition_failures, 0);
    }

    #[test]
    fn random_mode_can_abort_at_any_step() {
        let report = run_trials(&sample_scenario(), &case(300, 0.5, Mode::Random), 11)
            .expect("trials");
        assert!(report.aborts_by_step.contains_key(&1));
        assert!(report.aborts_by_step.contains_key(&2));
    }

    #[test]
    fn same_seed_gives_same_report() {
        let first = run_trials(&sample_scenario(), &case(50, 0.3, Mode::Tracking), 99)
            .expect("trials");
        let second = run_trials(&sample_scenario(), &case(50, 0.3, Mode::Tracking), 99)
            .expect("trials");
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_plan_is_counted_per_trial() {
        let mut scenario = sample_scenario();
        scenario.plan.insert(
            0,
            Action::Unknown {
                kind: "fly".to_string(),
                args: Vec::new(),
            },
        );
        let report =
            run_trials(&scenario, &case(4, 0.0, Mode::Tracking), 1).expect("trials");
        assert_eq!(report.malformed, 4);
        assert_eq!(report.aborted(), 0);
        assert_eq!(report.abort_rate(), Some(0.0));
        assert!(report.aborts_by_step.is_empty());
        assert_eq!(report.malformed_by_step.get(&1), Some(&4));
    }

    #[test]
    fn run_case_loads_scenario_from_repo_root() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_scenario(
            &temp.path().join("scenarios/tower.toml"),
            &sample_scenario(),
        )
        .expect("write scenario");
        let report = run_case(temp.path(), &case(3, 0.0, Mode::Tracking)).expect("run");
        assert_eq!(report.base_seed, 7);
        assert_eq!(report.completed, 3);
    }
}
