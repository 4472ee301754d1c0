use std::collections::BTreeMap;

use executioner::io::config::Mode;
use serde::Serialize;

use crate::outcome::Outcome;

/// Aggregate of one case's trials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialReport {
    pub case_id: String,
    pub mode: Mode,
    pub failure_probability: f64,
    pub base_seed: u64,
    pub trials: usize,
    pub completed: usize,
    pub precondition_failures: usize,
    pub execution_failures: usize,
    pub malformed: usize,
    /// 1-based step -> number of trials that aborted there.
    pub aborts_by_step: BTreeMap<usize, usize>,
    /// 1-based step -> number of trials rejected there as malformed.
    pub malformed_by_step: BTreeMap<usize, usize>,
}

impl TrialReport {
    pub fn new(case_id: &str, mode: Mode, failure_probability: f64, base_seed: u64) -> Self {
        Self {
            case_id: case_id.to_string(),
            mode,
            failure_probability,
            base_seed,
            trials: 0,
            completed: 0,
            precondition_failures: 0,
            execution_failures: 0,
            malformed: 0,
            aborts_by_step: BTreeMap::new(),
            malformed_by_step: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, outcome: Outcome, step: Option<usize>) {
        self.trials += 1;
        match outcome {
            Outcome::Completed => self.completed += 1,
            Outcome::PreconditionFailure => self.precondition_failures += 1,
            Outcome::ExecutionFailure => self.execution_failures += 1,
            Outcome::Malformed => self.malformed += 1,
        }
        let Some(step) = step else {
            return;
        };
        let by_step = match outcome {
            Outcome::Malformed => &mut self.malformed_by_step,
            _ => &mut self.aborts_by_step,
        };
        *by_step.entry(step).or_default() += 1;
    }

    /// Trials that reached an aborted plan. Malformed plans never do.
    pub fn aborted(&self) -> usize {
        self.precondition_failures + self.execution_failures
    }

    pub fn abort_rate(&self) -> Option<f64> {
        (self.trials > 0).then(|| self.aborted() as f64 / self.trials as f64)
    }

    /// Plain-text lines in the `report: key=value` form.
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "report: case={} mode={:?} p={} base_seed={}",
                self.case_id, self.mode, self.failure_probability, self.base_seed
            ),
            format!(
                "report: trials={} completed={} aborted={}",
                self.trials,
                self.completed,
                self.aborted()
            ),
            format!(
                "report: precondition={} execution={} malformed={}",
                self.precondition_failures, self.execution_failures, self.malformed
            ),
        ];
        if let Some(rate) = self.abort_rate() {
            lines.push(format!("report: abort_rate={:.3}", rate));
        }
        for (step, count) in &self.aborts_by_step {
            lines.push(format!("report: step {} aborts={}", step, count));
        }
        for (step, count) in &self.malformed_by_step {
            lines.push(format!("report: step {} malformed={}", step, count));
        }
        lines
    }
}
