//! CLI command implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::case::{CaseFile, discover_cases};
use crate::run::run_case;

fn cases_dir(repo_root: &Path) -> PathBuf {
    repo_root.join("eval").join("cases")
}

/// List all available cases.
pub fn list_cases(repo_root: &Path) -> Result<()> {
    for case in discover_cases(&cases_dir(repo_root))? {
        println!(
            "{} scenario={} trials={} p={}",
            case.case.id,
            case.case.scenario.display(),
            case.config.trials,
            case.config.failure_probability
        );
    }
    Ok(())
}

/// Run a case by id and print its report.
pub fn run_case_by_id(
    repo_root: &Path,
    case_id: &str,
    trials: Option<u32>,
    json: bool,
) -> Result<()> {
    let case_path = cases_dir(repo_root).join(format!("{case_id}.toml"));
    if !case_path.exists() {
        bail!("case {} not found at {}", case_id, case_path.display());
    }
    let mut case = CaseFile::load(&case_path).context("load case")?;
    if let Some(trials) = trials {
        if trials == 0 {
            bail!("--trials must be > 0");
        }
        case.config.trials = trials;
    }
    debug!(case_id, trials = case.config.trials, "case loaded");

    let report = run_case(repo_root, &case).context("run case")?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize report")?
        );
    } else {
        for line in report.render() {
            println!("{}", line);
        }
    }
    Ok(())
}
