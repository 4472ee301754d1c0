//! Case file parsing and validation.
//!
//! Cases are TOML files naming a scenario and how to sample it.
//! See `eval/cases/` for examples.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use executioner::core::sampler::FailureInjector;
use executioner::io::config::Mode;
use serde::Deserialize;

/// A parsed case file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CaseFile {
    pub case: CaseMeta,
    #[serde(default)]
    pub config: CaseConfig,
}

/// Case metadata: identifier and scenario location.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CaseMeta {
    /// Unique identifier (slug format: `[a-z0-9_-]+`).
    pub id: String,
    /// Scenario file, relative to the repository root.
    pub scenario: PathBuf,
}

/// Sampling parameters for the case.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaseConfig {
    /// Number of independent executions.
    pub trials: u32,
    pub failure_probability: f64,
    /// Seed of the first trial; trial `i` uses `seed + i`. Random when unset.
    pub seed: Option<u64>,
    pub mode: Mode,
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            trials: 100,
            failure_probability: 1.0 / 6.0,
            seed: None,
            mode: Mode::Tracking,
        }
    }
}

impl CaseFile {
    /// Load and validate a case file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read case {}", path.display()))?;
        let case: CaseFile =
            toml::from_str(&contents).with_context(|| format!("parse case {}", path.display()))?;
        case.validate()
            .with_context(|| format!("validate case {}", path.display()))?;
        Ok(case)
    }

    #[cfg(test)]
    pub fn parse_str(contents: &str) -> Result<Self> {
        let case: CaseFile = toml::from_str(contents).context("parse case")?;
        case.validate()?;
        Ok(case)
    }

    fn validate(&self) -> Result<()> {
        validate_case_id(&self.case.id)?;
        if self.case.scenario.as_os_str().is_empty() {
            bail!("case.scenario must be non-empty");
        }
        if self.config.trials == 0 {
            bail!("config.trials must be > 0");
        }
        FailureInjector::new(self.config.failure_probability)
            .context("invalid config.failure_probability")?;
        Ok(())
    }
}

/// Load every `*.toml` case in `dir`, sorted by id.
pub fn discover_cases(dir: &Path) -> Result<Vec<CaseFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut cases = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read cases dir {}", dir.display()))? {
        let entry = entry.context("read case entry")?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        cases.push(CaseFile::load(&path)?);
    }
    cases.sort_by(|left, right| left.case.id.cmp(&right.case.id));
    for pair in cases.windows(2) {
        if pair[0].case.id == pair[1].case.id {
            return Err(anyhow!("duplicate case.id {}", pair[0].case.id));
        }
    }
    Ok(cases)
}

fn validate_case_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        bail!("case.id must be non-empty");
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        bail!("case.id must match [a-z0-9_-]+, got {}", id);
    }
    Ok(())
}
