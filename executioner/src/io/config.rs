//! Executioner configuration stored as TOML (default `executioner.toml`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::sampler::FailureInjector;

/// Which executioner runs the plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Track the world state; only `pickup` and `stack` can fail.
    Tracking,
    /// Track nothing; every action can fail.
    Random,
}

/// Executioner configuration (TOML).
///
/// Missing fields fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Probability in `[0, 1)` that a fallible action diverges.
    pub failure_probability: f64,

    /// Seed for the failure sampler. Unset means OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Emit the world state to the event sink after every action.
    pub log_state: bool,

    /// Echo events to stdout in addition to any transcript.
    pub echo_events: bool,

    pub mode: Mode,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            failure_probability: 1.0 / 6.0,
            seed: None,
            log_state: false,
            echo_events: true,
            mode: Mode::Tracking,
        }
    }
}

impl ExecutionConfig {
    pub fn validate(&self) -> Result<()> {
        FailureInjector::new(self.failure_probability).context("invalid failure_probability")?;
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ExecutionConfig::default()`.
pub fn load_config(path: &Path) -> Result<ExecutionConfig> {
    if !path.exists() {
        let cfg = ExecutionConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ExecutionConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ExecutionConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
