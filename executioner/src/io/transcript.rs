//! File-backed event transcript.
//!
//! Appends every event to a text file, one event per line, so an advisor (or
//! a human) can read back everything the executioner reported.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::executor::EventSink;

pub struct TranscriptSink {
    path: PathBuf,
    file: File,
}

impl TranscriptSink {
    /// Open `path` for appending, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open transcript {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for TranscriptSink {
    fn log_event(&mut self, event: &str) -> Result<()> {
        writeln!(self.file, "{event}")
            .with_context(|| format!("append to {}", self.path.display()))
    }
}
