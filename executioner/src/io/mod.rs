//! I/O helpers: config, scenario files, transcripts and interactive pauses.

pub mod config;
pub mod pause;
pub mod scenario;
pub mod transcript;
