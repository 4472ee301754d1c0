//! Blocks-world plan executioner with stochastic failure injection.
//!
//! This crate walks a pre-computed plan against a symbolic blocks world,
//! deliberately making some actions diverge from their nominal effect, and
//! stops at the first failure with a precise reason. The architecture
//! enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (world state, invariants, action
//!   handlers, failure injection). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting helpers (config and scenario files,
//!   transcripts, interactive pauses).
//!
//! The executioners ([`blocks`], [`random_failing`]) share the [`executor`]
//! callback boundary; [`run`] wires them up for the CLI.

pub mod blocks;
pub mod core;
pub mod executor;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod random_failing;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
