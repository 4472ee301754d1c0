//! Deterministic, pure logic shared by the executioners.
//!
//! Core modules must be free of I/O side effects. Randomness enters only
//! through the [`sampler::Sampler`] trait, so every module here can be driven
//! deterministically from tests.

pub mod error;
pub mod handlers;
pub mod invariants;
pub mod sampler;
pub mod types;
pub mod world;
