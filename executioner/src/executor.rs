//! Executor abstraction and the callback boundary shared by all executioners.
//!
//! The [`PlanExecutor`] trait decouples callers from the concrete failure
//! model. Progress is reported as plain text through an [`EventSink`]; the
//! post-action hook runs synchronously after every successful action and may
//! block for as long as it likes (e.g. waiting for an operator).

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use tracing::warn;

use crate::core::error::MalformedPlan;
use crate::core::types::{Action, PlanResult};

/// Hook invoked after each successfully applied action.
pub type PostActionHook = Box<dyn FnMut()>;

/// Receiver of human-readable progress events.
///
/// Sink errors are never fatal: executioners log them and carry on.
pub trait EventSink {
    fn log_event(&mut self, event: &str) -> Result<()>;
}

/// Abstraction over plan executioners.
pub trait PlanExecutor {
    /// Execute `plan` in order, stopping at the first failed action.
    ///
    /// Recoverable failures are reported through the returned [`PlanResult`];
    /// only an unknown action kind is returned as an error.
    fn execute(&mut self, plan: &[Action]) -> Result<PlanResult, MalformedPlan>;

    /// Number of executions that ended aborted.
    fn failed_plans(&self) -> u32;
}

/// In-memory event log. Clones share the same buffer, so a caller can keep a
/// handle while the executioner owns another.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// All events joined with newlines, as an advisory transcript.
    pub fn transcript(&self) -> String {
        let mut text = self.events.borrow().join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

impl EventSink for EventLog {
    fn log_event(&mut self, event: &str) -> Result<()> {
        self.events.borrow_mut().push(event.to_string());
        Ok(())
    }
}

/// Echoes events to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn log_event(&mut self, event: &str) -> Result<()> {
        println!("{event}");
        Ok(())
    }
}

/// Discards events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn log_event(&mut self, _event: &str) -> Result<()> {
        Ok(())
    }
}

/// Forwards every event to each inner sink in order.
///
/// A failing sink does not stop delivery to the others; the first error is
/// returned once all sinks have been offered the event.
#[derive(Default)]
pub struct FanOut {
    sinks: Vec<Box<dyn EventSink>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl EventSink for FanOut {
    fn log_event(&mut self, event: &str) -> Result<()> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(err) = sink.log_event(event) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// Deliver an event, downgrading sink failures to a warning.
pub(crate) fn emit(sink: &mut dyn EventSink, event: &str) {
    if let Err(err) = sink.log_event(event) {
        let message = format!("{err:#}");
        warn!(error = %message, "event sink failed; continuing");
    }
}

pub(crate) fn start_banner(actions: usize) -> String {
    format!(
        "The robot is now executing the plan. There are a total of {actions} actions to execute."
    )
}

pub(crate) fn step_succeeded(step: usize, action: &Action) -> String {
    format!(" {step}. The action {action} was executed correctly")
}

pub(crate) fn step_failed(step: usize, action: &Action, reason: &str) -> String {
    format!(" {step}. The action {action} failed to execute: {reason}")
}

pub(crate) const STOP_BANNER: &str = "Plan execution stopped";
pub(crate) const COMPLETE_BANNER: &str = "The plan was executed correctly";
