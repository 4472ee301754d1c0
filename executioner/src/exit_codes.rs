//! Stable exit codes for executioner CLI commands.

/// Command succeeded; for `run`, the plan completed.
pub const OK: i32 = 0;
/// Invalid scenario, config or arguments, or any other error.
pub const INVALID: i32 = 1;
/// `executioner run` stopped the plan at a failed action.
pub const ABORTED: i32 = 2;
/// `executioner run` met an action kind it does not know.
pub const MALFORMED: i32 = 3;
