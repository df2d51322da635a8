//! Stable exit codes for `copilot` CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Configuration, repository or other runtime failure.
pub const FAILURE: i32 = 1;
/// The request was rejected as invalid input before any work was done.
pub const INVALID_REQUEST: i32 = 2;
