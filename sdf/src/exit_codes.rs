//! Exit codes for sdf's own commands.
//!
//! Profile commands report outcomes through printed messages; only a fatal
//! error changes the exit code. Delegated commands mirror the engine instead.

/// Command finished, whatever message it printed.
pub const OK: i32 = 0;
/// An unrecoverable error aborted the command.
pub const FATAL: i32 = 1;
