//! Stable exit codes for jvmtool CLI commands.

/// Command succeeded; the tool (if any) passed its acceptance policy.
pub const OK: i32 = 0;
/// Invalid configuration, missing binary, or an I/O failure.
pub const INVALID: i32 = 1;
/// The tool ran but failed its acceptance policy.
pub const TOOL_FAILED: i32 = 2;
