//! Typed failures of the tool-invocation operation.
//!
//! Plumbing uses [`anyhow`] throughout; these concrete types ride inside the
//! `anyhow::Error` chain so callers can classify a failure by downcast
//! instead of string matching. I/O failures stay `std::io::Error` under
//! anyhow context.

use std::path::PathBuf;

use thiserror::Error;

/// The environment or configuration is invalid.
///
/// Raised strictly before any process is spawned or directory is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither an explicit `tool_home` nor `JAVA_HOME` is available.
    #[error("no tool home configured (set JAVA_HOME or tool_home in jvmtool.toml)")]
    MissingToolHome,

    /// The requested binary is absent from the configured tool home.
    #[error(
        "invalid JDK: {} is not a file (set JAVA_HOME or tool_home in jvmtool.toml to a JDK 14 or newer installation)",
        .binary.display()
    )]
    MissingBinary {
        /// Path where the binary was expected.
        binary: PathBuf,
    },
}

/// The tool ran but failed its acceptance policy.
///
/// Captured stdout/stderr have already been echoed by the time this
/// propagates, so diagnostic context is never lost.
#[derive(Debug, Error)]
#[error("{tool} failed with exit code {exit_code}")]
pub struct ExecError {
    /// Tool binary name.
    pub tool: String,
    /// Exit code reported by the process (`-1` when the platform gave none).
    pub exit_code: i32,
}
