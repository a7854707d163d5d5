//! Locating a JDK tool binary under a tool home.

use std::path::{Path, PathBuf};

/// Platform-specific executable name for a JDK tool.
#[cfg(windows)]
pub fn executable_name(tool: &str) -> String {
    format!("{tool}.exe")
}

/// Platform-specific executable name for a JDK tool.
#[cfg(not(windows))]
pub fn executable_name(tool: &str) -> String {
    tool.to_string()
}

/// Expected binary location: `<tool_home>/bin/<executable>`.
pub fn tool_binary(tool_home: &Path, tool: &str) -> PathBuf {
    tool_home.join("bin").join(executable_name(tool))
}
