//! Shared helpers for unit and integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::tool::executable_name;
use crate::invoke::Invocation;

/// Create `<root>/jdk/bin/<tool>` as a plain file and return the tool home.
///
/// Enough for tests that never spawn (the existence precondition only).
pub fn stub_tool_home(root: &Path, tool: &str) -> PathBuf {
    let home = root.join("jdk");
    let bin = home.join("bin");
    fs::create_dir_all(&bin).expect("create bin dir");
    fs::write(bin.join(executable_name(tool)), "").expect("write stub tool");
    home
}

/// Create `<root>/jdk/bin/<tool>` as an executable `/bin/sh` script.
///
/// The script body receives the single `@<args-file>` argument as `$1`.
#[cfg(unix)]
pub fn script_tool_home(root: &Path, tool: &str, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let home = root.join("jdk");
    let bin = home.join("bin");
    fs::create_dir_all(&bin).expect("create bin dir");
    let path = bin.join(tool);
    fs::write(&path, format!("#!/bin/sh\n{script}\n")).expect("write tool script");
    let mut perms = fs::metadata(&path).expect("tool metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("make tool executable");
    home
}

/// Invocation rooted in a test directory, with quiet defaults.
pub fn sample_invocation(root: &Path, tool: &str, tool_home: PathBuf) -> Invocation {
    Invocation {
        tool: tool.to_string(),
        identity: format!("test-{tool}"),
        destination_dir: root.join("dest"),
        free_args: Vec::new(),
        tool_home,
        scratch_dir: root.join("scratch"),
        verbose: false,
        preserve_working_dir: false,
        output_limit_bytes: 100_000,
    }
}
