//! Working-directory lifecycle for one tool invocation.
//!
//! Each invocation owns a scratch directory keyed by its identity, plus an
//! argument file adjacent to it (`<identity>.args.txt`). Both live for
//! exactly one invocation unless preservation is requested. The
//! deterministic naming means two invocations with the same identity must
//! not run concurrently; last writer wins, with no locking.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::args::render_args_file;

/// Working directory for an invocation: `<scratch_dir>/<identity>`.
pub fn working_dir(scratch_dir: &Path, identity: &str) -> PathBuf {
    scratch_dir.join(identity)
}

/// Argument file, sibling of the working directory: `<identity>.args.txt`.
pub fn args_file(scratch_dir: &Path, identity: &str) -> PathBuf {
    scratch_dir.join(format!("{identity}.args.txt"))
}

/// Delete then recreate a directory.
///
/// Safe to call when nothing exists yet; stale contents from a previous run
/// never survive.
pub fn reset_dir(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).with_context(|| format!("remove {}", path.display()))?;
    }
    fs::create_dir_all(path).with_context(|| format!("create {}", path.display()))?;
    Ok(())
}

/// Write the argument file, one argument per line.
pub fn write_args_file(path: &Path, args: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, render_args_file(args)).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Remove the transient artifacts of one invocation.
pub fn remove_transient(workdir: &Path, args_file: &Path) -> Result<()> {
    if workdir.exists() {
        fs::remove_dir_all(workdir).with_context(|| format!("remove {}", workdir.display()))?;
    }
    if args_file.exists() {
        fs::remove_file(args_file).with_context(|| format!("remove {}", args_file.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_file_is_a_sibling_of_the_working_dir() {
        let scratch = Path::new("build/jvmtool");
        assert_eq!(
            working_dir(scratch, "package-jlink"),
            Path::new("build/jvmtool/package-jlink")
        );
        assert_eq!(
            args_file(scratch, "package-jlink"),
            Path::new("build/jvmtool/package-jlink.args.txt")
        );
    }

    #[test]
    fn reset_creates_a_missing_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("work");
        reset_dir(&dir).expect("reset");
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).expect("read dir").count(), 0);
    }

    #[test]
    fn reset_drops_stale_contents() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("work");
        fs::create_dir_all(dir.join("nested")).expect("create stale");
        fs::write(dir.join("nested/leftover.txt"), "stale").expect("write stale");

        reset_dir(&dir).expect("reset");
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).expect("read dir").count(), 0);
    }

    #[test]
    fn written_args_file_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("scratch").join("task.args.txt");
        let args = vec!["-v".to_string(), "--opt=1".to_string()];

        write_args_file(&path, &args).expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "-v\n--opt=1");
        assert_eq!(crate::core::args::parse_args_file(&contents), args);
    }

    #[test]
    fn remove_transient_is_idempotent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let workdir = temp.path().join("work");
        let args = temp.path().join("work.args.txt");
        fs::create_dir_all(&workdir).expect("create workdir");
        fs::write(&args, "-v").expect("write args");

        remove_transient(&workdir, &args).expect("remove");
        assert!(!workdir.exists());
        assert!(!args.exists());

        remove_transient(&workdir, &args).expect("remove again");
    }
}
