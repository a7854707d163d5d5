//! Orchestration of a single tool invocation.
//!
//! Lifecycle: binary-existence precondition, destination reset, workspace
//! preparation, argument materialization, blocking process execution with
//! captured streams, stream echo, acceptance policy, guaranteed cleanup.
//! All steps are sequential; there is no concurrency inside one invocation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument, warn};

use crate::core::args::materialize;
use crate::core::tool::tool_binary;
use crate::error::{ConfigError, ExecError};
use crate::io::process::{ProcessOutput, ProcessRequest, ProcessRunner, SystemRunner};
use crate::io::workdir;

/// Immutable-per-run description of one tool invocation.
///
/// The destination directory is exclusively owned by the invocation for the
/// duration of a run: it is cleared and rewritten on every run, and no other
/// component may write into it concurrently. The working directory and
/// argument file are named deterministically from `identity`, so two
/// invocations sharing an identity must not run concurrently (unsupported,
/// unsynchronized).
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Name of the JDK tool binary, e.g. `jlink` or `jpackage`.
    pub tool: String,
    /// Deterministic key for the working directory and argument file.
    pub identity: String,
    /// Output directory, cleared before each run.
    pub destination_dir: PathBuf,
    /// Free-form extra arguments, appended verbatim after the base list.
    pub free_args: Vec<String>,
    /// Resolved JDK installation root; the binary is expected at
    /// `bin/<platform executable name>`.
    pub tool_home: PathBuf,
    /// Parent directory for the working directory and argument file.
    pub scratch_dir: PathBuf,
    /// Echo captured tool output even on success.
    pub verbose: bool,
    /// Keep the working directory and argument file after the run.
    pub preserve_working_dir: bool,
    /// Bound on captured bytes per stream.
    pub output_limit_bytes: usize,
}

impl Invocation {
    /// Working directory for this invocation.
    pub fn working_dir(&self) -> PathBuf {
        workdir::working_dir(&self.scratch_dir, &self.identity)
    }

    /// Argument file for this invocation.
    pub fn args_file(&self) -> PathBuf {
        workdir::args_file(&self.scratch_dir, &self.identity)
    }

    /// Run with default hooks and the system runner.
    pub fn execute(&self, rebuild: Rebuild) -> Result<InvokeOutcome> {
        invoke(self, &DefaultHooks, &SystemRunner, rebuild)
    }

    fn validate(&self) -> Result<()> {
        if self.tool.trim().is_empty() {
            anyhow::bail!("tool name must not be empty");
        }
        if self.identity.trim().is_empty() {
            anyhow::bail!("invocation identity must not be empty");
        }
        if self.output_limit_bytes == 0 {
            anyhow::bail!("output_limit_bytes must be > 0");
        }
        Ok(())
    }
}

/// Opaque rebuild signal from the build host.
///
/// Forwarded to [`ToolHooks::populate_working_dir`]; the base operation does
/// not interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebuild {
    /// Run from scratch.
    Full,
    /// The build host reported unchanged inputs since the previous run.
    Incremental,
}

/// Extension points of the invocation lifecycle.
///
/// Defaults implement the base behavior; tool-specific callers override
/// individual steps. The destination and working-directory resets are not
/// part of this trait: the binary-existence check always precedes the first
/// filesystem mutation, and the working directory is guaranteed empty before
/// [`ToolHooks::populate_working_dir`] runs.
pub trait ToolHooks {
    /// Pre-populate the freshly reset working directory.
    fn populate_working_dir(
        &self,
        invocation: &Invocation,
        workdir: &Path,
        rebuild: Rebuild,
    ) -> Result<()> {
        let _ = (invocation, workdir, rebuild);
        Ok(())
    }

    /// Base argument list; the operation appends `free_args` afterwards.
    ///
    /// Receives the working directory so implementations can hand the tool
    /// paths inside it.
    fn make_args(&self, invocation: &Invocation, workdir: &Path) -> Result<Vec<String>> {
        let _ = (invocation, workdir);
        Ok(Vec::new())
    }

    /// Adjust the process request (environment, cwd, stdin) before spawn.
    fn configure_process(&self, invocation: &Invocation, request: &mut ProcessRequest) {
        let _ = (invocation, request);
    }

    /// Acceptance policy. The default requires exit code zero.
    fn check_result(&self, invocation: &Invocation, output: &ProcessOutput) -> Result<()> {
        if output.success() {
            return Ok(());
        }
        Err(ExecError {
            tool: invocation.tool.clone(),
            exit_code: output.exit_code,
        }
        .into())
    }
}

/// All-defaults hook set.
pub struct DefaultHooks;

impl ToolHooks for DefaultHooks {}

/// Caller-facing record of a completed invocation.
#[derive(Debug, Clone)]
pub struct InvokeOutcome {
    /// Tool binary name.
    pub tool: String,
    /// Invocation identity.
    pub identity: String,
    /// Exit code accepted by the result policy (zero under the default).
    pub exit_code: i32,
}

/// Execute one tool invocation.
///
/// No step is retried; every failure aborts the invocation and surfaces to
/// the caller. See the crate docs for the full lifecycle.
#[instrument(skip_all, fields(tool = %invocation.tool, identity = %invocation.identity))]
pub fn invoke<H: ToolHooks, R: ProcessRunner>(
    invocation: &Invocation,
    hooks: &H,
    runner: &R,
    rebuild: Rebuild,
) -> Result<InvokeOutcome> {
    invocation.validate()?;

    // Precondition: the binary must exist before anything on disk moves.
    let binary = tool_binary(&invocation.tool_home, &invocation.tool);
    if !binary.is_file() {
        return Err(ConfigError::MissingBinary { binary }.into());
    }

    // The destination is exclusively owned by this run; partial output from
    // a failed previous run never leaks into a fresh one.
    workdir::reset_dir(&invocation.destination_dir)?;

    let workdir = invocation.working_dir();
    workdir::reset_dir(&workdir)?;
    hooks.populate_working_dir(invocation, &workdir, rebuild)?;

    let base = hooks.make_args(invocation, &workdir)?;
    let args = materialize(base, &invocation.free_args);
    let args_file = invocation.args_file();
    workdir::write_args_file(&args_file, &args)?;
    debug!(args = args.len(), args_file = %args_file.display(), "materialized arguments");

    let attempt = (|| -> Result<ProcessOutput> {
        let args_file_abs = std::path::absolute(&args_file)
            .with_context(|| format!("absolutize {}", args_file.display()))?;
        let mut request = ProcessRequest::new(
            binary.clone(),
            vec![format!("@{}", args_file_abs.display())],
            invocation.output_limit_bytes,
        );
        hooks.configure_process(invocation, &mut request);

        let output = runner.run(&request)?;

        // Verbose runs show both streams even on success; failing runs show
        // both streams even when not verbose. Failures are never silent.
        if invocation.verbose || !output.success() {
            info!(tool = %invocation.tool, "tool stdout:\n{}", output.stdout_lossy());
            error!(tool = %invocation.tool, "tool stderr:\n{}", output.stderr_lossy());
        }

        hooks.check_result(invocation, &output)?;
        Ok(output)
    })();

    // Cleanup runs on every exit path, success or failure.
    let cleanup = cleanup_transient(invocation, &workdir, &args_file);

    match (attempt, cleanup) {
        (Ok(output), Ok(())) => Ok(InvokeOutcome {
            tool: invocation.tool.clone(),
            identity: invocation.identity.clone(),
            exit_code: output.exit_code,
        }),
        (Ok(_), Err(cleanup_err)) => Err(cleanup_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(cleanup_err)) => {
            // The primary failure wins; the cleanup failure stays visible.
            warn!(err = %cleanup_err, "cleanup failed after invocation error");
            Err(err)
        }
    }
}

fn cleanup_transient(invocation: &Invocation, workdir: &Path, args_file: &Path) -> Result<()> {
    if invocation.preserve_working_dir {
        info!(workdir = %workdir.display(), "preserving working directory");
        return Ok(());
    }
    workdir::remove_transient(workdir, args_file)
}
