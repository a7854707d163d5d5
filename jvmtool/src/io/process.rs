//! Spawning a tool process with synchronous, bounded output capture.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};

/// Everything needed to spawn one tool process.
///
/// Built by the invocation operation and handed to the `configure_process`
/// hook for adjustment before spawn.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// Path to the binary.
    pub program: PathBuf,
    /// Process arguments (the operation passes a single `@<args-file>`).
    pub args: Vec<String>,
    /// Extra environment variables, appended to the inherited environment.
    pub env: Vec<(String, String)>,
    /// Working directory for the child; inherits the parent's when `None`.
    pub cwd: Option<PathBuf>,
    /// Bytes written to the child's stdin before waiting.
    pub stdin: Option<Vec<u8>>,
    /// Bound on bytes kept per captured stream.
    pub output_limit_bytes: usize,
}

impl ProcessRequest {
    pub fn new(program: PathBuf, args: Vec<String>, output_limit_bytes: usize) -> Self {
        Self {
            program,
            args,
            env: Vec::new(),
            cwd: None,
            stdin: None,
            output_limit_bytes,
        }
    }
}

/// Captured result of one tool process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code, `-1` when the platform reports none (e.g. killed by signal).
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Bytes discarded from stdout beyond the capture limit.
    pub stdout_truncated: usize,
    /// Bytes discarded from stderr beyond the capture limit.
    pub stderr_truncated: usize,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Abstraction over process spawning.
///
/// The invocation operation only needs "spawn, block, capture". Tests use
/// recording runners that return predetermined outputs without spawning.
pub trait ProcessRunner {
    fn run(&self, request: &ProcessRequest) -> Result<ProcessOutput>;
}

/// Runner that spawns the real binary via [`std::process::Command`].
///
/// Blocks the calling thread until the child exits and both streams are
/// drained. There is no timeout: a hung tool blocks the invocation
/// indefinitely, and bounded execution is the caller's concern.
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    #[instrument(skip_all, fields(program = %request.program.display()))]
    fn run(&self, request: &ProcessRequest) -> Result<ProcessOutput> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        for (key, value) in &request.env {
            cmd.env(key, value);
        }
        if let Some(cwd) = &request.cwd {
            cmd.current_dir(cwd);
        }
        if request.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        } else {
            cmd.stdin(Stdio::null());
        }
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        debug!("spawning tool process");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                error!(err = %err, "failed to spawn tool");
                return Err(err)
                    .with_context(|| format!("spawn {}", request.program.display()));
            }
        };

        if let Some(input) = &request.stdin {
            let mut child_stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("stdin was not piped"))?;
            child_stdin.write_all(input).context("write stdin")?;
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr was not piped"))?;

        let limit = request.output_limit_bytes;
        let stdout_handle = thread::spawn(move || read_stream_limited(stdout, limit));
        let stderr_handle = thread::spawn(move || read_stream_limited(stderr, limit));

        let status = child.wait().context("wait for tool")?;

        let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
        let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;

        if stdout_truncated > 0 || stderr_truncated > 0 {
            warn!(stdout_truncated, stderr_truncated, "captured output truncated");
        }

        let exit_code = status.code().unwrap_or(-1);
        debug!(exit_code, "tool finished");
        Ok(ProcessOutput {
            exit_code,
            stdout,
            stderr,
            stdout_truncated,
            stderr_truncated,
        })
    }
}

fn join_output(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str, limit: usize) -> ProcessRequest {
        ProcessRequest::new(
            PathBuf::from("/bin/sh"),
            vec!["-c".to_string(), script.to_string()],
            limit,
        )
    }

    #[test]
    fn captures_both_streams_and_exit_code() {
        let output = SystemRunner
            .run(&sh("echo out; echo err >&2; exit 3", 100_000))
            .expect("run");
        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
        assert_eq!(output.stdout_lossy(), "out\n");
        assert_eq!(output.stderr_lossy(), "err\n");
    }

    #[test]
    fn zero_exit_is_success() {
        let output = SystemRunner.run(&sh("exit 0", 100_000)).expect("run");
        assert_eq!(output.exit_code, 0);
        assert!(output.success());
    }

    #[test]
    fn output_beyond_limit_is_dropped_but_drained() {
        let output = SystemRunner
            .run(&sh("printf '0123456789'", 4))
            .expect("run");
        assert_eq!(output.stdout, b"0123");
        assert_eq!(output.stdout_truncated, 6);
    }

    #[test]
    fn stdin_reaches_the_child() {
        let mut request = sh("cat", 100_000);
        request.stdin = Some(b"fed via stdin".to_vec());
        let output = SystemRunner.run(&request).expect("run");
        assert_eq!(output.stdout_lossy(), "fed via stdin");
    }

    #[test]
    fn extra_env_reaches_the_child() {
        let mut request = sh("printf '%s' \"$JVMTOOL_TEST_MARKER\"", 100_000);
        request.env.push(("JVMTOOL_TEST_MARKER".to_string(), "marked".to_string()));
        let output = SystemRunner.run(&request).expect("run");
        assert_eq!(output.stdout_lossy(), "marked");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let request = ProcessRequest::new(
            PathBuf::from("/nonexistent/jvmtool-no-such-binary"),
            Vec::new(),
            100_000,
        );
        let err = SystemRunner.run(&request).unwrap_err();
        assert!(err.to_string().contains("spawn"));
    }
}
