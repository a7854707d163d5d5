//! Tool-invocation configuration stored in `jvmtool.toml`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Crate configuration (TOML).
///
/// Intended to be edited by humans and checked into the consuming build.
/// Missing fields default to sensible values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JvmToolConfig {
    /// JDK installation to take tool binaries from. Falls back to the
    /// `JAVA_HOME` environment variable when unset. Must point at a JDK
    /// meeting the minimum version floor for the tools in use (JDK 14+ for
    /// `jpackage`); only the binary-existence check is enforced.
    pub tool_home: Option<PathBuf>,

    /// Explicit verbosity override. When unset, verbosity derives from the
    /// `JVMTOOL_VERBOSE` environment variable or a debug-enabled tracing
    /// filter.
    pub verbose: Option<bool>,

    /// Keep the working directory and argument file after a run for
    /// post-mortem inspection. Also enabled by the
    /// `JVMTOOL_PRESERVE_WORKING_DIR` environment variable.
    pub preserve_working_dir: bool,

    /// Parent directory for per-invocation working directories and argument
    /// files.
    pub scratch_dir: PathBuf,

    /// Truncate captured tool stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for JvmToolConfig {
    fn default() -> Self {
        Self {
            tool_home: None,
            verbose: None,
            preserve_working_dir: false,
            scratch_dir: PathBuf::from("build/jvmtool"),
            output_limit_bytes: 100_000,
        }
    }
}

impl JvmToolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.scratch_dir.as_os_str().is_empty() {
            return Err(anyhow!("scratch_dir must not be empty"));
        }
        Ok(())
    }

    /// Resolve the tool home: explicit config value, else `JAVA_HOME`.
    pub fn resolve_tool_home(&self) -> Result<PathBuf> {
        if let Some(home) = &self.tool_home {
            return Ok(home.clone());
        }
        match env::var_os("JAVA_HOME") {
            Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
            _ => Err(ConfigError::MissingToolHome.into()),
        }
    }

    /// Effective verbosity: explicit setting, else `JVMTOOL_VERBOSE`, else
    /// whether debug-level tracing is enabled.
    pub fn effective_verbose(&self) -> bool {
        if let Some(verbose) = self.verbose {
            return verbose;
        }
        if env_flag("JVMTOOL_VERBOSE") {
            return true;
        }
        tracing::enabled!(tracing::Level::DEBUG)
    }

    /// Effective preservation flag: config value or the
    /// `JVMTOOL_PRESERVE_WORKING_DIR` environment variable.
    pub fn effective_preserve_working_dir(&self) -> bool {
        self.preserve_working_dir || env_flag("JVMTOOL_PRESERVE_WORKING_DIR")
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).ok().as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `JvmToolConfig::default()`.
pub fn load_config(path: &Path) -> Result<JvmToolConfig> {
    if !path.exists() {
        let cfg = JvmToolConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: JvmToolConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &JvmToolConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
