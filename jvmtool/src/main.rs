//! Command-line front end for invoking JDK tools.
//!
//! Builds an [`Invocation`] from `jvmtool.toml` plus flags and runs it with
//! the default hooks and the system process runner.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use jvmtool::core::tool::tool_binary;
use jvmtool::error::ExecError;
use jvmtool::exit_codes;
use jvmtool::invoke::{Invocation, Rebuild};
use jvmtool::io::config::load_config;
use jvmtool::logging;

#[derive(Parser)]
#[command(
    name = "jvmtool",
    version,
    about = "Invoke JDK command-line tools with a deterministic workspace lifecycle"
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "jvmtool.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a JDK tool, passing its arguments via the `@file` convention.
    Run {
        /// Tool binary name, e.g. `jlink` or `jpackage`.
        tool: String,
        /// Output directory, cleared before the run.
        #[arg(long)]
        dest: PathBuf,
        /// Identity key for scratch artifacts; defaults to the tool name.
        #[arg(long)]
        identity: Option<String>,
        /// Extra arguments appended verbatim to the tool's argument file.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Print the resolved path of a tool binary.
    Locate {
        /// Tool binary name.
        tool: String,
    },
    /// Print the effective configuration.
    Config,
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_code_for(&err));
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config = load_config(&cli.config)?;
    match cli.command {
        Command::Run {
            tool,
            dest,
            identity,
            args,
        } => {
            let invocation = Invocation {
                identity: identity.unwrap_or_else(|| tool.clone()),
                tool,
                destination_dir: dest,
                free_args: args,
                tool_home: config.resolve_tool_home()?,
                scratch_dir: config.scratch_dir.clone(),
                verbose: config.effective_verbose(),
                preserve_working_dir: config.effective_preserve_working_dir(),
                output_limit_bytes: config.output_limit_bytes,
            };
            let outcome = invocation.execute(Rebuild::Full)?;
            println!(
                "run: tool={} identity={} exit_code={}",
                outcome.tool, outcome.identity, outcome.exit_code
            );
            Ok(exit_codes::OK)
        }
        Command::Locate { tool } => {
            let home = config.resolve_tool_home()?;
            let binary = tool_binary(&home, &tool);
            println!("{}", binary.display());
            if binary.is_file() {
                Ok(exit_codes::OK)
            } else {
                Ok(exit_codes::INVALID)
            }
        }
        Command::Config => {
            let rendered = toml::to_string_pretty(&config).context("render config")?;
            print!("{rendered}");
            println!(
                "effective: verbose={} preserve_working_dir={}",
                config.effective_verbose(),
                config.effective_preserve_working_dir()
            );
            Ok(exit_codes::OK)
        }
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ExecError>().is_some() {
        return exit_codes::TOOL_FAILED;
    }
    exit_codes::INVALID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_with_trailing_tool_args() {
        let cli = Cli::parse_from([
            "jvmtool",
            "run",
            "jlink",
            "--dest",
            "out/image",
            "--",
            "-v",
            "--opt=1",
        ]);
        match cli.command {
            Command::Run {
                tool,
                dest,
                identity,
                args,
                ..
            } => {
                assert_eq!(tool, "jlink");
                assert_eq!(dest, PathBuf::from("out/image"));
                assert_eq!(identity, None);
                assert_eq!(args, vec!["-v".to_string(), "--opt=1".to_string()]);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn parse_locate() {
        let cli = Cli::parse_from(["jvmtool", "locate", "jpackage"]);
        assert!(matches!(cli.command, Command::Locate { tool } if tool == "jpackage"));
    }

    #[test]
    fn parse_custom_config_path() {
        let cli = Cli::parse_from(["jvmtool", "--config", "ci/jvmtool.toml", "config"]);
        assert_eq!(cli.config, PathBuf::from("ci/jvmtool.toml"));
        assert!(matches!(cli.command, Command::Config));
    }

    #[test]
    fn exec_errors_map_to_tool_failed() {
        let err = anyhow::Error::new(ExecError {
            tool: "jlink".to_string(),
            exit_code: 5,
        });
        assert_eq!(exit_code_for(&err), exit_codes::TOOL_FAILED);
        assert_eq!(exit_code_for(&anyhow::anyhow!("io")), exit_codes::INVALID);
    }
}
