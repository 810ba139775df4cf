//! `toolattr` command-line entry point.
//!
//! Small front end over the library: normalize paths, check a config file by
//! applying it through the declared settings attributes, and run an external
//! program with piped or inherited streams.

use std::io::Write;
use std::path::PathBuf;
use std::process::{ExitCode, ExitStatus};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use toolattr::core::path::normalize_path;
use toolattr::io::config::{DEFAULT_CONFIG_FILE, load_config};
use toolattr::settings::Settings;
use toolattr::{ErrorKind, ExternalCommand, InvokeOptions, Output, Redirect, exit_codes, logging};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "toolattr",
    version,
    about = "Validated build settings and external tool invocation"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print each path in normalized form.
    Normalize {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Load a config file, apply it through the settings attributes, print the result.
    Check {
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
    /// Run an external program and relay its output.
    Run {
        /// Text encoding of the program's output; decoded output is relayed as UTF-8
        /// (default: raw bytes).
        #[arg(short, long)]
        encoding: Option<String>,
        /// Let the program use this terminal directly instead of pipes.
        #[arg(long)]
        inherit: bool,
        program: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn main() -> ExitCode {
    logging::init();
    match run() {
        Ok(code) => exit_code(code),
        Err(err) => {
            eprintln!("{err:#}");
            let spawn_failed = err
                .downcast_ref::<toolattr::Error>()
                .is_some_and(|err| err.kind() == ErrorKind::Spawn);
            exit_code(if spawn_failed {
                exit_codes::SPAWN_FAILED
            } else {
                exit_codes::INVALID
            })
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Normalize { paths } => cmd_normalize(&paths),
        Command::Check { config } => cmd_check(&config),
        Command::Run {
            encoding,
            inherit,
            program,
            args,
        } => cmd_run(&program, &args, encoding.as_deref(), inherit),
    }
}

fn cmd_normalize(paths: &[String]) -> Result<i32> {
    for path in paths {
        if path.is_empty() {
            bail!("empty path");
        }
        println!("{}", normalize_path(path));
    }
    Ok(exit_codes::OK)
}

fn cmd_check(config: &std::path::Path) -> Result<i32> {
    let cfg = load_config(config)?;
    let settings = Settings::from_config(&cfg)
        .with_context(|| format!("apply {}", config.display()))?;
    for line in settings.describe()? {
        println!("{line}");
    }
    for (name, tool) in settings.tools() {
        println!("tools.{name} = {tool}");
    }
    Ok(exit_codes::OK)
}

fn cmd_run(program: &str, args: &[String], encoding: Option<&str>, inherit: bool) -> Result<i32> {
    let command = ExternalCommand::with_encoding_label(program, encoding)?;
    let status = if inherit {
        let mut process = command.invoke(args, InvokeOptions::new().inherit_all())?;
        process.wait()?
    } else {
        let process = command.invoke(args, InvokeOptions::new().stdin(Redirect::Inherit))?;
        let completed = match process.communicate(None) {
            Ok(completed) => completed,
            Err(toolattr::Error::Undecoded { completed, error }) => {
                warn!(%error, "relaying undecodable output unchanged");
                *completed
            }
            Err(err) => return Err(err.into()),
        };
        relay(completed.stdout, &mut std::io::stdout())?;
        relay(completed.stderr, &mut std::io::stderr())?;
        completed.status
    };
    Ok(child_exit_code(status))
}

/// The child's exit code, or `128 + signal` if a signal ended it.
fn child_exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    status.code().unwrap_or(exit_codes::INVALID)
}

fn relay(output: Option<Output>, sink: &mut impl Write) -> Result<()> {
    if let Some(output) = output {
        sink.write_all(output.as_bytes()).context("relay output")?;
        sink.flush().context("flush output")?;
    }
    Ok(())
}
