//! localexec - run a shell command through the first process-spawning
//! primitive the host has not disabled.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use localexec_runner::{
    CommandSpec, Exec, ExecError, ExecSettings, LocalExec, install_deny_list,
};

mod cli;

use cli::Cli;

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    initialize_tracing();

    let settings = load_settings(args.config.as_ref())?;
    install_deny_list(&settings).context("failed to install deny-list")?;

    let exec = LocalExec::new().with_dual_stream(args.dual_stream.into());

    if args.list {
        let mut stdout = io::stdout().lock();
        for primitive in exec.available_primitives() {
            writeln!(stdout, "{primitive}")?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let command = args.command.as_deref().unwrap_or_default();
    let result = CommandSpec::from_args(command, args.args.iter().map(String::as_str))
        .map(|spec| spec.escape(!args.no_escape))
        .and_then(|spec| match args.strategy {
            Some(primitive) => exec.run_with(primitive, &spec),
            None => exec.run_spec(&spec),
        });

    match result {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            report_failure(&error)?;
            Ok(ExitCode::from(exit_status(error.code())))
        }
    }
}

/// Config file values first, then the environment.
fn load_settings(explicit: Option<&PathBuf>) -> Result<ExecSettings> {
    let path = match explicit {
        Some(path) => Some(path.clone()),
        None => default_config_path().filter(|path| path.is_file()),
    };

    let file_settings = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading deny-list config");
            ExecSettings::load(&path)?
        }
        None => ExecSettings::default(),
    };

    Ok(file_settings.merged(ExecSettings::from_env()))
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("localexec").join("config.toml"))
}

fn report_failure(error: &ExecError) -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    writeln!(
        stderr,
        "localexec: `{}` failed with code {}",
        error.command(),
        error.code()
    )?;
    let message = error.message().trim_end();
    if !message.is_empty() {
        writeln!(stderr, "{message}")?;
    }
    Ok(())
}

/// Process exit status for a failure code; anything outside 1..=255 maps to 1.
fn exit_status(code: i32) -> u8 {
    u8::try_from(code).ok().filter(|status| *status != 0).unwrap_or(1)
}

fn initialize_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
