use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use localexec_runner::{DualStreamMode, Primitive};

/// Run a command through the first process-spawning primitive the host allows.
///
/// Put `--` before the command when its arguments start with a dash:
/// `localexec -- ls -la`.
#[derive(Debug, Parser)]
#[command(name = "localexec", version, about, long_about = None)]
pub struct Cli {
    /// Join arguments verbatim instead of quoting each one
    #[arg(long)]
    pub no_escape: bool,

    /// TOML file with a `[policy]` table naming disabled primitives
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run with this primitive only, skipping availability checks
    #[arg(long, value_name = "PRIMITIVE")]
    pub strategy: Option<Primitive>,

    /// How the proc_open strategy collects stdout and stderr
    #[arg(long, value_enum, default_value_t = DualStreamArg::Pipes)]
    pub dual_stream: DualStreamArg,

    /// Print available primitives in selection order and exit
    #[arg(long)]
    pub list: bool,

    /// Program to run
    #[arg(required_unless_present = "list")]
    pub command: Option<String>,

    /// Arguments passed to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DualStreamArg {
    Pipes,
    SharedTempFile,
}

impl From<DualStreamArg> for DualStreamMode {
    fn from(value: DualStreamArg) -> Self {
        match value {
            DualStreamArg::Pipes => Self::Pipes,
            DualStreamArg::SharedTempFile => Self::SharedTempFile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_strategy_and_trailing_arguments() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from([
            "localexec",
            "--strategy",
            "proc_open",
            "--dual-stream",
            "shared-temp-file",
            "--",
            "sh",
            "-c",
            "exit 3",
        ])?;
        assert_eq!(cli.strategy, Some(Primitive::ProcOpen));
        assert_eq!(cli.dual_stream, DualStreamArg::SharedTempFile);
        assert_eq!(cli.command.as_deref(), Some("sh"));
        assert_eq!(cli.args, ["-c", "exit 3"]);
        Ok(())
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!(Cli::try_parse_from(["localexec", "--strategy", "system", "true"]).is_err());
    }

    #[test]
    fn list_does_not_need_a_command() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from(["localexec", "--list"])?;
        assert!(cli.list);
        assert!(cli.command.is_none());
        Ok(())
    }
}
