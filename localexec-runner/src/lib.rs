//! Runs shell commands on hosts where some process-spawning primitives may be
//! administratively disabled. Callers hand over a command name and arguments;
//! the crate quotes them into a single shell line, picks the first strategy
//! whose primitive is available and normalizes its captured output and exit
//! status into one result type.

pub mod command;
pub mod config;
pub mod error;
pub mod executor;
pub mod last_error;
pub mod policy;
pub mod shell;
pub mod strategy;

pub use command::{CommandSpec, build_command_line};
pub use config::{ConfigError, ExecSettings};
pub use error::{ExecError, FailureKind};
pub use executor::{Exec, ExecOptions, LocalExec};
pub use policy::{
    AllowAllProbe, DenyList, DenyListProbe, PrimitiveProbe, RuntimeProbe, deny_list,
    install_deny_list, is_disabled,
};
pub use shell::ShellKind;
pub use strategy::{DualStreamMode, ExecStrategy, Outcome, Primitive};

/// Run `command` with `args` through the default [`LocalExec`].
///
/// Arguments are quoted as individual shell words unless `options.escape` is
/// false.
pub fn run<I, S>(command: &str, args: I, options: ExecOptions) -> Result<String, ExecError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    LocalExec::new().run_args(command, args, options)
}
