//! Command specification and command-line construction.
//!
//! A [`CommandSpec`] is validated once at construction and then rendered into
//! a single shell line by [`CommandSpec::build`]. The command name is always
//! quoted as one word; arguments are quoted individually unless escaping is
//! switched off, in which case they are joined verbatim and the caller owns
//! their safety.

use crate::error::ExecError;
use crate::shell::ShellKind;

/// Immutable description of a command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    command: String,
    args: Vec<String>,
    escape: bool,
}

impl CommandSpec {
    /// Build a spec from a command name and optional argument values.
    ///
    /// `None` arguments are dropped rather than rendered as empty words. The
    /// command name is trimmed and must not be empty.
    pub fn new<I, S>(command: &str, args: I) -> Result<Self, ExecError>
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return Err(ExecError::invalid_command(command));
        }

        Ok(Self {
            command: trimmed.to_string(),
            args: args.into_iter().flatten().map(Into::into).collect(),
            escape: true,
        })
    }

    /// Same as [`CommandSpec::new`] for argument lists without gaps.
    pub fn from_args<I, S>(command: &str, args: I) -> Result<Self, ExecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(command, args.into_iter().map(Some))
    }

    /// Toggle per-argument quoting. Enabled by default.
    #[must_use]
    pub fn escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn escapes(&self) -> bool {
        self.escape
    }

    /// Render the command line for the host shell.
    pub fn build(&self) -> String {
        self.build_for(ShellKind::host())
    }

    /// Render the command line for a specific shell family.
    pub fn build_for(&self, shell: ShellKind) -> String {
        let mut line = shell.quote(&self.command).into_owned();
        for arg in &self.args {
            line.push(' ');
            if self.escape {
                line.push_str(&shell.quote(arg));
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// One-shot helper: validate and render in a single call.
pub fn build_command_line<I, S>(command: &str, args: I, escape: bool) -> Result<String, ExecError>
where
    I: IntoIterator<Item = Option<S>>,
    S: Into<String>,
{
    Ok(CommandSpec::new(command, args)?.escape(escape).build())
}
