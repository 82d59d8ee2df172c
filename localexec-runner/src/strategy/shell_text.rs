use std::io::Read;
use std::process::Stdio;

use tracing::debug;

use super::{ExecStrategy, Outcome, Primitive, decode, exit_code, reap};
use crate::error::ExecError;
use crate::shell::ShellKind;

/// Evaluates the line and returns whatever the shell printed.
///
/// The exit status is observed for logging only; this backend fails only when
/// the shell cannot be started or its output cannot be read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellText {
    shell: ShellKind,
}

impl ShellText {
    pub fn new(shell: ShellKind) -> Self {
        Self { shell }
    }
}

impl ExecStrategy for ShellText {
    fn primitive(&self) -> Primitive {
        Primitive::ShellExec
    }

    fn execute(&self, command_line: &str) -> Result<Outcome, ExecError> {
        let mut child = self
            .shell
            .command(command_line)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|error| ExecError::io(command_line, error))?;

        let mut buffer = Vec::new();
        if let Some(mut stdout) = child.stdout.take()
            && let Err(error) = stdout.read_to_end(&mut buffer)
        {
            drop(stdout);
            reap(&mut child);
            return Err(ExecError::io(command_line, error));
        }

        let status = child
            .wait()
            .map_err(|error| ExecError::io(command_line, error))?;
        debug!(
            code = exit_code(status),
            bytes = buffer.len(),
            "shell_exec finished; status not checked"
        );

        Ok(Outcome::success(decode(buffer)))
    }
}
