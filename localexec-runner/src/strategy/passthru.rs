use std::io;
use std::process::Stdio;

use tracing::debug;

use super::{ExecStrategy, Outcome, Primitive, decode, exit_code, reap};
use crate::error::ExecError;
use crate::shell::ShellKind;

/// Redirects the child's live stdout into an in-memory buffer, byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCapture {
    shell: ShellKind,
}

impl PassthroughCapture {
    pub fn new(shell: ShellKind) -> Self {
        Self { shell }
    }
}

impl ExecStrategy for PassthroughCapture {
    fn primitive(&self) -> Primitive {
        Primitive::Passthru
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
            && let Err(error) = io::copy(&mut stdout, &mut buffer)
        {
            drop(stdout);
            reap(&mut child);
            return Err(ExecError::io(command_line, error));
        }

        let status = child
            .wait()
            .map_err(|error| ExecError::io(command_line, error))?;
        let code = exit_code(status);
        let output = decode(buffer);
        debug!(code, bytes = output.len(), "passthru finished");

        if code != 0 {
            return Err(ExecError::new(command_line, output, code));
        }
        Ok(Outcome::success(output))
    }
}
