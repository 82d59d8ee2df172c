use std::io::{BufRead, BufReader, ErrorKind};
use std::process::Stdio;

use tracing::debug;

use super::{ExecStrategy, Outcome, Primitive, decode, exit_code, reap};
use crate::error::ExecError;
use crate::shell::ShellKind;

/// Reads stdout line by line and joins the lines without a separator.
///
/// Trailing whitespace, line terminators included, is stripped from every
/// line. Stderr stays attached to the caller's stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectCapture {
    shell: ShellKind,
}

impl DirectCapture {
    pub fn new(shell: ShellKind) -> Self {
        Self { shell }
    }
}

impl ExecStrategy for DirectCapture {
    fn primitive(&self) -> Primitive {
        Primitive::Exec
    }

    fn execute(&self, command_line: &str) -> Result<Outcome, ExecError> {
        let mut child = self
            .shell
            .command(command_line)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|error| ExecError::io(command_line, error))?;

        let Some(stdout) = child.stdout.take() else {
            reap(&mut child);
            return Err(ExecError::new(command_line, "stdout was not captured", -1));
        };

        let mut reader = BufReader::new(stdout);
        let mut output = Vec::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => output.extend_from_slice(line.trim_ascii_end()),
                Err(error) if error.kind() == ErrorKind::Interrupted => {}
                Err(error) => {
                    drop(reader);
                    reap(&mut child);
                    return Err(ExecError::io(command_line, error));
                }
            }
        }
        drop(reader);

        let status = child
            .wait()
            .map_err(|error| ExecError::io(command_line, error))?;
        let code = exit_code(status);
        let output = decode(output);
        debug!(code, bytes = output.len(), "exec finished");

        if code != 0 {
            return Err(ExecError::new(command_line, output, code));
        }
        Ok(Outcome::success(output))
    }
}
