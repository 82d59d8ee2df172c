use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::process::Stdio;

use tracing::debug;

use super::{ExecStrategy, Outcome, Primitive, decode, exit_code};
use crate::error::ExecError;
use crate::shell::ShellKind;

/// How stdout and stderr are collected by [`DualStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DualStreamMode {
    /// Two pipes drained concurrently; stdout first, then stderr.
    #[default]
    Pipes,
    /// Both streams share one anonymous temporary file, so their writes keep
    /// the order in which the child made them.
    SharedTempFile,
}

/// Spawns with stdin bound to the null device and captures both output
/// streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct DualStream {
    shell: ShellKind,
    mode: DualStreamMode,
}

impl DualStream {
    pub fn new(shell: ShellKind, mode: DualStreamMode) -> Self {
        Self { shell, mode }
    }

    fn run_with_pipes(&self, command_line: &str) -> Result<(Vec<u8>, i32), ExecError> {
        let child = self
            .shell
            .command(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| ExecError::io(command_line, error))?;

        let output = child
            .wait_with_output()
            .map_err(|error| ExecError::io(command_line, error))?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        Ok((combined, exit_code(output.status)))
    }

    fn run_with_shared_file(&self, command_line: &str) -> Result<(Vec<u8>, i32), ExecError> {
        let io_failure = |error: std::io::Error| ExecError::io(command_line, error);

        let mut buffer: File = tempfile::tempfile().map_err(io_failure)?;
        let stdout = buffer.try_clone().map_err(io_failure)?;
        let stderr = buffer.try_clone().map_err(io_failure)?;

        let status = self
            .shell
            .command(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .map_err(io_failure)?;

        let mut combined = Vec::new();
        buffer.seek(SeekFrom::Start(0)).map_err(io_failure)?;
        buffer.read_to_end(&mut combined).map_err(io_failure)?;
        Ok((combined, exit_code(status)))
    }
}

impl ExecStrategy for DualStream {
    fn primitive(&self) -> Primitive {
        Primitive::ProcOpen
    }

    fn execute(&self, command_line: &str) -> Result<Outcome, ExecError> {
        let (bytes, code) = match self.mode {
            DualStreamMode::Pipes => self.run_with_pipes(command_line)?,
            DualStreamMode::SharedTempFile => self.run_with_shared_file(command_line)?,
        };
        let output = decode(bytes);
        debug!(code, bytes = output.len(), mode = ?self.mode, "proc_open finished");

        if code != 0 {
            return Err(ExecError::new(command_line, output, code));
        }
        Ok(Outcome::success(output))
    }
}
