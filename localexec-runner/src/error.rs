use std::error::Error as StdError;

use thiserror::Error;

use crate::last_error;

/// Diagnostic used when neither the process nor the OS left a message.
pub const START_FAILURE_MESSAGE: &str = "command failed to start";

/// Diagnostic used when every known primitive is disabled or missing.
pub const ALL_DISABLED_MESSAGE: &str = "all command execution primitives are disabled";

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Which stage of a run produced the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The command name was empty after trimming. Nothing was spawned.
    InvalidCommand,
    /// No strategy's primitive is available. Nothing was spawned.
    AllDisabled,
    /// The chosen strategy could not start the process, could not capture its
    /// output, or the process reported a failure status.
    Execution,
}

/// Structured failure returned by every fallible operation in this crate.
///
/// `Display` renders the diagnostic text only; use [`ExecError::command`] and
/// [`ExecError::code`] to present the rest.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExecError {
    kind: FailureKind,
    command: String,
    message: String,
    code: i32,
    #[source]
    source: Option<BoxError>,
}

impl ExecError {
    /// Execution failure for `command`.
    ///
    /// An empty `message` is replaced by the last recorded system error of the
    /// calling thread (consuming it), or by [`START_FAILURE_MESSAGE`].
    pub fn new(command: impl Into<String>, message: impl Into<String>, code: i32) -> Self {
        Self::with_kind(FailureKind::Execution, command, message, code)
    }

    pub fn invalid_command(raw: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::InvalidCommand,
            command: raw.into(),
            message: "empty command".to_string(),
            code: 0,
            source: None,
        }
    }

    pub fn all_disabled(command: impl Into<String>) -> Self {
        Self::with_kind(FailureKind::AllDisabled, command, ALL_DISABLED_MESSAGE, 0)
    }

    /// Wrap an I/O failure that happened while starting or talking to a child.
    ///
    /// The OS error text becomes the diagnostic and the error is kept as the
    /// source.
    pub fn io(command: impl Into<String>, error: std::io::Error) -> Self {
        let code = error.raw_os_error().unwrap_or(-1);
        Self::with_kind(FailureKind::Execution, command, error.to_string(), code)
            .with_source(error)
    }

    fn with_kind(
        kind: FailureKind,
        command: impl Into<String>,
        message: impl Into<String>,
        code: i32,
    ) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = last_error::take().unwrap_or_else(|| START_FAILURE_MESSAGE.to_string());
        }

        Self {
            kind,
            command: command.into(),
            message,
            code,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// The built command line (or the raw command for [`FailureKind::InvalidCommand`]).
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Captured process output, or the best available system diagnostic.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Exit status of the process, or an OS error code when it never started.
    pub fn code(&self) -> i32 {
        self.code
    }
}
