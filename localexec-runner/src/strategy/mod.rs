//! Interchangeable process-spawning backends.
//!
//! Every backend runs an already built command line through the host shell
//! and normalizes what it observed into an [`Outcome`] or an [`ExecError`].
//! Each one depends on a single named [`Primitive`]; hosts disable backends by
//! listing primitive names in their deny-list.

use std::fmt;
use std::process::{Child, ExitStatus};
use std::str::FromStr;

use tracing::debug;

use crate::error::ExecError;
use crate::shell::ShellKind;

mod direct;
mod dual_stream;
mod passthru;
#[cfg(all(unix, feature = "popen"))]
mod pipe_read;
mod shell_text;

pub use direct::DirectCapture;
pub use dual_stream::{DualStream, DualStreamMode};
pub use passthru::PassthroughCapture;
#[cfg(all(unix, feature = "popen"))]
pub use pipe_read::PipeRead;
pub use shell_text::ShellText;

/// Runtime capability a strategy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Exec,
    Passthru,
    Popen,
    ProcOpen,
    ShellExec,
}

impl Primitive {
    /// Selection order: backends that report a separate exit status come
    /// before the one that only returns text.
    pub const PREFERENCE: [Self; 5] = [
        Self::Exec,
        Self::Passthru,
        Self::Popen,
        Self::ProcOpen,
        Self::ShellExec,
    ];

    /// Name matched against deny-list tokens.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Exec => "exec",
            Self::Passthru => "passthru",
            Self::Popen => "popen",
            Self::ProcOpen => "proc_open",
            Self::ShellExec => "shell_exec",
        }
    }

    /// Whether this build and host can provide the primitive at all,
    /// regardless of any deny-list.
    pub fn exists(self, shell: ShellKind) -> bool {
        let platform = match self {
            Self::Popen => cfg!(all(unix, feature = "popen")),
            Self::Exec | Self::Passthru | Self::ProcOpen | Self::ShellExec => true,
        };
        platform && shell.interpreter().is_some()
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPrimitive(pub String);

impl fmt::Display for UnknownPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown primitive `{}`", self.0)
    }
}

impl std::error::Error for UnknownPrimitive {}

impl FromStr for Primitive {
    type Err = UnknownPrimitive;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::PREFERENCE
            .into_iter()
            .find(|primitive| primitive.name() == value)
            .ok_or_else(|| UnknownPrimitive(value.to_string()))
    }
}

/// Successful result of a strategy run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub status: i32,
}

impl Outcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            status: 0,
        }
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

/// Trait implemented by concrete command execution strategies.
pub trait ExecStrategy: Send + Sync {
    /// Primitive this strategy depends on.
    fn primitive(&self) -> Primitive;

    /// Run `command_line` to completion and capture its output.
    fn execute(&self, command_line: &str) -> Result<Outcome, ExecError>;
}

/// The built-in strategies in [`Primitive::PREFERENCE`] order.
pub fn default_strategies(
    shell: ShellKind,
    dual_stream: DualStreamMode,
) -> Vec<Box<dyn ExecStrategy>> {
    let mut strategies: Vec<Box<dyn ExecStrategy>> = vec![
        Box::new(DirectCapture::new(shell)),
        Box::new(PassthroughCapture::new(shell)),
    ];
    #[cfg(all(unix, feature = "popen"))]
    strategies.push(Box::new(PipeRead::new()));
    strategies.push(Box::new(DualStream::new(shell, dual_stream)));
    strategies.push(Box::new(ShellText::new(shell)));
    strategies
}

/// Exit code of a finished child; `-1` when it was terminated by a signal.
pub(crate) fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Make sure a child we are abandoning does not outlive the call.
pub(crate) fn reap(child: &mut Child) {
    if let Err(error) = child.kill() {
        debug!(%error, "child already gone");
    }
    if let Err(error) = child.wait() {
        debug!(%error, "failed to reap child");
    }
}

/// Decode captured bytes, replacing invalid UTF-8.
pub(crate) fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(error) => String::from_utf8_lossy(error.as_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for primitive in Primitive::PREFERENCE {
            assert_eq!(primitive.name().parse::<Primitive>(), Ok(primitive));
        }
        assert!("system".parse::<Primitive>().is_err());
        assert!("EXEC".parse::<Primitive>().is_err());
    }

    #[test]
    fn preference_order_is_fixed() {
        let names: Vec<_> = Primitive::PREFERENCE.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            ["exec", "passthru", "popen", "proc_open", "shell_exec"]
        );
    }

    #[test]
    fn default_strategies_follow_preference_order() {
        let order: Vec<_> = default_strategies(ShellKind::host(), DualStreamMode::default())
            .iter()
            .map(|strategy| strategy.primitive())
            .collect();
        let expected: Vec<_> = Primitive::PREFERENCE
            .into_iter()
            .filter(|primitive| order.contains(primitive))
            .collect();
        assert_eq!(order, expected);
        assert!(order.len() >= 4);
    }

    #[test]
    fn decode_replaces_invalid_utf8() {
        assert_eq!(decode(vec![b'o', b'k', 0xff]), "ok\u{fffd}");
    }
}
