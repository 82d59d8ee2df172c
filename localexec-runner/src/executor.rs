use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::command::CommandSpec;
use crate::error::ExecError;
use crate::policy::{PrimitiveProbe, RuntimeProbe};
use crate::shell::ShellKind;
use crate::strategy::{
    DualStream, DualStreamMode, ExecStrategy, Outcome, Primitive, default_strategies,
};

/// Per-call options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    /// Quote every argument as one shell word. When false the arguments are
    /// joined verbatim.
    pub escape: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self { escape: true }
    }
}

impl ExecOptions {
    pub fn escaped() -> Self {
        Self::default()
    }

    pub fn verbatim() -> Self {
        Self { escape: false }
    }
}

/// Runs an external command and returns its captured output.
pub trait Exec: Send + Sync {
    fn run_spec(&self, spec: &CommandSpec) -> Result<String, ExecError>;

    /// Build the command line from `command` and `args` (`None` entries are
    /// dropped) and run it.
    fn run<I, S>(&self, command: &str, args: I, options: ExecOptions) -> Result<String, ExecError>
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
        Self: Sized,
    {
        let spec = CommandSpec::new(command, args)?.escape(options.escape);
        self.run_spec(&spec)
    }

    /// [`Exec::run`] for argument lists without gaps.
    fn run_args<I, S>(
        &self,
        command: &str,
        args: I,
        options: ExecOptions,
    ) -> Result<String, ExecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        Self: Sized,
    {
        self.run(command, args.into_iter().map(Some), options)
    }
}

/// Local executor that dispatches to the first available strategy.
///
/// Strategies are tried in [`Primitive::PREFERENCE`] order, but only the first
/// one whose primitive the probe reports available is executed; its failure is
/// returned as is.
pub struct LocalExec {
    shell: ShellKind,
    probe: Arc<dyn PrimitiveProbe>,
    strategies: Vec<Box<dyn ExecStrategy>>,
}

impl fmt::Debug for LocalExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order: Vec<Primitive> = self.strategies.iter().map(|s| s.primitive()).collect();
        f.debug_struct("LocalExec")
            .field("shell", &self.shell)
            .field("strategies", &order)
            .finish()
    }
}

impl LocalExec {
    /// Host shell, the process-wide deny-list and all built-in strategies.
    pub fn new() -> Self {
        let shell = ShellKind::host();
        Self {
            shell,
            probe: Arc::new(RuntimeProbe::new(shell)),
            strategies: default_strategies(shell, DualStreamMode::default()),
        }
    }

    #[must_use]
    pub fn with_probe(mut self, probe: impl PrimitiveProbe + 'static) -> Self {
        self.probe = Arc::new(probe);
        self
    }

    /// Swap the `proc_open` entry for one using `mode`. Other entries, custom
    /// ones included, keep their place.
    #[must_use]
    pub fn with_dual_stream(mut self, mode: DualStreamMode) -> Self {
        let shell = self.shell;
        for strategy in &mut self.strategies {
            if strategy.primitive() == Primitive::ProcOpen {
                *strategy = Box::new(DualStream::new(shell, mode));
            }
        }
        self
    }

    /// Replace the strategy list. The list order is the selection order.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn ExecStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn shell(&self) -> ShellKind {
        self.shell
    }

    /// Primitives the probe currently reports available, in selection order.
    pub fn available_primitives(&self) -> Vec<Primitive> {
        self.strategies
            .iter()
            .map(|strategy| strategy.primitive())
            .filter(|primitive| self.probe.is_available(*primitive))
            .collect()
    }

    fn select(&self) -> Option<&dyn ExecStrategy> {
        self.strategies
            .iter()
            .find(|strategy| self.probe.is_available(strategy.primitive()))
            .map(Box::as_ref)
    }

    /// Run through one specific strategy, skipping selection and the probe.
    pub fn run_with(&self, primitive: Primitive, spec: &CommandSpec) -> Result<String, ExecError> {
        let command_line = spec.build_for(self.shell);
        let Some(strategy) = self
            .strategies
            .iter()
            .find(|strategy| strategy.primitive() == primitive)
        else {
            return Err(ExecError::new(
                command_line,
                format!("no strategy registered for `{primitive}`"),
                -1,
            ));
        };
        dispatch(strategy.as_ref(), &command_line).map(Outcome::into_output)
    }
}

impl Default for LocalExec {
    fn default() -> Self {
        Self::new()
    }
}

impl Exec for LocalExec {
    fn run_spec(&self, spec: &CommandSpec) -> Result<String, ExecError> {
        let command_line = spec.build_for(self.shell);
        let Some(strategy) = self.select() else {
            warn!(command = %command_line, "no execution primitive is available");
            return Err(ExecError::all_disabled(command_line));
        };
        dispatch(strategy, &command_line).map(Outcome::into_output)
    }
}

fn dispatch(strategy: &dyn ExecStrategy, command_line: &str) -> Result<Outcome, ExecError> {
    let primitive = strategy.primitive();
    debug!(%primitive, command = %command_line, "running command");
    strategy.execute(command_line).inspect_err(|error| {
        warn!(
            %primitive,
            command = %command_line,
            code = error.code(),
            %error,
            "command failed"
        );
    })
}
