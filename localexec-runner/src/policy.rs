//! Availability probing.
//!
//! A primitive is available when this build and host provide it and its name
//! is not on the deny-list. The process-wide deny-list is computed once, on the
//! first probe (or by [`install_deny_list`]), and never changes afterwards.

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::ExecSettings;
use crate::shell::ShellKind;
use crate::strategy::Primitive;

/// Names of administratively disabled primitives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenyList {
    names: Vec<String>,
}

impl DenyList {
    /// Split on runs of whitespace and/or commas, dropping empty tokens.
    pub fn parse(raw: &str) -> Self {
        let names = raw
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// Exact, case-sensitive match.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|denied| denied == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

static DENY_LIST: OnceCell<DenyList> = OnceCell::new();

#[derive(Debug, Error)]
#[error("the process-wide deny-list was already initialized")]
pub struct DenyListAlreadySet;

/// The process-wide deny-list, read from the environment on first use.
pub fn deny_list() -> &'static DenyList {
    DENY_LIST.get_or_init(|| {
        let list = ExecSettings::from_env().deny_list();
        debug!(denied = ?list.names(), "deny-list initialized from environment");
        list
    })
}

/// Seed the process-wide deny-list before anything probes it.
pub fn install_deny_list(settings: &ExecSettings) -> Result<&'static DenyList, DenyListAlreadySet> {
    let list = settings.deny_list();
    debug!(denied = ?list.names(), "installing deny-list");
    DENY_LIST.set(list).map_err(|_| DenyListAlreadySet)?;
    Ok(deny_list())
}

/// True when `name` is unknown, missing on this host, or denied.
pub fn is_disabled(name: &str) -> bool {
    !name
        .parse::<Primitive>()
        .is_ok_and(|primitive| RuntimeProbe::default().is_available(primitive))
}

/// Narrow capability query used by the selector.
pub trait PrimitiveProbe: Send + Sync {
    fn is_available(&self, primitive: Primitive) -> bool;
}

impl<F> PrimitiveProbe for F
where
    F: Fn(Primitive) -> bool + Send + Sync,
{
    fn is_available(&self, primitive: Primitive) -> bool {
        self(primitive)
    }
}

/// Host existence plus the process-wide deny-list.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeProbe {
    shell: ShellKind,
}

impl RuntimeProbe {
    pub fn new(shell: ShellKind) -> Self {
        Self { shell }
    }
}

impl PrimitiveProbe for RuntimeProbe {
    fn is_available(&self, primitive: Primitive) -> bool {
        let exists = primitive.exists(self.shell);
        let denied = deny_list().contains(primitive.name());
        trace!(%primitive, exists, denied, "probed primitive");
        exists && !denied
    }
}

/// Host existence plus an explicitly supplied deny-list. Touches no global
/// state.
#[derive(Debug, Clone, Default)]
pub struct DenyListProbe {
    shell: ShellKind,
    deny: DenyList,
}

impl DenyListProbe {
    pub fn new(deny: DenyList) -> Self {
        Self {
            shell: ShellKind::host(),
            deny,
        }
    }

    pub fn from_settings(settings: &ExecSettings) -> Self {
        Self::new(settings.deny_list())
    }

    /// Deny every built-in primitive except `primitive`.
    pub fn only(primitive: Primitive) -> Self {
        let names = Primitive::PREFERENCE
            .into_iter()
            .filter(|candidate| *candidate != primitive)
            .map(Primitive::name)
            .collect::<Vec<_>>()
            .join(",");
        Self::new(DenyList::parse(&names))
    }

    #[must_use]
    pub fn with_shell(mut self, shell: ShellKind) -> Self {
        self.shell = shell;
        self
    }
}

impl PrimitiveProbe for DenyListProbe {
    fn is_available(&self, primitive: Primitive) -> bool {
        primitive.exists(self.shell) && !self.deny.contains(primitive.name())
    }
}

/// Host existence only; nothing is denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllProbe {
    shell: ShellKind,
}

impl PrimitiveProbe for AllowAllProbe {
    fn is_available(&self, primitive: Primitive) -> bool {
        primitive.exists(self.shell)
    }
}
