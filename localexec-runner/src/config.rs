//! Deny-list settings.
//!
//! Two independent settings name disabled primitives: a general list and a
//! hardened-runtime blacklist. They are read from the environment by default
//! and may also come from the `[policy]` table of a TOML file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::policy::DenyList;

pub const DISABLE_FUNCTIONS_ENV: &str = "LOCALEXEC_DISABLE_FUNCTIONS";
pub const EXECUTOR_BLACKLIST_ENV: &str = "LOCALEXEC_EXECUTOR_BLACKLIST";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Raw deny-list settings, comma and/or whitespace separated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecSettings {
    pub disable_functions: String,
    pub executor_blacklist: String,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    policy: ExecSettings,
}

impl ExecSettings {
    pub fn new(disable_functions: impl Into<String>, executor_blacklist: impl Into<String>) -> Self {
        Self {
            disable_functions: disable_functions.into(),
            executor_blacklist: executor_blacklist.into(),
        }
    }

    /// Settings from [`DISABLE_FUNCTIONS_ENV`] and [`EXECUTOR_BLACKLIST_ENV`].
    /// Unset or non-UTF-8 variables read as empty.
    pub fn from_env() -> Self {
        let read = |key: &str| std::env::var(key).unwrap_or_default();
        Self::new(read(DISABLE_FUNCTIONS_ENV), read(EXECUTOR_BLACKLIST_ENV))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.policy)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Append `other`'s entries after this one's.
    #[must_use]
    pub fn merged(self, other: Self) -> Self {
        let join = |left: String, right: String| match (left.is_empty(), right.is_empty()) {
            (_, true) => left,
            (true, false) => right,
            (false, false) => format!("{left},{right}"),
        };
        Self {
            disable_functions: join(self.disable_functions, other.disable_functions),
            executor_blacklist: join(self.executor_blacklist, other.executor_blacklist),
        }
    }

    /// Both settings concatenated (general list first) and split into names.
    pub fn deny_list(&self) -> DenyList {
        DenyList::parse(&format!(
            "{},{}",
            self.disable_functions, self.executor_blacklist
        ))
    }
}
