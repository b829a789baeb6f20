//! Environment access
//!
//! Process environment reads go through [`EnvAccessor`] so callers can
//! substitute a fixed map in tests instead of mutating the real environment.

use std::collections::HashMap;
use std::fmt;

/// Upper-case proxy variable, checked first
pub const HTTPS_PROXY: &str = "HTTPS_PROXY";

/// Lower-case proxy variable, checked when the upper-case one is unset
pub const HTTPS_PROXY_LOWER: &str = "https_proxy";

/// Read-only view of environment variables
pub trait EnvAccessor: Send + Sync + fmt::Debug {
    /// Value of `name`, or `None` when unset or not valid UTF-8
    fn var(&self, name: &str) -> Option<String>;

    /// Like [`var`](Self::var) but an empty value counts as unset
    fn non_empty_var(&self, name: &str) -> Option<String> {
        self.var(name).filter(|value| !value.is_empty())
    }
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvAccessor for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed set of variables
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvAccessor for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// HTTPS proxy configured in the environment
pub fn https_proxy(env: &dyn EnvAccessor) -> Option<String> {
    env.non_empty_var(HTTPS_PROXY)
        .or_else(|| env.non_empty_var(HTTPS_PROXY_LOWER))
}
