//! Environment lookups.
//!
//! The bots are configured almost entirely through the environment of a
//! GitHub Actions job. Everything reads it through [`Env`], so tests pass
//! a fixed map instead of touching the process environment.

use std::collections::HashMap;

/// Source of environment variables.
#[derive(Clone, Debug, Default)]
pub enum Env {
    /// The process environment.
    #[default]
    Process,
    /// A fixed set of variables.
    Fixed(HashMap<String, String>),
}

impl Env {
    pub fn real() -> Self {
        Env::Process
    }

    /// An environment holding exactly `vars`.
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Env::Fixed(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Value of `name` with surrounding whitespace removed; unset and blank
    /// variables are both `None`.
    pub fn non_empty(&self, name: &str) -> Option<String> {
        let raw = match self {
            Env::Process => std::env::var(name).ok()?,
            Env::Fixed(vars) => vars.get(name)?.clone(),
        };
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// First of `names` that has a non-blank value.
    pub fn first_non_empty(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| self.non_empty(name))
    }
}
