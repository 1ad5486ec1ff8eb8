// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validated `KEY=VALUE` environment entries.
//!
//! Event payloads, job class defaults, and start/stop environments are all
//! vectors of `KEY=VALUE` strings matching `^[A-Za-z_][A-Za-z0-9_]*=.*$`.
//! [`EnvVar`] parses and validates once at the boundary so the rest of the
//! system can work with `(key, value)` pairs directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single validated `KEY=VALUE` environment entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnvVar {
    key: String,
    value: String,
}

/// An entry that failed `KEY=VALUE` validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid env entry {0:?}: keys must match [A-Za-z_][A-Za-z0-9_]* and contain '='")]
pub struct InvalidEnvVar(pub String);

impl EnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self, InvalidEnvVar> {
        let key = key.into();
        if !is_valid_key(&key) {
            return Err(InvalidEnvVar(key));
        }
        Ok(Self {
            key,
            value: value.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn as_pair(&self) -> (&str, &str) {
        (&self.key, &self.value)
    }
}

impl TryFrom<String> for EnvVar {
    type Error = InvalidEnvVar;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        parse(&raw).ok_or(InvalidEnvVar(raw))
    }
}

impl TryFrom<&str> for EnvVar {
    type Error = InvalidEnvVar;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        parse(raw).ok_or_else(|| InvalidEnvVar(raw.to_string()))
    }
}

impl From<EnvVar> for String {
    fn from(var: EnvVar) -> Self {
        var.to_string()
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

fn parse(raw: &str) -> Option<EnvVar> {
    let (key, value) = raw.split_once('=')?;
    if !is_valid_key(key) {
        return None;
    }
    Some(EnvVar {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse a batch of raw `KEY=VALUE` strings, collecting the first failure.
///
/// Malformed entries are rejected wholesale (`InvalidArgs`), not skipped.
pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Result<Vec<EnvVar>, InvalidEnvVar> {
    raw.iter()
        .map(|s| EnvVar::try_from(s.as_ref()))
        .collect()
}

/// Merge two environments, with `override_env` entries replacing `base`
/// entries that share a key. Order of first appearance is preserved; keys
/// from `override_env` that are new are appended at the end.
pub fn merge(base: &[EnvVar], override_env: &[EnvVar]) -> Vec<EnvVar> {
    let mut merged: Vec<EnvVar> = base.to_vec();
    for entry in override_env {
        if let Some(existing) = merged.iter_mut().find(|e| e.key() == entry.key()) {
            *existing = entry.clone();
        } else {
            merged.push(entry.clone());
        }
    }
    merged
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
