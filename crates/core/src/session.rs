// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session scoping for job classes.
//!
//! `(session, name)` must be unique in the class registry. A `Session`
//! distinguishes the system session (`None`) from a per-user session (an
//! opaque scoping key, typically a D-Bus address or UID — the transport
//! that owns that notion lives outside this crate).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A session scoping key. Wraps a `String` so it isn't confused with a job
/// or event name at the type level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session(String);

impl Session {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Session {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Session {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Key identifying a job class in the registry: `(session, name)` per §3.3.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassKey {
    pub session: Option<Session>,
    pub name: String,
}

impl ClassKey {
    pub fn new(session: Option<Session>, name: impl Into<String>) -> Self {
        Self {
            session,
            name: name.into(),
        }
    }

    pub fn system(name: impl Into<String>) -> Self {
        Self::new(None, name)
    }
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.session {
            Some(session) => write!(f, "{}/{}", session, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
