// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event type and its progress lifecycle.

use crate::arena::Handle;
use crate::blocked::Blocked;
use crate::env::EnvVar;
use serde::{Deserialize, Serialize};

/// Handle to an [`Event`] in the event store's arena.
pub type EventId = Handle<Event>;

/// Progress of an event through the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Progress {
    /// Not yet offered to any class's operator trees this pass.
    Pending,
    /// Handlers have run; waiting for `blockers` to drain to zero.
    Handling,
    /// `blockers == 0`; will be removed and its `blocking` list flushed.
    Finished,
}

/// A named signal with an environment, consumed once per operator tree, then
/// completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub env: Vec<EnvVar>,
    pub progress: Progress,
    pub failed: bool,
    /// Count of outstanding `block()` calls against this event.
    pub blockers: u32,
    /// Entities suspended on this event reaching `Finished`.
    #[serde(skip)]
    pub blocking: Vec<Blocked>,
}

/// An event name or construction argument was invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("event name must not be empty")]
    EmptyName,
}

impl Event {
    /// Construct a new `Pending` event with `blockers == 0`: a freshly
    /// created event has no blockers until handlers run.
    pub fn new(name: impl Into<String>, env: Vec<EnvVar>) -> Result<Self, EventError> {
        let name = name.into();
        if name.is_empty() {
            return Err(EventError::EmptyName);
        }
        Ok(Self {
            name,
            env,
            progress: Progress::Pending,
            failed: false,
            blockers: 0,
            blocking: Vec::new(),
        })
    }

    /// Build the derived `<name>/failed` event for a failed event, per spec
    /// §3.1. Derived failure events never themselves fan out further
    /// failures — callers must not call this on an event whose name already
    /// ends in `/failed`; [`Event::is_derived_failure`] lets callers check.
    pub fn derived_failure(&self) -> Event {
        debug_assert!(!self.is_derived_failure(), "failure events do not chain");
        Event {
            name: format!("{}/failed", self.name),
            env: self.env.clone(),
            progress: Progress::Pending,
            failed: false,
            blockers: 0,
            blocking: Vec::new(),
        }
    }

    pub fn is_derived_failure(&self) -> bool {
        self.name.ends_with("/failed")
    }

    pub fn env_pairs(&self) -> Vec<(&str, &str)> {
        self.env.iter().map(|e| e.as_pair()).collect()
    }

    pub fn find_env(&self, key: &str) -> Option<&str> {
        self.env.iter().find(|e| e.key() == key).map(|e| e.value())
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
