// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized engine state captured in a snapshot.

use oj_core::{ClassKey, Event, Job, JobClass};
use serde::{Deserialize, Serialize};

/// The engine's full persisted state at a point in time: every registered
/// class, every job instance (goal, state, pids, env, and blocking edges as
/// opaque [`oj_core::EventId`] indices), and events not yet finished.
///
/// This is a passive data bag, not an event-sourced projection — unlike a
/// system where state is *derived* by replaying a log of state-change
/// facts, recovery here replays the WAL's raw [`Event`]s back through the
/// ordinary dispatch loop starting from this snapshot, so no
/// `apply_event`-style state machine lives in this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedState {
    pub classes: Vec<JobClass>,
    pub jobs: Vec<Job>,
    pub events: Vec<Event>,
}

impl MaterializedState {
    pub fn new(classes: Vec<JobClass>, jobs: Vec<Job>, events: Vec<Event>) -> Self {
        Self {
            classes,
            jobs,
            events,
        }
    }

    /// Find a registered class by its `(session, name)` key.
    pub fn class(&self, key: &ClassKey) -> Option<&JobClass> {
        self.classes.iter().find(|c| &c.key == key)
    }

    /// Every instance currently materialized for a class.
    pub fn jobs_of<'a>(&'a self, key: &'a ClassKey) -> impl Iterator<Item = &'a Job> {
        self.jobs.iter().filter(move |j| &j.class_key == key)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
