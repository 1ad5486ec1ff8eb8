// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-class ordered table of live job instances, keyed by expanded
//! instance name.
//!
//! Jobs live in an arena (they are handle-referenced from `Blocked` entries
//! and from events' `blocking` lists); `by_name` is an [`indexmap::IndexMap`]
//! rather than a `HashMap` so iteration order is deterministic and stable
//! under removal, per §9's "iteration order must be deterministic for
//! reproducible tests".

use indexmap::IndexMap;
use oj_core::{Arena, ClassKey, Job, JobId};

#[derive(Default)]
pub struct InstanceTable {
    arena: Arena<Job>,
    by_name: IndexMap<(ClassKey, String), JobId>,
}

impl InstanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.arena.get_mut(id)
    }

    pub fn find(&self, key: &ClassKey, name: &str) -> Option<JobId> {
        self.by_name.get(&(key.clone(), name.to_string())).copied()
    }

    pub fn insert(&mut self, job: Job) -> JobId {
        let lookup_key = (job.class_key.clone(), job.name.clone());
        let id = self.arena.insert(job);
        self.by_name.insert(lookup_key, id);
        id
    }

    pub fn remove(&mut self, id: JobId) -> Option<Job> {
        let job = self.arena.remove(id)?;
        self.by_name.shift_remove(&(job.class_key.clone(), job.name.clone()));
        Some(job)
    }

    /// Every live instance of `key`, in the order it was first inserted.
    pub fn of_class<'a>(&'a self, key: &'a ClassKey) -> impl Iterator<Item = (JobId, &'a Job)> + 'a {
        self.by_name
            .iter()
            .filter(move |((k, _), _)| k == key)
            .filter_map(move |(_, id)| self.arena.get(*id).map(|j| (*id, j)))
    }

    pub fn has_instances(&self, key: &ClassKey) -> bool {
        self.of_class(key).next().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobId, &Job)> {
        self.by_name
            .values()
            .filter_map(move |id| self.arena.get(*id).map(|j| (*id, j)))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
#[path = "instances_tests.rs"]
mod tests;
