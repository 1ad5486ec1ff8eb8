// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job class registry: one class per `(name, session)`, with
//! source-precedence overlap resolution when more than one configured
//! source defines the same key.

use indexmap::IndexMap;
use oj_core::{ClassKey, JobClass};
use oj_runbook::is_strictly_better;
use std::collections::HashMap;

/// A registry mutation worth telling watchers about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    Added(ClassKey),
    Removed(ClassKey),
}

/// Holds the one active [`JobClass`] per key, plus any better candidate
/// whose installation was deferred because the incumbent still has live
/// instances.
#[derive(Default)]
pub struct ClassRegistry {
    classes: IndexMap<ClassKey, JobClass>,
    pending: HashMap<ClassKey, JobClass>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ClassKey) -> Option<&JobClass> {
        self.classes.get(key)
    }

    /// Mutable access to feed a class's `start_on` tree during a dispatch
    /// pass. Mutating anything but `start_on`/`stop_on` here would bypass
    /// [`Self::install`]'s overlap bookkeeping.
    pub fn get_mut(&mut self, key: &ClassKey) -> Option<&mut JobClass> {
        self.classes.get_mut(key)
    }

    /// Classes in stable registration order, the iteration order §5 and §9
    /// require for a dispatch pass's class snapshot.
    pub fn iter(&self) -> impl Iterator<Item = &JobClass> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Offer `candidate` for registration. `has_instances` reports whether
    /// the key's current incumbent (if any) presently has live instances;
    /// the caller (which owns the instance table) must compute this.
    ///
    /// No incumbent: installs outright. A strictly better incumbent exists
    /// with no live instances: swaps in, reporting both the removal and the
    /// addition. A strictly better incumbent exists but has live instances:
    /// the candidate is held as `pending` for a later [`Self::reconsider`].
    /// A candidate no better than the incumbent is dropped.
    pub fn install(&mut self, candidate: JobClass, has_instances: bool) -> Vec<RegistryEvent> {
        let key = candidate.key.clone();
        match self.classes.get(&key) {
            None => {
                self.classes.insert(key.clone(), candidate);
                vec![RegistryEvent::Added(key)]
            }
            Some(incumbent) => {
                if !is_strictly_better(&candidate, incumbent) {
                    return Vec::new();
                }
                if has_instances {
                    self.pending.insert(key, candidate);
                    Vec::new()
                } else {
                    self.classes.insert(key.clone(), candidate);
                    vec![RegistryEvent::Removed(key.clone()), RegistryEvent::Added(key)]
                }
            }
        }
    }

    /// Re-examine `key`: if a deferred better candidate is waiting and the
    /// incumbent no longer has live instances, swap it in now.
    pub fn reconsider(&mut self, key: &ClassKey, has_instances: bool) -> Vec<RegistryEvent> {
        if has_instances {
            return Vec::new();
        }
        let Some(candidate) = self.pending.remove(key) else {
            return Vec::new();
        };
        self.classes.insert(key.clone(), candidate);
        vec![RegistryEvent::Removed(key.clone()), RegistryEvent::Added(key.clone())]
    }

    pub fn remove(&mut self, key: &ClassKey) -> Option<JobClass> {
        self.classes.shift_remove(key)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
