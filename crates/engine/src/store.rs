// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered registry of active events: allocates handles, tracks progress
//! and blocker counts, and hands the dispatcher events in strict FIFO
//! insertion order.
//!
//! A plain [`oj_core::Arena`] reuses freed slots off a LIFO free list, which
//! would let a later-inserted event reclaim an earlier event's index and
//! appear "first" to a naive index-order walk. `EventStore` keeps an
//! explicit insertion-order queue alongside the arena so FIFO holds
//! regardless of slot reuse.

use oj_core::{Arena, Blocked, EnvVar, Event, EventError, EventId, Progress};
use std::collections::VecDeque;

#[derive(Default)]
pub struct EventStore {
    arena: Arena<Event>,
    order: VecDeque<EventId>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new `PENDING` event and schedule it for the next pass.
    pub fn emit(&mut self, name: impl Into<String>, env: Vec<EnvVar>) -> Result<EventId, EventError> {
        let event = Event::new(name, env)?;
        let id = self.arena.insert(event);
        self.order.push_back(id);
        Ok(id)
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.arena.get_mut(id)
    }

    pub fn block(&mut self, id: EventId) {
        if let Some(e) = self.arena.get_mut(id) {
            e.blockers += 1;
        }
    }

    pub fn unblock(&mut self, id: EventId) {
        if let Some(e) = self.arena.get_mut(id) {
            e.blockers = e.blockers.saturating_sub(1);
        }
    }

    pub fn add_waiter(&mut self, id: EventId, waiter: Blocked) {
        if let Some(e) = self.arena.get_mut(id) {
            e.blocking.push(waiter);
        }
    }

    pub fn mark_failed(&mut self, id: EventId) {
        if let Some(e) = self.arena.get_mut(id) {
            e.failed = true;
        }
    }

    /// `PENDING` events, in FIFO insertion order.
    pub fn pending(&self) -> Vec<EventId> {
        self.filter_by(|e| e.progress == Progress::Pending)
    }

    pub fn mark_handling(&mut self, id: EventId) {
        if let Some(e) = self.arena.get_mut(id) {
            e.progress = Progress::Handling;
        }
    }

    /// `HANDLING` events whose blocker count has drained to zero.
    pub fn ready_to_finish(&self) -> Vec<EventId> {
        self.filter_by(|e| e.progress == Progress::Handling && e.blockers == 0)
    }

    pub fn mark_finished(&mut self, id: EventId) {
        if let Some(e) = self.arena.get_mut(id) {
            e.progress = Progress::Finished;
        }
    }

    /// `FINISHED` events, ready for removal.
    pub fn finished(&self) -> Vec<EventId> {
        self.filter_by(|e| e.progress == Progress::Finished)
    }

    /// Remove a finished event from the store, returning it (including its
    /// `blocking` list) so the caller can notify each waiter.
    pub fn remove(&mut self, id: EventId) -> Option<Event> {
        self.order.retain(|&x| x != id);
        self.arena.remove(id)
    }

    /// Every in-flight event, in FIFO insertion order. Used to build a
    /// checkpoint snapshot; `Event::blocking` is `#[serde(skip)]`, so the
    /// waiter edges these events carry are not themselves persisted.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.order.iter().filter_map(|id| self.arena.get(*id))
    }

    fn filter_by(&self, pred: impl Fn(&Event) -> bool) -> Vec<EventId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.arena.get(*id).is_some_and(&pred))
            .collect()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
