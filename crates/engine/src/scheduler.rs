// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kill-escalation timer bookkeeping.
//!
//! A timer here is always "send SIGKILL to this job's process slot if it's
//! still alive by `fires_at`" (§4.8). Unlike a generic named timer, every
//! entry already knows which job and slot it belongs to, so a fired timer
//! can be routed straight into [`crate::fsm::on_kill_timer_expired`] without
//! a side lookup table.

use oj_core::{JobId, ProcessKind};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Identifies one armed kill timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub job: JobId,
    pub kind: ProcessKind,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    fires_at: Instant,
}

/// Tracks the kill-escalation timers armed by [`crate::effect::Effect::ArmKillTimer`].
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: HashMap<TimerKey, Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the kill timer for `job`'s `kind` slot.
    pub fn arm(&mut self, job: JobId, kind: ProcessKind, duration: Duration, now: Instant) {
        let fires_at = now + duration;
        self.timers.insert(TimerKey { job, kind }, Timer { fires_at });
    }

    /// Disarm a job's kill timer, e.g. once its process has reaped.
    pub fn disarm(&mut self, job: JobId, kind: ProcessKind) {
        self.timers.remove(&TimerKey { job, kind });
    }

    /// Disarm every timer belonging to `job`, regardless of slot. Used when
    /// a job is destroyed with a timer still outstanding.
    pub fn disarm_job(&mut self, job: JobId) {
        self.timers.retain(|key, _| key.job != job);
    }

    /// Pop every timer key that has fired by `now`.
    pub fn fired_timers(&mut self, now: Instant) -> Vec<TimerKey> {
        let fired: Vec<TimerKey> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.fires_at <= now)
            .map(|(key, _)| *key)
            .collect();
        for key in &fired {
            self.timers.remove(key);
        }
        fired
    }

    /// The earliest deadline across all armed timers, for a driver loop to
    /// size its next sleep against.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|t| t.fires_at).min()
    }

    pub fn has_timers(&self) -> bool {
        !self.timers.is_empty()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
