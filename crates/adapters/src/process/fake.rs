// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process adapter for testing: tracks spawned pids and queues
//! [`ExitClassification`]s for the engine's `reap` poll to return.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProcessAdapter, ProcessError, SpawnSpec};
use async_trait::async_trait;
use oj_core::ExitClassification;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Recorded process call.
#[derive(Debug, Clone)]
pub enum ProcessCall {
    Spawn { command: String },
    Signal { pid: u32, signal: i32 },
    Reap,
    IsAlive { pid: u32 },
}

#[derive(Debug, Clone)]
struct FakeProcess {
    alive: bool,
}

struct FakeProcessState {
    processes: HashMap<u32, FakeProcess>,
    calls: Vec<ProcessCall>,
    pending_exits: Vec<(u32, ExitClassification)>,
    next_pid: u32,
}

/// Fake process adapter for testing.
#[derive(Clone)]
pub struct FakeProcessAdapter {
    inner: Arc<Mutex<FakeProcessState>>,
}

impl Default for FakeProcessAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeProcessState {
                processes: HashMap::new(),
                calls: Vec::new(),
                pending_exits: Vec::new(),
                next_pid: 1000,
            })),
        }
    }
}

impl FakeProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ProcessCall> {
        self.inner.lock().calls.clone()
    }

    /// Queue an exit classification for `pid`, returned by the next `reap`.
    pub fn exit(&self, pid: u32, classification: ExitClassification) {
        let mut inner = self.inner.lock();
        if let Some(process) = inner.processes.get_mut(&pid) {
            process.alive = !classification.is_terminal();
        }
        inner.pending_exits.push((pid, classification));
    }
}

#[async_trait]
impl ProcessAdapter for FakeProcessAdapter {
    async fn spawn(&self, spec: SpawnSpec) -> Result<u32, ProcessError> {
        let mut inner = self.inner.lock();
        let pid = inner.next_pid;
        inner.next_pid += 1;

        inner.calls.push(ProcessCall::Spawn {
            command: spec.command.clone(),
        });
        inner.processes.insert(pid, FakeProcess { alive: true });

        Ok(pid)
    }

    async fn signal(&self, pid: u32, signal: i32) -> Result<(), ProcessError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::Signal { pid, signal });

        if !inner.processes.contains_key(&pid) {
            return Err(ProcessError::NotFound(pid));
        }
        Ok(())
    }

    async fn reap(&self) -> Vec<(u32, ExitClassification)> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::Reap);
        std::mem::take(&mut inner.pending_exits)
    }

    async fn is_alive(&self, pid: u32) -> bool {
        let mut inner = self.inner.lock();
        inner.calls.push(ProcessCall::IsAlive { pid });
        inner.processes.get(&pid).map(|p| p.alive).unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
