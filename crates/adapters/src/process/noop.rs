// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op process adapter: spawns nothing, used where a class declares no
//! process for a slot.

use super::{ProcessAdapter, ProcessError, SpawnSpec};
use async_trait::async_trait;
use oj_core::ExitClassification;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpProcessAdapter;

impl NoOpProcessAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessAdapter for NoOpProcessAdapter {
    async fn spawn(&self, _spec: SpawnSpec) -> Result<u32, ProcessError> {
        Err(ProcessError::SpawnFailed("no-op adapter never spawns".to_string()))
    }

    async fn signal(&self, pid: u32, _signal: i32) -> Result<(), ProcessError> {
        Err(ProcessError::NotFound(pid))
    }

    async fn reap(&self) -> Vec<(u32, ExitClassification)> {
        Vec::new()
    }

    async fn is_alive(&self, _pid: u32) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
