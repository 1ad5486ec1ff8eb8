// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervision adapter: spawn, signal, and reap jobs' processes.

mod noop;
#[cfg(unix)]
mod unix;

pub use noop::NoOpProcessAdapter;
#[cfg(unix)]
pub use unix::UnixProcessAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessAdapter, ProcessCall};

use async_trait::async_trait;
use oj_core::{ExitClassification, ProcessKind};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Everything the adapter needs to spawn one process slot.
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    pub kind: ProcessKind,
    pub command: String,
    pub is_script: bool,
    pub env: Vec<(String, String)>,
    pub working_directory: Option<PathBuf>,
    pub umask: u32,
    pub nice: Option<i32>,
    pub trace: bool,
    pub limits: BTreeMap<&'static str, (u64, u64)>,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("process not found: {0}")]
    NotFound(u32),
    #[error("signal failed: {0}")]
    SignalFailed(String),
}

/// Adapter for spawning and supervising a job's child processes.
///
/// Implementations own the actual `fork`/`execve`/`ptrace` syscalls (or, in
/// the no-op/fake cases, simulate them). The engine's supervisor calls
/// `reap` on a poll interval to drain completed children non-blockingly.
#[async_trait]
pub trait ProcessAdapter: Clone + Send + Sync + 'static {
    async fn spawn(&self, spec: SpawnSpec) -> Result<u32, ProcessError>;

    async fn signal(&self, pid: u32, signal: i32) -> Result<(), ProcessError>;

    /// Non-blocking reap of any children that have changed state since the
    /// last call. Returns `(pid, classification)` pairs.
    async fn reap(&self) -> Vec<(u32, ExitClassification)>;

    async fn is_alive(&self, pid: u32) -> bool;
}
