// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability.

use crate::process::{ProcessAdapter, ProcessError, SpawnSpec};
use async_trait::async_trait;
use oj_core::ExitClassification;
use tracing::Instrument;

/// Wrapper that adds tracing spans to any [`ProcessAdapter`].
#[derive(Clone)]
pub struct TracedProcess<P> {
    inner: P,
}

impl<P> TracedProcess<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: ProcessAdapter> ProcessAdapter for TracedProcess<P> {
    async fn spawn(&self, spec: SpawnSpec) -> Result<u32, ProcessError> {
        let kind = spec.kind;
        async {
            tracing::info!(command = %spec.command, "starting");
            let start = std::time::Instant::now();
            let result = self.inner.spawn(spec).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(pid) => tracing::info!(pid, elapsed_ms, "spawned"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "spawn failed"),
            }
            result
        }
        .instrument(tracing::info_span!("process.spawn", ?kind))
        .await
    }

    async fn signal(&self, pid: u32, signal: i32) -> Result<(), ProcessError> {
        let result = self.inner.signal(pid, signal).await;
        tracing::info_span!("process.signal", pid, signal).in_scope(|| match &result {
            Ok(()) => tracing::info!("sent"),
            Err(e) => tracing::warn!(error = %e, "signal failed (may be expected)"),
        });
        result
    }

    async fn reap(&self) -> Vec<(u32, ExitClassification)> {
        let reaped = self.inner.reap().await;
        for (pid, classification) in &reaped {
            tracing::info!(pid, ?classification, "reaped");
        }
        reaped
    }

    async fn is_alive(&self, pid: u32) -> bool {
        let alive = self.inner.is_alive(pid).await;
        tracing::trace!(pid, alive, "checked");
        alive
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
