// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applies [`Effect`]s against a concrete [`ProcessAdapter`], logging and
//! timing each call the way a production supervisor would (§4.7, §4.8).
//!
//! Kept separate from [`crate::dispatch`] so the state machine stays
//! synchronously testable: `fsm`/`dispatch` decide, `Executor` is the only
//! place that actually awaits an adapter.

use crate::effect::Effect;
use crate::EngineError;
use oj_adapters::{ProcessAdapter, SpawnSpec};
use oj_core::ResourceKind;

/// Executes process-level [`Effect`]s (`Spawn`/`Signal`) through a
/// [`ProcessAdapter`]. `Emit`/`EmitAndBlock`/`ArmKillTimer`/`Diagnostic`
/// effects are routed elsewhere by [`crate::engine::Engine`] (the event
/// store and the kill-timer scheduler, respectively, aren't adapter calls).
pub struct Executor<P: ProcessAdapter> {
    process: P,
}

impl<P: ProcessAdapter> Executor<P> {
    pub fn new(process: P) -> Self {
        Self { process }
    }

    /// Spawn the process slot described by a `Spawn` effect. Panics (via
    /// `debug_assert`) if handed any other effect variant — callers are
    /// expected to have already routed non-process effects elsewhere.
    pub async fn spawn(&self, effect: &Effect) -> Result<u32, EngineError> {
        let Effect::Spawn {
            kind,
            command,
            is_script,
            env,
            trace,
            working_directory,
            umask,
            nice,
            limits,
            ..
        } = effect
        else {
            return Err(EngineError::InternalInvariant("executor::spawn called with a non-Spawn effect".to_string()));
        };

        let spec = SpawnSpec {
            kind: *kind,
            command: command.clone(),
            is_script: *is_script,
            env: env.iter().map(|e| (e.key().to_string(), e.value().to_string())).collect(),
            working_directory: working_directory.clone(),
            umask: *umask,
            nice: *nice,
            trace: *trace,
            limits: limits.limits.iter().map(|(kind, bounds)| (resource_kind_name(*kind), *bounds)).collect(),
        };

        tracing::info!(kind = ?spec.kind, command = %spec.command, trace = spec.trace, "spawning process");
        let start = std::time::Instant::now();
        let result = self.process.spawn(spec).await;
        let elapsed = start.elapsed();
        match &result {
            Ok(pid) => tracing::info!(pid, elapsed_ms = elapsed.as_millis() as u64, "spawned"),
            Err(e) => tracing::warn!(error = %e, elapsed_ms = elapsed.as_millis() as u64, "spawn failed"),
        }
        Ok(result?)
    }

    /// Send a signal to an already-running pid.
    pub async fn signal(&self, pid: u32, signal: i32) -> Result<(), EngineError> {
        tracing::info!(pid, signal, "sending signal");
        self.process.signal(pid, signal).await?;
        Ok(())
    }

    /// Non-blocking reap sweep, delegated straight to the adapter.
    pub async fn reap(&self) -> Vec<(u32, oj_core::ExitClassification)> {
        self.process.reap().await
    }

    pub async fn is_alive(&self, pid: u32) -> bool {
        self.process.is_alive(pid).await
    }
}

fn resource_kind_name(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Cpu => "cpu",
        ResourceKind::Fsize => "fsize",
        ResourceKind::Data => "data",
        ResourceKind::Stack => "stack",
        ResourceKind::Core => "core",
        ResourceKind::Rss => "rss",
        ResourceKind::Nofile => "nofile",
        ResourceKind::As => "as",
        ResourceKind::Nproc => "nproc",
        ResourceKind::Memlock => "memlock",
        ResourceKind::Locks => "locks",
        ResourceKind::Sigpending => "sigpending",
        ResourceKind::Msgqueue => "msgqueue",
        ResourceKind::Nice => "nice",
        ResourceKind::Rtprio => "rtprio",
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
