// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Side effects decided by the `fsm::on_*` transition functions and the
//! dispatch passes, applied by [`crate::executor::Executor`].
//!
//! Keeping the state machine a pure function of `&mut Job` that returns a
//! list of effects, rather than awaiting adapter calls directly, means it
//! stays synchronously testable without a runtime, and the dispatcher can
//! batch every instance's decisions before touching the process adapter.

use oj_core::{EnvVar, JobId, ProcessKind, ResourceLimits};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Effect {
    /// Spawn the given process slot for `job`. Carries every class-level
    /// spawn setting (§4.7) rather than leaving the executor to look the
    /// class back up, keeping effect application a pure function of the
    /// effect itself.
    Spawn {
        job: JobId,
        kind: ProcessKind,
        command: String,
        is_script: bool,
        env: Vec<EnvVar>,
        trace: bool,
        working_directory: Option<PathBuf>,
        umask: u32,
        nice: Option<i32>,
        limits: ResourceLimits,
    },
    /// Send `signal` to `job`'s process occupying `kind`.
    Signal {
        job: JobId,
        kind: ProcessKind,
        pid: u32,
        signal: i32,
    },
    /// Arm a kill-escalation timer; if still alive after `timeout`, the
    /// scheduler sends `SIGKILL` to the same pid.
    ArmKillTimer {
        job: JobId,
        kind: ProcessKind,
        pid: u32,
        timeout: Duration,
    },
    /// Emit a new built-in lifecycle event with no further coupling to the
    /// job that caused it (`started`, `stopped`).
    Emit { name: String, env: Vec<EnvVar> },
    /// Emit a built-in lifecycle event and block `job`'s progress on it
    /// reaching `FINISHED` (`starting`, `stopping`). The dispatcher records
    /// the resulting event id as `job.blocker` once the emit completes.
    EmitAndBlock {
        job: JobId,
        name: String,
        env: Vec<EnvVar>,
    },
    /// Log a non-fatal diagnostic (respawn storm, expansion failure, ...).
    Diagnostic { job: Option<JobId>, message: String },
}
