// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-job finite state machine: the ten-state (goal, state) transition
//! table and the side effects each state entry requires.
//!
//! This module is a pure decision function over `&mut Job` — it never
//! touches a process adapter or the event store directly. Every external
//! effect (spawning a process, sending a signal, emitting an event) is
//! returned as an [`Effect`] for [`crate::executor::Executor`] to carry
//! out; the dispatcher feeds the results of those effects back in through
//! the `on_*` entry points below. Keeping the two halves separate is what
//! lets the transition table be exercised synchronously in tests, with no
//! adapter or runtime required.

use crate::effect::Effect;
use crate::envbuild::env_var;
use crate::EngineError;
use oj_core::class::libc_signal;
use oj_core::{EnvVar, Expect, ExitClassification, Goal, Job, JobClass, JobId, JobState, ProcessDef, ProcessKind, TraceEvent, TraceState};

/// The table from §4.6: the successor of each (state, goal) pair. `None`
/// means the pair is a no-op (e.g. `Stop` on an already-`Waiting` job).
///
/// `Stopping`/`Killed` with `goal=Start` is the respawn fast path: a `MAIN`
/// process that has already exited returns straight to `Starting` without
/// sending a kill signal or running `PostStop` against a process that no
/// longer exists. Upstart's own `job_next_state` takes the same shortcut
/// (`test_job.c`'s "with stopping job and a goal of start" case expects
/// `JOB_STARTING`, not a forced kill cycle).
fn table_next(state: JobState, goal: Goal) -> Option<JobState> {
    use JobState::*;
    match (state, goal) {
        (Waiting, Goal::Start) => Some(Starting),
        (Waiting, Goal::Stop) => None,
        (Starting, Goal::Start) => Some(PreStart),
        (Starting, Goal::Stop) => Some(Stopping),
        (PreStart, Goal::Start) => Some(Spawned),
        (PreStart, Goal::Stop) => Some(Stopping),
        (Spawned, Goal::Start) => Some(PostStart),
        (Spawned, Goal::Stop) => Some(Stopping),
        (PostStart, Goal::Start) => Some(Running),
        (PostStart, Goal::Stop) => Some(Stopping),
        (Running, Goal::Start) => Some(Stopping),
        (Running, Goal::Stop) => Some(PreStop),
        (PreStop, Goal::Start) => Some(Running),
        (PreStop, Goal::Stop) => Some(Stopping),
        (Stopping, Goal::Start) => Some(Starting),
        (Stopping, Goal::Stop) => Some(Killed),
        (Killed, Goal::Start) => Some(Starting),
        (Killed, Goal::Stop) => Some(PostStop),
        (PostStop, Goal::Start) => Some(Starting),
        (PostStop, Goal::Stop) => Some(Waiting),
    }
}

/// Attempt the next table transition and run that state's entry side
/// effects. Recurses through states that have no corresponding process
/// defined, stopping as soon as a state demands external input (a spawned
/// process, an emitted event, a kill timer).
fn try_enter_next(
    job: &mut Job,
    class: &JobClass,
    job_id: JobId,
    now_ms: u64,
) -> Result<Vec<Effect>, EngineError> {
    let Some(next) = table_next(job.state, job.goal) else {
        return Ok(Vec::new());
    };
    debug_assert!(
        job.valid_next_states().contains(&next),
        "fsm produced an undeclared transition {:?} -> {:?}",
        job.state,
        next
    );
    job.state = next;
    enter_state(job, class, job_id, now_ms)
}

fn enter_state(
    job: &mut Job,
    class: &JobClass,
    job_id: JobId,
    now_ms: u64,
) -> Result<Vec<Effect>, EngineError> {
    match job.state {
        JobState::Starting => {
            job.env = job.start_env.clone();
            let env = lifecycle_env(class, job, None)?;
            Ok(vec![Effect::EmitAndBlock {
                job: job_id,
                name: "starting".to_string(),
                env,
            }])
        }
        JobState::PreStart | JobState::PostStart | JobState::PreStop | JobState::PostStop => {
            let kind = slot_kind(job.state);
            match class.process(kind) {
                Some(def) => Ok(vec![spawn_effect(class, job, job_id, kind, def, false)]),
                None => try_enter_next(job, class, job_id, now_ms),
            }
        }
        JobState::Spawned => match class.process(ProcessKind::Main) {
            Some(def) => {
                let trace = matches!(class.expect, Expect::Fork | Expect::Daemon);
                Ok(vec![spawn_effect(class, job, job_id, ProcessKind::Main, def, trace)])
            }
            None => try_enter_next(job, class, job_id, now_ms),
        },
        JobState::Running => {
            let env = lifecycle_env(class, job, None)?;
            Ok(vec![Effect::Emit {
                name: "started".to_string(),
                env,
            }])
        }
        JobState::Stopping => {
            let env = lifecycle_env(class, job, Some(job.failed))?;
            Ok(vec![Effect::EmitAndBlock {
                job: job_id,
                name: "stopping".to_string(),
                env,
            }])
        }
        JobState::Killed => {
            if let Some(pid) = job.pid_of(ProcessKind::Main) {
                job.kill_process = Some(ProcessKind::Main);
                job.kill_timer_armed = true;
                Ok(vec![
                    Effect::Signal {
                        job: job_id,
                        kind: ProcessKind::Main,
                        pid,
                        signal: class.kill_signal,
                    },
                    Effect::ArmKillTimer {
                        job: job_id,
                        kind: ProcessKind::Main,
                        pid,
                        timeout: class.kill_timeout,
                    },
                ])
            } else {
                try_enter_next(job, class, job_id, now_ms)
            }
        }
        JobState::PostStop => unreachable!("handled by the shared slot arm above"),
        JobState::Waiting => {
            let env = lifecycle_env(class, job, Some(job.failed))?;
            Ok(vec![Effect::Emit {
                name: "stopped".to_string(),
                env,
            }])
        }
    }
}

fn spawn_effect(class: &JobClass, job: &Job, job_id: JobId, kind: ProcessKind, def: &ProcessDef, trace: bool) -> Effect {
    Effect::Spawn {
        job: job_id,
        kind,
        command: def.command.clone(),
        is_script: def.is_script,
        env: job.env.clone(),
        trace,
        working_directory: class.working_directory.clone(),
        umask: class.umask,
        nice: class.nice,
        limits: class.limits.clone(),
    }
}

fn slot_kind(state: JobState) -> ProcessKind {
    match state {
        JobState::PreStart => ProcessKind::PreStart,
        JobState::PostStart => ProcessKind::PostStart,
        JobState::PreStop => ProcessKind::PreStop,
        JobState::PostStop => ProcessKind::PostStop,
        other => unreachable!("{other:?} has no process slot"),
    }
}

/// Build the env payload for a built-in lifecycle event. `result` is
/// `Some(failed)` for `stopping`/`stopped` (carries `RESULT`, and on
/// failure `PROCESS`/`EXIT_STATUS`); `None` for `starting`/`started`.
fn lifecycle_env(class: &JobClass, job: &Job, result: Option<bool>) -> Result<Vec<EnvVar>, EngineError> {
    let mut env = vec![
        env_var("JOB", class.key.name.clone())?,
        env_var("INSTANCE", job.name.clone())?,
    ];
    if let Some(failed) = result {
        env.push(env_var("RESULT", if failed { "failed" } else { "ok" })?);
        if failed {
            if let Some(process) = job.failed_process {
                env.push(env_var("PROCESS", process.as_str())?);
            }
            if let Some(status) = job.exit_status {
                env.push(env_var("EXIT_STATUS", status.to_string())?);
            }
        }
    }
    Ok(env)
}

/// A new goal was assigned to `job` (by the starting/stopping pass, or a
/// control-plane `Start`/`Stop`/`Restart` call).
///
/// Only acts when `job.state` is one of the three states a goal change is a
/// meaningful trigger for (`Waiting`, `Running`, `PreStop`); every other
/// state is mid-transition, already waiting on its own internal condition
/// (a blocker event, a spawned process, a kill timer), and will consult the
/// newly-set goal itself once that condition clears. Calling
/// `try_enter_next` unconditionally here would otherwise re-run a state's
/// entry side effects a second time for every further goal-setting event
/// that arrives while the job is already mid-flight.
pub fn on_goal_set(job: &mut Job, class: &JobClass, job_id: JobId, now_ms: u64) -> Result<Vec<Effect>, EngineError> {
    if !matches!(job.state, JobState::Waiting | JobState::Running | JobState::PreStop) {
        return Ok(Vec::new());
    }
    try_enter_next(job, class, job_id, now_ms)
}

/// The event `job.blocker` pointed to has finished.
pub fn on_blocker_finished(job: &mut Job, class: &JobClass, job_id: JobId, now_ms: u64) -> Result<Vec<Effect>, EngineError> {
    job.blocker = None;
    try_enter_next(job, class, job_id, now_ms)
}

/// The executor's `ProcessAdapter::spawn` call for `kind` succeeded.
pub fn on_process_spawned(
    job: &mut Job,
    class: &JobClass,
    job_id: JobId,
    kind: ProcessKind,
    pid: u32,
    now_ms: u64,
) -> Result<Vec<Effect>, EngineError> {
    job.set_pid(kind, Some(pid));
    if kind != ProcessKind::Main || job.state != JobState::Spawned {
        return Ok(Vec::new());
    }
    match class.expect {
        Expect::None => try_enter_next(job, class, job_id, now_ms),
        Expect::Fork | Expect::Daemon => {
            job.trace_state = TraceState::New;
            job.trace_forks = 0;
            Ok(Vec::new())
        }
        Expect::Stop => Ok(Vec::new()),
    }
}

fn is_expected_exit(class: &JobClass, job: &Job, kind: ProcessKind, classification: &ExitClassification) -> bool {
    match classification {
        ExitClassification::Exited(code) => {
            if kind == ProcessKind::Main {
                class.is_normal_exit(*code)
            } else {
                *code == 0 || class.normalexit.contains(code)
            }
        }
        ExitClassification::Killed(signal) => {
            matches!(job.state, JobState::Stopping | JobState::Killed) && *signal == class.kill_signal
        }
        ExitClassification::Dumped(_) => false,
        ExitClassification::Stopped(_) | ExitClassification::Trapped(_) => true,
    }
}

fn exit_code_of(classification: &ExitClassification) -> Option<i32> {
    match classification {
        ExitClassification::Exited(code) => Some(*code),
        ExitClassification::Killed(signal) | ExitClassification::Dumped(signal) => Some(*signal),
        ExitClassification::Stopped(_) | ExitClassification::Trapped(_) => None,
    }
}

/// `kind`'s process was reaped with `classification`.
pub fn on_process_exit(
    job: &mut Job,
    class: &JobClass,
    job_id: JobId,
    kind: ProcessKind,
    classification: ExitClassification,
    now_ms: u64,
) -> Result<Vec<Effect>, EngineError> {
    if classification.is_terminal() {
        job.set_pid(kind, None);
        if job.kill_process == Some(kind) {
            job.kill_process = None;
            job.kill_timer_armed = false;
        }
        if !is_expected_exit(class, job, kind, &classification) {
            job.failed = true;
            job.failed_process = Some(kind);
            job.exit_status = exit_code_of(&classification);
        } else if let ExitClassification::Exited(code) = classification {
            job.exit_status = Some(code);
        }
    }

    match (job.state, kind, classification.is_terminal()) {
        (JobState::Running, ProcessKind::Main, true) => handle_main_exit_while_running(job, class, job_id, now_ms),
        (JobState::Killed, _, true) => try_enter_next(job, class, job_id, now_ms),
        (state, k, true)
            if k == ProcessKind::PreStart && state == JobState::PreStart
                || k == ProcessKind::PostStart && state == JobState::PostStart
                || k == ProcessKind::PreStop && state == JobState::PreStop
                || k == ProcessKind::PostStop && state == JobState::PostStop =>
        {
            try_enter_next(job, class, job_id, now_ms)
        }
        (JobState::Spawned, ProcessKind::Main, true) => {
            // MAIN died before becoming ready: treat like any other failed
            // start-path process and fall through to stopping.
            job.goal = Goal::Stop;
            try_enter_next(job, class, job_id, now_ms)
        }
        _ => Ok(Vec::new()),
    }
}

/// The respawn path: a `MAIN` exit while the job's goal is still `Start`.
/// Restarts unless the respawn budget is exhausted or respawn is disabled,
/// in which case the goal is forced to `Stop`.
fn handle_main_exit_while_running(
    job: &mut Job,
    class: &JobClass,
    job_id: JobId,
    now_ms: u64,
) -> Result<Vec<Effect>, EngineError> {
    let mut diagnostics = Vec::new();
    if job.goal == Goal::Start {
        if class.respawn.enabled {
            let count = job.respawn_window.count_within(now_ms, class.respawn.interval);
            if count >= class.respawn.limit {
                job.goal = Goal::Stop;
                diagnostics.push(Effect::Diagnostic {
                    job: Some(job_id),
                    message: "respawning too fast".to_string(),
                });
            } else {
                job.respawn_window.record(now_ms);
            }
        } else {
            job.goal = Goal::Stop;
        }
    }
    diagnostics.extend(try_enter_next(job, class, job_id, now_ms)?);
    Ok(diagnostics)
}

/// A `ptrace` event arrived for `job`'s `MAIN` process (§4.8).
pub fn on_trace_event(
    job: &mut Job,
    class: &JobClass,
    job_id: JobId,
    event: TraceEvent,
    now_ms: u64,
) -> Result<Vec<Effect>, EngineError> {
    match event {
        TraceEvent::TraceMeStop => {
            job.trace_state = TraceState::Normal;
            Ok(Vec::new())
        }
        TraceEvent::Fork(child_pid) => {
            job.trace_forks += 1;
            let expected = match class.expect {
                Expect::Fork => 1,
                Expect::Daemon => 2,
                _ => 0,
            };
            if job.trace_forks >= expected {
                job.set_pid(ProcessKind::Main, Some(child_pid as u32));
                job.trace_state = TraceState::Normal;
                try_enter_next(job, class, job_id, now_ms)
            } else {
                job.trace_state = TraceState::NewChild;
                Ok(Vec::new())
            }
        }
        TraceEvent::Exec => {
            if job.trace_forks > 0 {
                try_enter_next(job, class, job_id, now_ms)
            } else {
                Ok(Vec::new())
            }
        }
    }
}

/// The kill timer armed on entry to `KILLED` has expired without the
/// process exiting; escalate to `SIGKILL`.
pub fn on_kill_timer_expired(job: &mut Job, job_id: JobId) -> Option<Effect> {
    if !job.kill_timer_armed {
        return None;
    }
    job.kill_timer_armed = false;
    let kind = job.kill_process?;
    let pid = job.pid_of(kind)?;
    Some(Effect::Signal {
        job: job_id,
        kind,
        pid,
        signal: libc_signal::SIGKILL,
    })
}

#[cfg(test)]
#[path = "fsm_tests.rs"]
mod tests;
