// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real `fork`/`execve`/`ptrace`/`waitid` process adapter.
//!
//! This is the one module in the workspace allowed raw `unsafe` — process
//! supervision is unavoidably `fork`+`exec`+`ptrace` at the syscall level.
#![allow(unsafe_code)]

use super::{ProcessAdapter, ProcessError, SpawnSpec};
use nix::sys::ptrace::{self, Options};
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{execv, fork, ForkResult, Pid};
use oj_core::{ExitClassification, TraceEvent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::ffi::CString;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct UnixProcessAdapter {
    traced: Arc<Mutex<HashSet<i32>>>,
}

impl UnixProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn build_argv(spec: &SpawnSpec) -> Result<(CString, Vec<CString>), ProcessError> {
    let argv: Vec<CString> = if spec.is_script {
        vec![
            CString::new("/bin/sh").unwrap(),
            CString::new("-c").unwrap(),
            CString::new(spec.command.clone())
                .map_err(|e| ProcessError::SpawnFailed(e.to_string()))?,
        ]
    } else {
        spec.command
            .split_whitespace()
            .map(CString::new)
            .collect::<Result<_, _>>()
            .map_err(|e| ProcessError::SpawnFailed(e.to_string()))?
    };
    let program = argv
        .first()
        .cloned()
        .ok_or_else(|| ProcessError::SpawnFailed("empty command".to_string()))?;
    Ok((program, argv))
}

/// SAFETY: runs between `fork` and `execv` in the child. Must only call
/// async-signal-safe functions — no allocation beyond what's already
/// prepared in `argv`/`program`, no locking.
unsafe fn child_exec(spec: &SpawnSpec, program: &CString, argv: &[CString]) -> ! {
    if spec.trace {
        let _ = ptrace::traceme();
    }
    if let Some(dir) = &spec.working_directory {
        let _ = std::env::set_current_dir(dir);
    }
    // SAFETY: umask is async-signal-safe and takes no pointers.
    libc::umask(spec.umask as libc::mode_t);
    if let Some(nice) = spec.nice {
        // SAFETY: nice(2) on the calling process only.
        libc::nice(nice as libc::c_int);
    }
    for (key, value) in &spec.env {
        std::env::set_var(key, value);
    }
    let _ = execv(program, argv);
    // execv only returns on failure.
    libc::_exit(127);
}

#[async_trait::async_trait]
impl ProcessAdapter for UnixProcessAdapter {
    async fn spawn(&self, spec: SpawnSpec) -> Result<u32, ProcessError> {
        let (program, argv) = build_argv(&spec)?;
        let traced = self.traced.clone();
        let trace = spec.trace;

        // fork()+exec() must not cross an await point; run it on a blocking
        // thread so tokio's executor isn't forked mid-scheduler-tick.
        let pid = tokio::task::spawn_blocking(move || -> Result<i32, ProcessError> {
            // SAFETY: single-threaded fork from a dedicated blocking thread;
            // the child immediately execs or exits without touching Rust
            // runtime state shared with the parent.
            match unsafe { fork() } {
                Ok(ForkResult::Parent { child, .. }) => {
                    if trace {
                        traced.lock().insert(child.as_raw());
                    }
                    Ok(child.as_raw())
                }
                Ok(ForkResult::Child) => {
                    // SAFETY: see child_exec's contract.
                    unsafe { child_exec(&spec, &program, &argv) }
                }
                Err(e) => Err(ProcessError::SpawnFailed(e.to_string())),
            }
        })
        .await
        .map_err(|e| ProcessError::SpawnFailed(e.to_string()))??;

        Ok(pid as u32)
    }

    async fn signal(&self, pid: u32, sig: i32) -> Result<(), ProcessError> {
        let signal = Signal::try_from(sig).map_err(|e| ProcessError::SignalFailed(e.to_string()))?;
        signal::kill(Pid::from_raw(pid as i32), signal)
            .map_err(|e| ProcessError::SignalFailed(e.to_string()))
    }

    async fn reap(&self) -> Vec<(u32, ExitClassification)> {
        let mut reaped = Vec::new();
        loop {
            match waitpid(None, Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED)) {
                Ok(WaitStatus::Exited(pid, code)) => {
                    self.traced.lock().remove(&pid.as_raw());
                    reaped.push((pid.as_raw() as u32, ExitClassification::Exited(code)));
                }
                Ok(WaitStatus::Signaled(pid, sig, dumped)) => {
                    self.traced.lock().remove(&pid.as_raw());
                    let code = sig as i32;
                    let classification = if dumped {
                        ExitClassification::Dumped(code)
                    } else {
                        ExitClassification::Killed(code)
                    };
                    reaped.push((pid.as_raw() as u32, classification));
                }
                // The initial stop after `PTRACE_TRACEME` + `execve`: arm
                // fork/exec event reporting now that the tracee exists, then
                // resume it. Without this the tracee never gets past its own
                // exec and `expect fork`/`expect daemon` jobs hang forever.
                Ok(WaitStatus::Stopped(pid, Signal::SIGTRAP)) if self.traced.lock().contains(&pid.as_raw()) => {
                    let _ = ptrace::setoptions(pid, Options::PTRACE_O_TRACEFORK | Options::PTRACE_O_TRACEEXEC);
                    let _ = ptrace::cont(pid, None);
                    reaped.push((pid.as_raw() as u32, ExitClassification::Trapped(TraceEvent::TraceMeStop)));
                }
                Ok(WaitStatus::Stopped(pid, sig)) => {
                    reaped.push((pid.as_raw() as u32, ExitClassification::Stopped(sig as i32)));
                }
                Ok(WaitStatus::PtraceEvent(pid, _sig, event))
                    if event == libc::PTRACE_EVENT_FORK || event == libc::PTRACE_EVENT_VFORK =>
                {
                    let child_pid = ptrace::getevent(pid).unwrap_or(0) as i32;
                    if child_pid > 0 {
                        // Inherits the parent's trace options automatically
                        // (ptrace(2)) but still starts life in a group-stop;
                        // resume it so it isn't left hanging either.
                        self.traced.lock().insert(child_pid);
                        let _ = ptrace::cont(Pid::from_raw(child_pid), None);
                    }
                    let _ = ptrace::cont(pid, None);
                    reaped.push((pid.as_raw() as u32, ExitClassification::Trapped(TraceEvent::Fork(child_pid))));
                }
                Ok(WaitStatus::PtraceEvent(pid, _sig, event)) if event == libc::PTRACE_EVENT_EXEC => {
                    let _ = ptrace::cont(pid, None);
                    reaped.push((pid.as_raw() as u32, ExitClassification::Trapped(TraceEvent::Exec)));
                }
                Ok(WaitStatus::PtraceEvent(pid, _sig, _other)) => {
                    let _ = ptrace::cont(pid, None);
                }
                Ok(WaitStatus::PtraceSyscall(pid)) => {
                    let _ = ptrace::cont(pid, None);
                }
                Ok(WaitStatus::StillAlive) | Err(nix::errno::Errno::ECHILD) => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
        reaped
    }

    async fn is_alive(&self, pid: u32) -> bool {
        signal::kill(Pid::from_raw(pid as i32), None).is_ok()
    }
}

#[cfg(test)]
#[path = "unix_tests.rs"]
mod tests;
