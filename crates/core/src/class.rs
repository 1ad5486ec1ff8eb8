// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job class configuration model.

use crate::env::EnvVar;
use crate::operator::Operator;
use crate::session::ClassKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// The five process slots a job class may define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProcessKind {
    PreStart,
    Main,
    PostStart,
    PreStop,
    PostStop,
}

impl ProcessKind {
    pub const ALL: [ProcessKind; 5] = [
        ProcessKind::PreStart,
        ProcessKind::Main,
        ProcessKind::PostStart,
        ProcessKind::PreStop,
        ProcessKind::PostStop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessKind::PreStart => "pre-start",
            ProcessKind::Main => "main",
            ProcessKind::PostStart => "post-start",
            ProcessKind::PreStop => "pre-stop",
            ProcessKind::PostStop => "post-stop",
        }
    }
}

/// A process definition for one [`ProcessKind`] slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDef {
    /// The literal command line, or the script body when `is_script`.
    pub command: String,
    pub is_script: bool,
}

impl ProcessDef {
    pub fn command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            is_script: false,
        }
    }

    pub fn script(body: impl Into<String>) -> Self {
        Self {
            command: body.into(),
            is_script: true,
        }
    }
}

/// How the supervisor determines a `MAIN` process is "ready".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expect {
    #[default]
    None,
    /// One `fork()` expected; adopt the child as `pid[MAIN]`.
    Fork,
    /// Two forks expected (double-fork daemonisation idiom).
    Daemon,
    /// The process is expected to stop itself (`SIGSTOP`) when ready.
    Stop,
}

/// Respawn budget: a sliding-window counter capping automatic restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespawnPolicy {
    pub enabled: bool,
    pub limit: u32,
    pub interval: Duration,
}

impl Default for RespawnPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            limit: 10,
            interval: Duration::from_secs(5),
        }
    }
}

/// How a job's stdio is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsoleMode {
    /// Bind `/dev/null`.
    #[default]
    None,
    /// Allocate a pty; the master is retained by the log subsystem, which
    /// lives outside this crate — here we only record the attach mode.
    Log,
    /// Inherit the supervisor's own console.
    Owner,
}

/// Resource limits applied to a spawned process. Modeled as
/// an explicit optional-per-resource table rather than a flat struct of
/// fields named after `RLIMIT_*`, matching how `rlimit` overrides are
/// sparse in practice (most classes set at most one or two).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub limits: BTreeMap<ResourceKind, (u64, u64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Cpu,
    Fsize,
    Data,
    Stack,
    Core,
    Rss,
    Nofile,
    As,
    Nproc,
    Memlock,
    Locks,
    Sigpending,
    Msgqueue,
    Nice,
    Rtprio,
}

/// A reusable definition that may yield zero or more instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobClass {
    pub key: ClassKey,
    /// Opaque stable identifier derived from `(session, name)`, used as the
    /// control-plane object path stand-in.
    pub path: String,
    /// Name template possibly containing `$VAR` references (empty =
    /// singleton instance).
    pub instance: String,
    pub env: Vec<EnvVar>,
    pub start_on: Operator,
    pub stop_on: Operator,
    pub emits: Vec<String>,
    pub processes: BTreeMap<ProcessKind, ProcessDef>,
    pub respawn: RespawnPolicy,
    pub normalexit: Vec<i32>,
    pub kill_timeout: Duration,
    pub kill_signal: i32,
    pub console: ConsoleMode,
    pub limits: ResourceLimits,
    pub umask: u32,
    pub nice: Option<i32>,
    pub working_directory: Option<PathBuf>,
    pub chroot: Option<PathBuf>,
    pub expect: Expect,
    /// Which source (file/precedence tier) this class came from, used by
    /// [`crate::session::ClassKey`] overlap resolution.
    pub source_precedence: i32,
}

impl JobClass {
    /// A minimal class with no operators, no processes: useful as a base for
    /// builders in `oj_runbook` and in tests.
    pub fn new(key: ClassKey) -> Self {
        let path = derive_path(&key);
        Self {
            key,
            path,
            instance: String::new(),
            env: Vec::new(),
            start_on: Operator::never(),
            stop_on: Operator::never(),
            emits: Vec::new(),
            processes: BTreeMap::new(),
            respawn: RespawnPolicy::default(),
            normalexit: Vec::new(),
            kill_timeout: Duration::from_secs(5),
            kill_signal: libc_signal::SIGTERM,
            console: ConsoleMode::default(),
            limits: ResourceLimits::default(),
            umask: 0o022,
            nice: None,
            working_directory: None,
            chroot: None,
            expect: Expect::default(),
            source_precedence: 0,
        }
    }

    pub fn is_singleton(&self) -> bool {
        self.instance.is_empty()
    }

    pub fn process(&self, kind: ProcessKind) -> Option<&ProcessDef> {
        self.processes.get(&kind)
    }

    /// Whether an exit status is an "expected" exit for this class
    /// independent of the process slot or signal handling in §4.9 (used for
    /// `MAIN` and tasks: exit 0 or a declared `normalexit` code).
    pub fn is_normal_exit(&self, code: i32) -> bool {
        code == 0 || self.normalexit.contains(&code)
    }
}

/// Signal numbers used without pulling in `libc` in `oj-core` (kept tiny and
/// POSIX-portable; `oj-adapters` is the crate allowed to depend on `libc`).
pub mod libc_signal {
    pub const SIGTERM: i32 = 15;
    pub const SIGKILL: i32 = 9;
    pub const SIGSTOP: i32 = 19;
    pub const SIGCONT: i32 = 18;
}

fn derive_path(key: &ClassKey) -> String {
    match &key.session {
        Some(session) => format!("/oj/job/{}/{}", session, sanitize(&key.name)),
        None => format!("/oj/job/{}", sanitize(&key.name)),
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
#[path = "class_tests.rs"]
mod tests;
