// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job instance: one running (or stopped) realization of a [`JobClass`].

use crate::arena::Handle;
use crate::blocked::Blocked;
use crate::class::{JobClass, ProcessKind};
use crate::env::EnvVar;
use crate::event::EventId;
use crate::operator::Operator;
use crate::session::ClassKey;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

pub type JobId = Handle<Job>;

/// What the job's owner wants it to be doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    Start,
    Stop,
}

/// The ten-state job lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Waiting,
    Starting,
    PreStart,
    Spawned,
    PostStart,
    Running,
    PreStop,
    Stopping,
    Killed,
    PostStop,
}

impl JobState {
    /// States in which the instance is considered "settled" for the
    /// purposes of a blocking `Start`/`Stop` control call.
    pub fn is_stable(&self) -> bool {
        matches!(self, JobState::Waiting | JobState::Running)
    }
}

/// Why ptrace-based process tracking is watching a spawned process, as part
/// of fork/daemon detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceState {
    #[default]
    None,
    /// `PTRACE_TRACEME` requested, awaiting the initial stop.
    New,
    /// Watching for the expected `fork()`/`clone()` event.
    NewChild,
    /// Tracking resumed normally after the expected fork(s) were consumed.
    Normal,
}

/// A sliding window of respawn timestamps used to enforce
/// [`crate::class::RespawnPolicy`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RespawnWindow {
    history: VecDeque<u64>,
}

impl RespawnWindow {
    pub fn record(&mut self, now_ms: u64) {
        self.history.push_back(now_ms);
    }

    /// Count of respawns within `interval` of `now_ms`, dropping older
    /// entries.
    pub fn count_within(&mut self, now_ms: u64, interval: Duration) -> u32 {
        let cutoff = now_ms.saturating_sub(interval.as_millis() as u64);
        while matches!(self.history.front(), Some(t) if *t < cutoff) {
            self.history.pop_front();
        }
        self.history.len() as u32
    }
}

/// One running (or idle) instance of a [`JobClass`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub class_key: ClassKey,
    /// Resolved instance name (empty for singleton classes).
    pub name: String,
    pub goal: Goal,
    pub state: JobState,
    /// pid for each process slot currently running, if any.
    pub pid: [Option<u32>; 5],
    pub env: Vec<EnvVar>,
    /// Environment captured from the event that most recently caused a
    /// `start on` match, merged over the class defaults. Precedence between
    /// class-declared env and the triggering event's env is resolved in
    /// favor of the event (see DESIGN.md).
    pub start_env: Vec<EnvVar>,
    pub stop_env: Vec<EnvVar>,
    /// The event this job is currently blocking, if its state transition is
    /// waiting on one (e.g. `STARTING` waiting on its `starting` event to
    /// finish).
    pub blocker: Option<EventId>,
    /// Other entities waiting on this job reaching a stable state or being
    /// destroyed: events blocked by a starting/stopping pass, pending
    /// control-plane replies, or (rarely) other jobs.
    ///
    /// Not persisted: `Blocked` entries are handles into the live event/job
    /// arenas, which a snapshot reload does not reconstruct positionally.
    /// Recovery rebuilds these edges by replaying the WAL through the normal
    /// dispatch path rather than carrying stale handles across a restart.
    #[serde(skip)]
    pub blocking: Vec<Blocked>,
    pub kill_timer_armed: bool,
    pub kill_process: Option<ProcessKind>,
    pub respawn_window: RespawnWindow,
    pub failed: bool,
    pub failed_process: Option<ProcessKind>,
    pub exit_status: Option<i32>,
    pub trace_state: TraceState,
    pub trace_forks: u32,
    pub start_on: Operator,
    pub stop_on: Operator,
}

impl Job {
    pub fn new(class: &JobClass, name: impl Into<String>) -> Self {
        Self {
            class_key: class.key.clone(),
            name: name.into(),
            goal: Goal::Stop,
            state: JobState::Waiting,
            pid: [None; 5],
            env: class.env.clone(),
            start_env: Vec::new(),
            stop_env: Vec::new(),
            blocker: None,
            blocking: Vec::new(),
            kill_timer_armed: false,
            kill_process: None,
            respawn_window: RespawnWindow::default(),
            failed: false,
            failed_process: None,
            exit_status: None,
            trace_state: TraceState::None,
            trace_forks: 0,
            start_on: class.start_on.clone(),
            stop_on: class.stop_on.clone(),
        }
    }

    /// Construct a bare instance for tests that don't need a backing class.
    #[cfg(any(test, feature = "test-support"))]
    pub fn new_for_test() -> Self {
        Self {
            class_key: ClassKey::system("test-job"),
            name: String::new(),
            goal: Goal::Stop,
            state: JobState::Waiting,
            pid: [None; 5],
            env: Vec::new(),
            start_env: Vec::new(),
            stop_env: Vec::new(),
            blocker: None,
            blocking: Vec::new(),
            kill_timer_armed: false,
            kill_process: None,
            respawn_window: RespawnWindow::default(),
            failed: false,
            failed_process: None,
            exit_status: None,
            trace_state: TraceState::None,
            trace_forks: 0,
            start_on: Operator::never(),
            stop_on: Operator::never(),
        }
    }

    pub fn set_pid(&mut self, kind: ProcessKind, pid: Option<u32>) {
        self.pid[kind_index(kind)] = pid;
    }

    pub fn pid_of(&self, kind: ProcessKind) -> Option<u32> {
        self.pid[kind_index(kind)]
    }

    pub fn is_running_any(&self) -> bool {
        self.pid.iter().any(Option::is_some)
    }

    /// Valid next states from the current one. Used by the engine's
    /// `fsm::step` to assert it never produces an undeclared transition.
    pub fn valid_next_states(&self) -> &'static [JobState] {
        use JobState::*;
        match self.state {
            Waiting => &[Starting],
            Starting => &[PreStart, Spawned, Stopping],
            PreStart => &[Spawned, Stopping],
            Spawned => &[PostStart, Running, Stopping],
            PostStart => &[Running, Stopping],
            Running => &[PreStop, Stopping],
            PreStop => &[Stopping, Running],
            Stopping => &[Killed, Starting],
            Killed => &[PostStop, Starting],
            PostStop => &[Waiting, Starting],
        }
    }
}

fn kind_index(kind: ProcessKind) -> usize {
    match kind {
        ProcessKind::PreStart => 0,
        ProcessKind::Main => 1,
        ProcessKind::PostStart => 2,
        ProcessKind::PreStop => 3,
        ProcessKind::PostStop => 4,
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
