// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SIGCHLD` reaping (§4.9): drain the process adapter's non-blocking reap
//! sweep, look up which job/slot each pid belonged to, disarm any kill timer
//! targeting it, and feed the classification into the FSM.

use crate::executor::Executor;
use crate::fsm;
use crate::instances::InstanceTable;
use crate::registry::ClassRegistry;
use crate::scheduler::Scheduler;
use crate::Effect;
use crate::EngineError;
use oj_adapters::ProcessAdapter;
use oj_core::{ExitClassification, JobId, ProcessKind};

#[derive(Default)]
pub struct Supervisor;

impl Supervisor {
    pub fn new() -> Self {
        Self
    }

    /// Drain one reap sweep and advance every affected job's FSM.
    ///
    /// `SIGCHLD` reaping is serialised with dispatch by construction here:
    /// callers must finish a `Supervisor::poll` before the next
    /// `Dispatcher::poll`, so a child's reaping always precedes any derived
    /// event it causes (§4.9's ordering guarantee).
    pub async fn poll<P: ProcessAdapter>(
        &self,
        executor: &Executor<P>,
        instances: &mut InstanceTable,
        classes: &ClassRegistry,
        scheduler: &mut Scheduler,
        now_ms: u64,
    ) -> Result<Vec<Effect>, EngineError> {
        let mut effects = Vec::new();
        for (pid, classification) in executor.reap().await {
            let Some((job_id, kind)) = find_owner(instances, pid) else {
                tracing::warn!(pid, "reaped pid with no known owner");
                continue;
            };
            if classification.is_terminal() {
                scheduler.disarm(job_id, kind);
            }
            let Some(job) = instances.get_mut(job_id) else { continue };
            let Some(class) = classes.get(&job.class_key).cloned() else { continue };
            let job = instances.get_mut(job_id).expect("looked up above");
            effects.extend(match classification {
                ExitClassification::Trapped(event) => fsm::on_trace_event(job, &class, job_id, event, now_ms)?,
                other => fsm::on_process_exit(job, &class, job_id, kind, other, now_ms)?,
            });
        }
        Ok(effects)
    }
}

fn find_owner(instances: &InstanceTable, pid: u32) -> Option<(JobId, ProcessKind)> {
    instances
        .iter()
        .find_map(|(id, job)| ProcessKind::ALL.into_iter().find(|&k| job.pid_of(k) == Some(pid)).map(|k| (id, k)))
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
