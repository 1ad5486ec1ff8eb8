// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The main dispatch loop: the per-event starting pass (§4.4), the
//! per-event stopping pass (§4.5), and the `poll()` fixed point (§4.1) that
//! drives both to quiescence and flushes finished events.

use crate::envbuild::{self, env_var};
use crate::fsm;
use crate::instances::InstanceTable;
use crate::registry::ClassRegistry;
use crate::store::EventStore;
use crate::Effect;
use crate::EngineError;
use oj_core::{
    merge_env, Blocked, ClassKey, EnvVar, Event, EventId, Goal, Job, JobClass, JobId, JobState,
    Operator,
};

/// Owns the three live data structures a running supervisor needs:
/// registered classes, live instances, and in-flight events.
#[derive(Default)]
pub struct Dispatcher {
    pub classes: ClassRegistry,
    pub instances: InstanceTable,
    pub events: EventStore,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a new event; it is picked up on the next [`Self::poll`].
    pub fn emit(&mut self, name: impl Into<String>, env: Vec<EnvVar>) -> Result<EventId, EngineError> {
        self.events.emit(name, env).map_err(|e| EngineError::InternalInvariant(e.to_string()))
    }

    /// Run the dispatch pass to a fixed point: evaluate every pending
    /// event against every class's `start_on`/`stop_on`, advance events
    /// whose blockers have drained, and flush finished events. Handlers run
    /// inside this loop may emit further pending events, which are folded
    /// into the same pass (§4.1).
    pub fn poll(&mut self, now_ms: u64) -> Result<Vec<Effect>, EngineError> {
        let mut effects = Vec::new();
        loop {
            let mut progressed = false;

            for event_id in self.events.pending() {
                effects.extend(self.run_starting_pass(event_id, now_ms)?);
                effects.extend(self.run_stopping_pass(event_id, now_ms)?);
                self.events.mark_handling(event_id);
                progressed = true;
            }

            for event_id in self.events.ready_to_finish() {
                self.events.mark_finished(event_id);
                progressed = true;
            }

            for event_id in self.events.finished() {
                if let Some(event) = self.events.remove(event_id) {
                    if event.failed && !event.is_derived_failure() {
                        let derived = event.derived_failure();
                        self.events.emit(derived.name, derived.env).map_err(|e| EngineError::InternalInvariant(e.to_string()))?;
                    }
                    effects.extend(self.notify_event_waiters(event, now_ms)?);
                }
                progressed = true;
            }

            if !progressed {
                break;
            }
        }
        Ok(effects)
    }

    fn notify_event_waiters(&mut self, event: Event, now_ms: u64) -> Result<Vec<Effect>, EngineError> {
        let mut effects = Vec::new();
        for waiter in event.blocking {
            match waiter {
                Blocked::Job(job_id) => {
                    let Some(job) = self.instances.get(job_id) else { continue };
                    let Some(class) = self.classes.get(&job.class_key).cloned() else { continue };
                    let job = self.instances.get_mut(job_id).expect("looked up above");
                    effects.extend(fsm::on_blocker_finished(job, &class, job_id, now_ms)?);
                    self.settle(job_id);
                }
                Blocked::Event(_) | Blocked::IpcReply(_, _) => {
                    // Not produced by this engine's own dispatch passes: a
                    // pending control-plane reply is the daemon layer's
                    // concern, and no event here ever waits on another.
                }
            }
        }
        Ok(effects)
    }

    /// §4.4: for every class, feed the event to `start_on`; on satisfaction
    /// create or reuse an instance with `goal = Start`.
    fn run_starting_pass(&mut self, event_id: EventId, now_ms: u64) -> Result<Vec<Effect>, EngineError> {
        let mut effects = Vec::new();
        let Some(event) = self.events.get(event_id).cloned() else {
            return Ok(effects);
        };
        let keys: Vec<ClassKey> = self.classes.iter().map(|c| c.key.clone()).collect();

        for key in keys {
            let became_satisfied = {
                let Some(class) = self.classes.get_mut(&key) else { continue };
                feed_and_block(&mut class.start_on, &mut self.events, event_id, &event, &[])
            };
            if !became_satisfied {
                continue;
            }

            let mut absorbed = Vec::new();
            {
                let class = self.classes.get_mut(&key).expect("fed above");
                class.start_on.absorbed_events(&mut absorbed);
                class.start_on.reset();
            }
            for id in &absorbed {
                self.events.unblock(*id);
            }

            let aggregated_env = aggregate_env(&self.events, &absorbed, "UPSTART_EVENTS")?;
            let Some(class) = self.classes.get(&key).cloned() else { continue };

            let instance_name = match envbuild::expand_instance_name(&class.instance, &aggregated_env) {
                Ok(name) => name,
                Err(err) => {
                    effects.push(Effect::Diagnostic {
                        job: None,
                        message: format!("instance name expansion failed for {}: {err}", class.key),
                    });
                    continue;
                }
            };
            let start_env = merge_env(&aggregated_env, &class.env);

            let job_id = match self.instances.find(&class.key, &instance_name) {
                Some(id) => id,
                None => self.instances.insert(Job::new(&class, instance_name)),
            };
            let job = self.instances.get_mut(job_id).expect("just found or inserted");

            if job.goal != Goal::Start {
                job.start_env = start_env;
                job.goal = Goal::Start;
                effects.extend(fsm::on_goal_set(job, &class, job_id, now_ms)?);
            }
            // Otherwise the instance is already starting: this event's only
            // remaining role is to wait for that start to stabilise.
            let job = self.instances.get_mut(job_id).expect("present");
            for id in &absorbed {
                self.events.block(*id);
                job.blocking.push(Blocked::Event(*id));
            }
            self.settle(job_id);
        }
        Ok(effects)
    }

    /// §4.5: symmetric to the starting pass, evaluated per live instance
    /// against its own (`$VAR`-resolved) `stop_on` tree.
    fn run_stopping_pass(&mut self, event_id: EventId, now_ms: u64) -> Result<Vec<Effect>, EngineError> {
        let mut effects = Vec::new();
        let Some(event) = self.events.get(event_id).cloned() else {
            return Ok(effects);
        };
        let job_ids: Vec<JobId> = self.instances.iter().map(|(id, _)| id).collect();

        for job_id in job_ids {
            let became_satisfied = {
                let Some(job) = self.instances.get_mut(job_id) else { continue };
                let job_env = job.env.clone();
                feed_and_block(&mut job.stop_on, &mut self.events, event_id, &event, &job_env)
            };
            if !became_satisfied {
                continue;
            }

            let mut absorbed = Vec::new();
            {
                let job = self.instances.get_mut(job_id).expect("fed above");
                job.stop_on.absorbed_events(&mut absorbed);
                job.stop_on.reset();
            }
            for id in &absorbed {
                self.events.unblock(*id);
            }

            let aggregated_env = aggregate_env(&self.events, &absorbed, "UPSTART_STOP_EVENTS")?;
            let Some(job) = self.instances.get_mut(job_id) else { continue };
            job.stop_env = aggregated_env;
            job.goal = Goal::Stop;
            for id in &absorbed {
                self.events.block(*id);
                job.blocking.push(Blocked::Event(*id));
            }

            let Some(class) = self.classes.get(&job.class_key).cloned() else { continue };
            let job = self.instances.get_mut(job_id).expect("present");
            effects.extend(fsm::on_goal_set(job, &class, job_id, now_ms)?);
            self.settle(job_id);
        }
        Ok(effects)
    }

    /// Run [`Self::settle`] over every live instance. The starting/stopping
    /// passes and [`Self::notify_event_waiters`] already settle the one job
    /// they just touched, but a job can also reach `WAITING`/`Stop` purely
    /// through a reaped exit (no event involved anywhere on its path), which
    /// none of those call sites see — so callers that drive the FSM outside
    /// a dispatch pass (a reap sweep, a direct control call) sweep here
    /// afterwards to make sure settled jobs still get removed.
    pub fn settle_all(&mut self) {
        let job_ids: Vec<JobId> = self.instances.iter().map(|(id, _)| id).collect();
        for job_id in job_ids {
            self.settle(job_id);
        }
    }

    /// Drain `job.blocking` once it reaches a stable state (§4.4's "keeping
    /// each event blocked until the job stabilises", and §4.6's WAITING
    /// side effect), then destroy it if its goal is still `Stop`.
    fn settle(&mut self, job_id: JobId) {
        let Some(job) = self.instances.get_mut(job_id) else { return };
        if job.state.is_stable() && !job.blocking.is_empty() {
            for waiter in std::mem::take(&mut job.blocking) {
                if let Blocked::Event(id) = waiter {
                    self.events.unblock(id);
                }
            }
        }
        let Some(job) = self.instances.get(job_id) else { return };
        if job.state == JobState::Waiting && job.goal == Goal::Stop && job.blocking.is_empty() {
            self.instances.remove(job_id);
        }
    }
}

/// Feed `event` to `operator`, and `block()` it once for every leaf that
/// newly absorbs it this call (a tree can have more than one leaf matching
/// the same event name). Returns whether the tree's root became satisfied.
fn feed_and_block(operator: &mut Operator, events: &mut EventStore, event_id: EventId, event: &Event, job_env: &[EnvVar]) -> bool {
    let mut before = Vec::new();
    operator.absorbed_events(&mut before);
    let became_satisfied = operator.feed(event_id, event, job_env);
    let mut after = Vec::new();
    operator.absorbed_events(&mut after);
    for _ in 0..after.len().saturating_sub(before.len()) {
        events.block(event_id);
    }
    became_satisfied
}

/// Merge the env of every absorbed event (left-to-right) and append the
/// space-joined event-name marker key (`UPSTART_EVENTS` /
/// `UPSTART_STOP_EVENTS`).
fn aggregate_env(events: &EventStore, absorbed: &[EventId], events_key: &str) -> Result<Vec<EnvVar>, EngineError> {
    let mut merged = Vec::new();
    let mut names = Vec::new();
    for &id in absorbed {
        if let Some(event) = events.get(id) {
            merged = merge_env(&merged, &event.env);
            names.push(event.name.clone());
        }
    }
    if !names.is_empty() {
        let marker = env_var(events_key, names.join(" "))?;
        merged = merge_env(&merged, std::slice::from_ref(&marker));
    }
    Ok(merged)
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
