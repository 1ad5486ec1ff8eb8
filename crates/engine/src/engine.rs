// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level engine: wires [`Dispatcher`], [`Scheduler`], [`Executor`], and
//! [`Supervisor`] into the single-threaded run loop and control surface of
//! §5/§6. One [`Engine::run_once`] call drains fired kill timers, runs the
//! dispatch pass to a fixed point, reaps exited children, and applies every
//! resulting [`Effect`] — spawning, signaling, arming timers, and emitting
//! lifecycle events — until nothing is left pending.

use crate::dispatch::Dispatcher;
use crate::envbuild;
use crate::executor::Executor;
use crate::fsm;
use crate::registry::RegistryEvent;
use crate::scheduler::Scheduler;
use crate::supervisor::Supervisor;
use crate::Effect;
use crate::EngineError;
use oj_adapters::{NotifyAdapter, NotifyEvent, ProcessAdapter};
use oj_core::{merge_env, Blocked, ClassKey, Clock, CoreError, EnvVar, Goal, Job, JobClass, JobId};
use std::collections::{HashMap, VecDeque};

/// One running supervisor: its class registry, live instances, in-flight
/// events, kill-timer schedule, and the adapters that actually touch the
/// outside world.
pub struct Engine<P: ProcessAdapter, N: NotifyAdapter, C: Clock> {
    dispatcher: Dispatcher,
    scheduler: Scheduler,
    executor: Executor<P>,
    supervisor: Supervisor,
    notify: N,
    clock: C,
    /// Instances a `Restart` control call stopped and is waiting to
    /// re-start once they settle back at `WAITING` (§6.2: "atomic with
    /// respect to other control requests on the same instance"), keyed by
    /// `(class, name)` with the env the restart should re-`start` with.
    pending_restarts: HashMap<(ClassKey, String), Vec<EnvVar>>,
}

impl<P: ProcessAdapter, N: NotifyAdapter, C: Clock> Engine<P, N, C> {
    pub fn new(process: P, notify: N, clock: C) -> Self {
        Self {
            dispatcher: Dispatcher::new(),
            scheduler: Scheduler::new(),
            executor: Executor::new(process),
            supervisor: Supervisor::new(),
            notify,
            clock,
            pending_restarts: HashMap::new(),
        }
    }

    /// Run the dispatch pass, the reap sweep, and fired kill timers to a
    /// fixed point, applying every effect they produce.
    pub async fn run_once(&mut self) -> Result<(), EngineError> {
        let now = self.clock.now();
        let now_ms = self.clock.epoch_ms();

        let mut queue: VecDeque<Effect> = VecDeque::new();
        for key in self.scheduler.fired_timers(now) {
            if let Some(job) = self.dispatcher.instances.get_mut(key.job) {
                if let Some(effect) = fsm::on_kill_timer_expired(job, key.job) {
                    queue.push_back(effect);
                }
            }
        }
        queue.extend(self.dispatcher.poll(now_ms)?);
        queue.extend(
            self.supervisor
                .poll(&self.executor, &mut self.dispatcher.instances, &self.dispatcher.classes, &mut self.scheduler, now_ms)
                .await?,
        );

        loop {
            match queue.pop_front() {
                Some(effect) => queue.extend(self.apply_effect(effect, now_ms, now).await?),
                None => {
                    let more = self.dispatcher.poll(now_ms)?;
                    if more.is_empty() {
                        break;
                    }
                    queue.extend(more);
                }
            }
        }
        self.dispatcher.settle_all();
        self.settle_pending_restarts(now_ms).await?;
        Ok(())
    }

    async fn apply_effect(&mut self, effect: Effect, now_ms: u64, now: std::time::Instant) -> Result<Vec<Effect>, EngineError> {
        match effect.clone() {
            Effect::Spawn { job, kind, .. } => {
                let pid = self.executor.spawn(&effect).await?;
                let Some(job_ref) = self.dispatcher.instances.get_mut(job) else {
                    return Ok(Vec::new());
                };
                let Some(class) = self.dispatcher.classes.get(&job_ref.class_key).cloned() else {
                    return Ok(Vec::new());
                };
                let job_ref = self.dispatcher.instances.get_mut(job).expect("looked up above");
                fsm::on_process_spawned(job_ref, &class, job, kind, pid, now_ms)
            }
            Effect::Signal { pid, signal, .. } => {
                self.executor.signal(pid, signal).await?;
                Ok(Vec::new())
            }
            Effect::ArmKillTimer { job, kind, timeout, .. } => {
                self.scheduler.arm(job, kind, timeout, now);
                Ok(Vec::new())
            }
            Effect::Emit { name, env } => {
                self.dispatcher.emit(name, env)?;
                Ok(Vec::new())
            }
            Effect::EmitAndBlock { job, name, env } => {
                let id = self.dispatcher.emit(name, env)?;
                self.dispatcher.events.add_waiter(id, Blocked::Job(job));
                if let Some(job_ref) = self.dispatcher.instances.get_mut(job) {
                    job_ref.blocker = Some(id);
                }
                Ok(Vec::new())
            }
            Effect::Diagnostic { job, message } => {
                tracing::warn!(?job, %message, "diagnostic");
                Ok(Vec::new())
            }
        }
    }

    /// After a pass settles, re-`Start` any instance a `restart()` call is
    /// waiting on now that it has reached `WAITING`.
    async fn settle_pending_restarts(&mut self, now_ms: u64) -> Result<(), EngineError> {
        let ready: Vec<(ClassKey, String)> = self
            .pending_restarts
            .keys()
            .filter(|(key, name)| self.dispatcher.instances.find(key, name).is_none())
            .cloned()
            .collect();
        for (key, name) in ready {
            let env = self.pending_restarts.remove(&(key.clone(), name)).unwrap_or_default();
            self.start(&key, env, now_ms).await?;
        }
        Ok(())
    }

    /// §6.1: submit a new event for the next dispatch pass.
    pub fn emit_event(&mut self, name: impl Into<String>, env: Vec<EnvVar>) -> Result<(), EngineError> {
        self.dispatcher.emit(name, env)?;
        Ok(())
    }

    /// §6.2 `Start`: create or reuse the instance `env` expands to and set
    /// its goal to `START`.
    pub async fn start(&mut self, key: &ClassKey, env: Vec<EnvVar>, now_ms: u64) -> Result<JobId, EngineError> {
        let class = self.lookup_class(key)?;
        let name = envbuild::expand_instance_name(&class.instance, &env)?;
        let job_id = match self.dispatcher.instances.find(key, &name) {
            Some(id) => id,
            None => self.dispatcher.instances.insert(Job::new(&class, name)),
        };
        let job = self.dispatcher.instances.get_mut(job_id).expect("found or inserted");
        if job.goal == Goal::Start {
            return Err(EngineError::Core(CoreError::AlreadyStarted));
        }
        job.start_env = merge_env(&env, &class.env);
        job.goal = Goal::Start;
        let effects = fsm::on_goal_set(job, &class, job_id, now_ms)?;
        self.drain(effects, now_ms).await?;
        Ok(job_id)
    }

    /// §6.2 `Stop`.
    pub async fn stop(&mut self, job_id: JobId, env: Vec<EnvVar>, now_ms: u64) -> Result<(), EngineError> {
        let job = self.dispatcher.instances.get_mut(job_id).ok_or(EngineError::Core(CoreError::UnknownInstance(job_id.index().to_string())))?;
        if job.goal == Goal::Stop {
            return Err(EngineError::Core(CoreError::AlreadyStopped));
        }
        let class = self.dispatcher.classes.get(&job.class_key).cloned().ok_or_else(|| EngineError::Core(CoreError::UnknownInstance(job.class_key.to_string())))?;
        let job = self.dispatcher.instances.get_mut(job_id).expect("looked up above");
        job.stop_env = env;
        job.goal = Goal::Stop;
        let effects = fsm::on_goal_set(job, &class, job_id, now_ms)?;
        self.drain(effects, now_ms).await?;
        Ok(())
    }

    /// §6.2 `Restart`: stop now, remembering to re-`Start` once the
    /// instance settles back at `WAITING`.
    pub async fn restart(&mut self, job_id: JobId, env: Vec<EnvVar>, now_ms: u64) -> Result<(), EngineError> {
        let job = self.dispatcher.instances.get(job_id).ok_or(EngineError::Core(CoreError::UnknownInstance(job_id.index().to_string())))?;
        let key = job.class_key.clone();
        let name = job.name.clone();
        self.pending_restarts.insert((key, name), env.clone());
        self.stop(job_id, env, now_ms).await
    }

    /// Apply `effects` (and whatever follow-up effects they produce)
    /// immediately, without waiting for the next [`Self::run_once`].
    async fn drain(&mut self, effects: Vec<Effect>, now_ms: u64) -> Result<(), EngineError> {
        let now = self.clock.now();
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            queue.extend(self.apply_effect(effect, now_ms, now).await?);
        }
        self.dispatcher.settle_all();
        Ok(())
    }

    pub fn get_instance(&self, job_id: JobId) -> Option<&Job> {
        self.dispatcher.instances.get(job_id)
    }

    pub fn get_instance_by_name(&self, key: &ClassKey, name: &str) -> Option<&Job> {
        self.dispatcher.instances.find(key, name).and_then(|id| self.dispatcher.instances.get(id))
    }

    pub fn get_all_instances(&self) -> Vec<(JobId, &Job)> {
        self.dispatcher.instances.iter().collect()
    }

    /// Install a class; returns the registry changes so the daemon layer can
    /// push matching `JobAdded`/`JobRemoved` notifications (§6.3).
    pub async fn install_class(&mut self, class: JobClass) -> Vec<RegistryEvent> {
        let has_instances = self.dispatcher.instances.has_instances(&class.key);
        let events = self.dispatcher.classes.install(class, has_instances);
        self.publish_registry_events(&events).await;
        events
    }

    pub async fn remove_class(&mut self, key: &ClassKey) -> Option<JobClass> {
        let removed = self.dispatcher.classes.remove(key);
        if removed.is_some() {
            self.publish_registry_events(&[RegistryEvent::Removed(key.clone())]).await;
        }
        removed
    }

    async fn publish_registry_events(&self, events: &[RegistryEvent]) {
        for event in events {
            let notify_event = match event {
                RegistryEvent::Added(key) => NotifyEvent::JobAdded(key.clone()),
                RegistryEvent::Removed(key) => NotifyEvent::JobRemoved(key.clone()),
            };
            if let Err(e) = self.notify.notify(notify_event).await {
                tracing::warn!(error = %e, "notify failed");
            }
        }
    }

    fn lookup_class(&self, key: &ClassKey) -> Result<JobClass, EngineError> {
        self.dispatcher.classes.get(key).cloned().ok_or_else(|| EngineError::Core(CoreError::UnknownInstance(key.to_string())))
    }

    /// Snapshot every registered class, live instance, and in-flight event
    /// for `oj_storage::Checkpointer`. Taken under whatever lock the caller
    /// already holds on the engine; cheap enough to run on the main loop
    /// before handing the clone to a background checkpoint thread.
    pub fn materialize(&self) -> oj_storage::MaterializedState {
        oj_storage::MaterializedState::new(
            self.dispatcher.classes.iter().cloned().collect(),
            self.dispatcher.instances.iter().map(|(_, job)| job.clone()).collect(),
            self.dispatcher.events.iter().cloned().collect(),
        )
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod runtime_tests;
