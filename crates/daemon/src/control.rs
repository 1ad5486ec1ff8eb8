// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §6's control surface: an in-process trait a future transport would
//! drive. [`EngineControl`] is the only implementation — it journals
//! externally submitted events to the WAL before handing them to
//! [`oj_engine::Engine`], so a crash between the two can't lose one.

use crate::error::ControlError;
use async_trait::async_trait;
use oj_adapters::{NotifyAdapter, ProcessAdapter};
use oj_core::{ClassKey, Clock, EnvVar, Job, JobClass, JobId};
use oj_engine::{Engine, EngineError, RegistryEvent};
use oj_storage::Wal;
use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

#[async_trait]
pub trait Control: Send + Sync {
    /// §6.1: submit a new event for the next dispatch pass.
    async fn emit_event(&self, name: String, env: Vec<EnvVar>) -> Result<(), ControlError>;
    /// §6.2 `Start`.
    async fn start(&self, key: &ClassKey, env: Vec<EnvVar>) -> Result<JobId, ControlError>;
    /// §6.2 `Stop`.
    async fn stop(&self, job_id: JobId, env: Vec<EnvVar>) -> Result<(), ControlError>;
    /// §6.2 `Restart`.
    async fn restart(&self, job_id: JobId, env: Vec<EnvVar>) -> Result<(), ControlError>;
    async fn get_instance(&self, job_id: JobId) -> Option<Job>;
    async fn get_instance_by_name(&self, key: &ClassKey, name: &str) -> Option<Job>;
    async fn get_all_instances(&self) -> Vec<(JobId, Job)>;
    async fn install_class(&self, class: JobClass) -> Vec<RegistryEvent>;
    async fn remove_class(&self, key: &ClassKey) -> Option<JobClass>;
}

/// Wraps a running [`Engine`] with the WAL it journals external events
/// into. Cloning shares both the engine lock and the WAL lock, so any
/// number of callers (the supervisor's own main loop included) can hold a
/// handle.
#[derive(Clone)]
pub struct EngineControl<P: ProcessAdapter, N: NotifyAdapter, C: Clock> {
    pub(crate) engine: Arc<AsyncMutex<Engine<P, N, C>>>,
    wal: Arc<SyncMutex<Wal>>,
    clock: C,
}

impl<P: ProcessAdapter, N: NotifyAdapter, C: Clock> EngineControl<P, N, C> {
    pub fn new(engine: Engine<P, N, C>, wal: Wal, clock: C) -> Self {
        Self { engine: Arc::new(AsyncMutex::new(engine)), wal: Arc::new(SyncMutex::new(wal)), clock }
    }

    pub fn wal(&self) -> Arc<SyncMutex<Wal>> {
        Arc::clone(&self.wal)
    }

    pub fn engine_handle(&self) -> Arc<AsyncMutex<Engine<P, N, C>>> {
        Arc::clone(&self.engine)
    }
}

#[async_trait]
impl<P: ProcessAdapter, N: NotifyAdapter, C: Clock> Control for EngineControl<P, N, C> {
    async fn emit_event(&self, name: String, env: Vec<EnvVar>) -> Result<(), ControlError> {
        let event = oj_core::Event::new(name.clone(), env.clone())
            .map_err(|e| ControlError::Engine(EngineError::InternalInvariant(e.to_string())))?;
        self.wal.lock().append(&event)?;
        self.engine.lock().await.emit_event(name, env)?;
        Ok(())
    }

    async fn start(&self, key: &ClassKey, env: Vec<EnvVar>) -> Result<JobId, ControlError> {
        let now_ms = self.clock.epoch_ms();
        Ok(self.engine.lock().await.start(key, env, now_ms).await?)
    }

    async fn stop(&self, job_id: JobId, env: Vec<EnvVar>) -> Result<(), ControlError> {
        let now_ms = self.clock.epoch_ms();
        self.engine.lock().await.stop(job_id, env, now_ms).await?;
        Ok(())
    }

    async fn restart(&self, job_id: JobId, env: Vec<EnvVar>) -> Result<(), ControlError> {
        let now_ms = self.clock.epoch_ms();
        self.engine.lock().await.restart(job_id, env, now_ms).await?;
        Ok(())
    }

    async fn get_instance(&self, job_id: JobId) -> Option<Job> {
        self.engine.lock().await.get_instance(job_id).cloned()
    }

    async fn get_instance_by_name(&self, key: &ClassKey, name: &str) -> Option<Job> {
        self.engine.lock().await.get_instance_by_name(key, name).cloned()
    }

    async fn get_all_instances(&self) -> Vec<(JobId, Job)> {
        self.engine.lock().await.get_all_instances().into_iter().map(|(id, job)| (id, job.clone())).collect()
    }

    async fn install_class(&self, class: JobClass) -> Vec<RegistryEvent> {
        self.engine.lock().await.install_class(class).await
    }

    async fn remove_class(&self, key: &ClassKey) -> Option<JobClass> {
        self.engine.lock().await.remove_class(key).await
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
