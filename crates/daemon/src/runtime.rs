// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §5's main loop: a single-threaded cooperative scheduler built on
//! `tokio::select!`, with no socket listener of its own — control calls
//! arrive in-process through [`crate::control::EngineControl`] instead of
//! over a Unix socket.

use crate::config::SupervisorConfig;
use crate::control::EngineControl;
use oj_adapters::{NotifyAdapter, ProcessAdapter};
use oj_core::Clock;
use oj_storage::{Checkpointer, Wal};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

/// Flush interval for the WAL's group commit window, matching
/// [`crate::config::FLUSH_INTERVAL`].
const FLUSH_INTERVAL: Duration = Duration::from_millis(10);

pub struct Supervisor<P: ProcessAdapter, N: NotifyAdapter, C: Clock> {
    control: EngineControl<P, N, C>,
    snapshot_path: PathBuf,
    timer_check_interval: Duration,
    checkpoint_interval: Duration,
}

impl<P: ProcessAdapter + 'static, N: NotifyAdapter + 'static, C: Clock + 'static> Supervisor<P, N, C> {
    pub fn new(control: EngineControl<P, N, C>, config: &SupervisorConfig) -> Self {
        Self {
            control,
            snapshot_path: config.snapshot_path.clone(),
            timer_check_interval: config.timer_check_interval,
            checkpoint_interval: config.checkpoint_interval,
        }
    }

    pub fn control(&self) -> &EngineControl<P, N, C> {
        &self.control
    }

    /// Run until SIGTERM, SIGINT, or `shutdown` is notified. Spawns the
    /// background flush and checkpoint tasks first, then drives
    /// `Engine::run_once` on a fixed poll interval so timers, kill
    /// escalations, and respawn budgets keep advancing even when no new
    /// control call arrives.
    pub async fn run(&self, shutdown: std::sync::Arc<Notify>) -> std::io::Result<()> {
        self.spawn_flush_task();
        self.spawn_checkpoint_task();

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut timer_check = tokio::time::interval(self.timer_check_interval);

        loop {
            tokio::select! {
                _ = timer_check.tick() => {
                    if let Err(e) = self.control.engine_handle().lock().await.run_once().await {
                        error!(error = %e, "engine run_once failed");
                    }
                }
                _ = shutdown.notified() => {
                    info!("shutdown requested via control surface");
                    break;
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, shutting down");
                    break;
                }
                _ = sigint.recv() => {
                    info!("received SIGINT, shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    fn spawn_flush_task(&self) {
        let wal = self.control.wal();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(FLUSH_INTERVAL);
            loop {
                interval.tick().await;
                let mut wal = wal.lock();
                if wal.needs_flush() {
                    if let Err(e) = wal.flush() {
                        error!(error = %e, "failed to flush event journal");
                    }
                }
            }
        });
    }

    fn spawn_checkpoint_task(&self) {
        let engine = self.control.engine_handle();
        let wal = self.control.wal();
        let checkpointer = Checkpointer::new(self.snapshot_path.clone());
        let interval_dur = self.checkpoint_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval_dur);
            loop {
                interval.tick().await;

                let (state, processed_seq) = {
                    let engine = engine.lock().await;
                    let wal = wal.lock();
                    (engine.materialize(), wal.processed_seq())
                };

                if processed_seq == 0 {
                    continue;
                }

                let handle = checkpointer.start(processed_seq, &state);
                let result = tokio::task::spawn_blocking(move || handle.wait()).await;

                match result {
                    Ok(Ok(checkpoint)) => {
                        debug!(
                            seq = checkpoint.seq,
                            size_bytes = checkpoint.size_bytes,
                            job_count = checkpoint.job_count,
                            pending_event_count = checkpoint.pending_event_count,
                            "checkpoint complete"
                        );
                        let mut wal = wal.lock();
                        if let Err(e) = wal.truncate_before(processed_seq) {
                            warn!(error = %e, "failed to truncate WAL after checkpoint");
                        }
                    }
                    Ok(Err(e)) => error!(error = %e, "checkpoint failed"),
                    Err(e) => error!(error = %e, "checkpoint task panicked"),
                }
            }
        });
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
