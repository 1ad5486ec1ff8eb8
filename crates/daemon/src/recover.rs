// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup recovery shared by the `ojd` binary and the `oj` CLI's
//! single-process mode (§6): both need to open the same on-disk WAL and
//! snapshot and arrive at the same [`EngineControl`], so the sequence
//! lives here instead of being duplicated in two `main.rs` files.

use crate::config::SupervisorConfig;
use crate::control::{Control, EngineControl};
use oj_adapters::{NotifyAdapter, ProcessAdapter};
use oj_core::Clock;
use oj_runbook::source::SourcePrecedence;
use oj_storage::{load_snapshot, SnapshotError, Wal, WalError};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum RecoverError {
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),
}

/// Load the last snapshot (if any), open the WAL at its seq, re-install
/// every checkpointed class plus anything found under `classes_dir`, and
/// replay WAL entries written since the snapshot.
pub async fn recover<P: ProcessAdapter, N: NotifyAdapter, C: Clock>(
    process: P,
    notify: N,
    clock: C,
    config: &SupervisorConfig,
) -> Result<EngineControl<P, N, C>, RecoverError> {
    let (state, processed_seq) = match load_snapshot(&config.snapshot_path) {
        Ok(Some(snapshot)) => {
            info!(seq = snapshot.seq, "loaded snapshot");
            (Some(snapshot.state), snapshot.seq)
        }
        Ok(None) => (None, 0),
        Err(e) => {
            warn!(error = %e, "failed to load snapshot, starting from an empty state");
            (None, 0)
        }
    };

    let mut wal = Wal::open(&config.wal_path, processed_seq)?;
    let replay = wal.entries_after(processed_seq)?;

    let engine = oj_engine::Engine::new(process, notify, clock.clone());
    let control = EngineControl::new(engine, wal, clock);

    if let Some(state) = state {
        for class in state.classes {
            control.install_class(class).await;
        }
    }
    if let Some(classes_dir) = &config.classes_dir {
        match SourcePrecedence::new(vec![classes_dir.clone()]).load_all() {
            Ok(classes) => {
                for class in classes {
                    control.install_class(class).await;
                }
            }
            Err(e) => warn!(error = %e, dir = %classes_dir.display(), "failed to load job classes"),
        }
    }
    for entry in replay {
        if let Err(e) = control.engine_handle().lock().await.emit_event(entry.event.name, entry.event.env) {
            error!(seq = entry.seq, error = %e, "failed to replay journaled event");
        }
    }

    Ok(control)
}

#[cfg(test)]
#[path = "recover_tests.rs"]
mod tests;
