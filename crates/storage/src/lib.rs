// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Persisted engine state for supervisor re-exec: a JSONL write-ahead log
//! of dispatched events plus a periodic compressed snapshot.

mod checkpoint;
mod migration;
mod snapshot;
mod state;
mod wal;

pub use checkpoint::{
    load_snapshot, CheckpointError, CheckpointHandle, CheckpointResult, CheckpointWriter,
    Checkpointer, FsCheckpointWriter,
};
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use snapshot::{Snapshot, SnapshotError};
pub use state::MaterializedState;
pub use wal::{Wal, WalEntry, WalError};

/// Current snapshot schema version. Bump when [`MaterializedState`]'s
/// on-disk shape changes in a way that needs a [`MigrationRegistry`] entry.
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;
