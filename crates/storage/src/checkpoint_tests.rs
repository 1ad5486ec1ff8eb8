// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::MaterializedState;
use oj_core::{ClassKey, Job, JobClass};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

fn test_state() -> MaterializedState {
    let class = JobClass::new(ClassKey::system("web"));
    let job = Job::new(&class, "");
    MaterializedState::new(vec![class], vec![job], Vec::new())
}

#[test]
fn checkpoint_sync_writes_a_loadable_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    let checkpointer = Checkpointer::new(path.clone());

    let result = checkpointer.checkpoint_sync(10, &test_state()).unwrap();
    assert_eq!(result.seq, 10);
    assert!(result.size_bytes > 0);

    let loaded = load_snapshot(&path).unwrap().unwrap();
    assert_eq!(loaded.seq, 10);
    assert_eq!(loaded.state.jobs.len(), 1);
}

#[test]
fn start_runs_in_background_and_wait_blocks_for_completion() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    let checkpointer = Checkpointer::new(path.clone());

    let handle = checkpointer.start(3, &test_state());
    assert_eq!(handle.seq, 3);
    let result = handle.wait().unwrap();
    assert_eq!(result.seq, 3);
    assert!(load_snapshot(&path).unwrap().is_some());
}

#[test]
fn load_snapshot_of_missing_path_is_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.zst");
    assert!(load_snapshot(&path).unwrap().is_none());
}

#[test]
fn load_snapshot_runs_migration_to_current_version() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    let checkpointer = Checkpointer::new(path.clone());
    checkpointer.checkpoint_sync(1, &test_state()).unwrap();

    let loaded = load_snapshot(&path).unwrap().unwrap();
    assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);
}

#[derive(Clone, Default)]
struct FailingWriter {
    fail_write_tmp: Arc<Mutex<bool>>,
}

impl CheckpointWriter for FailingWriter {
    fn write_tmp(&self, path: &std::path::Path, data: &[u8]) -> Result<(), CheckpointError> {
        if *self.fail_write_tmp.lock().unwrap() {
            return Err(CheckpointError::Failed("injected write failure".into()));
        }
        FsCheckpointWriter.write_tmp(path, data)
    }

    fn fsync_file(&self, path: &std::path::Path) -> Result<(), CheckpointError> {
        FsCheckpointWriter.fsync_file(path)
    }

    fn rename(&self, from: &std::path::Path, to: &std::path::Path) -> Result<(), CheckpointError> {
        FsCheckpointWriter.rename(from, to)
    }

    fn fsync_dir(&self, path: &std::path::Path) -> Result<(), CheckpointError> {
        FsCheckpointWriter.fsync_dir(path)
    }

    fn file_size(&self, path: &std::path::Path) -> Result<u64, CheckpointError> {
        FsCheckpointWriter.file_size(path)
    }
}

#[test]
fn injected_write_failure_surfaces_as_checkpoint_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    let writer = FailingWriter {
        fail_write_tmp: Arc::new(Mutex::new(true)),
    };
    let checkpointer = Checkpointer::with_writer(writer, path.clone());

    let err = checkpointer.checkpoint_sync(1, &test_state()).unwrap_err();
    assert!(matches!(err, CheckpointError::Failed(_)));
    assert!(!path.exists());
}

#[test]
fn with_compression_level_is_accepted_and_still_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.zst");
    let checkpointer = Checkpointer::new(path.clone()).with_compression_level(19);

    checkpointer.checkpoint_sync(1, &test_state()).unwrap();
    assert!(load_snapshot(&path).unwrap().is_some());
}
