// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::control::Control;
use oj_adapters::{FakeNotifyAdapter, FakeProcessAdapter};
use oj_core::{ClassKey, Event, FakeClock};
use tempfile::tempdir;

fn test_config(dir: &std::path::Path) -> SupervisorConfig {
    SupervisorConfig {
        state_dir: dir.to_path_buf(),
        wal_path: dir.join("wal").join("events.wal"),
        snapshot_path: dir.join("snapshot.zst"),
        log_path: dir.join("daemon.log"),
        lock_path: dir.join("daemon.pid"),
        classes_dir: None,
        session: None,
        sessions_disabled: false,
        timer_check_interval: std::time::Duration::from_millis(20),
        checkpoint_interval: std::time::Duration::from_secs(3600),
    }
}

#[tokio::test]
async fn recover_with_no_prior_state_starts_empty() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let control =
        recover(FakeProcessAdapter::new(), FakeNotifyAdapter::new(), FakeClock::new(), &config).await.unwrap();

    assert!(control.get_all_instances().await.is_empty());
}

#[tokio::test]
async fn recover_replays_wal_entries_written_by_a_prior_process() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    {
        let mut wal = Wal::open(&config.wal_path, 0).unwrap();
        wal.append(&Event::new("custom".to_string(), Vec::new()).unwrap()).unwrap();
        wal.flush().unwrap();
    }

    let control =
        recover(FakeProcessAdapter::new(), FakeNotifyAdapter::new(), FakeClock::new(), &config).await.unwrap();

    // The replayed event has nowhere to land (no class/event-name operator
    // matches it), so it stays queued rather than crashing recovery.
    assert_eq!(control.wal().lock().write_seq(), 1);
}

#[tokio::test]
async fn recover_reinstalls_classes_from_the_config_directory() {
    let dir = tempdir().unwrap();
    let classes_dir = dir.path().join("classes");
    std::fs::create_dir_all(&classes_dir).unwrap();
    std::fs::write(classes_dir.join("svc.toml"), "[jobs.svc]\nmain = \"true\"\n").unwrap();

    let mut config = test_config(dir.path());
    config.classes_dir = Some(classes_dir);

    let control =
        recover(FakeProcessAdapter::new(), FakeNotifyAdapter::new(), FakeClock::new(), &config).await.unwrap();

    let key = ClassKey::system("svc");
    control.start(&key, Vec::new()).await.unwrap();
}
