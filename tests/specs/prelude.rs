// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared scaffolding for the workspace-level scenario tests: a tempdir-backed
//! [`SupervisorConfig`] plus the fake adapters, so each scenario recovers a
//! real [`EngineControl`] against a real WAL/snapshot path without touching
//! any real process or clock.

use oj_adapters::{FakeNotifyAdapter, FakeProcessAdapter};
use oj_core::{EnvVar, FakeClock};
use oj_daemon::config::SupervisorConfig;
use oj_daemon::control::EngineControl;
pub use oj_daemon::control::Control;
use std::path::Path;
use std::time::Duration;

pub type TestControl = EngineControl<FakeProcessAdapter, FakeNotifyAdapter, FakeClock>;

pub fn test_config(dir: &Path) -> SupervisorConfig {
    SupervisorConfig {
        state_dir: dir.to_path_buf(),
        wal_path: dir.join("wal").join("events.wal"),
        snapshot_path: dir.join("snapshot.zst"),
        log_path: dir.join("daemon.log"),
        lock_path: dir.join("daemon.pid"),
        classes_dir: None,
        session: None,
        sessions_disabled: false,
        timer_check_interval: Duration::from_millis(20),
        checkpoint_interval: Duration::from_secs(3600),
    }
}

/// Recover a fresh [`EngineControl`] over a tempdir the caller owns (so the
/// caller can reopen the same state directory later to exercise recovery).
pub async fn recover_in(dir: &Path) -> (TestControl, FakeProcessAdapter) {
    let config = test_config(dir);
    let process = FakeProcessAdapter::new();
    let control = oj_daemon::recover(process.clone(), FakeNotifyAdapter::new(), FakeClock::new(), &config)
        .await
        .unwrap();
    (control, process)
}

/// Drive the engine's run loop to a fixed point the way `Supervisor::run`'s
/// `timer_check` tick does, except synchronously and as many times as asked.
pub async fn run_ticks(control: &TestControl, n: usize) {
    for _ in 0..n {
        control.engine_handle().lock().await.run_once().await.unwrap();
    }
}

pub fn env(pairs: &[(&str, &str)]) -> Vec<EnvVar> {
    pairs.iter().map(|(k, v)| EnvVar::new(*k, *v).unwrap()).collect()
}

pub fn has_env(vars: &[EnvVar], key: &str, value: &str) -> bool {
    vars.iter().any(|v| v.key() == key && v.value() == value)
}
