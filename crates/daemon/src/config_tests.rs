// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Mutex;

/// Serialise tests that mutate process env vars this module reads.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in ["OJ_STATE_DIR", "OJ_LOGDIR", "OJ_CLASSES_DIR", "OJ_SESSION", "OJ_NO_SESSIONS", "OJ_TIMER_CHECK_MS", "OJ_CHECKPOINT_MS"]
    {
        std::env::remove_var(key);
    }
}

#[test]
fn load_uses_oj_state_dir_and_default_intervals() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env();
    std::env::set_var("OJ_STATE_DIR", "/tmp/oj-config-test");

    let config = SupervisorConfig::load().unwrap();
    assert_eq!(config.state_dir, PathBuf::from("/tmp/oj-config-test"));
    assert_eq!(config.wal_path, PathBuf::from("/tmp/oj-config-test/wal/events.wal"));
    assert_eq!(config.log_path, PathBuf::from("/tmp/oj-config-test/daemon.log"));
    assert_eq!(config.timer_check_interval, DEFAULT_TIMER_CHECK_INTERVAL);
    assert!(config.session.is_none());
    assert!(!config.sessions_disabled);
    clear_env();
}

#[test]
fn load_honors_logdir_session_and_interval_overrides() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env();
    std::env::set_var("OJ_STATE_DIR", "/tmp/oj-config-test");
    std::env::set_var("OJ_LOGDIR", "/tmp/oj-config-test-logs");
    std::env::set_var("OJ_SESSION", "user-7");
    std::env::set_var("OJ_TIMER_CHECK_MS", "250");

    let config = SupervisorConfig::load().unwrap();
    assert_eq!(config.log_path, PathBuf::from("/tmp/oj-config-test-logs/daemon.log"));
    assert_eq!(config.session, Some(Session::new("user-7")));
    assert_eq!(config.timer_check_interval, Duration::from_millis(250));
    clear_env();
}

#[test]
fn load_without_home_or_oj_state_dir_fails() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env();
    let home = std::env::var("HOME").ok();
    std::env::remove_var("HOME");

    let result = SupervisorConfig::load();
    assert!(matches!(result, Err(ConfigError::NoStateDir)));

    if let Some(home) = home {
        std::env::set_var("HOME", home);
    }
}
