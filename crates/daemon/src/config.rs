// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup configuration, read once from the environment per §6.5.

use oj_core::Session;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a state directory: set OJ_STATE_DIR or HOME")]
    NoStateDir,
}

/// Flush interval for the WAL's group commit window.
pub const FLUSH_INTERVAL: Duration = Duration::from_millis(10);

/// Default interval between background checkpoints.
const DEFAULT_CHECKPOINT_INTERVAL: Duration = Duration::from_secs(60);

/// Default timer-check resolution for the scheduler's fired-timer sweep.
const DEFAULT_TIMER_CHECK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub state_dir: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub log_path: PathBuf,
    pub lock_path: PathBuf,
    /// Directory of job class source files for `oj-runbook` to load at
    /// startup. `None` means the supervisor starts with an empty registry
    /// and classes are installed solely through the control surface.
    pub classes_dir: Option<PathBuf>,
    /// `UPSTART_SESSION` equivalent: the per-user session this daemon
    /// instance serves, or `None` for the system session.
    pub session: Option<Session>,
    /// `UPSTART_NO_SESSIONS` equivalent: when set, per-user sessions are
    /// rejected and every class is forced into the system session.
    pub sessions_disabled: bool,
    pub timer_check_interval: Duration,
    pub checkpoint_interval: Duration,
}

impl SupervisorConfig {
    /// Load from the environment. Mirrors `OJ_STATE_DIR` >
    /// `XDG_STATE_HOME`/oj > `~/.local/state/oj`, the same precedence the
    /// CLI side resolves paths with.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = state_dir()?;
        let log_dir = std::env::var("OJ_LOGDIR").map(PathBuf::from).unwrap_or_else(|_| state_dir.clone());

        Ok(Self {
            wal_path: state_dir.join("wal").join("events.wal"),
            snapshot_path: state_dir.join("snapshot.zst"),
            log_path: log_dir.join("daemon.log"),
            lock_path: state_dir.join("daemon.pid"),
            classes_dir: std::env::var("OJ_CLASSES_DIR").ok().map(PathBuf::from),
            session: std::env::var("OJ_SESSION").ok().map(Session::new),
            sessions_disabled: std::env::var("OJ_NO_SESSIONS").is_ok(),
            timer_check_interval: env_duration_ms("OJ_TIMER_CHECK_MS").unwrap_or(DEFAULT_TIMER_CHECK_INTERVAL),
            checkpoint_interval: env_duration_ms("OJ_CHECKPOINT_MS").unwrap_or(DEFAULT_CHECKPOINT_INTERVAL),
            state_dir,
        })
    }
}

fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("OJ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("oj"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/oj"))
}

fn env_duration_ms(key: &str) -> Option<Duration> {
    std::env::var(key).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
