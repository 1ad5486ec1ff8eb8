// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Main dispatch loop's idle poll interval when no timers are pending (default: 200ms).
pub fn poll_ms() -> Duration {
    parse_duration_ms("OJ_POLL_MS").unwrap_or(Duration::from_millis(200))
}

/// Interval between `ProcessAdapter::reap` sweeps (default: 250ms).
pub fn reap_poll_ms() -> Duration {
    parse_duration_ms("OJ_REAP_POLL_MS").unwrap_or(Duration::from_millis(250))
}

/// Interval between liveness checks on a job under a kill timer (default: 1000ms).
pub fn kill_check_ms() -> Duration {
    parse_duration_ms("OJ_KILL_CHECK_MS").unwrap_or(Duration::from_secs(1))
}
