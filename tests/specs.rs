// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level scenarios (§8.4 S1-S6): the same end-to-end cases
//! `oj_engine::runtime_tests` drives against `Engine` directly, here driven
//! one layer up through `oj_daemon`'s `Control`/`recover` surface, so the
//! WAL journal, class loading from disk, and crash recovery are exercised
//! alongside the FSM.

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/lifecycle.rs"]
mod lifecycle;

#[path = "specs/restart.rs"]
mod restart;

#[path = "specs/conf_loading.rs"]
mod conf_loading;

#[path = "specs/crash_recovery.rs"]
mod crash_recovery;
