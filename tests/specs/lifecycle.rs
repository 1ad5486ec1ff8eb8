// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! S1-S3 (§8.4) through the daemon's `Control` surface rather than calling
//! `Engine` directly, so the WAL journaling `emit_event` does along the way
//! is exercised too.

use crate::prelude::*;
use oj_core::{ClassKey, JobState, Operator, OperatorPattern, ProcessDef, ProcessKind};
use tempfile::tempdir;

// S1. Singleton service lifecycle.
#[tokio::test]
async fn singleton_service_starts_on_foo_and_stops_on_bar() {
    let dir = tempdir().unwrap();
    let (control, process) = recover_in(dir.path()).await;

    let key = ClassKey::system("srv");
    let mut class = oj_core::JobClass::new(key.clone());
    class.start_on = Operator::leaf(OperatorPattern::new("foo"));
    class.stop_on = Operator::leaf(OperatorPattern::new("bar"));
    class.processes.insert(ProcessKind::Main, ProcessDef::command("/bin/sleep 999"));
    class.respawn.enabled = false;
    control.install_class(class).await;

    control.emit_event("foo".to_string(), Vec::new()).await.unwrap();
    run_ticks(&control, 1).await;

    let job = control.get_instance_by_name(&key, "").await.expect("instance started");
    assert_eq!(job.state, JobState::Running);
    let main_pid = job.pid_of(ProcessKind::Main).unwrap();

    // The journaled event must have reached disk before the instance does,
    // since a crash between the two must not lose the cause of the start.
    assert_eq!(control.wal().lock().write_seq(), 1);

    control.emit_event("bar".to_string(), Vec::new()).await.unwrap();
    run_ticks(&control, 1).await;
    process.exit(main_pid, oj_core::ExitClassification::Killed(15));
    run_ticks(&control, 1).await;

    assert!(control.get_instance_by_name(&key, "").await.is_none());
    assert_eq!(control.wal().lock().write_seq(), 2);
}

// S2. Parametric instance.
#[tokio::test]
async fn parametric_instances_coexist_by_expanded_name() {
    let dir = tempdir().unwrap();
    let (control, _process) = recover_in(dir.path()).await;

    let key = ClassKey::system("task");
    let mut class = oj_core::JobClass::new(key.clone());
    class.instance = "$FOO".to_string();
    class.start_on = Operator::leaf(OperatorPattern::new("ev"));
    control.install_class(class).await;

    control.emit_event("ev".to_string(), env(&[("FOO", "alpha")])).await.unwrap();
    run_ticks(&control, 1).await;
    control.emit_event("ev".to_string(), env(&[("FOO", "beta")])).await.unwrap();
    run_ticks(&control, 1).await;

    assert!(control.get_instance_by_name(&key, "alpha").await.is_some());
    assert!(control.get_instance_by_name(&key, "beta").await.is_some());
}

// S3. AND operator: neither branch alone starts the instance.
#[tokio::test]
async fn and_operator_waits_for_both_branches_before_starting() {
    let dir = tempdir().unwrap();
    let (control, _process) = recover_in(dir.path()).await;

    let key = ClassKey::system("both");
    let mut class = oj_core::JobClass::new(key.clone());
    class.start_on = Operator::leaf(OperatorPattern::new("a")).and(Operator::leaf(OperatorPattern::new("b")));
    control.install_class(class).await;

    control.emit_event("a".to_string(), env(&[("A_VAR", "1")])).await.unwrap();
    run_ticks(&control, 1).await;
    assert!(control.get_instance_by_name(&key, "").await.is_none());

    control.emit_event("b".to_string(), env(&[("B_VAR", "2")])).await.unwrap();
    run_ticks(&control, 1).await;

    let job = control.get_instance_by_name(&key, "").await.expect("both branches satisfied");
    assert!(has_env(&job.env, "A_VAR", "1"));
    assert!(has_env(&job.env, "B_VAR", "2"));
    assert!(has_env(&job.env, "UPSTART_EVENTS", "a b"));
}
