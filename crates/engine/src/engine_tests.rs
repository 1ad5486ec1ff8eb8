// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_adapters::{FakeNotifyAdapter, FakeProcessAdapter, NotifyCall};
use oj_core::{ClassKey, FakeClock, JobState};

fn test_engine() -> Engine<FakeProcessAdapter, FakeNotifyAdapter, FakeClock> {
    Engine::new(FakeProcessAdapter::new(), FakeNotifyAdapter::new(), FakeClock::new())
}

/// A class with no process slots at all: every state transition in the
/// table is driven purely by built-in lifecycle events, so a test can
/// exercise the full `start`/`stop` cycle without touching the process
/// adapter.
fn bare_class(name: &str) -> JobClass {
    JobClass::new(ClassKey::system(name))
}

#[tokio::test]
async fn start_reaches_running_after_one_run_once() {
    let mut engine = test_engine();
    let key = ClassKey::system("svc");
    engine.install_class(bare_class("svc")).await;

    let job_id = engine.start(&key, Vec::new(), 0).await.unwrap();
    assert_eq!(engine.get_instance(job_id).unwrap().state, JobState::Starting);

    engine.run_once().await.unwrap();
    assert_eq!(engine.get_instance(job_id).unwrap().state, JobState::Running);
}

#[tokio::test]
async fn starting_an_already_started_instance_errors() {
    let mut engine = test_engine();
    let key = ClassKey::system("svc");
    engine.install_class(bare_class("svc")).await;

    engine.start(&key, Vec::new(), 0).await.unwrap();
    let err = engine.start(&key, Vec::new(), 0).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn stop_settles_and_removes_the_instance() {
    let mut engine = test_engine();
    let key = ClassKey::system("svc");
    engine.install_class(bare_class("svc")).await;

    let job_id = engine.start(&key, Vec::new(), 0).await.unwrap();
    engine.run_once().await.unwrap();
    assert_eq!(engine.get_instance(job_id).unwrap().state, JobState::Running);

    engine.stop(job_id, Vec::new(), 0).await.unwrap();
    engine.run_once().await.unwrap();

    assert!(engine.get_instance(job_id).is_none());
    assert!(engine.get_instance_by_name(&key, "").is_none());
}

#[tokio::test]
async fn restart_re_starts_once_the_old_instance_settles() {
    let mut engine = test_engine();
    let key = ClassKey::system("svc");
    engine.install_class(bare_class("svc")).await;

    let original = engine.start(&key, Vec::new(), 0).await.unwrap();
    engine.run_once().await.unwrap();
    assert_eq!(engine.get_instance(original).unwrap().state, JobState::Running);

    engine.restart(original, Vec::new(), 0).await.unwrap();
    // First pass: the old instance's stop cycle settles and is removed,
    // and `settle_pending_restarts` fires a fresh `start` whose own
    // "starting" blocker is still outstanding.
    engine.run_once().await.unwrap();
    assert!(engine.get_instance(original).is_none());

    // Second pass: the new instance's "starting" blocker resolves.
    engine.run_once().await.unwrap();
    let restarted = engine.get_instance_by_name(&key, "").expect("restarted instance");
    assert_eq!(restarted.state, JobState::Running);
}

#[tokio::test]
async fn install_and_remove_class_notify_watchers() {
    let notify = FakeNotifyAdapter::new();
    let mut engine = Engine::new(FakeProcessAdapter::new(), notify.clone(), FakeClock::new());
    let key = ClassKey::system("svc");

    engine.install_class(bare_class("svc")).await;
    engine.remove_class(&key).await;

    let calls = notify.calls();
    assert!(calls.contains(&NotifyCall::JobAdded(key.clone())));
    assert!(calls.contains(&NotifyCall::JobRemoved(key)));
}

#[tokio::test]
async fn emit_event_is_visible_on_next_poll() {
    let mut engine = test_engine();
    // No class reacts to "custom-event"; this just exercises that
    // `emit_event` feeds the dispatcher and `run_once` drains it without
    // error.
    engine.emit_event("custom-event", Vec::new()).unwrap();
    engine.run_once().await.unwrap();
}
