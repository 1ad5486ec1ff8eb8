// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_adapters::{FakeNotifyAdapter, FakeProcessAdapter};
use oj_core::{ClassKey, FakeClock, JobState};
use tempfile::tempdir;

fn bare_class(name: &str) -> JobClass {
    JobClass::new(ClassKey::system(name))
}

fn test_control(wal_path: &std::path::Path) -> EngineControl<FakeProcessAdapter, FakeNotifyAdapter, FakeClock> {
    let engine = Engine::new(FakeProcessAdapter::new(), FakeNotifyAdapter::new(), FakeClock::new());
    let wal = Wal::open(wal_path, 0).unwrap();
    EngineControl::new(engine, wal, FakeClock::new())
}

#[tokio::test]
async fn start_then_stop_drives_an_instance_through_the_lifecycle() {
    let dir = tempdir().unwrap();
    let control = test_control(&dir.path().join("wal.jsonl"));
    let key = ClassKey::system("svc");
    control.install_class(bare_class("svc")).await;

    let job_id = control.start(&key, Vec::new()).await.unwrap();
    control.engine.lock().await.run_once().await.unwrap();
    assert_eq!(control.get_instance(job_id).await.unwrap().state, JobState::Running);

    control.stop(job_id, Vec::new()).await.unwrap();
    control.engine.lock().await.run_once().await.unwrap();
    assert!(control.get_instance(job_id).await.is_none());
}

#[tokio::test]
async fn starting_the_same_instance_twice_errors() {
    let dir = tempdir().unwrap();
    let control = test_control(&dir.path().join("wal.jsonl"));
    let key = ClassKey::system("svc");
    control.install_class(bare_class("svc")).await;

    control.start(&key, Vec::new()).await.unwrap();
    let err = control.start(&key, Vec::new()).await;
    assert!(matches!(err, Err(ControlError::Engine(_))));
}

#[tokio::test]
async fn emit_event_journals_before_reaching_the_engine() {
    let dir = tempdir().unwrap();
    let control = test_control(&dir.path().join("wal.jsonl"));

    control.emit_event("custom".to_string(), Vec::new()).await.unwrap();

    let wal = control.wal();
    let mut wal = wal.lock();
    wal.flush().unwrap();
    let entry = wal.next_unprocessed().unwrap().unwrap();
    assert_eq!(entry.event.name, "custom");
}

#[tokio::test]
async fn get_all_instances_reflects_installed_and_started_jobs() {
    let dir = tempdir().unwrap();
    let control = test_control(&dir.path().join("wal.jsonl"));
    let key = ClassKey::system("svc");
    control.install_class(bare_class("svc")).await;
    control.start(&key, Vec::new()).await.unwrap();

    let instances = control.get_all_instances().await;
    assert_eq!(instances.len(), 1);
}

#[tokio::test]
async fn remove_class_clears_a_previously_installed_key() {
    let dir = tempdir().unwrap();
    let control = test_control(&dir.path().join("wal.jsonl"));
    let key = ClassKey::system("svc");
    control.install_class(bare_class("svc")).await;

    let removed = control.remove_class(&key).await;
    assert!(removed.is_some());
    assert!(control.remove_class(&key).await.is_none());
}
