// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_adapters::{FakeNotifyAdapter, FakeProcessAdapter};
use oj_core::{FakeClock, JobClass};
use oj_daemon::EngineControl;
use oj_engine::Engine;
use oj_storage::Wal;
use tempfile::tempdir;

fn test_control(dir: &std::path::Path) -> EngineControl<FakeProcessAdapter, FakeNotifyAdapter, FakeClock> {
    let engine = Engine::new(FakeProcessAdapter::new(), FakeNotifyAdapter::new(), FakeClock::new());
    let wal = Wal::open(&dir.join("events.wal"), 0).unwrap();
    EngineControl::new(engine, wal, FakeClock::new())
}

#[tokio::test]
async fn resolve_instance_finds_a_started_singleton() {
    let dir = tempdir().unwrap();
    let control = test_control(dir.path());
    let key = ClassKey::system("web");
    control.install_class(JobClass::new(key.clone())).await;
    control.start(&key, Vec::new()).await.unwrap();

    let job_id = resolve_instance(&control, &key, "").await.unwrap();
    let job = control.get_instance(job_id).await.unwrap();
    assert_eq!(job.class_key, key);
}

#[tokio::test]
async fn resolve_instance_rejects_an_unknown_name() {
    let dir = tempdir().unwrap();
    let control = test_control(dir.path());
    let key = ClassKey::system("web");
    control.install_class(JobClass::new(key.clone())).await;
    control.start(&key, Vec::new()).await.unwrap();

    let result = resolve_instance(&control, &key, "nonexistent").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn resolve_instance_rejects_an_unknown_class() {
    let dir = tempdir().unwrap();
    let control = test_control(dir.path());
    let key = ClassKey::system("ghost");

    let result = resolve_instance(&control, &key, "").await;
    assert!(result.is_err());
}
