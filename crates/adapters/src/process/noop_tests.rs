// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_core::ProcessKind;
use std::collections::BTreeMap;

fn spec() -> SpawnSpec {
    SpawnSpec {
        kind: ProcessKind::Main,
        command: "true".to_string(),
        is_script: false,
        env: Vec::new(),
        working_directory: None,
        umask: 0o022,
        nice: None,
        trace: false,
        limits: BTreeMap::new(),
    }
}

#[tokio::test]
async fn spawn_always_errors() {
    let adapter = NoOpProcessAdapter::new();
    assert!(adapter.spawn(spec()).await.is_err());
}

#[tokio::test]
async fn reap_is_always_empty() {
    let adapter = NoOpProcessAdapter::new();
    assert!(adapter.reap().await.is_empty());
}

#[tokio::test]
async fn is_alive_is_always_false() {
    let adapter = NoOpProcessAdapter::new();
    assert!(!adapter.is_alive(1).await);
}
