// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A second `recover()` call against the same state directory must put the
//! instance back where a process that never crashed would have left it:
//! the class reloads from `classes_dir`, and the journaled `start on` event
//! replays from the WAL, without ever taking a snapshot in between.

use crate::prelude::{run_ticks, test_config};
use oj_adapters::{FakeNotifyAdapter, FakeProcessAdapter};
use oj_core::{ClassKey, FakeClock, JobState};
use oj_daemon::control::Control;
use tempfile::tempdir;

#[tokio::test]
async fn a_second_recover_replays_the_wal_and_restarts_the_instance() {
    let dir = tempdir().unwrap();
    let classes_dir = dir.path().join("classes");
    std::fs::create_dir_all(&classes_dir).unwrap();
    std::fs::write(
        classes_dir.join("srv.toml"),
        "[jobs.srv]\nstart_on = \"boot\"\nmain = \"/bin/sleep 999\"\n",
    )
    .unwrap();

    let mut config = test_config(dir.path());
    config.classes_dir = Some(classes_dir);
    let key = ClassKey::system("srv");

    {
        let control =
            oj_daemon::recover(FakeProcessAdapter::new(), FakeNotifyAdapter::new(), FakeClock::new(), &config)
                .await
                .unwrap();
        control.emit_event("boot".to_string(), Vec::new()).await.unwrap();
        run_ticks(&control, 1).await;
        assert_eq!(control.get_instance_by_name(&key, "").await.unwrap().state, JobState::Running);
        control.wal().lock().flush().unwrap();
        // The process "crashes" here: `control` is dropped with no snapshot
        // ever taken, so recovery has only the WAL and `classes_dir` to work
        // with.
    }

    let control =
        oj_daemon::recover(FakeProcessAdapter::new(), FakeNotifyAdapter::new(), FakeClock::new(), &config)
            .await
            .unwrap();
    run_ticks(&control, 1).await;

    let job = control.get_instance_by_name(&key, "").await.expect("WAL replay re-fired the start-on event");
    assert_eq!(job.state, JobState::Running);
}
