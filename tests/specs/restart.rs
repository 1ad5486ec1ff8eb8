// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! S6 (§8.4): `Restart` through the `Control` surface runs the stop path
//! with the old env, then re-starts with the new one, with no gap an
//! outside observer can catch the instance sitting in `WAITING`.

use crate::prelude::*;
use oj_core::{ClassKey, JobState};
use tempfile::tempdir;

#[tokio::test]
async fn restart_re_starts_with_the_new_env_instead_of_the_old_one() {
    let dir = tempdir().unwrap();
    let (control, _process) = recover_in(dir.path()).await;

    let key = ClassKey::system("svc");
    control.install_class(oj_core::JobClass::new(key.clone())).await;

    let original = control.start(&key, env(&[("GEN", "old")])).await.unwrap();
    run_ticks(&control, 1).await;
    assert_eq!(control.get_instance(original).await.unwrap().state, JobState::Running);

    control.restart(original, env(&[("GEN", "new")])).await.unwrap();
    run_ticks(&control, 2).await;

    let restarted = control.get_instance_by_name(&key, "").await.expect("restart re-started the instance");
    assert_eq!(restarted.state, JobState::Running);
    assert!(has_env(&restarted.env, "GEN", "new"));
}
