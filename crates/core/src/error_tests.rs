// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn invalid_env_var_converts_to_invalid_args() {
    let bad = InvalidEnvVar("nope".to_string());
    let err: CoreError = bad.into();
    assert!(matches!(err, CoreError::InvalidArgs(_)));
}

#[test]
fn messages_are_human_readable() {
    assert_eq!(CoreError::AlreadyStarted.to_string(), "already started");
    assert_eq!(CoreError::AlreadyStopped.to_string(), "already stopped");
}
