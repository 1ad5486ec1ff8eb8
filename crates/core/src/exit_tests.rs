// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn is_terminal_distinguishes_exit_kinds() {
    assert!(ExitClassification::Exited(0).is_terminal());
    assert!(ExitClassification::Killed(9).is_terminal());
    assert!(ExitClassification::Dumped(11).is_terminal());
    assert!(!ExitClassification::Stopped(19).is_terminal());
    assert!(!ExitClassification::Trapped(TraceEvent::TraceMeStop).is_terminal());
}

#[test]
fn exited_with_matches_only_given_code() {
    let e = ExitClassification::Exited(100);
    assert!(e.exited_with(100));
    assert!(!e.exited_with(99));
}

#[test]
fn killed_by_matches_only_given_signal() {
    let e = ExitClassification::Killed(15);
    assert!(e.killed_by(15));
    assert!(!e.killed_by(9));
}
