// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::env::EnvVar;

#[test]
fn new_rejects_empty_name() {
    assert_eq!(Event::new("", vec![]), Err(EventError::EmptyName));
}

#[test]
fn new_event_starts_pending_with_no_blockers() {
    let event = Event::new("started", vec![]).unwrap();
    assert_eq!(event.progress, Progress::Pending);
    assert_eq!(event.blockers, 0);
    assert!(!event.failed);
}

#[test]
fn derived_failure_appends_suffix_and_carries_env() {
    let env = vec![EnvVar::new("JOB", "db").unwrap()];
    let event = Event::new("started", env).unwrap();
    let failure = event.derived_failure();
    assert_eq!(failure.name, "started/failed");
    assert_eq!(failure.env, event.env);
    assert!(failure.is_derived_failure());
}

#[test]
fn is_derived_failure_detects_suffix() {
    let event = Event::new("started/failed", vec![]).unwrap();
    assert!(event.is_derived_failure());
    let plain = Event::new("started", vec![]).unwrap();
    assert!(!plain.is_derived_failure());
}

#[test]
fn find_env_looks_up_by_key() {
    let env = vec![EnvVar::new("JOB", "db").unwrap()];
    let event = Event::new("started", env).unwrap();
    assert_eq!(event.find_env("JOB"), Some("db"));
    assert_eq!(event.find_env("MISSING"), None);
}

#[test]
#[should_panic]
fn derived_failure_panics_on_chained_failure_event() {
    let event = Event::new("started/failed", vec![]).unwrap();
    let _ = event.derived_failure();
}
