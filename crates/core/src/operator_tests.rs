// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::arena::Arena;
use crate::event::Event;

fn ev(name: &str, pairs: &[(&str, &str)]) -> Event {
    let env = pairs
        .iter()
        .map(|(k, v)| EnvVar::new(*k, *v).unwrap())
        .collect();
    Event::new(name, env).unwrap()
}

/// Mint a throwaway `EventId` for tests that only care about satisfaction,
/// not the identity of the absorbed event.
fn id() -> EventId {
    let mut arena: Arena<Event> = Arena::new();
    arena.insert(ev("placeholder", &[]))
}

#[test]
fn never_is_never_satisfied() {
    let mut op = Operator::never();
    assert!(op.feed(id(), &ev("anything", &[]), &[]) == false);
    assert!(!op.is_satisfied());
}

#[test]
fn single_match_fires_on_name() {
    let mut op = Operator::leaf(OperatorPattern::new("started"));
    assert!(op.feed(id(), &ev("started", &[]), &[]));
    assert!(op.is_satisfied());
}

#[test]
fn match_with_env_constraint_requires_value() {
    let mut op = Operator::leaf(OperatorPattern::new("started").with_match("JOB", "db"));
    assert!(!op.feed(id(), &ev("started", &[("JOB", "web")]), &[]));
    assert!(!op.is_satisfied());
    assert!(op.feed(id(), &ev("started", &[("JOB", "db")]), &[]));
}

#[test]
fn and_requires_both_sides() {
    let mut op =
        Operator::leaf(OperatorPattern::new("a")).and(Operator::leaf(OperatorPattern::new("b")));
    assert!(!op.feed(id(), &ev("a", &[]), &[]));
    assert!(!op.is_satisfied());
    assert!(op.feed(id(), &ev("b", &[]), &[]));
    assert!(op.is_satisfied());
}

#[test]
fn or_fires_on_first_branch() {
    let mut op =
        Operator::leaf(OperatorPattern::new("a")).or(Operator::leaf(OperatorPattern::new("b")));
    assert!(op.feed(id(), &ev("a", &[]), &[]));
    assert!(op.is_satisfied());
}

#[test]
fn reset_clears_all_leaves() {
    let mut op =
        Operator::leaf(OperatorPattern::new("a")).and(Operator::leaf(OperatorPattern::new("b")));
    op.feed(id(), &ev("a", &[]), &[]);
    op.reset();
    assert!(!op.is_satisfied());
}

#[test]
fn dollar_var_resolves_against_job_env() {
    let job_env = vec![EnvVar::new("JOB", "db").unwrap()];
    let mut op = Operator::leaf(OperatorPattern::new("stopping").with_match("JOB", "$JOB"));
    assert!(op.feed(id(), &ev("stopping", &[("JOB", "db")]), &job_env));
}

#[test]
fn event_names_collects_all_leaves() {
    let op =
        Operator::leaf(OperatorPattern::new("a")).and(Operator::leaf(OperatorPattern::new("b")));
    let mut names = std::collections::BTreeMap::new();
    op.event_names(&mut names);
    assert!(names.contains_key("a"));
    assert!(names.contains_key("b"));
}

#[test]
fn absorbed_events_records_matching_ids_in_walk_order() {
    let mut arena: Arena<Event> = Arena::new();
    let a_id = arena.insert(ev("a", &[]));
    let b_id = arena.insert(ev("b", &[]));

    let mut op =
        Operator::leaf(OperatorPattern::new("a")).and(Operator::leaf(OperatorPattern::new("b")));
    op.feed(a_id, arena.get(a_id).unwrap(), &[]);
    op.feed(b_id, arena.get(b_id).unwrap(), &[]);

    let mut absorbed = Vec::new();
    op.absorbed_events(&mut absorbed);
    assert_eq!(absorbed, vec![a_id, b_id]);
}

#[test]
fn reset_clears_absorbed_events_too() {
    let mut op = Operator::leaf(OperatorPattern::new("a"));
    op.feed(id(), &ev("a", &[]), &[]);
    op.reset();
    let mut absorbed = Vec::new();
    op.absorbed_events(&mut absorbed);
    assert!(absorbed.is_empty());
}
