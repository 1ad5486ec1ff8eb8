// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_core::{Job, JobState, Operator, OperatorPattern};

fn class_starting_on(name: &str, event: &str) -> JobClass {
    let mut class = JobClass::new(ClassKey::system(name));
    class.start_on = Operator::leaf(OperatorPattern::new(event));
    class
}

#[test]
fn matching_event_creates_an_instance_and_sets_its_goal() {
    let mut d = Dispatcher::new();
    d.classes.install(class_starting_on("svc", "net-up"), false);
    d.emit("net-up", Vec::new()).unwrap();

    d.poll(0).unwrap();

    // `poll()` decides and hands off a `starting` `EmitAndBlock` effect for
    // the caller to apply; on its own it only gets the instance as far as
    // `STARTING` before it needs that blocker resolved from outside.
    let (_, job) = d.instances.iter().next().expect("instance created");
    assert_eq!(job.state, JobState::Starting);
    assert_eq!(job.goal, Goal::Start);
}

#[test]
fn unmatched_event_creates_no_instance() {
    let mut d = Dispatcher::new();
    d.classes.install(class_starting_on("svc", "net-up"), false);
    d.emit("unrelated", Vec::new()).unwrap();

    d.poll(0).unwrap();

    assert!(d.instances.is_empty());
}

#[test]
fn second_matching_event_reuses_the_singleton_instance() {
    let mut d = Dispatcher::new();
    d.classes.install(class_starting_on("svc", "net-up"), false);
    d.emit("net-up", Vec::new()).unwrap();
    d.poll(0).unwrap();
    let first_count = d.instances.len();

    d.emit("net-up", Vec::new()).unwrap();
    d.poll(0).unwrap();

    assert_eq!(d.instances.len(), first_count);
}

#[test]
fn stop_on_event_sets_the_instance_goal_to_stop() {
    // `poll()` only decides; it never applies the `EmitAndBlock` effects
    // that would carry a stopping instance the rest of the way to
    // `WAITING` (that's `Engine::apply_effect`'s job). A job is seeded
    // directly at `RUNNING` here since an organic starting pass alone
    // can't reach it without those effects being applied.
    let mut d = Dispatcher::new();
    let mut class = class_starting_on("svc", "net-up");
    class.stop_on = Operator::leaf(OperatorPattern::new("net-down"));
    d.classes.install(class.clone(), false);

    let mut job = Job::new(&class, "");
    job.goal = Goal::Start;
    job.state = JobState::Running;
    d.instances.insert(job);

    d.emit("net-down", Vec::new()).unwrap();
    d.poll(0).unwrap();

    let (_, job) = d.instances.iter().next().expect("instance still present");
    assert_eq!(job.goal, Goal::Stop);
    assert_eq!(job.state, JobState::Stopping);
}

#[test]
fn instance_name_expansion_failure_is_reported_as_a_diagnostic() {
    let mut d = Dispatcher::new();
    let mut class = class_starting_on("svc", "net-up");
    class.instance = "$UNDEFINED".to_string();
    d.classes.install(class, false);

    d.emit("net-up", Vec::new()).unwrap();
    let effects = d.poll(0).unwrap();

    assert!(effects.iter().any(|e| matches!(e, Effect::Diagnostic { .. })));
    assert!(d.instances.is_empty());
}

#[test]
fn one_event_can_start_more_than_one_class_in_a_single_poll() {
    let mut d = Dispatcher::new();
    d.classes.install(class_starting_on("web", "net-up"), false);
    d.classes.install(class_starting_on("worker", "net-up"), false);

    d.emit("net-up", Vec::new()).unwrap();
    d.poll(0).unwrap();

    assert_eq!(d.instances.len(), 2);
}
