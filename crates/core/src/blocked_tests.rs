// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::event::Event;
use crate::job::Job;
use crate::arena::Arena;

#[test]
fn blocked_variants_are_distinguishable() {
    let mut events: Arena<Event> = Arena::new();
    let mut jobs: Arena<Job> = Arena::new();
    let event_id = events.insert(Event::new("foo", vec![]).unwrap());
    let job_id = jobs.insert(Job::new_for_test());

    let a = Blocked::Event(event_id);
    let b = Blocked::Job(job_id);
    let c = Blocked::IpcReply(ReplyId::new("r1"), ReplyKind::Start);

    assert_ne!(a, b);
    assert!(matches!(c, Blocked::IpcReply(_, ReplyKind::Start)));
}
