// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Uniform "waiter is suspended on subject" edges: a job waiting for an
//! event, an event waiting for jobs it caused, or a pending control-plane
//! reply waiting for a job transition.

use crate::event::EventId;
use crate::job::JobId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifies a still-unanswered control-plane call.
    pub struct ReplyId;
}

/// Which control-plane call a [`Blocked::IpcReply`] is waiting to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyKind {
    Start,
    Stop,
    Restart,
}

/// A waiter suspended on some other entity completing.
///
/// Placed in the subject's `blocking` list; removed when the subject
/// completes (an event reaching `Finished`, or a job reaching a stable
/// state). This is a flat enum over handles rather than `Rc`/`Weak` pointers,
/// avoiding reference cycles between events and the jobs they unblock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Blocked {
    /// A job is waiting on this subject (e.g. `STARTING` waits on its
    /// `starting` event).
    Job(JobId),
    /// An event is waiting on this subject (e.g. a class's starting pass
    /// blocks the triggering event until the new instance stabilises).
    Event(EventId),
    /// A control-plane reply is waiting on this subject (e.g. `Start(wait:
    /// true)` waits for the instance to reach `RUNNING`/`WAITING`).
    IpcReply(ReplyId, ReplyKind),
}

#[cfg(test)]
#[path = "blocked_tests.rs"]
mod tests;
