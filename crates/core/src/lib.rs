// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-core: data model and pure logic for the `oj` process supervisor.
//!
//! Everything here is deterministic and side-effect free: job and event
//! state, the operator trees that match events to job goals, and the id/
//! error/env plumbing shared by every other crate in the workspace. Process
//! spawning, persistence, and the control surface live in `oj-adapters`,
//! `oj-storage`, and `oj-daemon` respectively.

pub mod arena;
pub mod blocked;
pub mod class;
pub mod clock;
pub mod env;
pub mod error;
pub mod event;
pub mod exit;
pub mod id;
pub mod job;
pub mod operator;
pub mod session;
pub mod time_fmt;

pub use arena::{Arena, Handle};
pub use blocked::{Blocked, ReplyId, ReplyKind};
pub use class::{
    ConsoleMode, Expect, JobClass, ProcessDef, ProcessKind, ResourceKind, ResourceLimits,
    RespawnPolicy,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use env::{merge as merge_env, parse_all as parse_env_all, EnvVar, InvalidEnvVar};
pub use error::CoreError;
pub use event::{Event, EventError, EventId, Progress};
pub use exit::{ExitClassification, TraceEvent};
pub use id::{IdGen, ShortId, UuidIdGen};
pub use job::{Goal, Job, JobId, JobState, RespawnWindow, TraceState};
pub use operator::{Operator, OperatorPattern};
pub use session::{ClassKey, Session};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
