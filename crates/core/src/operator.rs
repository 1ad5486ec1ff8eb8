// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Boolean event-matching trees used for `start on`/`stop on` expressions.

use crate::env::EnvVar;
use crate::event::{Event, EventId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single `name KEY=VALUE ...` match clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorPattern {
    pub name: String,
    /// `KEY=VALUE` constraints the event's env must satisfy; `KEY=$VAR`
    /// entries are resolved against the job's own environment at evaluation
    /// time rather than compared literally.
    pub env_match: Vec<(String, String)>,
}

impl OperatorPattern {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            env_match: Vec::new(),
        }
    }

    pub fn with_match(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_match.push((key.into(), value.into()));
        self
    }

    fn matches(&self, event: &Event, job_env: &[EnvVar]) -> bool {
        if self.name != event.name {
            return false;
        }
        self.env_match.iter().all(|(key, expected)| {
            let resolved = resolve(expected, job_env);
            event.find_env(key) == Some(resolved.as_ref())
        })
    }
}

fn resolve<'a>(expected: &'a str, job_env: &[EnvVar]) -> std::borrow::Cow<'a, str> {
    if let Some(var) = expected.strip_prefix('$') {
        match job_env.iter().find(|e| e.key() == var) {
            Some(e) => std::borrow::Cow::Owned(e.value().to_string()),
            None => std::borrow::Cow::Borrowed(""),
        }
    } else {
        std::borrow::Cow::Borrowed(expected)
    }
}

/// A boolean tree of event matches.
///
/// Each leaf tracks whether it has been satisfied this "pass"; `And` nodes
/// require every child satisfied, `Or` nodes short-circuit on the first.
/// `reset()` clears all leaves back to unsatisfied, used once a tree fires
/// or when the owning job stops (§4.2's "operator state resets on
/// consumption").
/// A leaf's satisfaction state: whether it has matched this pass and, if so,
/// which event it absorbed (held blocked until the tree is consumed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchState {
    pub satisfied: bool,
    pub absorbed: Option<EventId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Operator {
    /// Never satisfied; used for classes with no `start on` (manual-only).
    #[default]
    Never,
    Match(OperatorPattern, MatchState),
    And(Box<Operator>, Box<Operator>),
    Or(Box<Operator>, Box<Operator>),
}

impl Operator {
    pub fn never() -> Self {
        Operator::Never
    }

    pub fn leaf(pattern: OperatorPattern) -> Self {
        Operator::Match(pattern, MatchState::default())
    }

    pub fn and(self, other: Operator) -> Self {
        Operator::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Operator) -> Self {
        Operator::Or(Box::new(self), Box::new(other))
    }

    /// Offer `event` (identified by `event_id`, the event store's handle for
    /// it) to every leaf that names it, marking matches satisfied and
    /// recording which event each leaf absorbed. Returns true if this caused
    /// the tree's satisfaction state to flip to fully-satisfied on this
    /// call.
    pub fn feed(&mut self, event_id: EventId, event: &Event, job_env: &[EnvVar]) -> bool {
        let was_satisfied = self.is_satisfied();
        self.feed_inner(event_id, event, job_env);
        !was_satisfied && self.is_satisfied()
    }

    fn feed_inner(&mut self, event_id: EventId, event: &Event, job_env: &[EnvVar]) {
        match self {
            Operator::Never => {}
            Operator::Match(pattern, state) => {
                if !state.satisfied && pattern.matches(event, job_env) {
                    state.satisfied = true;
                    state.absorbed = Some(event_id);
                }
            }
            Operator::And(a, b) | Operator::Or(a, b) => {
                a.feed_inner(event_id, event, job_env);
                b.feed_inner(event_id, event, job_env);
            }
        }
    }

    pub fn is_satisfied(&self) -> bool {
        match self {
            Operator::Never => false,
            Operator::Match(_, state) => state.satisfied,
            Operator::And(a, b) => a.is_satisfied() && b.is_satisfied(),
            Operator::Or(a, b) => a.is_satisfied() || b.is_satisfied(),
        }
    }

    /// Clear every leaf's satisfaction flag and absorbed event, in the same
    /// left-to-right walk order `feed`/`absorbed_events` use. Callers must
    /// `unblock()` each id returned by [`Operator::absorbed_events`] before
    /// (or as part of) calling this.
    pub fn reset(&mut self) {
        match self {
            Operator::Never => {}
            Operator::Match(_, state) => *state = MatchState::default(),
            Operator::And(a, b) | Operator::Or(a, b) => {
                a.reset();
                b.reset();
            }
        }
    }

    /// Ordered list of events absorbed by satisfied leaves, in the same
    /// left-to-right walk order as `feed`/`reset` — the order §4.2's
    /// `UPSTART_EVENTS` aggregation and event-unblocking rely on.
    pub fn absorbed_events(&self, out: &mut Vec<EventId>) {
        match self {
            Operator::Never => {}
            Operator::Match(_, state) => {
                if let Some(id) = state.absorbed {
                    out.push(id);
                }
            }
            Operator::And(a, b) | Operator::Or(a, b) => {
                a.absorbed_events(out);
                b.absorbed_events(out);
            }
        }
    }

    /// Collect the distinct event names referenced anywhere in the tree, for
    /// the dispatcher's interest index.
    pub fn event_names(&self, out: &mut BTreeMap<String, ()>) {
        match self {
            Operator::Never => {}
            Operator::Match(pattern, _) => {
                out.insert(pattern.name.clone(), ());
            }
            Operator::And(a, b) | Operator::Or(a, b) => {
                a.event_names(out);
                b.event_names(out);
            }
        }
    }
}

#[cfg(test)]
#[path = "operator_tests.rs"]
mod tests;
