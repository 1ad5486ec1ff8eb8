// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_core::{parse_env_all, Arena, Event, Operator};

fn fire(op: &mut Operator, name: &str, env: &[(&str, &str)]) -> bool {
    let raw = env
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>();
    let event = Event::new(name, parse_env_all(&raw).unwrap()).unwrap();
    let mut arena: Arena<Event> = Arena::new();
    let id = arena.insert(event);
    op.feed(id, arena.get(id).unwrap(), &[])
}

#[test]
fn single_event_name_parses_to_leaf() {
    let mut op = parse("started").unwrap();
    assert!(fire(&mut op, "started", &[]));
}

#[test]
fn and_requires_both_events() {
    let mut op = parse("network-up and net-device-up").unwrap();
    assert!(!fire(&mut op, "network-up", &[]));
    assert!(fire(&mut op, "net-device-up", &[]));
}

#[test]
fn or_fires_on_either_branch() {
    let mut op = parse("foo or bar").unwrap();
    assert!(fire(&mut op, "bar", &[]));
}

#[test]
fn env_match_constrains_the_leaf() {
    let mut op = parse("net-device-up IFACE=eth0").unwrap();
    assert!(!fire(&mut op, "net-device-up", &[("IFACE", "eth1")]));
    assert!(fire(&mut op, "net-device-up", &[("IFACE", "eth0")]));
}

#[test]
fn empty_expression_errors() {
    assert_eq!(parse("   "), Err(ExprError::Empty));
}

#[test]
fn bare_and_with_no_term_errors() {
    assert!(parse("started and").is_err());
}

#[test]
fn trailing_tokens_after_full_parse_error() {
    assert!(parse("started ) extra").is_err());
}
