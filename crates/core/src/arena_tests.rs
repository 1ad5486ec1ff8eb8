// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn insert_and_get_round_trips() {
    let mut arena: Arena<&'static str> = Arena::new();
    let h = arena.insert("hello");
    assert_eq!(arena.get(h), Some(&"hello"));
}

#[test]
fn removed_handle_is_stale_after_reuse() {
    let mut arena: Arena<u32> = Arena::new();
    let h1 = arena.insert(1);
    arena.remove(h1);
    let h2 = arena.insert(2);

    // Same slot index, different generation.
    assert_eq!(h1.index(), h2.index());
    assert_eq!(arena.get(h1), None);
    assert_eq!(arena.get(h2), Some(&2));
}

#[test]
fn len_excludes_freed_slots() {
    let mut arena: Arena<u32> = Arena::new();
    let a = arena.insert(1);
    let _b = arena.insert(2);
    assert_eq!(arena.len(), 2);
    arena.remove(a);
    assert_eq!(arena.len(), 1);
}

#[test]
fn iter_only_yields_live_entries() {
    let mut arena: Arena<u32> = Arena::new();
    let a = arena.insert(1);
    let _b = arena.insert(2);
    arena.remove(a);
    let values: Vec<_> = arena.iter().map(|(_, v)| *v).collect();
    assert_eq!(values, vec![2]);
}
