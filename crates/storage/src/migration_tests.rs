// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

struct AddEnvField;

impl Migration for AddEnvField {
    fn source_version(&self) -> u32 {
        0
    }

    fn target_version(&self) -> u32 {
        1
    }

    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError> {
        if let Some(obj) = snapshot.as_object_mut() {
            obj.entry("state").or_insert_with(|| json!({}));
        }
        Ok(())
    }
}

#[test]
fn same_version_is_a_no_op() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"version": 1, "seq": 5});
    let migrated = registry.migrate_to(snapshot.clone(), 1).unwrap();
    assert_eq!(migrated, snapshot);
}

#[test]
fn newer_than_target_is_rejected() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"version": 5, "seq": 5});
    let err = registry.migrate_to(snapshot, 1).unwrap_err();
    assert!(matches!(err, MigrationError::TooNew(5, 1)));
}

#[test]
fn missing_version_field_defaults_to_zero() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"seq": 5});
    // No migrations registered, so going to version 0 is a no-op, but
    // asking for version 1 has no path from the implicit 0.
    let err = registry.migrate_to(snapshot, 1).unwrap_err();
    assert!(matches!(err, MigrationError::NoPath(0, 1)));
}

#[test]
fn unregistered_path_errors() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"version": 0});
    let err = registry.migrate_to(snapshot, 3).unwrap_err();
    assert!(matches!(err, MigrationError::NoPath(0, 3)));
}

#[test]
fn chained_migration_stamps_version_field_consistently() {
    let registry = MigrationRegistry {
        migrations: vec![Box::new(AddEnvField)],
    };
    let snapshot = json!({"version": 0, "seq": 1});
    let migrated = registry.migrate_to(snapshot, 1).unwrap();
    assert_eq!(migrated["version"], json!(1));
    assert_eq!(migrated["state"], json!({}));
}
