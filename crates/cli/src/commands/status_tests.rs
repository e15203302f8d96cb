// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use crate::commands::testing::Harness;
use crate::error::Error;

#[test]
fn new_list_and_show() {
    let h = Harness::new();
    assert_eq!(h.run(&["status", "new", "Open"]).unwrap(), "Created status 1: Open\n");
    h.run(&["status", "new", "Done"]).unwrap();

    assert_eq!(h.run(&["status", "list"]).unwrap(), "- 1: Open\n- 2: Done\n");
    assert_eq!(h.run(&["status", "show", "Done"]).unwrap(), "Status 2: Done\n");
    assert_eq!(h.run(&["status", "show", "1"]).unwrap(), "Status 1: Open\n");
}

#[test]
fn rename_by_id_and_by_name() {
    let h = Harness::new();
    h.status("Open");
    assert_eq!(
        h.run(&["status", "rename", "1", "Todo"]).unwrap(),
        "Renamed status 1: Todo\n"
    );
    assert_eq!(
        h.run(&["status", "rename", "Todo", "Backlog"]).unwrap(),
        "Renamed status 1: Backlog\n"
    );
}

#[test]
fn duplicate_name_is_rejected() {
    let h = Harness::new();
    h.status("Open");
    let err = h.run(&["status", "new", "Open"]).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(trellis_core::Error::DuplicateName(_))
    ));
}

#[test]
fn delete_in_use_status_fails() {
    let h = Harness::new();
    let open = h.status("Open");
    h.issue("A", &open, None);
    let err = h.run(&["status", "delete", "Open"]).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(trellis_core::Error::StatusInUse { issues: 1, .. })
    ));
    assert_eq!(h.engine.list_statuses().unwrap().len(), 1);
}

#[test]
fn delete_unused_status() {
    let h = Harness::new();
    h.status("Open");
    h.status("Stale");
    assert_eq!(
        h.run(&["status", "delete", "2"]).unwrap(),
        "Deleted status 2: Stale\n"
    );
    assert_eq!(h.engine.list_statuses().unwrap().len(), 1);
}

#[test]
fn json_output() {
    let h = Harness::new();
    let out = h.run(&["-o", "json", "status", "new", "Open"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["id"], 1);
    assert_eq!(value["name"], "Open");

    let out = h.run(&["status", "list", "--output", "json"]).unwrap();
    let list: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    assert_eq!(list.len(), 1);
}

#[test]
fn unknown_status_is_not_found() {
    let h = Harness::new();
    let err = h.run(&["status", "show", "Nope"]).unwrap_err();
    assert!(err.to_string().contains("not found: Nope"), "{err}");
}
