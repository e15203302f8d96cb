// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use trellis_core::{IssueId, Relation};
use yare::parameterized;

use crate::commands::testing::Harness;
use crate::error::Error;

#[test]
fn new_issue_with_parent_and_description() {
    let h = Harness::new();
    h.status("Open");
    assert_eq!(
        h.run(&["issue", "new", "Epic", "-s", "Open"]).unwrap(),
        "Created issue 1: Epic\n"
    );
    h.run(&["issue", "new", "Task", "--status", "1", "--parent", "1", "-d", "details"])
        .unwrap();

    let task = h.engine.get_issue(IssueId(2)).unwrap();
    assert_eq!(task.parent, Some(IssueId(1)));
    assert_eq!(task.description, "details");
}

#[test]
fn new_issue_with_missing_parent_fails() {
    let h = Harness::new();
    h.status("Open");
    let err = h
        .run(&["issue", "new", "Orphan", "-s", "Open", "--parent", "9"])
        .unwrap_err();
    assert!(err.to_string().contains("issue not found: 9"), "{err}");
    assert!(h.engine.list_issues().unwrap().is_empty());
}

#[test]
fn show_lists_relations() {
    let h = Harness::new();
    let open = h.status("Open");
    let epic = h.issue("Epic", &open, None);
    let task = h.issue("Task", &open, Some(epic.id));
    let schema = h.issue("Schema", &open, None);
    h.engine.link_blocking(schema.id, task.id).unwrap();

    let out = h.run(&["issue", "show", "2"]).unwrap();
    assert!(out.starts_with("Issue 2\nTitle: Task\nStatus: Open\nParent: 1\n"));
    assert!(out.contains("Blocked by:\n  - [Open] 3: Schema"));

    let out = h.run(&["-o", "json", "issue", "show", "1"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["children"][0]["id"], 2);
    assert_eq!(value["status_name"], "Open");
}

#[test]
fn list_filters() {
    let h = Harness::new();
    let open = h.status("Open");
    let done = h.status("Done");
    let a = h.issue("A", &open, None);
    let b = h.issue("B", &done, Some(a.id));
    let c = h.issue("C", &open, None);
    h.engine.link_blocking(b.id, c.id).unwrap();
    h.engine.link_blocking(a.id, b.id).unwrap();

    assert_eq!(
        h.run(&["issue", "list"]).unwrap(),
        "- [Open] 1: A\n- [Done] 2: B\n- [Open] 3: C\n"
    );
    assert_eq!(
        h.run(&["issue", "list", "--roots"]).unwrap(),
        "- [Open] 1: A\n- [Open] 3: C\n"
    );
    assert_eq!(
        h.run(&["issue", "list", "--status", "Done"]).unwrap(),
        "- [Done] 2: B\n"
    );
    // B is done, so only B itself (blocked by open A) counts as blocked.
    assert_eq!(
        h.run(&["issue", "list", "--blocked"]).unwrap(),
        "- [Done] 2: B\n"
    );
    // With nothing resolved, C is blocked by B as well.
    assert_eq!(
        h.run(&["issue", "list", "--blocked", "--resolved", "Nothing"])
            .unwrap(),
        "- [Done] 2: B\n- [Open] 3: C\n"
    );
}

#[test]
fn edit_requires_a_field() {
    let h = Harness::new();
    let open = h.status("Open");
    h.issue("A", &open, None);
    assert_eq!(
        h.run(&["issue", "edit", "1", "--title", "Renamed"]).unwrap(),
        "Updated issue 1\n"
    );
    assert_eq!(h.engine.get_issue(IssueId(1)).unwrap().title, "Renamed");
}

#[test]
fn set_status_by_name() {
    let h = Harness::new();
    let open = h.status("Open");
    h.status("Done");
    h.issue("A", &open, None);
    assert_eq!(
        h.run(&["issue", "set-status", "1", "Done"]).unwrap(),
        "Issue 1 is now Done\n"
    );
}

#[test]
fn reparent_and_back_to_root() {
    let h = Harness::new();
    let open = h.status("Open");
    h.issue("A", &open, None);
    h.issue("B", &open, None);
    assert_eq!(
        h.run(&["issue", "reparent", "2", "1"]).unwrap(),
        "Issue 2 is now a child of 1\n"
    );
    assert_eq!(
        h.run(&["issue", "ancestors", "2"]).unwrap(),
        "- [Open] 1: A\n"
    );
    assert_eq!(
        h.run(&["issue", "children", "1"]).unwrap(),
        "- [Open] 2: B\n"
    );
    assert_eq!(
        h.run(&["issue", "reparent", "2", "--root"]).unwrap(),
        "Issue 2 is now a root\n"
    );
}

#[parameterized(
    direct = { &["issue", "reparent", "1", "2"] },
    deep = { &["issue", "reparent", "1", "3"] },
)]
fn reparent_cycle_is_rejected(args: &[&str]) {
    let h = Harness::new();
    let open = h.status("Open");
    let a = h.issue("A", &open, None);
    let b = h.issue("B", &open, Some(a.id));
    h.issue("C", &open, Some(b.id));

    let err = h.run(args).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(trellis_core::Error::CycleDetected {
            relation: Relation::Parent,
            ..
        })
    ));
    assert!(h.engine.get_issue(a.id).unwrap().is_root());
}

#[test]
fn delete_reports_cascade() {
    let h = Harness::new();
    let open = h.status("Open");
    let a = h.issue("A", &open, None);
    let b = h.issue("B", &open, Some(a.id));
    let c = h.issue("C", &open, None);
    h.engine.link_blocking(a.id, c.id).unwrap();

    assert_eq!(
        h.run(&["issue", "delete", "1"]).unwrap(),
        "Deleted issue 1: A (removed 1 blocking edge(s), detached 1 child issue(s))\n"
    );
    assert!(h.engine.get_issue(b.id).unwrap().is_root());
    assert!(h.engine.blocking_edges().unwrap().is_empty());
}

#[test]
fn show_reads_one_snapshot() {
    let h = Harness::new();
    let open = h.status("Open");
    let epic = h.issue("Epic", &open, None);
    let task = h.issue("Task", &open, Some(epic.id));
    h.engine.link_blocking(epic.id, task.id).unwrap();

    let (out, transactions) = h.run_counted(&["issue", "show", "1"]).unwrap();
    assert!(out.contains("Children:\n  - [Open] 2: Task"));
    assert!(out.contains("Blocks:\n  - [Open] 2: Task"));
    assert_eq!(transactions, 1);

    assert!(h.run_counted(&["issue", "show", "9"]).is_err());
}
