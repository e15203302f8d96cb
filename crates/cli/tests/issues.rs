// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;

use yare::parameterized;

fn project_with_chain() -> Project {
    let p = Project::new();
    p.status("Open");
    let a = p.issue("A", "Open");
    let b = p.issue("B", "Open");
    let c = p.issue("C", "Open");
    p.run(&["issue", "reparent", &b, &a]);
    p.run(&["issue", "reparent", &c, &b]);
    p
}

#[test]
fn hierarchy_round_trip() {
    let p = project_with_chain();
    p.cmd()
        .args(["issue", "ancestors", "3"])
        .assert()
        .success()
        .stdout("- [Open] 2: B\n- [Open] 1: A\n");
    p.cmd()
        .args(["issue", "list", "--roots"])
        .assert()
        .success()
        .stdout("- [Open] 1: A\n");
}

#[parameterized(
    self_parent = { "1", "1", "cannot be its own parent" },
    direct_cycle = { "1", "2", "would create a parent cycle" },
    deep_cycle = { "1", "3", "would create a parent cycle" },
    missing_parent = { "1", "42", "issue not found: 42" },
)]
fn rejected_reparent_leaves_tree_unchanged(issue: &str, parent: &str, message: &str) {
    let p = project_with_chain();
    p.cmd()
        .args(["issue", "reparent", issue, parent])
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));
    p.cmd()
        .args(["issue", "list", "--roots"])
        .assert()
        .success()
        .stdout("- [Open] 1: A\n");
}

#[test]
fn delete_detaches_children() {
    let p = project_with_chain();
    p.cmd()
        .args(["issue", "delete", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("detached 1 child issue(s)"));
    p.cmd()
        .args(["issue", "list", "--roots"])
        .assert()
        .success()
        .stdout("- [Open] 1: A\n- [Open] 3: C\n");
}

#[test]
fn show_json_is_one_document() {
    let p = project_with_chain();
    let out = p.run(&["issue", "show", "2", "-o", "json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["title"], "B");
    assert_eq!(value["parent"], 1);
    assert_eq!(value["children"][0]["title"], "C");
}

#[test]
fn edit_and_set_status() {
    let p = Project::new();
    p.status("Open");
    p.status("Done");
    let id = p.issue("Draft", "Open");
    p.run(&["issue", "edit", &id, "--title", "Final", "-d", "ready"]);
    p.run(&["issue", "set-status", &id, "Done"]);
    p.cmd()
        .args(["issue", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: Final"))
        .stdout(predicate::str::contains("Status: Done"))
        .stdout(predicate::str::contains("    ready"));
}

#[test]
fn issue_requires_existing_status() {
    let p = Project::new();
    p.cmd()
        .args(["issue", "new", "A", "--status", "Open"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("status not found: Open"));
}
