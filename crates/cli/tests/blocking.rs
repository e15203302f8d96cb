// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;

fn project_with_issues(n: usize) -> Project {
    let p = Project::new();
    p.status("Open");
    p.status("Done");
    for i in 0..n {
        p.issue(&format!("Issue {}", i + 1), "Open");
    }
    p
}

#[test]
fn add_and_list_edges() {
    let p = project_with_issues(3);
    p.cmd()
        .args(["block", "add", "1", "2"])
        .assert()
        .success()
        .stdout("1 blocks 2 (edge 1)\n");
    p.run(&["block", "add", "2", "3"]);
    p.cmd()
        .args(["block", "list", "2"])
        .assert()
        .success()
        .stdout("- 1: 1 blocks 2\n- 2: 2 blocks 3\n");
}

#[test]
fn closing_the_loop_fails() {
    let p = project_with_issues(3);
    p.run(&["block", "add", "1", "2"]);
    p.run(&["block", "add", "2", "3"]);
    p.cmd()
        .args(["block", "add", "3", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("would create a blocks cycle: 3 -> 1"));
    p.cmd()
        .args(["block", "list"])
        .assert()
        .success()
        .stdout("- 1: 1 blocks 2\n- 2: 2 blocks 3\n");
}

#[test]
fn self_and_duplicate_edges_fail() {
    let p = project_with_issues(2);
    p.cmd()
        .args(["block", "add", "1", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot block itself"));
    p.run(&["block", "add", "1", "2"]);
    p.cmd()
        .args(["block", "add", "1", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn resolving_the_blocker_unblocks() {
    let p = project_with_issues(2);
    p.run(&["block", "add", "1", "2"]);
    p.cmd()
        .args(["block", "check", "2"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Issue 2 is blocked by:"));
    p.cmd()
        .args(["issue", "list", "--blocked"])
        .assert()
        .success()
        .stdout("- [Open] 2: Issue 2\n");

    p.run(&["issue", "set-status", "1", "Done"]);
    p.cmd()
        .args(["block", "check", "2"])
        .assert()
        .success()
        .stdout("Issue 2 is not blocked\n");
}

#[test]
fn deleting_an_issue_removes_its_edges() {
    let p = project_with_issues(3);
    p.run(&["block", "add", "1", "2"]);
    p.run(&["block", "add", "2", "3"]);
    p.run(&["issue", "delete", "2"]);
    p.cmd()
        .args(["block", "list"])
        .assert()
        .success()
        .stdout("");
    p.cmd().args(["verify"]).assert().success();
}

#[test]
fn remove_missing_edge_fails() {
    let p = project_with_issues(1);
    p.cmd()
        .args(["block", "remove", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found: 5"));
}
