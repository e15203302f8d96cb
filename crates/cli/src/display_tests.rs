// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::{TimeZone, Utc};
use trellis_core::{EdgeId, IssueId};

fn status(id: i64, name: &str) -> IssueStatus {
    IssueStatus {
        id: StatusId(id),
        name: name.to_string(),
    }
}

fn issue(id: i64, title: &str, status: i64, parent: Option<i64>) -> Issue {
    Issue {
        id: IssueId(id),
        title: title.to_string(),
        description: String::new(),
        status: StatusId(status),
        parent: parent.map(IssueId),
        created_at: Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 11, 9, 30, 0).unwrap(),
    }
}

fn names() -> StatusNames {
    StatusNames::new(&[status(1, "Open"), status(2, "Done")])
}

#[test]
fn status_and_edge_lines() {
    assert_eq!(format_status_line(&status(3, "In review")), "- 3: In review");
    let edge = BlockingEdge {
        id: EdgeId(7),
        blocker: IssueId(1),
        blocked: IssueId(2),
        created_at: Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(),
    };
    assert_eq!(format_edge_line(&edge), "- 7: 1 blocks 2");
}

#[test]
fn issue_line_uses_status_name() {
    let line = format_issue_line(&issue(4, "Fix login", 2, None), &names());
    assert_eq!(line, "- [Done] 4: Fix login");
}

#[test]
fn unknown_status_is_shown_by_id() {
    let line = format_issue_line(&issue(4, "Fix login", 9, None), &names());
    assert_eq!(line, "- [#9] 4: Fix login");
}

#[test]
fn details_for_root_without_relations() {
    let details = IssueDetails {
        issue: issue(1, "Epic", 1, None),
        status_name: "Open".into(),
        children: vec![],
        blockers: vec![],
        blocking: vec![],
    };
    let out = format_issue_details(&details, &names());
    assert_eq!(
        out,
        "Issue 1\nTitle: Epic\nStatus: Open\nParent: (root)\n\
         Created: 2024-01-10 12:00\nUpdated: 2024-01-11 09:30"
    );
}

#[test]
fn details_list_relations_and_description() {
    let mut subject = issue(2, "Task", 1, Some(1));
    subject.description = "Needs a migration".into();
    let details = IssueDetails {
        issue: subject,
        status_name: "Open".into(),
        children: vec![issue(5, "Subtask", 1, Some(2))],
        blockers: vec![issue(3, "Schema", 2, None)],
        blocking: vec![],
    };
    let out = format_issue_details(&details, &names());
    assert!(out.contains("Parent: 1"));
    assert!(out.contains("Description:\n    Needs a migration"));
    assert!(out.contains("Children:\n  - [Open] 5: Subtask"));
    assert!(out.contains("Blocked by:\n  - [Done] 3: Schema"));
    assert!(!out.contains("Blocks:"));
}

#[test]
fn details_serialize_flat() {
    let details = IssueDetails {
        issue: issue(1, "Epic", 1, None),
        status_name: "Open".into(),
        children: vec![],
        blockers: vec![],
        blocking: vec![],
    };
    let json: serde_json::Value = serde_json::to_value(&details).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["status_name"], "Open");
    assert!(json.get("parent").is_none());
}

#[test]
fn wrap_text_breaks_long_single_lines() {
    let text = "alpha beta gamma delta";
    assert_eq!(wrap_text(text, 11), "alpha beta\ngamma delta");
    assert_eq!(wrap_text(text, 80), text);
    assert_eq!(wrap_text("keep\nmy lines", 2), "keep\nmy lines");
}

#[test]
fn report_formatting() {
    let clean = IntegrityReport {
        statuses: 2,
        issues: 3,
        edges: 1,
        faults: vec![],
    };
    assert_eq!(
        format_report(&clean),
        "checked 2 status(es), 3 issue(s), 1 blocking edge(s)\nno faults found"
    );

    let faulty = IntegrityReport {
        faults: vec![Fault::SelfParent { issue: IssueId(4) }],
        ..clean
    };
    let out = format_report(&faulty);
    assert!(out.contains("1 fault(s):\n- "));
}
