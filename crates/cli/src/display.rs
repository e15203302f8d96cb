// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use std::collections::HashMap;

use trellis_core::{BlockingEdge, Fault, IntegrityReport, Issue, IssueStatus, StatusId};

/// Maximum line width for wrapped descriptions (excluding the indent).
const WRAP_WIDTH: usize = 96;

/// Status names keyed by id, for rendering issues.
pub struct StatusNames(HashMap<StatusId, String>);

impl StatusNames {
    pub fn new(statuses: &[IssueStatus]) -> Self {
        StatusNames(
            statuses
                .iter()
                .map(|s| (s.id, s.name.clone()))
                .collect(),
        )
    }

    /// The status name, or `#<id>` when the id is unknown.
    pub fn label(&self, id: StatusId) -> String {
        self.0
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("#{}", id))
    }
}

/// Everything `issue show` prints about one issue.
#[derive(Debug, Serialize)]
pub struct IssueDetails {
    #[serde(flatten)]
    pub issue: Issue,
    pub status_name: String,
    pub children: Vec<Issue>,
    pub blockers: Vec<Issue>,
    pub blocking: Vec<Issue>,
}

/// Wrap a single-line text at word boundaries. Multi-line text is kept
/// as the user wrote it.
pub fn wrap_text(content: &str, width: usize) -> String {
    if content.contains('\n') || content.len() <= width {
        return content.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in content.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

pub fn format_status_line(status: &IssueStatus) -> String {
    format!("- {}: {}", status.id, status.name)
}

pub fn format_issue_line(issue: &Issue, names: &StatusNames) -> String {
    format!(
        "- [{}] {}: {}",
        names.label(issue.status),
        issue.id,
        issue.title
    )
}

pub fn format_edge_line(edge: &BlockingEdge) -> String {
    format!(
        "- {}: {} blocks {}",
        edge.id, edge.blocker, edge.blocked
    )
}

fn push_section(output: &mut Vec<String>, heading: &str, issues: &[Issue], names: &StatusNames) {
    if issues.is_empty() {
        return;
    }
    output.push(String::new());
    output.push(format!("{}:", heading));
    for issue in issues {
        output.push(format!("  {}", format_issue_line(issue, names)));
    }
}

/// Format issue details for `issue show`.
pub fn format_issue_details(details: &IssueDetails, names: &StatusNames) -> String {
    let issue = &details.issue;
    let mut output = vec![
        format!("Issue {}", issue.id),
        format!("Title: {}", issue.title),
        format!("Status: {}", details.status_name),
    ];
    match issue.parent {
        Some(parent) => output.push(format!("Parent: {}", parent)),
        None => output.push("Parent: (root)".to_string()),
    }
    output.push(format!(
        "Created: {}",
        issue.created_at.format("%Y-%m-%d %H:%M")
    ));
    output.push(format!(
        "Updated: {}",
        issue.updated_at.format("%Y-%m-%d %H:%M")
    ));

    if !issue.description.is_empty() {
        output.push(String::new());
        output.push("Description:".to_string());
        for line in wrap_text(&issue.description, WRAP_WIDTH).lines() {
            output.push(format!("    {}", line));
        }
    }

    push_section(&mut output, "Children", &details.children, names);
    push_section(&mut output, "Blocked by", &details.blockers, names);
    push_section(&mut output, "Blocks", &details.blocking, names);

    output.join("\n")
}

pub fn format_fault(fault: &Fault) -> String {
    format!("- {}", fault)
}

/// Summary line plus one line per fault.
pub fn format_report(report: &IntegrityReport) -> String {
    let mut output = vec![format!(
        "checked {} status(es), {} issue(s), {} blocking edge(s)",
        report.statuses, report.issues, report.edges
    )];
    if report.is_clean() {
        output.push("no faults found".to_string());
    } else {
        output.push(format!("{} fault(s):", report.faults.len()));
        output.extend(report.faults.iter().map(format_fault));
    }
    output.join("\n")
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
