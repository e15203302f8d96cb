// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hierarchy manager: the parent/child forest over issues.
//!
//! Every walk up the parent chain is bounded by the number of issues in the
//! store, so corrupted data yields [`Error::ConsistencyFault`] instead of a
//! loop. Deleting an issue orphans its direct children (set-null, one level).

use chrono::Utc;
use std::ops::ControlFlow;

use crate::error::{Error, Relation, Result};
use crate::model::{Issue, IssueId};
use crate::store::{Field, Kind, Txn};

/// Visits `start` and then each ancestor, nearest first, until `visit` breaks
/// or a root is reached. `referrer` is the issue whose parent is `start`.
fn walk_up(
    txn: &dyn Txn,
    start: IssueId,
    referrer: Option<IssueId>,
    mut visit: impl FnMut(Issue) -> ControlFlow<()>,
) -> Result<()> {
    let limit = txn.count(Kind::Issue)?;
    let mut next = Some(start);
    let mut child = referrer;
    let mut steps = 0usize;

    while let Some(id) = next {
        if steps >= limit {
            tracing::error!(issue = %start, limit, "parent chain exceeds issue count");
            return Err(Error::ConsistencyFault(format!(
                "parent chain from issue {start} exceeds {limit} steps"
            )));
        }
        let issue = match (txn.issue(id), child) {
            (Ok(issue), _) => issue,
            (Err(Error::NotFound { .. }), Some(child)) => {
                tracing::error!(issue = %child, parent = %id, "dangling parent reference");
                return Err(Error::ConsistencyFault(format!(
                    "issue {child} references missing parent {id}"
                )));
            }
            (Err(e), _) => return Err(e),
        };
        steps += 1;
        child = Some(issue.id);
        next = issue.parent;
        if visit(issue).is_break() {
            break;
        }
    }
    Ok(())
}

/// Sets or clears the parent of `issue`.
///
/// Fails with `SelfReference` when `parent == issue` and with `CycleDetected`
/// when `issue` already appears in the ancestor chain of `parent`.
pub fn set_parent(txn: &mut dyn Txn, issue: IssueId, parent: Option<IssueId>) -> Result<Issue> {
    let current = txn.issue(issue)?;
    if let Some(parent) = parent {
        if parent == issue {
            return Err(Error::SelfReference(issue));
        }
        txn.issue(parent)?;

        let mut closes_cycle = false;
        walk_up(txn, parent, None, |ancestor| {
            if ancestor.id == issue {
                closes_cycle = true;
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        if closes_cycle {
            return Err(Error::CycleDetected {
                relation: Relation::Parent,
                from: issue,
                to: parent,
            });
        }
    }

    let now = Utc::now();
    txn.update(
        Kind::Issue,
        issue.0,
        vec![Field::Parent(parent), Field::UpdatedAt(now)],
    )?;
    Ok(Issue {
        parent,
        updated_at: now,
        ..current
    })
}

/// Clears the parent of every direct child of `issue`. Returns the orphans.
pub fn delete_issue_cascade(txn: &mut dyn Txn, issue: IssueId) -> Result<Vec<IssueId>> {
    let children = txn.children_of(issue)?;
    let now = Utc::now();
    let mut orphaned = Vec::with_capacity(children.len());
    for child in children {
        txn.update(
            Kind::Issue,
            child.id.0,
            vec![Field::Parent(None), Field::UpdatedAt(now)],
        )?;
        orphaned.push(child.id);
    }
    Ok(orphaned)
}

pub fn children(txn: &dyn Txn, issue: IssueId) -> Result<Vec<Issue>> {
    txn.issue(issue)?;
    txn.children_of(issue)
}

/// Ancestors of `issue`, nearest first. Empty for a root.
pub fn ancestors(txn: &dyn Txn, issue: IssueId) -> Result<Vec<Issue>> {
    let Some(parent) = txn.issue(issue)?.parent else {
        return Ok(Vec::new());
    };
    let mut chain = Vec::new();
    walk_up(txn, parent, Some(issue), |ancestor| {
        chain.push(ancestor);
        ControlFlow::Continue(())
    })?;
    Ok(chain)
}

/// Issues without a parent.
pub fn roots(txn: &dyn Txn) -> Result<Vec<Issue>> {
    txn.issues_where(&Field::Parent(None))
}

#[cfg(test)]
#[path = "hierarchy_tests.rs"]
mod tests;
