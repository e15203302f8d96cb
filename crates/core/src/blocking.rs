// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking graph manager: directed "blocker blocks blocked" edges.
//!
//! The edge set stays acyclic. Before an edge is inserted, a breadth-first
//! search from `blocked` looks for `blocker`; finding it means the new edge
//! would close a cycle. Deleting an issue deletes every edge touching it.

use chrono::Utc;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::error::{Error, Relation, Result};
use crate::model::{BlockingEdge, EdgeId, Issue, IssueId, IssueStatus, StatusId};
use crate::store::{Field, Kind, Txn};

/// Decides whether a status counts as resolved for blocking purposes.
pub type ResolvedFn<'a> = &'a dyn Fn(&IssueStatus) -> bool;

/// True if `target` can be reached from `start` along blocking edges.
fn reachable(txn: &dyn Txn, start: IssueId, target: IssueId) -> Result<bool> {
    let limit = txn.count(Kind::Issue)?;
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if current == target {
            return Ok(true);
        }
        if visited.len() > limit {
            tracing::error!(from = %start, limit, "blocking traversal exceeds issue count");
            return Err(Error::ConsistencyFault(format!(
                "blocking traversal from issue {start} visited more than {limit} issues"
            )));
        }
        for edge in txn.edges_from(current)? {
            if visited.insert(edge.blocked) {
                queue.push_back(edge.blocked);
            }
        }
    }
    Ok(false)
}

/// Records that `blocker` blocks `blocked`.
pub fn add_edge(txn: &mut dyn Txn, blocker: IssueId, blocked: IssueId) -> Result<BlockingEdge> {
    txn.issue(blocker)?;
    txn.issue(blocked)?;
    if blocker == blocked {
        return Err(Error::SelfBlock(blocker));
    }
    if txn.edges_from(blocker)?.iter().any(|e| e.blocked == blocked) {
        return Err(Error::DuplicateEdge { blocker, blocked });
    }
    if reachable(txn, blocked, blocker)? {
        return Err(Error::CycleDetected {
            relation: Relation::Blocks,
            from: blocker,
            to: blocked,
        });
    }

    let created_at = Utc::now();
    let id = EdgeId(txn.insert(
        Kind::BlockingEdge,
        vec![
            Field::Blocker(blocker),
            Field::Blocked(blocked),
            Field::CreatedAt(created_at),
        ],
    )?);
    Ok(BlockingEdge {
        id,
        blocker,
        blocked,
        created_at,
    })
}

/// Removes one edge and returns it.
pub fn remove_edge(txn: &mut dyn Txn, id: EdgeId) -> Result<BlockingEdge> {
    let edge = txn.edge(id)?;
    txn.delete(Kind::BlockingEdge, id.0)?;
    Ok(edge)
}

/// Deletes every edge where `issue` is blocker or blocked.
pub fn delete_issue_cascade(txn: &mut dyn Txn, issue: IssueId) -> Result<Vec<EdgeId>> {
    let ids: BTreeSet<EdgeId> = txn
        .edges_from(issue)?
        .into_iter()
        .chain(txn.edges_into(issue)?)
        .map(|e| e.id)
        .collect();
    for id in &ids {
        txn.delete(Kind::BlockingEdge, id.0)?;
    }
    Ok(ids.into_iter().collect())
}

/// True if any issue blocking `issue` has a status that is not resolved.
pub fn is_blocked(txn: &dyn Txn, issue: IssueId, resolved: ResolvedFn<'_>) -> Result<bool> {
    txn.issue(issue)?;
    for edge in txn.edges_into(issue)? {
        let blocker = txn.issue(edge.blocker)?;
        if !resolved(&txn.status(blocker.status)?) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Issues that block `issue`.
pub fn blockers(txn: &dyn Txn, issue: IssueId) -> Result<Vec<Issue>> {
    txn.issue(issue)?;
    txn.edges_into(issue)?
        .into_iter()
        .map(|e| txn.issue(e.blocker))
        .collect()
}

/// Blockers of `issue` whose status `resolved` rejects.
pub fn unresolved_blockers(
    txn: &dyn Txn,
    issue: IssueId,
    resolved: ResolvedFn<'_>,
) -> Result<Vec<Issue>> {
    let mut open = Vec::new();
    for blocker in blockers(txn, issue)? {
        if !resolved(&txn.status(blocker.status)?) {
            open.push(blocker);
        }
    }
    Ok(open)
}

/// Issues that `issue` blocks.
pub fn blocked(txn: &dyn Txn, issue: IssueId) -> Result<Vec<Issue>> {
    txn.issue(issue)?;
    txn.edges_from(issue)?
        .into_iter()
        .map(|e| txn.issue(e.blocked))
        .collect()
}

/// Edges touching `issue` in either direction, by id.
pub fn edges_for(txn: &dyn Txn, issue: IssueId) -> Result<Vec<BlockingEdge>> {
    txn.issue(issue)?;
    let mut edges = txn.edges_from(issue)?;
    edges.extend(txn.edges_into(issue)?);
    edges.sort_by_key(|e| e.id);
    edges.dedup_by_key(|e| e.id);
    Ok(edges)
}

/// Every issue with at least one unresolved blocker.
pub fn blocked_issues(txn: &dyn Txn, resolved: ResolvedFn<'_>) -> Result<Vec<Issue>> {
    let statuses: HashMap<StatusId, IssueStatus> =
        txn.statuses()?.into_iter().map(|s| (s.id, s)).collect();
    let issues = txn.issues()?;
    let unresolved: HashSet<IssueId> = issues
        .iter()
        .filter(|i| statuses.get(&i.status).map_or(true, |s| !resolved(s)))
        .map(|i| i.id)
        .collect();
    let blocked: HashSet<IssueId> = txn
        .edges()?
        .into_iter()
        .filter(|e| unresolved.contains(&e.blocker))
        .map(|e| e.blocked)
        .collect();
    Ok(issues
        .into_iter()
        .filter(|i| blocked.contains(&i.id))
        .collect())
}

#[cfg(test)]
#[path = "blocking_tests.rs"]
mod tests;
