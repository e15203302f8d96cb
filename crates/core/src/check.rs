// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-store integrity verification.
//!
//! Mutations through the engine cannot produce any of these faults. The
//! check exists for stores written by other tools or damaged on disk; it
//! reports and never repairs.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::error::Result;
use crate::model::{EdgeId, IssueId, StatusId};
use crate::store::Txn;

/// One invariant violation found in committed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "fault", rename_all = "snake_case")]
pub enum Fault {
    DuplicateStatusName {
        name: String,
        statuses: Vec<StatusId>,
    },
    MissingStatus {
        issue: IssueId,
        status: StatusId,
    },
    MissingParent {
        issue: IssueId,
        parent: IssueId,
    },
    SelfParent {
        issue: IssueId,
    },
    ParentCycle {
        issues: Vec<IssueId>,
    },
    MissingEndpoint {
        edge: EdgeId,
        issue: IssueId,
    },
    SelfBlock {
        edge: EdgeId,
        issue: IssueId,
    },
    DuplicateEdge {
        blocker: IssueId,
        blocked: IssueId,
        edges: Vec<EdgeId>,
    },
    BlockingCycle {
        issues: Vec<IssueId>,
    },
}

fn join_path(issues: &[IssueId]) -> String {
    let mut parts: Vec<String> = issues.iter().map(IssueId::to_string).collect();
    if let Some(first) = issues.first() {
        parts.push(first.to_string());
    }
    parts.join(" -> ")
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::DuplicateStatusName { name, statuses } => {
                write!(f, "status name '{name}' is shared by {} statuses", statuses.len())
            }
            Fault::MissingStatus { issue, status } => {
                write!(f, "issue {issue} references missing status {status}")
            }
            Fault::MissingParent { issue, parent } => {
                write!(f, "issue {issue} references missing parent {parent}")
            }
            Fault::SelfParent { issue } => write!(f, "issue {issue} is its own parent"),
            Fault::ParentCycle { issues } => write!(f, "parent cycle: {}", join_path(issues)),
            Fault::MissingEndpoint { edge, issue } => {
                write!(f, "edge {edge} references missing issue {issue}")
            }
            Fault::SelfBlock { edge, issue } => write!(f, "edge {edge} has issue {issue} block itself"),
            Fault::DuplicateEdge {
                blocker,
                blocked,
                edges,
            } => write!(
                f,
                "{} edges record that {blocker} blocks {blocked}",
                edges.len()
            ),
            Fault::BlockingCycle { issues } => write!(f, "blocking cycle: {}", join_path(issues)),
        }
    }
}

/// Result of [`verify`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub statuses: usize,
    pub issues: usize,
    pub edges: usize,
    pub faults: Vec<Fault>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Scans every status, issue and edge visible to `txn`.
pub fn verify(txn: &dyn Txn) -> Result<IntegrityReport> {
    let statuses = txn.statuses()?;
    let issues = txn.issues()?;
    let edges = txn.edges()?;
    let mut faults = Vec::new();

    let mut by_name: BTreeMap<&str, Vec<StatusId>> = BTreeMap::new();
    for status in &statuses {
        by_name.entry(status.name.as_str()).or_default().push(status.id);
    }
    for (name, ids) in by_name {
        if ids.len() > 1 {
            faults.push(Fault::DuplicateStatusName {
                name: name.to_string(),
                statuses: ids,
            });
        }
    }

    let status_ids: HashSet<StatusId> = statuses.iter().map(|s| s.id).collect();
    let parents: BTreeMap<IssueId, Option<IssueId>> =
        issues.iter().map(|i| (i.id, i.parent)).collect();

    for issue in &issues {
        if !status_ids.contains(&issue.status) {
            faults.push(Fault::MissingStatus {
                issue: issue.id,
                status: issue.status,
            });
        }
        match issue.parent {
            Some(parent) if parent == issue.id => faults.push(Fault::SelfParent { issue: issue.id }),
            Some(parent) if !parents.contains_key(&parent) => faults.push(Fault::MissingParent {
                issue: issue.id,
                parent,
            }),
            _ => {}
        }
    }
    faults.extend(
        parent_cycles(&parents)
            .into_iter()
            .map(|issues| Fault::ParentCycle { issues }),
    );

    let mut pairs: BTreeMap<(IssueId, IssueId), Vec<EdgeId>> = BTreeMap::new();
    let mut graph: BTreeMap<IssueId, Vec<IssueId>> = BTreeMap::new();
    for edge in &edges {
        for endpoint in [edge.blocker, edge.blocked] {
            if !parents.contains_key(&endpoint) {
                faults.push(Fault::MissingEndpoint {
                    edge: edge.id,
                    issue: endpoint,
                });
            }
        }
        if edge.blocker == edge.blocked {
            faults.push(Fault::SelfBlock {
                edge: edge.id,
                issue: edge.blocker,
            });
            continue;
        }
        let ids = pairs.entry((edge.blocker, edge.blocked)).or_default();
        ids.push(edge.id);
        if ids.len() == 1 {
            graph.entry(edge.blocker).or_default().push(edge.blocked);
        }
    }
    for ((blocker, blocked), ids) in pairs {
        if ids.len() > 1 {
            faults.push(Fault::DuplicateEdge {
                blocker,
                blocked,
                edges: ids,
            });
        }
    }
    faults.extend(
        blocking_cycles(&graph)
            .into_iter()
            .map(|issues| Fault::BlockingCycle { issues }),
    );

    if !faults.is_empty() {
        tracing::warn!(faults = faults.len(), "integrity check found faults");
    }
    Ok(IntegrityReport {
        statuses: statuses.len(),
        issues: issues.len(),
        edges: edges.len(),
        faults,
    })
}

/// Cycles in the parent relation, each listed once starting from its
/// lowest-id entry point. Self-parents are reported separately.
fn parent_cycles(parents: &BTreeMap<IssueId, Option<IssueId>>) -> Vec<Vec<IssueId>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        OnPath,
        Done,
    }

    let mut marks: HashMap<IssueId, Mark> = HashMap::new();
    let mut cycles = Vec::new();

    for &start in parents.keys() {
        let mut path = Vec::new();
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            match marks.get(&id) {
                Some(Mark::Done) => break,
                Some(Mark::OnPath) => {
                    if let Some(pos) = path.iter().position(|p| *p == id) {
                        cycles.push(path[pos..].to_vec());
                    }
                    break;
                }
                None => {}
            }
            marks.insert(id, Mark::OnPath);
            path.push(id);
            cursor = parents
                .get(&id)
                .copied()
                .flatten()
                .filter(|parent| *parent != id && parents.contains_key(parent));
        }
        for id in path {
            marks.insert(id, Mark::Done);
        }
    }
    cycles
}

/// Directed cycles in the blocking graph, found with an iterative DFS.
fn blocking_cycles(graph: &BTreeMap<IssueId, Vec<IssueId>>) -> Vec<Vec<IssueId>> {
    let mut cycles = Vec::new();
    let mut visited: HashSet<IssueId> = HashSet::new();
    let mut on_stack: HashSet<IssueId> = HashSet::new();
    let mut path: Vec<IssueId> = Vec::new();
    // (node, index of the next neighbor to visit)
    let mut stack: Vec<(IssueId, usize)> = Vec::new();

    for &node in graph.keys() {
        if !visited.insert(node) {
            continue;
        }
        on_stack.insert(node);
        path.push(node);
        stack.push((node, 0));

        while let Some((current, idx)) = stack.last_mut() {
            let current = *current;
            let neighbors = graph.get(&current).map(Vec::as_slice).unwrap_or(&[]);
            if *idx < neighbors.len() {
                let next = neighbors[*idx];
                *idx += 1;
                if on_stack.contains(&next) {
                    if let Some(pos) = path.iter().position(|p| *p == next) {
                        cycles.push(path[pos..].to_vec());
                    }
                } else if visited.insert(next) {
                    on_stack.insert(next);
                    path.push(next);
                    stack.push((next, 0));
                }
                continue;
            }
            on_stack.remove(&current);
            path.pop();
            stack.pop();
        }
    }
    cycles
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
