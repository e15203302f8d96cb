// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Integrity engine: the public façade over the status registry, the
//! hierarchy manager and the blocking graph manager.
//!
//! Every mutation runs in one read-write transaction. Invariant checks happen
//! inside that transaction, and any failure rolls the whole mutation back. A
//! mutation that loses a commit race is re-run from scratch up to
//! [`EngineConfig::max_conflict_retries`] times.
//!
//! The engine keeps no state between calls; every check reads the store.

use chrono::Utc;
use serde::Serialize;

use crate::blocking;
use crate::check::{self, IntegrityReport};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::hierarchy;
use crate::model::{
    require_text, BlockingEdge, EdgeId, Issue, IssueId, IssuePatch, IssueStatus, NewIssue,
    StatusId,
};
use crate::status;
use crate::store::{Field, Kind, Store, Txn, TxnMode};

/// What [`Engine::delete_issue`] removed or changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletedIssue {
    pub issue: Issue,
    /// Blocking edges removed because they touched the issue.
    pub removed_edges: Vec<EdgeId>,
    /// Former direct children, now roots.
    pub orphaned: Vec<IssueId>,
}

pub struct Engine<S: Store> {
    store: S,
    config: EngineConfig,
}

impl<S: Store> Engine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Engine { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs `f` in a read-write transaction, retrying on conflict.
    fn mutate<R>(&self, op: &'static str, mut f: impl FnMut(&mut dyn Txn) -> Result<R>) -> Result<R> {
        let mut attempt: u32 = 0;
        loop {
            match self.try_mutate(&mut f) {
                Ok(value) => {
                    tracing::debug!(op, attempts = attempt + 1, "mutation committed");
                    return Ok(value);
                }
                Err(Error::Conflict) if attempt < self.config.max_conflict_retries => {
                    attempt += 1;
                    tracing::warn!(op, attempt, "transaction conflict, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn try_mutate<R>(&self, f: &mut impl FnMut(&mut dyn Txn) -> Result<R>) -> Result<R> {
        let mut txn = self.store.begin(TxnMode::ReadWrite)?;
        match f(txn.as_mut()) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback() {
                    tracing::warn!("rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Runs `f` against one read-only transaction, so every query inside
    /// it sees the same committed state.
    pub fn read<R>(&self, f: impl FnOnce(&dyn Txn) -> Result<R>) -> Result<R> {
        let txn = self.store.begin(TxnMode::ReadOnly)?;
        let value = f(txn.as_ref())?;
        txn.commit()?;
        Ok(value)
    }

    // Statuses

    pub fn create_status(&self, name: &str) -> Result<IssueStatus> {
        self.mutate("create_status", |txn| status::create(txn, name))
    }

    pub fn rename_status(&self, id: StatusId, new_name: &str) -> Result<IssueStatus> {
        self.mutate("rename_status", |txn| status::rename(txn, id, new_name))
    }

    pub fn rename_status_by_name(&self, current: &str, new_name: &str) -> Result<IssueStatus> {
        self.mutate("rename_status", |txn| {
            status::rename_by_name(txn, current, new_name)
        })
    }

    /// Deletes a status no issue references. Returns the deleted status.
    pub fn delete_status(&self, id: StatusId) -> Result<IssueStatus> {
        self.mutate("delete_status", |txn| status::delete(txn, id))
    }

    pub fn delete_status_by_name(&self, name: &str) -> Result<IssueStatus> {
        self.mutate("delete_status", |txn| status::delete_by_name(txn, name))
    }

    pub fn get_status(&self, id: StatusId) -> Result<IssueStatus> {
        self.read(|txn| status::get(txn, id))
    }

    pub fn status_by_name(&self, name: &str) -> Result<IssueStatus> {
        self.read(|txn| status::get_by_name(txn, name))
    }

    pub fn list_statuses(&self) -> Result<Vec<IssueStatus>> {
        self.read(status::list)
    }

    // Issues

    /// Creates an issue, optionally under `new.parent`.
    ///
    /// The row is inserted first and the parent is then attached with the
    /// same checks as [`Engine::reparent_issue`], all in one transaction.
    pub fn create_issue(&self, new: &NewIssue) -> Result<Issue> {
        require_text("title", &new.title)?;
        self.mutate("create_issue", |txn| {
            txn.status(new.status)?;
            let now = Utc::now();
            let id = IssueId(txn.insert(
                Kind::Issue,
                vec![
                    Field::Title(new.title.clone()),
                    Field::Description(new.description.clone()),
                    Field::Status(new.status),
                    Field::CreatedAt(now),
                    Field::UpdatedAt(now),
                ],
            )?);
            match new.parent {
                Some(parent) => hierarchy::set_parent(txn, id, Some(parent)),
                None => txn.issue(id),
            }
        })
    }

    /// Deletes an issue together with every blocking edge touching it and
    /// turns its direct children into roots.
    pub fn delete_issue(&self, id: IssueId) -> Result<DeletedIssue> {
        self.mutate("delete_issue", |txn| {
            let issue = txn.issue(id)?;
            let removed_edges = blocking::delete_issue_cascade(txn, id)?;
            let orphaned = hierarchy::delete_issue_cascade(txn, id)?;
            txn.delete(Kind::Issue, id.0)?;
            Ok(DeletedIssue {
                issue,
                removed_edges,
                orphaned,
            })
        })
    }

    /// Moves an issue to another status. Blocking state is not consulted.
    pub fn update_status(&self, id: IssueId, status: StatusId) -> Result<Issue> {
        self.mutate("update_status", |txn| {
            let issue = txn.issue(id)?;
            txn.status(status)?;
            let now = Utc::now();
            txn.update(
                Kind::Issue,
                id.0,
                vec![Field::Status(status), Field::UpdatedAt(now)],
            )?;
            Ok(Issue {
                status,
                updated_at: now,
                ..issue
            })
        })
    }

    pub fn edit_issue(&self, id: IssueId, patch: &IssuePatch) -> Result<Issue> {
        if patch.is_empty() {
            return Err(Error::InvalidInput(
                "nothing to update: give a title or a description".to_string(),
            ));
        }
        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        self.mutate("edit_issue", |txn| {
            txn.issue(id)?;
            let mut fields = Vec::new();
            if let Some(title) = &patch.title {
                fields.push(Field::Title(title.clone()));
            }
            if let Some(description) = &patch.description {
                fields.push(Field::Description(description.clone()));
            }
            fields.push(Field::UpdatedAt(Utc::now()));
            txn.update(Kind::Issue, id.0, fields)?;
            txn.issue(id)
        })
    }

    /// Sets or clears the parent of an issue.
    pub fn reparent_issue(&self, id: IssueId, parent: Option<IssueId>) -> Result<Issue> {
        self.mutate("reparent_issue", |txn| {
            hierarchy::set_parent(txn, id, parent)
        })
    }

    pub fn get_issue(&self, id: IssueId) -> Result<Issue> {
        self.read(|txn| txn.issue(id))
    }

    pub fn list_issues(&self) -> Result<Vec<Issue>> {
        self.read(|txn| txn.issues())
    }

    pub fn roots(&self) -> Result<Vec<Issue>> {
        self.read(hierarchy::roots)
    }

    pub fn children(&self, id: IssueId) -> Result<Vec<Issue>> {
        self.read(|txn| hierarchy::children(txn, id))
    }

    /// Ancestors of an issue, nearest first.
    pub fn ancestors(&self, id: IssueId) -> Result<Vec<Issue>> {
        self.read(|txn| hierarchy::ancestors(txn, id))
    }

    // Blocking

    /// Records that `blocker` blocks `blocked`.
    pub fn link_blocking(&self, blocker: IssueId, blocked: IssueId) -> Result<BlockingEdge> {
        self.mutate("link_blocking", |txn| {
            blocking::add_edge(txn, blocker, blocked)
        })
    }

    pub fn unlink_blocking(&self, edge: EdgeId) -> Result<BlockingEdge> {
        self.mutate("unlink_blocking", |txn| blocking::remove_edge(txn, edge))
    }

    pub fn get_edge(&self, id: EdgeId) -> Result<BlockingEdge> {
        self.read(|txn| txn.edge(id))
    }

    /// The raw edge set.
    pub fn blocking_edges(&self) -> Result<Vec<BlockingEdge>> {
        self.read(|txn| txn.edges())
    }

    pub fn edges_for(&self, id: IssueId) -> Result<Vec<BlockingEdge>> {
        self.read(|txn| blocking::edges_for(txn, id))
    }

    pub fn blockers(&self, id: IssueId) -> Result<Vec<Issue>> {
        self.read(|txn| blocking::blockers(txn, id))
    }

    pub fn blocked(&self, id: IssueId) -> Result<Vec<Issue>> {
        self.read(|txn| blocking::blocked(txn, id))
    }

    /// True if any blocker of `id` has a status `resolved` rejects.
    pub fn is_blocked(&self, id: IssueId, resolved: impl Fn(&IssueStatus) -> bool) -> Result<bool> {
        self.read(|txn| blocking::is_blocked(txn, id, &resolved))
    }

    /// Blockers of `id` whose status `resolved` rejects; empty when `id`
    /// is not blocked.
    pub fn unresolved_blockers(
        &self,
        id: IssueId,
        resolved: impl Fn(&IssueStatus) -> bool,
    ) -> Result<Vec<Issue>> {
        self.read(|txn| blocking::unresolved_blockers(txn, id, &resolved))
    }

    pub fn blocked_issues(&self, resolved: impl Fn(&IssueStatus) -> bool) -> Result<Vec<Issue>> {
        self.read(|txn| blocking::blocked_issues(txn, &resolved))
    }

    /// Scans committed state for invariant violations.
    pub fn verify(&self) -> Result<IntegrityReport> {
        self.read(check::verify)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
