// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory entity store.
//!
//! Each transaction works on a private copy of the committed tables. Commit
//! publishes the copy only if no other transaction has committed writes since
//! it began; otherwise it fails with [`Error::Conflict`] and nothing changes.
//! Transactions that wrote nothing always commit.
//!
//! Name and edge-pair uniqueness are enforced like the SQLite schema does;
//! referential constraints are not.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{validate_fields, validate_query, Field, Kind, Record, Store, Txn, TxnMode};
use crate::error::{Error, Result};
use crate::model::{BlockingEdge, EdgeId, Issue, IssueId, IssueStatus, StatusId};

#[derive(Debug, Clone, Default)]
struct Table {
    rows: BTreeMap<i64, Record>,
    /// Ids are never reused, even after deletes.
    last_id: i64,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    statuses: Table,
    issues: Table,
    edges: Table,
}

impl Tables {
    fn table(&self, kind: Kind) -> &Table {
        match kind {
            Kind::Status => &self.statuses,
            Kind::Issue => &self.issues,
            Kind::BlockingEdge => &self.edges,
        }
    }

    fn table_mut(&mut self, kind: Kind) -> &mut Table {
        match kind {
            Kind::Status => &mut self.statuses,
            Kind::Issue => &mut self.issues,
            Kind::BlockingEdge => &mut self.edges,
        }
    }

    /// Rejects a row that would duplicate a unique key held by another row.
    fn check_unique(&self, candidate: &Record) -> Result<()> {
        let table = self.table(candidate.kind());
        let others = table.rows.values().filter(|r| r.id() != candidate.id());
        match candidate {
            Record::Status(status) => {
                let taken = others
                    .filter_map(|r| match r {
                        Record::Status(s) => Some(s),
                        _ => None,
                    })
                    .any(|s| s.name == status.name);
                if taken {
                    return Err(Error::DuplicateName(status.name.clone()));
                }
            }
            Record::BlockingEdge(edge) => {
                let taken = others
                    .filter_map(|r| match r {
                        Record::BlockingEdge(e) => Some(e),
                        _ => None,
                    })
                    .any(|e| e.blocker == edge.blocker && e.blocked == edge.blocked);
                if taken {
                    return Err(Error::DuplicateEdge {
                        blocker: edge.blocker,
                        blocked: edge.blocked,
                    });
                }
            }
            Record::Issue(_) => {}
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Committed {
    /// Bumped by every commit that wrote something.
    version: u64,
    tables: Tables,
}

/// Ephemeral store for tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Committed>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Committed> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for MemoryStore {
    fn begin(&self, mode: TxnMode) -> Result<Box<dyn Txn + '_>> {
        let committed = self.lock();
        Ok(Box::new(MemoryTxn {
            store: self,
            mode,
            base_version: committed.version,
            tables: committed.tables.clone(),
            dirty: false,
        }))
    }
}

/// A snapshot transaction over a [`MemoryStore`].
pub struct MemoryTxn<'a> {
    store: &'a MemoryStore,
    mode: TxnMode,
    base_version: u64,
    tables: Tables,
    dirty: bool,
}

impl MemoryTxn<'_> {
    fn ensure_writable(&self) -> Result<()> {
        if self.mode == TxnMode::ReadOnly {
            return Err(Error::InvalidInput(
                "write attempted in a read-only transaction".to_string(),
            ));
        }
        Ok(())
    }
}

fn blank(kind: Kind, id: i64) -> Record {
    let now = Utc::now();
    match kind {
        Kind::Status => Record::Status(IssueStatus {
            id: StatusId(id),
            name: String::new(),
        }),
        Kind::Issue => Record::Issue(Issue {
            id: IssueId(id),
            title: String::new(),
            description: String::new(),
            status: StatusId(0),
            parent: None,
            created_at: now,
            updated_at: now,
        }),
        Kind::BlockingEdge => Record::BlockingEdge(BlockingEdge {
            id: EdgeId(id),
            blocker: IssueId(0),
            blocked: IssueId(0),
            created_at: now,
        }),
    }
}

/// Writes one validated field into a record.
fn apply(record: &mut Record, field: Field) {
    match (record, field) {
        (Record::Status(s), Field::Name(name)) => s.name = name,
        (Record::Issue(i), Field::Title(title)) => i.title = title,
        (Record::Issue(i), Field::Description(text)) => i.description = text,
        (Record::Issue(i), Field::Status(status)) => i.status = status,
        (Record::Issue(i), Field::Parent(parent)) => i.parent = parent,
        (Record::Issue(i), Field::CreatedAt(ts)) => i.created_at = ts,
        (Record::Issue(i), Field::UpdatedAt(ts)) => i.updated_at = ts,
        (Record::BlockingEdge(e), Field::Blocker(id)) => e.blocker = id,
        (Record::BlockingEdge(e), Field::Blocked(id)) => e.blocked = id,
        (Record::BlockingEdge(e), Field::CreatedAt(ts)) => e.created_at = ts,
        _ => {}
    }
}

fn matches(record: &Record, field: &Field) -> bool {
    match (record, field) {
        (Record::Status(s), Field::Name(name)) => &s.name == name,
        (Record::Issue(i), Field::Status(status)) => i.status == *status,
        (Record::Issue(i), Field::Parent(parent)) => i.parent == *parent,
        (Record::BlockingEdge(e), Field::Blocker(id)) => e.blocker == *id,
        (Record::BlockingEdge(e), Field::Blocked(id)) => e.blocked == *id,
        _ => false,
    }
}

impl Txn for MemoryTxn<'_> {
    fn mode(&self) -> TxnMode {
        self.mode
    }

    fn get(&self, kind: Kind, id: i64) -> Result<Record> {
        self.tables
            .table(kind)
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(kind, id))
    }

    fn insert(&mut self, kind: Kind, fields: Vec<Field>) -> Result<i64> {
        self.ensure_writable()?;
        validate_fields(kind, &fields, true)?;

        let id = self.tables.table(kind).last_id + 1;
        let mut record = blank(kind, id);
        for field in fields {
            apply(&mut record, field);
        }
        self.tables.check_unique(&record)?;

        let table = self.tables.table_mut(kind);
        table.last_id = id;
        table.rows.insert(id, record);
        self.dirty = true;
        Ok(id)
    }

    fn update(&mut self, kind: Kind, id: i64, fields: Vec<Field>) -> Result<()> {
        self.ensure_writable()?;
        validate_fields(kind, &fields, false)?;

        let mut record = self.get(kind, id)?;
        for field in fields {
            apply(&mut record, field);
        }
        self.tables.check_unique(&record)?;

        self.tables.table_mut(kind).rows.insert(id, record);
        self.dirty = true;
        Ok(())
    }

    fn delete(&mut self, kind: Kind, id: i64) -> Result<()> {
        self.ensure_writable()?;
        self.tables
            .table_mut(kind)
            .rows
            .remove(&id)
            .ok_or_else(|| Error::not_found(kind, id))?;
        self.dirty = true;
        Ok(())
    }

    fn query_by_field(&self, kind: Kind, field: &Field) -> Result<Vec<Record>> {
        validate_query(kind, field)?;
        Ok(self
            .tables
            .table(kind)
            .rows
            .values()
            .filter(|r| matches(r, field))
            .cloned()
            .collect())
    }

    fn scan(&self, kind: Kind) -> Result<Vec<Record>> {
        Ok(self.tables.table(kind).rows.values().cloned().collect())
    }

    fn count(&self, kind: Kind) -> Result<usize> {
        Ok(self.tables.table(kind).rows.len())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTxn {
            store,
            base_version,
            tables,
            dirty,
            ..
        } = *self;
        if !dirty {
            return Ok(());
        }
        let mut committed = store.lock();
        if committed.version != base_version {
            tracing::debug!(
                base = base_version,
                current = committed.version,
                "memory store commit lost the race"
            );
            return Err(Error::Conflict);
        }
        committed.tables = tables;
        committed.version += 1;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
