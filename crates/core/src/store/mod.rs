// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Entity store adapter contract.
//!
//! The engine talks to persistence only through [`Store`] and [`Txn`]: a
//! scoped transaction offering primary-key lookup, insert, update, delete and
//! lookup by an indexed field, over the three entity kinds. Adapters own the
//! physical layout but have no authority over the tree or graph invariants.
//!
//! Result sequences are ordered by ascending id.

pub mod memory;
pub mod sqlite;

use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::{Error, Result};
use crate::model::{BlockingEdge, EdgeId, Issue, IssueId, IssueStatus, StatusId};

/// The entity kinds a store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Status,
    Issue,
    BlockingEdge,
}

impl Kind {
    /// Returns the string representation used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Status => "status",
            Kind::Issue => "issue",
            Kind::BlockingEdge => "blocking_edge",
        }
    }

    /// Fields that must be present when inserting a record of this kind.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Kind::Status => &["name"],
            Kind::Issue => &["title", "status"],
            Kind::BlockingEdge => &["blocker", "blocked"],
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::BlockingEdge => write!(f, "blocking edge"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// A single attribute value, used for inserts, updates and field lookups.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Name(String),
    Title(String),
    Description(String),
    Status(StatusId),
    /// `Parent(None)` clears the parent; as a lookup it selects root issues.
    Parent(Option<IssueId>),
    Blocker(IssueId),
    Blocked(IssueId),
    CreatedAt(DateTime<Utc>),
    UpdatedAt(DateTime<Utc>),
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Name(_) => "name",
            Field::Title(_) => "title",
            Field::Description(_) => "description",
            Field::Status(_) => "status",
            Field::Parent(_) => "parent",
            Field::Blocker(_) => "blocker",
            Field::Blocked(_) => "blocked",
            Field::CreatedAt(_) => "created_at",
            Field::UpdatedAt(_) => "updated_at",
        }
    }

    /// Whether this attribute exists on records of `kind`.
    pub fn applies_to(&self, kind: Kind) -> bool {
        match self {
            Field::Name(_) => kind == Kind::Status,
            Field::Title(_)
            | Field::Description(_)
            | Field::Status(_)
            | Field::Parent(_)
            | Field::UpdatedAt(_) => kind == Kind::Issue,
            Field::Blocker(_) | Field::Blocked(_) => kind == Kind::BlockingEdge,
            Field::CreatedAt(_) => matches!(kind, Kind::Issue | Kind::BlockingEdge),
        }
    }

    /// Whether adapters keep an index usable by [`Txn::query_by_field`].
    pub fn is_queryable(&self) -> bool {
        matches!(
            self,
            Field::Name(_)
                | Field::Status(_)
                | Field::Parent(_)
                | Field::Blocker(_)
                | Field::Blocked(_)
        )
    }
}

/// Checks a field list against `kind` before an adapter writes it.
pub(crate) fn validate_fields(kind: Kind, fields: &[Field], inserting: bool) -> Result<()> {
    if let Some(field) = fields.iter().find(|f| !f.applies_to(kind)) {
        return Err(Error::InvalidInput(format!(
            "field '{}' does not apply to {}",
            field.name(),
            kind
        )));
    }
    if inserting {
        for required in kind.required_fields() {
            if !fields.iter().any(|f| f.name() == *required) {
                return Err(Error::InvalidInput(format!(
                    "missing field '{required}' for new {kind}"
                )));
            }
        }
    } else if fields.is_empty() {
        return Err(Error::InvalidInput(format!("empty update for {kind}")));
    }
    Ok(())
}

/// Checks that `field` can be used as a lookup key for `kind`.
pub(crate) fn validate_query(kind: Kind, field: &Field) -> Result<()> {
    if !field.applies_to(kind) || !field.is_queryable() {
        return Err(Error::InvalidInput(format!(
            "cannot query {} by '{}'",
            kind,
            field.name()
        )));
    }
    Ok(())
}

/// A stored record of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Status(IssueStatus),
    Issue(Issue),
    BlockingEdge(BlockingEdge),
}

impl Record {
    pub fn kind(&self) -> Kind {
        match self {
            Record::Status(_) => Kind::Status,
            Record::Issue(_) => Kind::Issue,
            Record::BlockingEdge(_) => Kind::BlockingEdge,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Record::Status(s) => s.id.0,
            Record::Issue(i) => i.id.0,
            Record::BlockingEdge(e) => e.id.0,
        }
    }

    pub fn into_status(self) -> Result<IssueStatus> {
        match self {
            Record::Status(status) => Ok(status),
            other => Err(mismatch(Kind::Status, &other)),
        }
    }

    pub fn into_issue(self) -> Result<Issue> {
        match self {
            Record::Issue(issue) => Ok(issue),
            other => Err(mismatch(Kind::Issue, &other)),
        }
    }

    pub fn into_edge(self) -> Result<BlockingEdge> {
        match self {
            Record::BlockingEdge(edge) => Ok(edge),
            other => Err(mismatch(Kind::BlockingEdge, &other)),
        }
    }
}

fn mismatch(expected: Kind, got: &Record) -> Error {
    Error::ConsistencyFault(format!(
        "store returned a {} record where a {} was expected",
        got.kind(),
        expected
    ))
}

/// Isolation requested when opening a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnMode {
    /// Queries only. May run at a lower isolation level.
    ReadOnly,
    /// Mutations. Commits are checked for conflicts with concurrent writers.
    ReadWrite,
}

/// A transactional entity store shared by concurrent callers.
pub trait Store: Send + Sync {
    /// Opens a transaction. Dropping it without [`Txn::commit`] rolls it back.
    fn begin(&self, mode: TxnMode) -> Result<Box<dyn Txn + '_>>;
}

/// A scoped transaction against a [`Store`].
pub trait Txn {
    fn mode(&self) -> TxnMode;

    /// Fetches one record; [`Error::NotFound`] when absent.
    fn get(&self, kind: Kind, id: i64) -> Result<Record>;

    /// Inserts a record and returns its store-assigned id.
    fn insert(&mut self, kind: Kind, fields: Vec<Field>) -> Result<i64>;

    /// Overwrites the given fields; [`Error::NotFound`] when absent.
    fn update(&mut self, kind: Kind, id: i64, fields: Vec<Field>) -> Result<()>;

    /// Removes one record; [`Error::NotFound`] when absent.
    fn delete(&mut self, kind: Kind, id: i64) -> Result<()>;

    /// All records of `kind` whose attribute equals `field`.
    fn query_by_field(&self, kind: Kind, field: &Field) -> Result<Vec<Record>>;

    /// All records of `kind`.
    fn scan(&self, kind: Kind) -> Result<Vec<Record>>;

    /// Number of records of `kind`. Bounds every traversal.
    fn count(&self, kind: Kind) -> Result<usize>;

    fn commit(self: Box<Self>) -> Result<()>;

    fn rollback(self: Box<Self>) -> Result<()>;

    fn status(&self, id: StatusId) -> Result<IssueStatus> {
        self.get(Kind::Status, id.0)?.into_status()
    }

    fn issue(&self, id: IssueId) -> Result<Issue> {
        self.get(Kind::Issue, id.0)?.into_issue()
    }

    fn edge(&self, id: EdgeId) -> Result<BlockingEdge> {
        self.get(Kind::BlockingEdge, id.0)?.into_edge()
    }

    fn status_by_name(&self, name: &str) -> Result<Option<IssueStatus>> {
        let mut found = self.query_by_field(Kind::Status, &Field::Name(name.to_string()))?;
        match found.len() {
            0 => Ok(None),
            1 => found.remove(0).into_status().map(Some),
            n => Err(Error::ConsistencyFault(format!(
                "{n} statuses share the name '{name}'"
            ))),
        }
    }

    fn statuses(&self) -> Result<Vec<IssueStatus>> {
        self.scan(Kind::Status)?
            .into_iter()
            .map(Record::into_status)
            .collect()
    }

    fn issues(&self) -> Result<Vec<Issue>> {
        self.scan(Kind::Issue)?
            .into_iter()
            .map(Record::into_issue)
            .collect()
    }

    fn edges(&self) -> Result<Vec<BlockingEdge>> {
        self.scan(Kind::BlockingEdge)?
            .into_iter()
            .map(Record::into_edge)
            .collect()
    }

    fn issues_where(&self, field: &Field) -> Result<Vec<Issue>> {
        self.query_by_field(Kind::Issue, field)?
            .into_iter()
            .map(Record::into_issue)
            .collect()
    }

    fn edges_where(&self, field: &Field) -> Result<Vec<BlockingEdge>> {
        self.query_by_field(Kind::BlockingEdge, field)?
            .into_iter()
            .map(Record::into_edge)
            .collect()
    }

    /// Direct children of `parent`.
    fn children_of(&self, parent: IssueId) -> Result<Vec<Issue>> {
        self.issues_where(&Field::Parent(Some(parent)))
    }

    /// Outgoing edges: issues that `blocker` blocks.
    fn edges_from(&self, blocker: IssueId) -> Result<Vec<BlockingEdge>> {
        self.edges_where(&Field::Blocker(blocker))
    }

    /// Incoming edges: issues that block `blocked`.
    fn edges_into(&self, blocked: IssueId) -> Result<Vec<BlockingEdge>> {
        self.edges_where(&Field::Blocked(blocked))
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
