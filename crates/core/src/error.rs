// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for trellis-core operations.

use std::fmt;

use thiserror::Error;

use crate::model::{IssueId, StatusId};
use crate::store::Kind;

/// Which relation an acyclicity check was guarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The parent/child forest.
    Parent,
    /// The blocking DAG.
    Blocks,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Parent => "parent",
            Relation::Blocks => "blocks",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// All possible errors that can occur in trellis-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} not found: {key}")]
    NotFound { kind: Kind, key: String },

    #[error("status name already exists: '{0}'\n  hint: status names are unique (case-sensitive)")]
    DuplicateName(String),

    #[error("issue {0} cannot be its own parent")]
    SelfReference(IssueId),

    #[error("issue {0} cannot block itself")]
    SelfBlock(IssueId),

    #[error("would create a {relation} cycle: {from} -> {to}\n  hint: {to} already reaches {from}")]
    CycleDetected {
        relation: Relation,
        from: IssueId,
        to: IssueId,
    },

    #[error("blocking edge already exists: {blocker} blocks {blocked}")]
    DuplicateEdge { blocker: IssueId, blocked: IssueId },

    #[error("status {status} is in use by {issues} issue(s)\n  hint: move those issues to another status first")]
    StatusInUse { status: StatusId, issues: usize },

    #[error("transaction conflict with a concurrent mutation\n  hint: retry the operation")]
    Conflict,

    #[error("consistency fault: {0}")]
    ConsistencyFault(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] keyed by a numeric id.
    pub fn not_found(kind: Kind, id: impl fmt::Display) -> Self {
        Error::NotFound {
            kind,
            key: id.to_string(),
        }
    }

    /// True when retrying the whole operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Conflict)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, _) = &error {
            if matches!(
                failure.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) {
                return Error::Conflict;
            }
        }
        Error::Database(error)
    }
}

/// A specialized Result type for trellis-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
