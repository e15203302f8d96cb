// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core entity types: statuses, issues, and blocking edges.
//!
//! Ids are store-assigned integers wrapped in distinct newtypes so an issue id
//! can never be passed where a status id is expected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                s.trim().parse::<i64>().map($name).map_err(|_| {
                    Error::InvalidInput(format!("invalid {} id: '{}'", $label, s))
                })
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                $name(id)
            }
        }
    };
}

entity_id!(
    /// Identifier of an [`IssueStatus`].
    StatusId,
    "status"
);
entity_id!(
    /// Identifier of an [`Issue`].
    IssueId,
    "issue"
);
entity_id!(
    /// Identifier of a [`BlockingEdge`].
    EdgeId,
    "edge"
);

/// A named lifecycle state. Names are unique across all statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatus {
    pub id: StatusId,
    pub name: String,
}

/// The primary entity representing a tracked work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    /// Short description of the work.
    pub title: String,
    /// Longer description providing context. Empty when not given.
    pub description: String,
    /// Current lifecycle status; always resolves to an existing status.
    pub status: StatusId,
    /// Weak back-reference to the containing issue. Absent for roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<IssueId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// `blocker` must be resolved before `blocked` can proceed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingEdge {
    pub id: EdgeId,
    pub blocker: IssueId,
    pub blocked: IssueId,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an issue.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub status: StatusId,
    pub parent: Option<IssueId>,
}

impl NewIssue {
    /// Creates a root issue with an empty description.
    pub fn new(title: impl Into<String>, status: StatusId) -> Self {
        NewIssue {
            title: title.into(),
            description: String::new(),
            status,
            parent: None,
        }
    }

    /// Sets the description (builder pattern).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the parent issue (builder pattern).
    pub fn with_parent(mut self, parent: Option<IssueId>) -> Self {
        self.parent = parent;
        self
    }
}

/// Partial update of an issue's free-text fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl IssuePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Rejects names and titles that are empty or whitespace-only.
pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
