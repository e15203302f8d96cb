// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Status registry: the closed set of named lifecycle states.
//!
//! Names are unique (exact, case-sensitive match) and a status can only be
//! deleted while no issue references it.

use crate::error::{Error, Result};
use crate::model::{require_text, IssueStatus, StatusId};
use crate::store::{Field, Kind, Txn};

pub fn create(txn: &mut dyn Txn, name: &str) -> Result<IssueStatus> {
    require_text("status name", name)?;
    if txn.status_by_name(name)?.is_some() {
        return Err(Error::DuplicateName(name.to_string()));
    }
    let id = StatusId(txn.insert(Kind::Status, vec![Field::Name(name.to_string())])?);
    Ok(IssueStatus {
        id,
        name: name.to_string(),
    })
}

/// Renames a status. Renaming to its current name is a no-op.
pub fn rename(txn: &mut dyn Txn, id: StatusId, new_name: &str) -> Result<IssueStatus> {
    require_text("status name", new_name)?;
    let mut status = txn.status(id)?;
    if status.name == new_name {
        return Ok(status);
    }
    if let Some(existing) = txn.status_by_name(new_name)? {
        if existing.id != id {
            return Err(Error::DuplicateName(new_name.to_string()));
        }
    }
    txn.update(Kind::Status, id.0, vec![Field::Name(new_name.to_string())])?;
    status.name = new_name.to_string();
    Ok(status)
}

/// Removes an unreferenced status and returns it.
pub fn delete(txn: &mut dyn Txn, id: StatusId) -> Result<IssueStatus> {
    let status = txn.status(id)?;
    let issues = txn.issues_where(&Field::Status(id))?.len();
    if issues > 0 {
        return Err(Error::StatusInUse { status: id, issues });
    }
    txn.delete(Kind::Status, id.0)?;
    Ok(status)
}

pub fn get(txn: &dyn Txn, id: StatusId) -> Result<IssueStatus> {
    txn.status(id)
}

/// Looks a status up by exact name.
pub fn get_by_name(txn: &dyn Txn, name: &str) -> Result<IssueStatus> {
    txn.status_by_name(name)?.ok_or_else(|| Error::NotFound {
        kind: Kind::Status,
        key: name.to_string(),
    })
}

pub fn list(txn: &dyn Txn) -> Result<Vec<IssueStatus>> {
    txn.statuses()
}

pub fn rename_by_name(txn: &mut dyn Txn, current: &str, new_name: &str) -> Result<IssueStatus> {
    let id = get_by_name(txn, current)?.id;
    rename(txn, id, new_name)
}

pub fn delete_by_name(txn: &mut dyn Txn, name: &str) -> Result<IssueStatus> {
    let id = get_by_name(txn, name)?.id;
    delete(txn, id)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
