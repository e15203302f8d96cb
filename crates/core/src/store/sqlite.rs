// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed entity store.
//!
//! One connection sits behind a mutex. Read-write transactions open with
//! `BEGIN IMMEDIATE`, so writers take the database write lock up front and
//! concurrent mutations (threads or processes) serialize; a writer that cannot
//! get the lock within the busy timeout fails with [`Error::Conflict`].
//!
//! The schema's foreign keys mirror the engine's lifecycle policies but act
//! only as a backstop: the engine performs its cascades explicitly.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{validate_fields, validate_query, Field, Kind, Record, Store, Txn, TxnMode};
use crate::config::SqliteOptions;
use crate::error::{Error, Result};
use crate::model::{BlockingEdge, EdgeId, Issue, IssueId, IssueStatus, StatusId};

/// Schema version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// SQL schema for the entity store.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS statuses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    CONSTRAINT un_issue_statuses_name UNIQUE (name)
);

CREATE TABLE IF NOT EXISTS issues (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status_id INTEGER NOT NULL,
    parent_id INTEGER,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    CONSTRAINT fk_issues_status FOREIGN KEY (status_id)
        REFERENCES statuses(id) ON DELETE RESTRICT,
    CONSTRAINT fk_issues_parent FOREIGN KEY (parent_id)
        REFERENCES issues(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS blocking_edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    blocker_id INTEGER NOT NULL,
    blocked_id INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    CONSTRAINT un_blocking_edges_pair UNIQUE (blocker_id, blocked_id),
    CONSTRAINT fk_blocking_edges_blocker FOREIGN KEY (blocker_id)
        REFERENCES issues(id) ON DELETE CASCADE,
    CONSTRAINT fk_blocking_edges_blocked FOREIGN KEY (blocked_id)
        REFERENCES issues(id) ON DELETE CASCADE,
    CHECK (blocker_id != blocked_id)
);

CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status_id);
CREATE INDEX IF NOT EXISTS idx_issues_parent ON issues(parent_id);
CREATE INDEX IF NOT EXISTS idx_blocking_edges_blocked ON blocking_edges(blocked_id);
"#;

/// Run schema creation and version checks on a database connection.
///
/// Idempotent: existing databases at the current version are left as-is.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version > SCHEMA_VERSION {
        return Err(Error::ConsistencyFault(format!(
            "database schema version {version} is newer than supported version {SCHEMA_VERSION}"
        )));
    }
    conn.execute_batch(SCHEMA)?;
    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    Ok(())
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::ConsistencyFault(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

fn table(kind: Kind) -> &'static str {
    match kind {
        Kind::Status => "statuses",
        Kind::Issue => "issues",
        Kind::BlockingEdge => "blocking_edges",
    }
}

fn columns(kind: Kind) -> &'static str {
    match kind {
        Kind::Status => "id, name",
        Kind::Issue => "id, title, description, status_id, parent_id, created_at, updated_at",
        Kind::BlockingEdge => "id, blocker_id, blocked_id, created_at",
    }
}

fn column(field: &Field) -> &'static str {
    match field {
        Field::Name(_) => "name",
        Field::Title(_) => "title",
        Field::Description(_) => "description",
        Field::Status(_) => "status_id",
        Field::Parent(_) => "parent_id",
        Field::Blocker(_) => "blocker_id",
        Field::Blocked(_) => "blocked_id",
        Field::CreatedAt(_) => "created_at",
        Field::UpdatedAt(_) => "updated_at",
    }
}

fn value(field: &Field) -> Value {
    match field {
        Field::Name(s) | Field::Title(s) | Field::Description(s) => Value::Text(s.clone()),
        Field::Status(id) => Value::Integer(id.0),
        Field::Parent(Some(id)) | Field::Blocker(id) | Field::Blocked(id) => Value::Integer(id.0),
        Field::Parent(None) => Value::Null,
        Field::CreatedAt(ts) | Field::UpdatedAt(ts) => Value::Text(ts.to_rfc3339()),
    }
}

fn record_from_row(kind: Kind, row: &rusqlite::Row) -> rusqlite::Result<Record> {
    Ok(match kind {
        Kind::Status => Record::Status(IssueStatus {
            id: StatusId(row.get(0)?),
            name: row.get(1)?,
        }),
        Kind::Issue => {
            let created_str: String = row.get(5)?;
            let updated_str: String = row.get(6)?;
            Record::Issue(Issue {
                id: IssueId(row.get(0)?),
                title: row.get(1)?,
                description: row.get(2)?,
                status: StatusId(row.get(3)?),
                parent: row.get::<_, Option<i64>>(4)?.map(IssueId),
                created_at: parse_timestamp(&created_str, "created_at")?,
                updated_at: parse_timestamp(&updated_str, "updated_at")?,
            })
        }
        Kind::BlockingEdge => {
            let created_str: String = row.get(3)?;
            Record::BlockingEdge(BlockingEdge {
                id: EdgeId(row.get(0)?),
                blocker: IssueId(row.get(1)?),
                blocked: IssueId(row.get(2)?),
                created_at: parse_timestamp(&created_str, "created_at")?,
            })
        }
    })
}

/// Turns unique-constraint failures into the engine's duplicate errors.
fn map_write_error(kind: Kind, fields: &[Field], error: rusqlite::Error) -> Error {
    let unique = matches!(
        &error,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    );
    if unique {
        match kind {
            Kind::Status => {
                if let Some(Field::Name(name)) = fields.iter().find(|f| f.name() == "name") {
                    return Error::DuplicateName(name.clone());
                }
            }
            Kind::BlockingEdge => {
                let blocker = fields.iter().find_map(|f| match f {
                    Field::Blocker(id) => Some(*id),
                    _ => None,
                });
                let blocked = fields.iter().find_map(|f| match f {
                    Field::Blocked(id) => Some(*id),
                    _ => None,
                });
                if let (Some(blocker), Some(blocked)) = (blocker, blocked) {
                    return Error::DuplicateEdge { blocker, blocked };
                }
            }
            Kind::Issue => {}
        }
    }
    Error::from(error)
}

/// SQLite database holding statuses, issues and blocking edges.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a database at the given path, creating and migrating if needed.
    pub fn open(path: &Path, options: &SqliteOptions) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_millis(options.busy_timeout_ms))?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;",
        )?;
        run_migrations(&conn)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");

        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        run_migrations(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A holder that panicked has already rolled back in SqliteTxn::drop.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for SqliteStore {
    fn begin(&self, mode: TxnMode) -> Result<Box<dyn Txn + '_>> {
        let conn = self.lock();
        if !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK")?;
        }
        conn.execute_batch(match mode {
            TxnMode::ReadOnly => "BEGIN DEFERRED",
            TxnMode::ReadWrite => "BEGIN IMMEDIATE",
        })?;
        Ok(Box::new(SqliteTxn {
            conn,
            mode,
            finished: false,
        }))
    }
}

/// An open SQLite transaction. Holds the connection until it ends.
pub struct SqliteTxn<'a> {
    conn: MutexGuard<'a, Connection>,
    mode: TxnMode,
    finished: bool,
}

impl SqliteTxn<'_> {
    fn ensure_writable(&self) -> Result<()> {
        if self.mode == TxnMode::ReadOnly {
            return Err(Error::InvalidInput(
                "write attempted in a read-only transaction".to_string(),
            ));
        }
        Ok(())
    }

    fn select(&self, kind: Kind, clause: &str, values: Vec<Value>) -> Result<Vec<Record>> {
        let sql = format!(
            "SELECT {} FROM {} {} ORDER BY id",
            columns(kind),
            table(kind),
            clause
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values), |row| record_from_row(kind, row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

impl Txn for SqliteTxn<'_> {
    fn mode(&self) -> TxnMode {
        self.mode
    }

    fn get(&self, kind: Kind, id: i64) -> Result<Record> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            columns(kind),
            table(kind)
        );
        self.conn
            .query_row(&sql, params![id], |row| record_from_row(kind, row))
            .optional()?
            .ok_or_else(|| Error::not_found(kind, id))
    }

    fn insert(&mut self, kind: Kind, fields: Vec<Field>) -> Result<i64> {
        self.ensure_writable()?;
        validate_fields(kind, &fields, true)?;

        let cols: Vec<&str> = fields.iter().map(column).collect();
        let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table(kind),
            cols.join(", "),
            placeholders.join(", ")
        );
        self.conn
            .execute(&sql, params_from_iter(fields.iter().map(value)))
            .map_err(|e| map_write_error(kind, &fields, e))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&mut self, kind: Kind, id: i64, fields: Vec<Field>) -> Result<()> {
        self.ensure_writable()?;
        validate_fields(kind, &fields, false)?;

        let set_clauses: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{} = ?{}", column(f), i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table(kind),
            set_clauses.join(", "),
            fields.len() + 1
        );
        let mut values: Vec<Value> = fields.iter().map(value).collect();
        values.push(Value::Integer(id));

        let affected = self
            .conn
            .execute(&sql, params_from_iter(values))
            .map_err(|e| map_write_error(kind, &fields, e))?;
        if affected == 0 {
            return Err(Error::not_found(kind, id));
        }
        Ok(())
    }

    fn delete(&mut self, kind: Kind, id: i64) -> Result<()> {
        self.ensure_writable()?;
        let sql = format!("DELETE FROM {} WHERE id = ?1", table(kind));
        let affected = self.conn.execute(&sql, params![id])?;
        if affected == 0 {
            return Err(Error::not_found(kind, id));
        }
        Ok(())
    }

    fn query_by_field(&self, kind: Kind, field: &Field) -> Result<Vec<Record>> {
        validate_query(kind, field)?;
        if let Field::Parent(None) = field {
            return self.select(kind, "WHERE parent_id IS NULL", Vec::new());
        }
        let clause = format!("WHERE {} = ?1", column(field));
        self.select(kind, &clause, vec![value(field)])
    }

    fn scan(&self, kind: Kind) -> Result<Vec<Record>> {
        self.select(kind, "", Vec::new())
    }

    fn count(&self, kind: Kind) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table(kind));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> Result<()> {
        self.finished = true;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

impl Drop for SqliteTxn<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!("failed to roll back abandoned transaction: {}", e);
            }
        }
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
