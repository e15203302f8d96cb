// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! trellis-core: integrity engine for the trellis issue tracker
//!
//! This crate owns the invariants a relational schema cannot express on its
//! own: the parent relation over issues is a forest, the blocking relation is
//! a DAG, and statuses are only removed once nothing references them. Every
//! mutation runs inside one store transaction and either commits whole or
//! leaves the store untouched.

pub mod blocking;
pub mod check;
pub mod config;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod status;
pub mod store;

pub use check::{Fault, IntegrityReport};
pub use config::{EngineConfig, SqliteOptions};
pub use engine::{DeletedIssue, Engine};
pub use error::{Error, Relation, Result};
pub use model::{BlockingEdge, EdgeId, Issue, IssueId, IssuePatch, IssueStatus, NewIssue, StatusId};
pub use store::memory::MemoryStore;
pub use store::sqlite::SqliteStore;
pub use store::{Field, Kind, Record, Store, Txn, TxnMode};
