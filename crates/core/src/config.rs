// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine and adapter tuning knobs.
//!
//! Both structs deserialize from the `[engine]` and `[sqlite]` tables of the
//! CLI's TOML config; every field has a default.

use serde::{Deserialize, Serialize};

fn default_max_conflict_retries() -> u32 {
    3
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Integrity engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// How many times a mutation is re-run after a transaction conflict.
    /// Zero surfaces the first conflict to the caller.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_conflict_retries: default_max_conflict_retries(),
        }
    }
}

/// Settings for [`crate::SqliteStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteOptions {
    /// Milliseconds a writer waits for the database lock before the
    /// transaction fails with a conflict.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        SqliteOptions {
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
