// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the `trellis` command line.
///
/// Engine errors pass through unchanged so their hints reach the user.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] trellis_core::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("integrity check found {0} fault(s)")]
    FaultsFound(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
