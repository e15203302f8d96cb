// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! trellis_cli - the administrative command line for the trellis engine.
//!
//! Loads [`Config`], installs logging, opens the SQLite store and hands the
//! parsed [`Cli`] command to the engine. No integrity rule lives here; every
//! check is made by `trellis_core`.
//!
//! ```rust,ignore
//! use clap::Parser;
//! use trellis_cli::{run, Cli};
//!
//! run(Cli::parse())?;
//! ```

mod cli;
mod commands;
mod display;
mod logging;

pub mod config;
pub mod error;

use tracing::debug;

use trellis_core::{Engine, SqliteStore};

pub use cli::{
    BlockCommand, Cli, Command, IssueCommand, ListArgs, OutputFormat, ResolvedArgs,
    StatusCommand, StatusRef,
};
pub use config::Config;
pub use error::{Error, Result};

/// Runs one parsed command against the configured database.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::locate(cli.config.as_deref())?;
    logging::setup_logging(config.log.as_deref());

    let db_path = cli.db.unwrap_or(config.database);
    debug!(db = %db_path.display(), "opening store");
    let store = SqliteStore::open(&db_path, &config.sqlite)?;
    let engine = Engine::with_config(store, config.engine);

    let stdout = std::io::stdout();
    let mut ctx = commands::Context {
        format: cli.output,
        resolved_statuses: &config.resolved_statuses,
        out: stdout.lock(),
    };
    commands::dispatch(&engine, cli.command, &mut ctx)
}
