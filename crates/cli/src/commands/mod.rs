// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod block;
pub mod issue;
pub mod status;
pub mod verify;

use serde::Serialize;
use std::io::Write;

use trellis_core::{Engine, IssueStatus, Store};

use crate::cli::{Command, OutputFormat, ResolvedArgs, StatusRef};
use crate::error::Result;

/// Per-invocation settings shared by every command.
pub struct Context<'a, W: Write> {
    pub format: OutputFormat,
    /// Status names counted as resolved when `--resolved` is not given.
    pub resolved_statuses: &'a [String],
    pub out: W,
}

impl<W: Write> Context<'_, W> {
    pub fn line(&mut self, text: impl AsRef<str>) -> Result<()> {
        writeln!(self.out, "{}", text.as_ref())?;
        Ok(())
    }

    /// One JSON document per line.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.line(json)
    }

    /// `--resolved` names, or the configured defaults.
    pub fn resolved_names(&self, args: &ResolvedArgs) -> Vec<String> {
        if args.names.is_empty() {
            self.resolved_statuses.to_vec()
        } else {
            args.names.clone()
        }
    }
}

pub fn dispatch<S: Store, W: Write>(
    engine: &Engine<S>,
    command: Command,
    ctx: &mut Context<'_, W>,
) -> Result<()> {
    match command {
        Command::Status(cmd) => status::run(engine, cmd, ctx),
        Command::Issue(cmd) => issue::run(engine, cmd, ctx),
        Command::Block(cmd) => block::run(engine, cmd, ctx),
        Command::Verify => verify::run(engine, ctx),
    }
}

/// Looks a status up by id or by exact name.
pub(crate) fn resolve_status<S: Store>(
    engine: &Engine<S>,
    status: &StatusRef,
) -> Result<IssueStatus> {
    let found = match status {
        StatusRef::Id(id) => engine.get_status(*id)?,
        StatusRef::Name(name) => engine.status_by_name(name)?,
    };
    Ok(found)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
