// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use trellis_core::{Engine, Store};

use crate::cli::{OutputFormat, StatusCommand, StatusRef};
use crate::display::format_status_line;
use crate::error::Result;

use super::{resolve_status, Context};

pub fn run<S: Store, W: Write>(
    engine: &Engine<S>,
    cmd: StatusCommand,
    ctx: &mut Context<'_, W>,
) -> Result<()> {
    let (status, verb) = match cmd {
        StatusCommand::New { name } => (engine.create_status(&name)?, "Created"),
        StatusCommand::Rename { status, new_name } => {
            let renamed = match status {
                StatusRef::Id(id) => engine.rename_status(id, &new_name)?,
                StatusRef::Name(name) => engine.rename_status_by_name(&name, &new_name)?,
            };
            (renamed, "Renamed")
        }
        StatusCommand::Delete { status } => {
            let deleted = match status {
                StatusRef::Id(id) => engine.delete_status(id)?,
                StatusRef::Name(name) => engine.delete_status_by_name(&name)?,
            };
            (deleted, "Deleted")
        }
        StatusCommand::Show { status } => return show(engine, &status, ctx),
        StatusCommand::List => return list(engine, ctx),
    };

    match ctx.format {
        OutputFormat::Json => ctx.json(&status),
        OutputFormat::Text => ctx.line(format!(
            "{} status {}: {}",
            verb, status.id, status.name
        )),
    }
}

fn show<S: Store, W: Write>(
    engine: &Engine<S>,
    status: &StatusRef,
    ctx: &mut Context<'_, W>,
) -> Result<()> {
    let status = resolve_status(engine, status)?;
    match ctx.format {
        OutputFormat::Json => ctx.json(&status),
        OutputFormat::Text => ctx.line(format!("Status {}: {}", status.id, status.name)),
    }
}

fn list<S: Store, W: Write>(engine: &Engine<S>, ctx: &mut Context<'_, W>) -> Result<()> {
    let statuses = engine.list_statuses()?;
    match ctx.format {
        OutputFormat::Json => ctx.json(&statuses),
        OutputFormat::Text => {
            for status in &statuses {
                ctx.line(format_status_line(status))?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
