// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use std::io::Write;

use trellis_core::{blocking, Engine, Issue, IssueId, IssueStatus, Store};

use crate::cli::{BlockCommand, OutputFormat, ResolvedArgs};
use crate::display::{format_edge_line, format_issue_line, StatusNames};
use crate::error::Result;

use super::Context;

/// `block check` result.
#[derive(Debug, Serialize)]
struct BlockState {
    issue: IssueId,
    blocked: bool,
    /// Blockers whose status is not resolved.
    blockers: Vec<Issue>,
}

pub fn run<S: Store, W: Write>(
    engine: &Engine<S>,
    cmd: BlockCommand,
    ctx: &mut Context<'_, W>,
) -> Result<()> {
    match cmd {
        BlockCommand::Add { blocker, blocked } => {
            let edge = engine.link_blocking(blocker, blocked)?;
            match ctx.format {
                OutputFormat::Json => ctx.json(&edge),
                OutputFormat::Text => ctx.line(format!(
                    "{} blocks {} (edge {})",
                    edge.blocker, edge.blocked, edge.id
                )),
            }
        }
        BlockCommand::Remove { edge } => {
            let edge = engine.unlink_blocking(edge)?;
            match ctx.format {
                OutputFormat::Json => ctx.json(&edge),
                OutputFormat::Text => ctx.line(format!(
                    "Removed edge {}: {} no longer blocks {}",
                    edge.id, edge.blocker, edge.blocked
                )),
            }
        }
        BlockCommand::List { issue } => {
            let edges = match issue {
                Some(id) => engine.edges_for(id)?,
                None => engine.blocking_edges()?,
            };
            match ctx.format {
                OutputFormat::Json => ctx.json(&edges),
                OutputFormat::Text => {
                    for edge in &edges {
                        ctx.line(format_edge_line(edge))?;
                    }
                    Ok(())
                }
            }
        }
        BlockCommand::Check { id, resolved } => check(engine, id, &resolved, ctx),
    }
}

fn check<S: Store, W: Write>(
    engine: &Engine<S>,
    id: IssueId,
    resolved: &ResolvedArgs,
    ctx: &mut Context<'_, W>,
) -> Result<()> {
    let resolved = ctx.resolved_names(resolved);
    let is_resolved = |status: &IssueStatus| resolved.contains(&status.name);
    let (statuses, blockers) = engine.read(|txn| {
        Ok((
            trellis_core::status::list(txn)?,
            blocking::unresolved_blockers(txn, id, &is_resolved)?,
        ))
    })?;

    let state = BlockState {
        issue: id,
        blocked: !blockers.is_empty(),
        blockers,
    };
    match ctx.format {
        OutputFormat::Json => ctx.json(&state),
        OutputFormat::Text if !state.blocked => ctx.line(format!("Issue {} is not blocked", id)),
        OutputFormat::Text => {
            let names = StatusNames::new(&statuses);
            ctx.line(format!("Issue {} is blocked by:", id))?;
            for issue in &state.blockers {
                ctx.line(format!("  {}", format_issue_line(issue, &names)))?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "block_tests.rs"]
mod tests;
