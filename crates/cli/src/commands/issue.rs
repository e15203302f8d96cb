// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashSet;
use std::io::Write;

use trellis_core::{
    blocking, hierarchy, Engine, Issue, IssueId, IssuePatch, NewIssue, Store,
};

use crate::cli::{IssueCommand, ListArgs, OutputFormat};
use crate::display::{format_issue_details, format_issue_line, IssueDetails, StatusNames};
use crate::error::Result;

use super::{resolve_status, Context};

pub fn run<S: Store, W: Write>(
    engine: &Engine<S>,
    cmd: IssueCommand,
    ctx: &mut Context<'_, W>,
) -> Result<()> {
    match cmd {
        IssueCommand::New {
            title,
            status,
            description,
            parent,
        } => {
            let status = resolve_status(engine, &status)?;
            let mut new = NewIssue::new(title, status.id).with_parent(parent);
            if let Some(description) = description {
                new = new.with_description(description);
            }
            let issue = engine.create_issue(&new)?;
            report(ctx, &issue, format!("Created issue {}: {}", issue.id, issue.title))
        }
        IssueCommand::Show { id } => show(engine, id, ctx),
        IssueCommand::List(args) => list(engine, &args, ctx),
        IssueCommand::Edit {
            id,
            title,
            description,
        } => {
            let issue = engine.edit_issue(id, &IssuePatch { title, description })?;
            report(ctx, &issue, format!("Updated issue {}", issue.id))
        }
        IssueCommand::SetStatus { id, status } => {
            let status = resolve_status(engine, &status)?;
            let issue = engine.update_status(id, status.id)?;
            report(ctx, &issue, format!("Issue {} is now {}", issue.id, status.name))
        }
        IssueCommand::Reparent { id, parent, root } => {
            let parent = if root { None } else { parent };
            let issue = engine.reparent_issue(id, parent)?;
            let text = match issue.parent {
                Some(parent) => format!("Issue {} is now a child of {}", issue.id, parent),
                None => format!("Issue {} is now a root", issue.id),
            };
            report(ctx, &issue, text)
        }
        IssueCommand::Delete { id } => {
            let deleted = engine.delete_issue(id)?;
            match ctx.format {
                OutputFormat::Json => ctx.json(&deleted),
                OutputFormat::Text => ctx.line(format!(
                    "Deleted issue {}: {} (removed {} blocking edge(s), detached {} child issue(s))",
                    deleted.issue.id,
                    deleted.issue.title,
                    deleted.removed_edges.len(),
                    deleted.orphaned.len()
                )),
            }
        }
        IssueCommand::Children { id } => {
            let children = engine.children(id)?;
            print_issues(engine, &children, ctx)
        }
        IssueCommand::Ancestors { id } => {
            let ancestors = engine.ancestors(id)?;
            print_issues(engine, &ancestors, ctx)
        }
    }
}

/// Prints a mutated issue: the whole record as JSON, or a one-line summary.
fn report<W: Write>(ctx: &mut Context<'_, W>, issue: &Issue, text: String) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => ctx.json(issue),
        OutputFormat::Text => ctx.line(text),
    }
}

fn show<S: Store, W: Write>(
    engine: &Engine<S>,
    id: IssueId,
    ctx: &mut Context<'_, W>,
) -> Result<()> {
    let (details, names) = engine.read(|txn| {
        let issue = txn.issue(id)?;
        let names = StatusNames::new(&trellis_core::status::list(txn)?);
        let details = IssueDetails {
            status_name: names.label(issue.status),
            children: hierarchy::children(txn, id)?,
            blockers: blocking::blockers(txn, id)?,
            blocking: blocking::blocked(txn, id)?,
            issue,
        };
        Ok((details, names))
    })?;
    match ctx.format {
        OutputFormat::Json => ctx.json(&details),
        OutputFormat::Text => ctx.line(format_issue_details(&details, &names)),
    }
}

fn list<S: Store, W: Write>(
    engine: &Engine<S>,
    args: &ListArgs,
    ctx: &mut Context<'_, W>,
) -> Result<()> {
    let mut issues = if args.roots {
        engine.roots()?
    } else {
        engine.list_issues()?
    };

    if let Some(status) = &args.status {
        let status = resolve_status(engine, status)?;
        issues.retain(|issue| issue.status == status.id);
    }

    if args.blocked {
        let resolved = ctx.resolved_names(&args.resolved);
        let blocked: HashSet<IssueId> = engine
            .blocked_issues(|status| resolved.contains(&status.name))?
            .into_iter()
            .map(|issue| issue.id)
            .collect();
        issues.retain(|issue| blocked.contains(&issue.id));
    }

    print_issues(engine, &issues, ctx)
}

fn print_issues<S: Store, W: Write>(
    engine: &Engine<S>,
    issues: &[Issue],
    ctx: &mut Context<'_, W>,
) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => ctx.json(issues),
        OutputFormat::Text => {
            let names = StatusNames::new(&engine.list_statuses()?);
            for issue in issues {
                ctx.line(format_issue_line(issue, &names))?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
