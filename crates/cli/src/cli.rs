// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use trellis_core::{EdgeId, IssueId, StatusId};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for all commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A status given on the command line: all-digit arguments are ids,
/// anything else is an exact name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusRef {
    Id(StatusId),
    Name(String),
}

impl FromStr for StatusRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = s.parse::<i64>() {
                return Ok(StatusRef::Id(StatusId(id)));
            }
        }
        Ok(StatusRef::Name(s.to_string()))
    }
}

impl fmt::Display for StatusRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusRef::Id(id) => write!(f, "{id}"),
            StatusRef::Name(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Parser)]
#[command(name = "trellis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Issue tracker core with enforced hierarchy and blocking integrity")]
#[command(
    long_about = "Issue tracker core with enforced hierarchy and blocking integrity.\n\n\
    Parent links always form a forest, blocking links always form a DAG, and a status\n\
    cannot be deleted while issues use it."
)]
pub struct Cli {
    /// Config file (default: $TRELLIS_CONFIG, then ./trellis.toml)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Database file (overrides `database` from the config)
    #[arg(long, global = true, value_name = "path")]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage lifecycle statuses
    #[command(subcommand)]
    Status(StatusCommand),

    /// Create, edit and arrange issues
    #[command(subcommand)]
    Issue(IssueCommand),

    /// Manage blocking relationships
    #[command(subcommand)]
    Block(BlockCommand),

    /// Check the whole store for integrity faults
    #[command(after_help = "\
Exits with status 1 when any fault is found.")]
    Verify,
}

#[derive(Subcommand)]
pub enum StatusCommand {
    /// Create a status
    New {
        #[arg(value_parser = non_empty_string)]
        name: String,
    },

    /// Rename a status
    #[command(after_help = "\
Examples:
  trellis status rename Open Todo     Rename by name
  trellis status rename 3 Todo        Rename by id")]
    Rename {
        /// Status id or name
        status: StatusRef,
        #[arg(value_parser = non_empty_string)]
        new_name: String,
    },

    /// Delete a status no issue uses
    Delete {
        /// Status id or name
        status: StatusRef,
    },

    /// Show one status
    Show {
        /// Status id or name
        status: StatusRef,
    },

    /// List all statuses
    List,
}

#[derive(Subcommand)]
pub enum IssueCommand {
    /// Create an issue
    #[command(after_help = "\
Examples:
  trellis issue new \"Fix login\" -s Open
  trellis issue new \"Write tests\" -s Open --parent 4 -d \"unit and e2e\"")]
    New {
        #[arg(value_parser = non_empty_string)]
        title: String,

        /// Initial status (id or name)
        #[arg(long, short)]
        status: StatusRef,

        #[arg(long, short)]
        description: Option<String>,

        /// Parent issue id
        #[arg(long, short)]
        parent: Option<IssueId>,
    },

    /// Show an issue with its relations
    Show { id: IssueId },

    /// List issues
    List(ListArgs),

    /// Change an issue's title or description
    #[command(group = clap::ArgGroup::new("fields")
        .args(["title", "description"])
        .required(true)
        .multiple(true))]
    Edit {
        id: IssueId,

        #[arg(long, short, value_parser = non_empty_string)]
        title: Option<String>,

        #[arg(long, short)]
        description: Option<String>,
    },

    /// Move an issue to another status
    SetStatus {
        id: IssueId,
        /// Status id or name
        status: StatusRef,
    },

    /// Set or clear an issue's parent
    #[command(after_help = "\
Examples:
  trellis issue reparent 7 3          Make 3 the parent of 7
  trellis issue reparent 7 --root     Make 7 a root issue")]
    Reparent {
        id: IssueId,

        /// New parent issue id
        #[arg(required_unless_present = "root", conflicts_with = "root")]
        parent: Option<IssueId>,

        /// Clear the parent instead
        #[arg(long)]
        root: bool,
    },

    /// Delete an issue, its blocking links, and detach its children
    Delete { id: IssueId },

    /// List direct children
    Children { id: IssueId },

    /// List ancestors, nearest first
    Ancestors { id: IssueId },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only issues without a parent
    #[arg(long)]
    pub roots: bool,

    /// Only issues in this status (id or name)
    #[arg(long, short)]
    pub status: Option<StatusRef>,

    /// Only issues with at least one unresolved blocker
    #[arg(long)]
    pub blocked: bool,

    #[command(flatten)]
    pub resolved: ResolvedArgs,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ResolvedArgs {
    /// Status name that counts as resolved (repeatable; default from config)
    #[arg(long = "resolved", value_name = "name")]
    pub names: Vec<String>,
}

#[derive(Subcommand)]
pub enum BlockCommand {
    /// Record that one issue blocks another
    #[command(after_help = "\
Examples:
  trellis block add 1 2               Issue 1 blocks issue 2")]
    Add { blocker: IssueId, blocked: IssueId },

    /// Remove a blocking edge by id
    Remove { edge: EdgeId },

    /// List blocking edges, all or those touching one issue
    List { issue: Option<IssueId> },

    /// Report whether an issue has unresolved blockers
    Check {
        id: IssueId,

        #[command(flatten)]
        resolved: ResolvedArgs,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
