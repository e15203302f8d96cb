// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use trellis_core::{Engine, Store};

use crate::cli::OutputFormat;
use crate::display::format_report;
use crate::error::{Error, Result};

use super::Context;

/// Prints the integrity report. Any fault turns into an error so the
/// process exits non-zero.
pub fn run<S: Store, W: Write>(engine: &Engine<S>, ctx: &mut Context<'_, W>) -> Result<()> {
    let report = engine.verify()?;
    match ctx.format {
        OutputFormat::Json => ctx.json(&report)?,
        OutputFormat::Text => ctx.line(format_report(&report))?,
    }
    if report.is_clean() {
        Ok(())
    } else {
        Err(Error::FaultsFound(report.faults.len()))
    }
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod tests;
