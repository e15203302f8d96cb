// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TRELLIS_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Picks the filter directive: `$TRELLIS_LOG`, then the config's `log`,
/// then `warn`. Blank values are skipped.
pub fn directive<'a>(env: Option<&'a str>, configured: Option<&'a str>) -> &'a str {
    env.filter(|v| !v.trim().is_empty())
        .or(configured.filter(|v| !v.trim().is_empty()))
        .unwrap_or(DEFAULT_FILTER)
}

/// Installs the stderr subscriber. Safe to call more than once.
pub fn setup_logging(configured: Option<&str>) {
    let env = std::env::var(LOG_ENV).ok();
    let chosen = directive(env.as_deref(), configured);
    let filter = EnvFilter::try_new(chosen).unwrap_or_else(|e| {
        eprintln!("warning: ignoring log filter '{}': {}", chosen, e);
        EnvFilter::new(DEFAULT_FILTER)
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
