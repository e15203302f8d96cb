// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line configuration.
//!
//! Read from a TOML file found by [`Config::locate`]:
//! - `database`: path of the SQLite file, relative to the config file
//! - `log`: default tracing filter when `TRELLIS_LOG` is unset
//! - `resolved_statuses`: status names that no longer block anything
//! - `[engine]` and `[sqlite]`: passed through to trellis-core

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use trellis_core::{EngineConfig, SqliteOptions};

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "trellis.toml";
pub const CONFIG_ENV: &str = "TRELLIS_CONFIG";
const USER_CONFIG_DIR: &str = "trellis";
const USER_CONFIG_FILE: &str = "config.toml";
const DB_FILE_NAME: &str = "trellis.db";

fn default_database() -> PathBuf {
    PathBuf::from(DB_FILE_NAME)
}

fn default_resolved_statuses() -> Vec<String> {
    vec!["Done".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    #[serde(default = "default_resolved_statuses")]
    pub resolved_statuses: Vec<String>,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub sqlite: SqliteOptions,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: default_database(),
            log: None,
            resolved_statuses: default_resolved_statuses(),
            engine: EngineConfig::default(),
            sqlite: SqliteOptions::default(),
        }
    }
}

impl Config {
    /// Parses a config file. A relative `database` is resolved against the
    /// directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        if config.database.is_relative() {
            if let Some(dir) = path.parent() {
                config.database = dir.join(&config.database);
            }
        }
        Ok(config)
    }

    /// Finds and loads the config for this process, or returns defaults
    /// when no file is found.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let found = find_config_file(
            explicit,
            std::env::var_os(CONFIG_ENV),
            &cwd,
            dirs::config_dir().as_deref(),
        )?;
        match found {
            Some(path) => Config::load(&path),
            None => Ok(Config::default()),
        }
    }
}

/// Search order: explicit path, `$TRELLIS_CONFIG`, `<cwd>/trellis.toml`,
/// `<user config dir>/trellis/config.toml`.
///
/// The first two must exist when given; the last two are optional.
pub fn find_config_file(
    explicit: Option<&Path>,
    env: Option<OsString>,
    cwd: &Path,
    user_dir: Option<&Path>,
) -> Result<Option<PathBuf>> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from));
    if let Some(path) = named {
        if !path.is_file() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Ok(Some(local));
    }

    Ok(user_dir
        .map(|dir| dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE))
        .filter(|path| path.is_file()))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
