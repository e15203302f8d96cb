// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use std::path::Path;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn trellis() -> Command {
    cargo_bin_cmd!("trellis")
}

/// A temp directory with a `trellis.toml` and a fresh database beside it.
pub struct Project {
    pub temp: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self::with_config("database = \"trellis.db\"\n")
    }

    pub fn with_config(config: &str) -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("trellis.toml"), config).unwrap();
        Project { temp }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// A command running in the project directory, isolated from the
    /// caller's environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = trellis();
        cmd.current_dir(self.path())
            .env_remove("TRELLIS_CONFIG")
            .env_remove("TRELLIS_LOG");
        cmd
    }

    /// Runs a command that must succeed and returns its stdout.
    pub fn run(&self, args: &[&str]) -> String {
        let output = self.cmd().args(args).assert().success().get_output().clone();
        String::from_utf8(output.stdout).unwrap()
    }

    pub fn status(&self, name: &str) {
        self.run(&["status", "new", name]);
    }

    /// Creates an issue and returns its id.
    pub fn issue(&self, title: &str, status: &str) -> String {
        let out = self.run(&["issue", "new", title, "--status", status]);
        out.trim()
            .strip_prefix("Created issue ")
            .and_then(|rest| rest.split(':').next())
            .unwrap()
            .to_string()
    }
}
