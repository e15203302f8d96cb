// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use trellis_core::{IssueId, Relation, StatusId};
use yare::parameterized;

#[parameterized(
    self_block = { trellis_core::Error::SelfBlock(IssueId(4)), "issue 4 cannot block itself" },
    in_use = {
        trellis_core::Error::StatusInUse { status: StatusId(2), issues: 3 },
        "status 2 is in use by 3 issue(s)",
    },
    cycle = {
        trellis_core::Error::CycleDetected { relation: Relation::Parent, from: IssueId(1), to: IssueId(2) },
        "would create a parent cycle: 1 -> 2",
    },
)]
fn core_errors_keep_their_message(core: trellis_core::Error, prefix: &str) {
    let err = Error::from(core);
    assert!(err.to_string().starts_with(prefix), "{err}");
}

#[test]
fn faults_found_counts_faults() {
    assert_eq!(
        Error::FaultsFound(2).to_string(),
        "integrity check found 2 fault(s)"
    );
}

#[test]
fn config_error_is_prefixed() {
    let err = Error::Config("missing database".into());
    assert_eq!(err.to_string(), "config error: missing database");
}
