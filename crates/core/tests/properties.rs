// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Property-based tests for the forest and DAG invariants.
//!
//! Random sequences of reparent, link, unlink and delete operations run
//! against a fresh engine. After every step:
//! - following `parent` from any issue reaches a root within N steps
//! - the blocking edges admit a topological order
//! - a failed operation left the store exactly as it was

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use std::collections::{HashMap, VecDeque};
use tracing::info;

use trellis_core::{
    BlockingEdge, EdgeId, Engine, Issue, IssueId, MemoryStore, NewIssue, SqliteStore, Store,
};

const ISSUES: usize = 8;

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
enum Op {
    Reparent(usize, Option<usize>),
    Link(usize, usize),
    Unlink(usize),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..ISSUES, proptest::option::of(0..ISSUES)).prop_map(|(i, p)| Op::Reparent(i, p)),
        4 => (0..ISSUES, 0..ISSUES).prop_map(|(a, b)| Op::Link(a, b)),
        1 => (0..ISSUES * 2).prop_map(Op::Unlink),
        1 => (0..ISSUES).prop_map(Op::Delete),
    ]
}

fn setup<S: Store>(store: S) -> (Engine<S>, Vec<IssueId>) {
    let engine = Engine::new(store);
    let open = engine.create_status("Open").unwrap();
    let ids = (0..ISSUES)
        .map(|n| {
            engine
                .create_issue(&NewIssue::new(format!("issue {n}"), open.id))
                .unwrap()
                .id
        })
        .collect();
    (engine, ids)
}

fn snapshot<S: Store>(engine: &Engine<S>) -> (Vec<Issue>, Vec<BlockingEdge>) {
    (
        engine.list_issues().unwrap(),
        engine.blocking_edges().unwrap(),
    )
}

fn apply<S: Store>(engine: &Engine<S>, ids: &[IssueId], op: &Op) -> trellis_core::Result<()> {
    match *op {
        Op::Reparent(i, p) => engine.reparent_issue(ids[i], p.map(|p| ids[p])).map(drop),
        Op::Link(a, b) => engine.link_blocking(ids[a], ids[b]).map(drop),
        Op::Unlink(e) => engine.unlink_blocking(EdgeId(e as i64 + 1)).map(drop),
        Op::Delete(i) => engine.delete_issue(ids[i]).map(drop),
    }
}

fn assert_forest(issues: &[Issue]) {
    let parents: HashMap<IssueId, Option<IssueId>> =
        issues.iter().map(|i| (i.id, i.parent)).collect();
    for issue in issues {
        let mut cursor = issue.parent;
        let mut steps = 0;
        while let Some(parent) = cursor {
            steps += 1;
            assert!(steps <= issues.len(), "parent chain from {} loops", issue.id);
            assert!(
                parents.contains_key(&parent),
                "issue {} has missing parent {parent}",
                issue.id
            );
            cursor = parents[&parent];
        }
    }
}

fn assert_dag(issues: &[Issue], edges: &[BlockingEdge]) {
    let mut indegree: HashMap<IssueId, usize> = issues.iter().map(|i| (i.id, 0)).collect();
    let mut outgoing: HashMap<IssueId, Vec<IssueId>> = HashMap::new();
    for edge in edges {
        assert!(indegree.contains_key(&edge.blocker), "dangling blocker");
        assert!(indegree.contains_key(&edge.blocked), "dangling blocked");
        *indegree.get_mut(&edge.blocked).unwrap() += 1;
        outgoing.entry(edge.blocker).or_default().push(edge.blocked);
    }

    let mut ready: VecDeque<IssueId> = indegree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut ordered = 0;
    while let Some(id) = ready.pop_front() {
        ordered += 1;
        for next in outgoing.get(&id).into_iter().flatten() {
            let d = indegree.get_mut(next).unwrap();
            *d -= 1;
            if *d == 0 {
                ready.push_back(*next);
            }
        }
    }
    assert_eq!(ordered, issues.len(), "blocking edges contain a cycle");
}

fn check_sequence<S: Store>(store: S, ops: &[Op]) {
    let (engine, ids) = setup(store);
    for op in ops {
        let before = snapshot(&engine);
        let result = apply(&engine, &ids, op);
        let after = snapshot(&engine);
        if result.is_err() {
            assert_eq!(before, after, "failed {op:?} changed the store");
        }
        assert_forest(&after.0);
        assert_dag(&after.0, &after.1);
    }
    assert!(engine.verify().unwrap().is_clean());
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..Default::default()
    })]

    #[test]
    fn invariants_hold_on_memory_store(ops in prop::collection::vec(op_strategy(), 1..40)) {
        init_test_logging();
        info!("memory store sequence: {} ops", ops.len());
        check_sequence(MemoryStore::new(), &ops);
    }

    #[test]
    fn invariants_hold_on_sqlite_store(ops in prop::collection::vec(op_strategy(), 1..40)) {
        init_test_logging();
        info!("sqlite store sequence: {} ops", ops.len());
        check_sequence(SqliteStore::open_in_memory().unwrap(), &ops);
    }

    #[test]
    fn parent_chain_is_never_closed(len in 2..ISSUES) {
        init_test_logging();
        let (engine, ids) = setup(MemoryStore::new());
        for pair in ids[..len].windows(2) {
            engine.reparent_issue(pair[1], Some(pair[0])).unwrap();
        }
        let result = engine.reparent_issue(ids[0], Some(ids[len - 1]));
        prop_assert!(
            matches!(result, Err(trellis_core::Error::CycleDetected { .. })),
            "expected a cycle error"
        );
        prop_assert_eq!(engine.ancestors(ids[len - 1]).unwrap().len(), len - 1);
    }
}
