// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Layout Properties
//!
//! Property tests over random reservation sequences:
//! - No signature appears twice
//! - Entries joined by an ownership edge share a row
//! - Every row stays in kind precedence order, unranked kinds last
//! - Offset resync is idempotent and matches the grid formula

use std::collections::HashSet;

use kubechaser_layout::{
    Position, ResourceKind, ResourceSignature, ResourceStatus, SlotEntry, SlotTable, VisualHandle,
};
use proptest::prelude::*;

const NAMESPACES: [&str; 2] = ["a", "b"];
const KINDS: [ResourceKind; 4] = [
    ResourceKind::Deployment,
    ResourceKind::ReplicaSet,
    ResourceKind::Pod,
    ResourceKind::Service,
];

#[derive(Debug, Clone)]
struct Op {
    namespace: usize,
    kind: usize,
    name: usize,
    owner: Option<(usize, usize)>,
}

impl Op {
    fn signature(&self) -> ResourceSignature {
        ResourceSignature::new(
            KINDS[self.kind],
            format!("r{}", self.name),
            NAMESPACES[self.namespace],
        )
    }

    fn owner(&self) -> Option<ResourceSignature> {
        self.owner.map(|(kind, name)| {
            ResourceSignature::new(KINDS[kind], format!("r{}", name), NAMESPACES[self.namespace])
        })
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    (0..2usize, 0..4usize, 0..6usize, proptest::option::of((0..4usize, 0..6usize))).prop_map(
        |(namespace, kind, name, owner)| Op {
            namespace,
            kind,
            name,
            owner,
        },
    )
}

fn build(ops: &[Op]) -> SlotTable {
    let mut table = SlotTable::default();
    for (i, op) in ops.iter().enumerate() {
        table.reserve(SlotEntry::new(
            op.signature(),
            op.owner(),
            VisualHandle::new(i as u64),
            ResourceStatus::Opaque,
        ));
    }
    table
}

proptest! {
    /// Property: every signature is stored once, however often it is reserved
    #[test]
    fn prop_signatures_unique(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let table = build(&ops);
        let distinct: HashSet<ResourceSignature> = ops.iter().map(Op::signature).collect();

        prop_assert!(table.signatures_unique());
        prop_assert_eq!(table.len(), distinct.len());
        prop_assert_eq!(table.snapshot().entry_count(), distinct.len());
    }

    /// Property: an owner present in the table sits in its child's row
    #[test]
    fn prop_owned_entries_share_row(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let table = build(&ops);

        for namespace in NAMESPACES {
            for row in table.rows(namespace) {
                for entry in row.iter() {
                    for owner in &entry.owned_by {
                        if let Some((owner_row, _)) = table.locate(owner) {
                            let (entry_row, _) = table.locate(&entry.signature).unwrap();
                            prop_assert_eq!(
                                owner_row,
                                entry_row,
                                "{} and {} split",
                                entry.signature,
                                owner
                            );
                        }
                    }
                }
            }
        }
    }

    /// Property: rows are ordered by kind precedence whatever the arrival order
    #[test]
    fn prop_rows_sorted_by_precedence(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let table = build(&ops);
        let precedence = table.precedence();

        for namespace in NAMESPACES {
            for row in table.rows(namespace) {
                let kinds: Vec<ResourceKind> = row.iter().map(|e| e.signature.kind).collect();
                prop_assert!(row.is_sorted_by_precedence(precedence), "unsorted row {:?}", kinds);
            }
        }
    }

    /// Property: resync twice without mutation gives identical positions
    #[test]
    fn prop_resync_idempotent(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut table = build(&ops);
        let before = table.snapshot();

        for namespace in NAMESPACES {
            let first = table.resync_namespace(namespace);
            let second = table.resync_namespace(namespace);
            prop_assert_eq!(first, second);
        }
        prop_assert_eq!(table.snapshot(), before);
    }

    /// Property: stored positions follow (row, namespace, column) × stride
    #[test]
    fn prop_positions_match_grid(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let table = build(&ops);
        let stride = table.stride();

        for namespace in table.namespaces() {
            let ns_index = table.namespace_index(namespace).unwrap();
            for (r, row) in table.rows(namespace).iter().enumerate() {
                for (c, entry) in row.iter().enumerate() {
                    prop_assert_eq!(entry.position, Position::slot(r, ns_index, c, stride));
                }
            }
        }
    }
}
