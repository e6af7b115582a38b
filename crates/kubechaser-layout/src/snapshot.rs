// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Serializable views of the slot table, for debugging and replay output.

use serde::{Deserialize, Serialize};

use crate::signature::ResourceSignature;
use crate::status::ResourceStatus;
use crate::types::Position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub signature: ResourceSignature,
    pub owned_by: Vec<ResourceSignature>,
    pub status: ResourceStatus,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceSnapshot {
    pub namespace: String,
    /// Stable index of the namespace, used for its y offset
    pub index: usize,
    pub rows: Vec<Vec<EntrySnapshot>>,
}

/// Whole-table view in namespace order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub namespaces: Vec<NamespaceSnapshot>,
}

impl LayoutSnapshot {
    pub fn namespace(&self, namespace: &str) -> Option<&NamespaceSnapshot> {
        self.namespaces.iter().find(|ns| ns.namespace == namespace)
    }

    /// Names per row for one namespace; empty if the namespace has no rows
    pub fn row_names(&self, namespace: &str) -> Vec<Vec<String>> {
        self.namespace(namespace)
            .map(|ns| {
                ns.rows
                    .iter()
                    .map(|row| row.iter().map(|e| e.signature.name.clone()).collect())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn entry_count(&self) -> usize {
        self.namespaces
            .iter()
            .flat_map(|ns| ns.rows.iter())
            .map(Vec::len)
            .sum()
    }
}

/// Axis-aligned box around a namespace's slots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NamespaceBounds {
    pub center: Position,
    /// Full size along each axis, padding included on both sides
    pub extent: Position,
}
