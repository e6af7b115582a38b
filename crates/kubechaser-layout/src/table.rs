// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
SlotTable - namespace-keyed rows of slot entries.

The table is the authoritative layout state. Insertion lives in
`allocator.rs` and row consolidation in `merge.rs`; this module holds the
storage, lookups, offset resync and eviction.
*/

use ahash::{AHashMap, AHashSet};
use tracing::{debug, info};

use crate::kind::KindPrecedence;
use crate::settings::LayoutSettings;
use crate::signature::ResourceSignature;
use crate::slot::{Row, SlotEntry};
use crate::snapshot::{EntrySnapshot, LayoutSnapshot, NamespaceBounds, NamespaceSnapshot};
use crate::types::Position;
use crate::visual::VisualHandle;

/// New position for a visual after a resync
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub visual: VisualHandle,
    pub position: Position,
}

/// Result of removing an entry from the table
#[derive(Debug, Clone)]
pub struct Eviction {
    pub entry: SlotEntry,
    /// Positions of the surviving entries in the namespace
    pub placements: Vec<Placement>,
}

/// Mapping from namespace to ordered rows
///
/// # Design Notes
///
/// - Namespace order is append-only; a namespace keeps its index even after
///   its last row is evicted
/// - `members` mirrors every signature in `rows` for constant-time duplicate checks
#[derive(Debug, Clone)]
pub struct SlotTable {
    pub(crate) rows: AHashMap<String, Vec<Row>>,
    namespace_order: Vec<String>,
    pub(crate) members: AHashSet<ResourceSignature>,
    pub(crate) stride: f32,
    pub(crate) precedence: KindPrecedence,
}

impl SlotTable {
    pub fn new(stride: f32, precedence: KindPrecedence) -> Self {
        Self {
            rows: AHashMap::new(),
            namespace_order: Vec::new(),
            members: AHashSet::new(),
            stride,
            precedence,
        }
    }

    pub fn with_settings(settings: &LayoutSettings) -> Self {
        Self::new(settings.stride, settings.precedence.clone())
    }

    pub fn stride(&self) -> f32 {
        self.stride
    }

    pub fn precedence(&self) -> &KindPrecedence {
        &self.precedence
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, signature: &ResourceSignature) -> bool {
        self.members.contains(signature)
    }

    /// Namespaces in first-seen order, including ones with no rows left
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespace_order.iter().map(String::as_str)
    }

    pub fn namespace_index(&self, namespace: &str) -> Option<usize> {
        self.namespace_order.iter().position(|ns| ns == namespace)
    }

    /// Index for `namespace`, registering it and creating an empty bucket if needed
    pub(crate) fn ensure_namespace(&mut self, namespace: &str) -> usize {
        let index = match self.namespace_index(namespace) {
            Some(index) => index,
            None => {
                debug!(target: "kubechaser-layout", "New namespace {}", namespace);
                self.namespace_order.push(namespace.to_string());
                self.namespace_order.len() - 1
            }
        };
        self.rows.entry(namespace.to_string()).or_default();
        index
    }

    /// Rows of a namespace; empty if the namespace has no bucket
    pub fn rows(&self, namespace: &str) -> &[Row] {
        self.rows.get(namespace).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_bucket(&self, namespace: &str) -> bool {
        self.rows.contains_key(namespace)
    }

    /// (row index, index within row) of a signature
    pub fn locate(&self, signature: &ResourceSignature) -> Option<(usize, usize)> {
        if !self.members.contains(signature) {
            return None;
        }
        self.rows(&signature.namespace)
            .iter()
            .enumerate()
            .find_map(|(r, row)| row.position_of(signature).map(|c| (r, c)))
    }

    pub fn entry(&self, signature: &ResourceSignature) -> Option<&SlotEntry> {
        let (r, c) = self.locate(signature)?;
        self.rows(&signature.namespace)
            .get(r)
            .and_then(|row| row.entries().get(c))
    }

    pub fn entry_mut(&mut self, signature: &ResourceSignature) -> Option<&mut SlotEntry> {
        let (r, c) = self.locate(signature)?;
        self.rows
            .get_mut(&signature.namespace)
            .and_then(|rows| rows.get_mut(r))
            .and_then(|row| row.entries_mut().get_mut(c))
    }

    /// Recompute positions for one row from its current order
    pub fn resync_row(&mut self, namespace: &str, row_index: usize) -> Vec<Placement> {
        let Some(ns_index) = self.namespace_index(namespace) else {
            return Vec::new();
        };
        let stride = self.stride;
        let Some(row) = self
            .rows
            .get_mut(namespace)
            .and_then(|rows| rows.get_mut(row_index))
        else {
            return Vec::new();
        };

        row.entries_mut()
            .iter_mut()
            .enumerate()
            .map(|(column, entry)| {
                entry.position = Position::slot(row_index, ns_index, column, stride);
                Placement {
                    visual: entry.visual,
                    position: entry.position,
                }
            })
            .collect()
    }

    /// Recompute positions for every row of a namespace
    pub fn resync_namespace(&mut self, namespace: &str) -> Vec<Placement> {
        let row_count = self.rows(namespace).len();
        (0..row_count)
            .flat_map(|r| self.resync_row(namespace, r))
            .collect()
    }

    /// Remove an entry, dropping its row and namespace bucket if they empty out
    ///
    /// Rows are not split when the removed entry was the only link between
    /// its neighbours.
    pub fn evict(&mut self, signature: &ResourceSignature) -> Option<Eviction> {
        let (row_index, _) = self.locate(signature)?;
        let namespace = signature.namespace.as_str();
        let rows = self.rows.get_mut(namespace)?;

        let entry = rows[row_index].remove(signature)?;
        self.members.remove(signature);

        if rows[row_index].is_empty() {
            rows.remove(row_index);
        }
        if rows.is_empty() {
            self.rows.remove(namespace);
            info!(
                target: "kubechaser-layout",
                "Evicted {} (namespace {} now empty)", signature, namespace
            );
            return Some(Eviction {
                entry,
                placements: Vec::new(),
            });
        }

        info!(target: "kubechaser-layout", "Evicted {}", signature);
        let placements = self.resync_namespace(namespace);
        Some(Eviction { entry, placements })
    }

    /// Center and size of the box around a namespace's synchronised positions
    pub fn bounds(&self, namespace: &str, padding: Position) -> Option<NamespaceBounds> {
        let mut positions = self
            .rows(namespace)
            .iter()
            .flat_map(Row::iter)
            .map(|e| e.position);
        let first = positions.next()?;
        let (min, max) = positions.fold((first, first), |(lo, hi), p| {
            (
                Position::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Position::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        });

        Some(NamespaceBounds {
            center: Position::new(
                (min.x + max.x) / 2.0,
                (min.y + max.y) / 2.0,
                (min.z + max.z) / 2.0,
            ),
            extent: Position::new(
                max.x - min.x + 2.0 * padding.x,
                max.y - min.y + 2.0 * padding.y,
                max.z - min.z + 2.0 * padding.z,
            ),
        })
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        let namespaces = self
            .namespace_order
            .iter()
            .enumerate()
            .filter_map(|(index, namespace)| {
                let rows = self.rows.get(namespace)?;
                Some(NamespaceSnapshot {
                    namespace: namespace.clone(),
                    index,
                    rows: rows
                        .iter()
                        .map(|row| {
                            row.iter()
                                .map(|e| EntrySnapshot {
                                    signature: e.signature.clone(),
                                    owned_by: e.owned_by.clone(),
                                    status: e.status.clone(),
                                    position: e.position,
                                })
                                .collect()
                        })
                        .collect(),
                })
            })
            .collect();
        LayoutSnapshot { namespaces }
    }

    /// Every signature appears exactly once and `members` matches the rows
    pub fn signatures_unique(&self) -> bool {
        let mut seen = AHashSet::new();
        let all_unique = self
            .rows
            .values()
            .flat_map(|rows| rows.iter())
            .flat_map(Row::iter)
            .all(|e| seen.insert(&e.signature));
        all_unique && seen.len() == self.members.len()
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::with_settings(&LayoutSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ResourceKind;
    use crate::status::ResourceStatus;

    fn sig(kind: ResourceKind, name: &str, ns: &str) -> ResourceSignature {
        ResourceSignature::new(kind, name, ns)
    }

    fn push_row(table: &mut SlotTable, entries: Vec<ResourceSignature>) {
        let ns = entries[0].namespace.clone();
        table.ensure_namespace(&ns);
        let mut row = Row::default();
        for (i, s) in entries.into_iter().enumerate() {
            table.members.insert(s.clone());
            row.absorb(Row::singleton(SlotEntry::new(
                s,
                Vec::new(),
                VisualHandle::new(i as u64),
                ResourceStatus::Opaque,
            )));
        }
        table.rows.get_mut(&ns).unwrap().push(row);
    }

    #[test]
    fn test_resync_row_positions() {
        let mut table = SlotTable::default();
        push_row(&mut table, vec![sig(ResourceKind::Deployment, "d0", "a")]);
        push_row(&mut table, vec![sig(ResourceKind::Deployment, "x", "b")]);
        push_row(
            &mut table,
            vec![
                sig(ResourceKind::Deployment, "d1", "b"),
                sig(ResourceKind::Pod, "p1", "b"),
            ],
        );

        let placements = table.resync_row("b", 1);

        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].position, Position::new(6.0, 6.0, 0.0));
        assert_eq!(placements[1].position, Position::new(6.0, 6.0, 6.0));
        assert_eq!(
            table.entry(&sig(ResourceKind::Pod, "p1", "b")).unwrap().position,
            Position::new(6.0, 6.0, 6.0)
        );
    }

    #[test]
    fn test_resync_unknown_row_is_empty() {
        let mut table = SlotTable::default();
        assert!(table.resync_row("nowhere", 0).is_empty());
        assert!(table.resync_namespace("nowhere").is_empty());
    }

    #[test]
    fn test_evict_drops_empty_row_and_bucket() {
        let mut table = SlotTable::default();
        let d = sig(ResourceKind::Deployment, "d1", "a");
        push_row(&mut table, vec![d.clone()]);

        let eviction = table.evict(&d).unwrap();

        assert_eq!(eviction.entry.signature, d);
        assert!(eviction.placements.is_empty());
        assert!(!table.has_bucket("a"));
        assert!(table.is_empty());
        // Namespace keeps its index for later arrivals
        assert_eq!(table.namespace_index("a"), Some(0));
        assert!(table.evict(&d).is_none());
    }

    #[test]
    fn test_evict_resyncs_survivors() {
        let mut table = SlotTable::default();
        let d1 = sig(ResourceKind::Deployment, "d1", "a");
        let d2 = sig(ResourceKind::Deployment, "d2", "a");
        push_row(&mut table, vec![d1.clone()]);
        push_row(&mut table, vec![d2.clone()]);
        table.resync_namespace("a");

        let eviction = table.evict(&d1).unwrap();

        assert_eq!(eviction.placements.len(), 1);
        assert_eq!(table.entry(&d2).unwrap().position, Position::ORIGIN);
        assert_eq!(table.locate(&d2), Some((0, 0)));
    }

    #[test]
    fn test_bounds() {
        let mut table = SlotTable::default();
        push_row(
            &mut table,
            vec![
                sig(ResourceKind::Deployment, "d1", "a"),
                sig(ResourceKind::ReplicaSet, "rs1", "a"),
                sig(ResourceKind::Pod, "p1", "a"),
            ],
        );
        push_row(&mut table, vec![sig(ResourceKind::Deployment, "d2", "a")]);
        table.resync_namespace("a");

        let bounds = table.bounds("a", Position::new(5.0, 3.0, 5.0)).unwrap();

        assert_eq!(bounds.center, Position::new(3.0, 0.0, 6.0));
        assert_eq!(bounds.extent, Position::new(16.0, 6.0, 22.0));
        assert!(table.bounds("missing", Position::ORIGIN).is_none());
    }

    #[test]
    fn test_snapshot_in_namespace_order() {
        let mut table = SlotTable::default();
        push_row(&mut table, vec![sig(ResourceKind::Deployment, "z", "zeta")]);
        push_row(&mut table, vec![sig(ResourceKind::Deployment, "a", "alpha")]);

        let snapshot = table.snapshot();

        let order: Vec<_> = snapshot.namespaces.iter().map(|n| n.namespace.as_str()).collect();
        assert_eq!(order, vec!["zeta", "alpha"]);
        assert_eq!(snapshot.entry_count(), 2);
        assert!(table.signatures_unique());
    }
}
