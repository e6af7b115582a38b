// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Slot entries and rows.

A row is an ordered run of entries belonging to one ownership chain, laid
out along the z axis in precedence order (ancestors first).
*/

use ahash::AHashSet;

use crate::kind::{KindPrecedence, PlacementClass};
use crate::signature::ResourceSignature;
use crate::status::ResourceStatus;
use crate::types::Position;
use crate::visual::VisualHandle;

/// One live resource occupying a slot
#[derive(Debug, Clone, PartialEq)]
pub struct SlotEntry {
    pub signature: ResourceSignature,
    /// Signatures this resource is owned by (no duplicates)
    pub owned_by: Vec<ResourceSignature>,
    pub visual: VisualHandle,
    pub status: ResourceStatus,
    /// Last position handed to the backend
    pub position: Position,
}

impl SlotEntry {
    pub fn new<I>(
        signature: ResourceSignature,
        owned_by: I,
        visual: VisualHandle,
        status: ResourceStatus,
    ) -> Self
    where
        I: IntoIterator<Item = ResourceSignature>,
    {
        let mut seen = AHashSet::new();
        let owned_by = owned_by
            .into_iter()
            .filter(|owner| *owner != signature && seen.insert(owner.clone()))
            .collect();
        Self {
            signature,
            owned_by,
            visual,
            status,
            position: Position::ORIGIN,
        }
    }

    pub fn is_owned_by(&self, owner: &ResourceSignature) -> bool {
        self.owned_by.iter().any(|o| o == owner)
    }

    /// Ownership edge in either direction
    pub fn collides_with(&self, other: &SlotEntry) -> bool {
        self.is_owned_by(&other.signature) || other.is_owned_by(&self.signature)
    }
}

/// Ordered entries of one ownership group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<SlotEntry>,
}

impl Row {
    pub fn singleton(entry: SlotEntry) -> Self {
        Self {
            entries: vec![entry],
        }
    }

    pub fn entries(&self) -> &[SlotEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [SlotEntry] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotEntry> {
        self.entries.iter()
    }

    pub fn position_of(&self, signature: &ResourceSignature) -> Option<usize> {
        self.entries.iter().position(|e| &e.signature == signature)
    }

    pub fn contains(&self, signature: &ResourceSignature) -> bool {
        self.position_of(signature).is_some()
    }

    /// True if any member has an ownership edge to `candidate`
    pub fn collides_with(&self, candidate: &SlotEntry) -> bool {
        self.entries.iter().any(|e| e.collides_with(candidate))
    }

    /// Insert according to the kind's placement class, returning the index used
    ///
    /// Ancestors are prepended. Every other kind goes after the entries that
    /// sort at or before it and ahead of the first one that sorts after it:
    /// a mid kind lands before the first descendant or unranked entry, a
    /// descendant before the first unranked entry, and unranked kinds at the
    /// end. A row sorted by precedence stays sorted.
    pub fn insert(&mut self, entry: SlotEntry, precedence: &KindPrecedence) -> usize {
        let index = match precedence.class(entry.signature.kind) {
            PlacementClass::Ancestor => 0,
            PlacementClass::Mid | PlacementClass::Descendant | PlacementClass::Other => {
                let key = precedence.sort_key(entry.signature.kind);
                self.entries
                    .iter()
                    .position(|e| precedence.sort_key(e.signature.kind) > key)
                    .unwrap_or(self.entries.len())
            }
        };
        self.entries.insert(index, entry);
        index
    }

    /// True if entries are in non-decreasing precedence order
    pub fn is_sorted_by_precedence(&self, precedence: &KindPrecedence) -> bool {
        let keys: Vec<_> = self
            .entries
            .iter()
            .map(|e| precedence.sort_key(e.signature.kind))
            .collect();
        keys.windows(2).all(|pair| pair[0] <= pair[1])
    }

    /// Append another row's entries, keeping the first occurrence of each signature
    pub fn absorb(&mut self, other: Row) {
        let mut seen: AHashSet<ResourceSignature> =
            self.entries.iter().map(|e| e.signature.clone()).collect();
        for entry in other.entries {
            if seen.insert(entry.signature.clone()) {
                self.entries.push(entry);
            }
        }
    }

    /// Stable sort by kind rank; equal ranks keep their relative order
    pub fn sort_by_precedence(&mut self, precedence: &KindPrecedence) {
        self.entries.sort_by_key(|e| precedence.sort_key(e.signature.kind));
    }

    pub fn remove(&mut self, signature: &ResourceSignature) -> Option<SlotEntry> {
        let index = self.position_of(signature)?;
        Some(self.entries.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ResourceKind;

    fn entry(kind: ResourceKind, name: &str, owners: &[(ResourceKind, &str)]) -> SlotEntry {
        SlotEntry::new(
            ResourceSignature::new(kind, name, "ns"),
            owners
                .iter()
                .map(|(k, n)| ResourceSignature::new(*k, *n, "ns")),
            VisualHandle::new(0),
            ResourceStatus::Opaque,
        )
    }

    fn names(row: &Row) -> Vec<&str> {
        row.iter().map(|e| e.signature.name.as_str()).collect()
    }

    #[test]
    fn test_collision_is_bidirectional() {
        let rs = entry(ResourceKind::ReplicaSet, "rs1", &[]);
        let pod = entry(ResourceKind::Pod, "p1", &[(ResourceKind::ReplicaSet, "rs1")]);
        let other = entry(ResourceKind::Pod, "p2", &[(ResourceKind::ReplicaSet, "rs2")]);

        assert!(rs.collides_with(&pod));
        assert!(pod.collides_with(&rs));
        assert!(!rs.collides_with(&other));
    }

    #[test]
    fn test_owner_list_deduplicated() {
        let e = entry(
            ResourceKind::Pod,
            "p1",
            &[
                (ResourceKind::ReplicaSet, "rs1"),
                (ResourceKind::ReplicaSet, "rs1"),
                (ResourceKind::Pod, "p1"),
            ],
        );
        assert_eq!(e.owned_by.len(), 1);
    }

    #[test]
    fn test_insert_positions_by_class() {
        let precedence = KindPrecedence::default();
        let mut row = Row::singleton(entry(ResourceKind::Pod, "p1", &[]));

        row.insert(entry(ResourceKind::Pod, "p2", &[]), &precedence);
        row.insert(entry(ResourceKind::ReplicaSet, "rs1", &[]), &precedence);
        row.insert(entry(ResourceKind::Deployment, "d1", &[]), &precedence);
        row.insert(entry(ResourceKind::Service, "svc", &[]), &precedence);
        let mid = row.insert(entry(ResourceKind::ReplicaSet, "rs2", &[]), &precedence);

        assert_eq!(mid, 2);
        assert_eq!(names(&row), vec!["d1", "rs1", "rs2", "p1", "p2", "svc"]);
    }

    #[test]
    fn test_ranked_kinds_go_before_unranked() {
        let precedence = KindPrecedence::default();
        let mut row = Row::singleton(entry(ResourceKind::Deployment, "d1", &[]));
        row.insert(entry(ResourceKind::Secret, "s1", &[]), &precedence);

        let mid = row.insert(entry(ResourceKind::ReplicaSet, "rs1", &[]), &precedence);
        let descendant = row.insert(entry(ResourceKind::Pod, "p1", &[]), &precedence);
        row.insert(entry(ResourceKind::ConfigMap, "cm", &[]), &precedence);

        assert_eq!(mid, 1);
        assert_eq!(descendant, 2);
        assert_eq!(names(&row), vec!["d1", "rs1", "p1", "s1", "cm"]);
        assert!(row.is_sorted_by_precedence(&precedence));
    }

    #[test]
    fn test_mid_appends_without_descendants() {
        let precedence = KindPrecedence::default();
        let mut row = Row::singleton(entry(ResourceKind::Deployment, "d1", &[]));
        let index = row.insert(entry(ResourceKind::ReplicaSet, "rs1", &[]), &precedence);
        assert_eq!(index, 1);
    }

    #[test]
    fn test_absorb_keeps_first_occurrence() {
        let mut row = Row::singleton(entry(ResourceKind::Pod, "p1", &[]));
        let mut other = Row::singleton(entry(ResourceKind::Pod, "p2", &[]));
        other.entries.push(entry(
            ResourceKind::Pod,
            "p1",
            &[(ResourceKind::ReplicaSet, "rs9")],
        ));

        row.absorb(other);

        assert_eq!(names(&row), vec!["p1", "p2"]);
        assert!(row.entries()[0].owned_by.is_empty());
    }

    #[test]
    fn test_sort_is_stable() {
        let precedence = KindPrecedence::default();
        let mut row = Row::default();
        for (kind, name) in [
            (ResourceKind::Pod, "p-b"),
            (ResourceKind::ReplicaSet, "rs"),
            (ResourceKind::Pod, "p-a"),
            (ResourceKind::Secret, "s"),
            (ResourceKind::Deployment, "d"),
        ] {
            row.entries.push(entry(kind, name, &[]));
        }

        row.sort_by_precedence(&precedence);

        assert_eq!(names(&row), vec!["d", "rs", "p-b", "p-a", "s"]);
    }

    #[test]
    fn test_remove() {
        let mut row = Row::singleton(entry(ResourceKind::Pod, "p1", &[]));
        let sig = ResourceSignature::new(ResourceKind::Pod, "p1", "ns");
        assert!(row.remove(&sig).is_some());
        assert!(row.is_empty());
        assert!(row.remove(&sig).is_none());
    }
}
