// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Deferred deletion.

`mark_deleting` only starts the backend's fade-out and records the entry;
the table is untouched until `collect` sees the fade has finished, at which
point the slot is evicted and the visual destroyed.

```text
Live --mark_deleting--> Deleting --fade complete + collect--> Evicted
```
*/

use tracing::debug;

use crate::signature::ResourceSignature;
use crate::table::SlotTable;
use crate::visual::{VisualBackend, VisualHandle};

/// An entry whose visual is fading out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    pub signature: ResourceSignature,
    pub visual: VisualHandle,
}

/// Entries told to fade out but not yet evicted, in marking order
#[derive(Debug, Clone, Default)]
pub struct PendingDeletions {
    entries: Vec<PendingDeletion>,
}

impl PendingDeletions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, signature: &ResourceSignature) -> bool {
        self.entries.iter().any(|p| &p.signature == signature)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingDeletion> {
        self.entries.iter()
    }

    /// Start tracking; returns false if already tracked
    pub fn track(&mut self, signature: ResourceSignature, visual: VisualHandle) -> bool {
        if self.contains(&signature) {
            return false;
        }
        self.entries.push(PendingDeletion { signature, visual });
        true
    }

    /// Remove the given positions, highest first so earlier indices stay valid
    pub fn remove_indices(&mut self, indices: &[usize]) -> Vec<PendingDeletion> {
        let mut sorted = indices.to_vec();
        sorted.sort();
        sorted.dedup();

        let mut removed = Vec::with_capacity(sorted.len());
        for &index in sorted.iter().rev() {
            if index < self.entries.len() {
                removed.push(self.entries.remove(index));
            }
        }
        removed.reverse();
        removed
    }
}

/// Summary of one `collect` sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectReport {
    /// Signatures evicted from the table, in marking order
    pub evicted: Vec<ResourceSignature>,
    /// Entries still waiting for their fade to finish
    pub still_pending: usize,
}

/// Begin the fade-out for `signature`
///
/// Returns false (and does nothing) if the signature is not in the table or
/// is already fading.
pub fn mark_deleting<B: VisualBackend + ?Sized>(
    pending: &mut PendingDeletions,
    table: &SlotTable,
    backend: &mut B,
    signature: &ResourceSignature,
) -> bool {
    let Some(entry) = table.entry(signature) else {
        debug!(
            target: "kubechaser-layout",
            "Ignoring delete for unknown {}", signature
        );
        return false;
    };
    if pending.contains(signature) {
        debug!(target: "kubechaser-layout", "{} is already fading", signature);
        return false;
    }

    backend.begin_fade_out(entry.visual);
    pending.track(signature.clone(), entry.visual);
    debug!(target: "kubechaser-layout", "Fading out {}", signature);
    true
}

/// Evict every tracked entry whose fade has completed
///
/// Safe to call at any time; a sweep with nothing ready changes nothing.
pub fn collect<B: VisualBackend + ?Sized>(
    pending: &mut PendingDeletions,
    table: &mut SlotTable,
    backend: &mut B,
) -> CollectReport {
    if pending.is_empty() {
        return CollectReport::default();
    }

    let ready: Vec<usize> = pending
        .iter()
        .enumerate()
        .filter(|(_, p)| backend.is_fade_complete(p.visual))
        .map(|(index, _)| index)
        .collect();

    let mut evicted = Vec::with_capacity(ready.len());
    for &index in &ready {
        let Some(deletion) = pending.entries.get(index) else {
            continue;
        };
        if let Some(eviction) = table.evict(&deletion.signature) {
            for placement in eviction.placements {
                backend.reposition_visual(placement.visual, placement.position);
            }
        }
        backend.destroy_visual(deletion.visual);
        evicted.push(deletion.signature.clone());
    }

    pending.remove_indices(&ready);

    CollectReport {
        evicted,
        still_pending: pending.len(),
    }
}
