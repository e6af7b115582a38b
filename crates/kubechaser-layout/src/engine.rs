// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
LayoutEngine - thread-safe facade over the slot table.

The table and the rendering backend share one mutex, so a reservation's
duplicate check, visual creation, collision scan and mutation happen in a
single critical section. Pending deletions have their own mutex; whenever
both are needed the pending lock is taken first.
*/

use parking_lot::Mutex;
use tracing::debug;

use crate::allocator::Reservation;
use crate::gc::{self, CollectReport, PendingDeletions};
use crate::settings::LayoutSettings;
use crate::signature::ResourceSignature;
use crate::slot::SlotEntry;
use crate::snapshot::{LayoutSnapshot, NamespaceBounds};
use crate::status::ResourceStatus;
use crate::table::SlotTable;
use crate::types::Position;
use crate::visual::{VisualBackend, VisualStyle};

struct LayoutState<B> {
    table: SlotTable,
    backend: B,
}

/// Slot table, backend and deletion tracking behind their own locks
pub struct LayoutEngine<B: VisualBackend> {
    settings: LayoutSettings,
    state: Mutex<LayoutState<B>>,
    pending: Mutex<PendingDeletions>,
}

impl<B: VisualBackend> LayoutEngine<B> {
    pub fn new(settings: LayoutSettings, backend: B) -> Self {
        let table = SlotTable::with_settings(&settings);
        Self {
            settings,
            state: Mutex::new(LayoutState { table, backend }),
            pending: Mutex::new(PendingDeletions::new()),
        }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Create a visual for a new resource and give it a slot
    ///
    /// Duplicate signatures return `Reservation::Duplicate` without touching
    /// the backend. This includes a signature still fading out after a
    /// delete: the create is dropped and the entry is evicted once its fade
    /// completes.
    pub fn reserve(
        &self,
        signature: ResourceSignature,
        owned_by: Vec<ResourceSignature>,
        status: ResourceStatus,
    ) -> Reservation {
        let mut state = self.state.lock();
        if state.table.contains(&signature) {
            drop(state);
            if self.pending.lock().contains(&signature) {
                debug!(
                    target: "kubechaser-layout",
                    "Create for {} ignored, previous visual still fading", signature
                );
            } else {
                debug!(
                    target: "kubechaser-layout",
                    "Create for existing {} ignored", signature
                );
            }
            return Reservation::Duplicate;
        }

        let style = VisualStyle::for_resource(signature.kind, &status);
        let spawn = self.settings.spawn_point(&mut rand::thread_rng());
        let visual = state.backend.create_visual(&signature, spawn, style);

        let entry = SlotEntry::new(signature, owned_by, visual, status);
        let reservation = state.table.reserve(entry);
        if let Reservation::Placed { placements, .. } = &reservation {
            for placement in placements {
                state
                    .backend
                    .reposition_visual(placement.visual, placement.position);
            }
        }
        reservation
    }

    /// Store a new status and restyle the visual; false if the signature is unknown
    pub fn update_status(&self, signature: &ResourceSignature, status: ResourceStatus) -> bool {
        let mut state = self.state.lock();
        let LayoutState { table, backend } = &mut *state;
        let Some(entry) = table.entry_mut(signature) else {
            debug!(
                target: "kubechaser-layout",
                "Status update for unknown {} ignored", signature
            );
            return false;
        };

        let style = VisualStyle::for_resource(signature.kind, &status);
        entry.status = status;
        backend.update_visual(entry.visual, style);
        true
    }

    /// Start fading out a resource's visual
    pub fn mark_deleting(&self, signature: &ResourceSignature) -> bool {
        let mut pending = self.pending.lock();
        let mut state = self.state.lock();
        let LayoutState { table, backend } = &mut *state;
        gc::mark_deleting(&mut pending, table, backend, signature)
    }

    /// Evict every entry whose fade-out has finished
    pub fn collect(&self) -> CollectReport {
        let mut pending = self.pending.lock();
        if pending.is_empty() {
            return CollectReport::default();
        }
        let mut state = self.state.lock();
        let LayoutState { table, backend } = &mut *state;
        gc::collect(&mut pending, table, backend)
    }

    pub fn contains(&self, signature: &ResourceSignature) -> bool {
        self.state.lock().table.contains(signature)
    }

    pub fn len(&self) -> usize {
        self.state.lock().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().table.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        self.state.lock().table.snapshot()
    }

    pub fn bounds(&self, namespace: &str, padding: Position) -> Option<NamespaceBounds> {
        self.state.lock().table.bounds(namespace, padding)
    }

    /// Run `f` against the table while holding the lock
    pub fn with_table<R>(&self, f: impl FnOnce(&SlotTable) -> R) -> R {
        f(&self.state.lock().table)
    }

    /// Run `f` against the backend while holding the lock
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        f(&mut self.state.lock().backend)
    }
}
