// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Slot allocation.

A new entry joins the first row holding an owner or owned resource of it,
or starts a row of its own. Any further rows it connects to are folded in by
`flatten` before the call returns, so each reservation leaves the namespace
with ownership-connected rows merged.
*/

use tracing::debug;

use crate::slot::{Row, SlotEntry};
use crate::table::{Placement, SlotTable};

/// Outcome of `SlotTable::reserve`
#[derive(Debug, Clone, PartialEq)]
pub enum Reservation {
    /// Signature already present; table untouched
    Duplicate,
    Placed {
        /// Row holding the entry after merging
        row_index: usize,
        /// Number of other rows folded into it
        merged_rows: usize,
        /// Positions to push to the backend
        placements: Vec<Placement>,
    },
}

impl Reservation {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Reservation::Duplicate)
    }
}

impl SlotTable {
    /// Insert an entry into its namespace
    ///
    /// Duplicate signatures are a no-op. Collision scan and mutation happen
    /// under the same `&mut self`, so callers sharing the table behind a lock
    /// get an atomic reservation.
    pub fn reserve(&mut self, entry: SlotEntry) -> Reservation {
        if self.members.contains(&entry.signature) {
            debug!(
                target: "kubechaser-layout",
                "Ignoring duplicate reservation for {}", entry.signature
            );
            return Reservation::Duplicate;
        }

        let namespace = entry.signature.namespace.clone();
        self.ensure_namespace(&namespace);
        self.members.insert(entry.signature.clone());

        let candidate = entry.clone();
        let precedence = &self.precedence;
        let rows = self.rows.entry(namespace.clone()).or_default();

        let row_index = match rows.iter().position(|row| row.collides_with(&candidate)) {
            Some(index) => {
                let column = rows[index].insert(entry, precedence);
                debug!(
                    target: "kubechaser-layout",
                    "Placed {} in row {} at column {}", candidate.signature, index, column
                );
                index
            }
            None => {
                rows.push(Row::singleton(entry));
                debug!(
                    target: "kubechaser-layout",
                    "Placed {} in new row {}", candidate.signature, rows.len() - 1
                );
                rows.len() - 1
            }
        };

        let placements = self.resync_row(&namespace, row_index);
        let outcome = self.flatten(&namespace, &candidate, row_index);

        debug_assert!(self.signatures_unique(), "duplicate signature after reserve");

        if outcome.merged_rows == 0 {
            Reservation::Placed {
                row_index,
                merged_rows: 0,
                placements,
            }
        } else {
            Reservation::Placed {
                row_index: outcome.row_index,
                merged_rows: outcome.merged_rows,
                placements: outcome.placements,
            }
        }
    }
}
