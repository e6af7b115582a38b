// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Row merging.

After an insertion, any other row holding an owner or owned resource of the
inserted entry is folded into the insertion row. A new mid-tier entry can
bridge two rows that were previously separate (a Deployment's row and a
stray Pod's row when their ReplicaSet arrives), so the scan always covers
every row of the namespace.
*/

use tracing::info;

use crate::slot::SlotEntry;
use crate::table::{Placement, SlotTable};

/// Outcome of `SlotTable::flatten`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenOutcome {
    /// Index of the merged row once the absorbed rows are gone
    pub row_index: usize,
    pub merged_rows: usize,
    /// Positions for the whole namespace; empty when nothing merged
    pub placements: Vec<Placement>,
}

impl SlotTable {
    /// Fold rows that collide with `inserted` into row `inserted_row`
    ///
    /// Absorbed rows are concatenated in their original order, de-duplicated
    /// by signature (first occurrence wins) and stably re-sorted by kind
    /// precedence. Emptied rows are removed from the highest index down, then
    /// every row in the namespace is resynced.
    pub fn flatten(
        &mut self,
        namespace: &str,
        inserted: &SlotEntry,
        inserted_row: usize,
    ) -> FlattenOutcome {
        let precedence = &self.precedence;
        let Some(rows) = self.rows.get_mut(namespace) else {
            return FlattenOutcome {
                row_index: inserted_row,
                ..FlattenOutcome::default()
            };
        };
        if inserted_row >= rows.len() {
            return FlattenOutcome {
                row_index: inserted_row,
                ..FlattenOutcome::default()
            };
        }

        let collected: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(index, row)| *index != inserted_row && row.collides_with(inserted))
            .map(|(index, _)| index)
            .collect();

        if collected.is_empty() {
            return FlattenOutcome {
                row_index: inserted_row,
                ..FlattenOutcome::default()
            };
        }

        for &index in &collected {
            let absorbed = std::mem::take(&mut rows[index]);
            rows[inserted_row].absorb(absorbed);
        }
        rows[inserted_row].sort_by_precedence(precedence);

        for &index in collected.iter().rev() {
            rows.remove(index);
        }
        let row_index = inserted_row - collected.iter().filter(|&&i| i < inserted_row).count();

        info!(
            target: "kubechaser-layout",
            "Merged {} row(s) into row {} of namespace {} after placing {}",
            collected.len(),
            row_index,
            namespace,
            inserted.signature
        );

        let placements = self.resync_namespace(namespace);
        FlattenOutcome {
            row_index,
            merged_rows: collected.len(),
            placements,
        }
    }
}
