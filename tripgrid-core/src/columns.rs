//! Side-by-side columns for temporally overlapping items on one day.
//!
//! Greedy interval colouring over items sorted by start time, followed by
//! a per-cluster re-rank so that unrelated groups of overlapping items do
//! not widen each other's column count.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::item::{ItemId, Placement, TimeRange, TimedItem};

/// Horizontal slot of one item within its day column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSlot {
    /// Rank of the item's column within its overlap cluster.
    pub column: usize,
    /// Number of distinct columns used by the cluster. Always >= 1.
    pub total_columns: usize,
}

impl ColumnSlot {
    pub const FULL: ColumnSlot = ColumnSlot {
        column: 0,
        total_columns: 1,
    };

    /// Fraction of the day column's width.
    pub fn width(&self) -> f64 {
        1.0 / self.total_columns as f64
    }

    /// Left edge as a fraction of the day column's width.
    pub fn left(&self) -> f64 {
        self.column as f64 / self.total_columns as f64
    }
}

/// Column slots for the items of one day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnAssignment {
    slots: BTreeMap<ItemId, ColumnSlot>,
}

impl ColumnAssignment {
    pub fn get(&self, id: &ItemId) -> Option<ColumnSlot> {
        self.slots.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &ColumnSlot)> {
        self.slots.iter()
    }
}

fn layout_order(a: &(ItemId, TimeRange), b: &(ItemId, TimeRange)) -> Ordering {
    a.1.start
        .cmp(&b.1.start)
        .then(a.1.end.cmp(&b.1.end))
        .then(a.1.duration().cmp(&b.1.duration()))
        .then(a.0.cmp(&b.0))
}

/// Assign columns to already-clipped ranges.
pub fn pack_ranges(mut entries: Vec<(ItemId, TimeRange)>) -> ColumnAssignment {
    entries.sort_by(layout_order);

    // End of the most recently placed range in each column.
    let mut column_ends: Vec<TimeRange> = Vec::new();
    let mut raw_columns = Vec::with_capacity(entries.len());

    for (_, range) in &entries {
        let free = column_ends.iter().position(|last| !last.overlaps(range));
        let column = match free {
            Some(index) => {
                column_ends[index] = *range;
                index
            }
            None => {
                column_ends.push(*range);
                column_ends.len() - 1
            }
        };
        raw_columns.push(column);
    }

    let mut slots = BTreeMap::new();
    let mut cluster_start = 0;
    while cluster_start < entries.len() {
        // Sorted by start, a cluster extends while the next start falls
        // before the furthest end seen so far.
        let mut cluster_end = cluster_start + 1;
        let mut reach = entries[cluster_start].1.end;
        while cluster_end < entries.len() && entries[cluster_end].1.start < reach {
            reach = reach.max(entries[cluster_end].1.end);
            cluster_end += 1;
        }

        let mut used: Vec<usize> = raw_columns[cluster_start..cluster_end].to_vec();
        used.sort_unstable();
        used.dedup();

        for index in cluster_start..cluster_end {
            let column = used.binary_search(&raw_columns[index]).unwrap_or(0);
            slots.insert(
                entries[index].0.clone(),
                ColumnSlot {
                    column,
                    total_columns: used.len(),
                },
            );
        }

        tracing::trace!(
            size = cluster_end - cluster_start,
            columns = used.len(),
            "packed overlap cluster"
        );
        cluster_start = cluster_end;
    }

    ColumnAssignment { slots }
}

/// Assign columns to the timed items touching `date`, each clipped to the day.
///
/// Bars and items without a valid range are left out.
pub fn pack_day(date: NaiveDate, items: &[TimedItem]) -> ColumnAssignment {
    let day = TimeRange::whole_day(date);
    let entries = items
        .iter()
        .filter(|item| match item.kind.placement() {
            Placement::Timed => true,
            Placement::Bar => false,
        })
        .filter_map(|item| {
            let clipped = item.range()?.intersect(&day)?;
            Some((item.id.clone(), clipped))
        })
        .collect();
    pack_ranges(entries)
}
