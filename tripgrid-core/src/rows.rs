//! Row band packing for multi-day bars.
//!
//! Bars are whole-day spans. Sorting by first day and reusing the lowest row
//! that has already ended gives the minimum number of rows.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::GridConfig;
use crate::item::{ItemId, Placement, TimedItem};
use crate::window::DayWindow;

/// A whole-day span, both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub id: ItemId,
    pub first: NaiveDate,
    pub last: NaiveDate,
}

/// Where a bar is drawn in the band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarPlacement {
    pub id: ItemId,
    pub row: usize,
    /// Index of the first visible day the bar covers.
    pub first_day_index: usize,
    /// Number of visible days the bar covers.
    pub span_days: usize,
}

/// Row assignment for every bar in the visible window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowAssignment {
    placements: Vec<BarPlacement>,
    rows: BTreeMap<ItemId, usize>,
    row_count: usize,
}

impl RowAssignment {
    pub fn row_of(&self, id: &ItemId) -> Option<usize> {
        self.rows.get(id).copied()
    }

    pub fn placements(&self) -> &[BarPlacement] {
        &self.placements
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Height reserved above the hourly grid. The floor only applies to an
    /// empty band.
    pub fn band_height(&self, config: &GridConfig) -> f64 {
        if self.row_count == 0 {
            return config.min_band_height;
        }
        self.row_count as f64 * config.bar_row_height
    }
}

/// Assign rows to bars in the order given. Bars must be sorted by `first`.
///
/// A row is free for a bar when its current end is strictly before the bar's
/// first day, so a bar ending on the day another begins occupies its own row.
pub fn assign_rows(bars: &[Bar]) -> Vec<usize> {
    let mut row_ends: Vec<NaiveDate> = Vec::new();
    bars.iter()
        .map(|bar| match row_ends.iter().position(|end| *end < bar.first) {
            Some(row) => {
                row_ends[row] = bar.last;
                row
            }
            None => {
                row_ends.push(bar.last);
                row_ends.len() - 1
            }
        })
        .collect()
}

/// Pack the bar items that intersect `window`.
pub fn pack_bars(window: &DayWindow, items: &[TimedItem]) -> RowAssignment {
    let (Some(window_first), Some(window_last)) = (window.first(), window.last()) else {
        return RowAssignment::default();
    };

    let mut bars: Vec<Bar> = items
        .iter()
        .filter(|item| match item.kind.placement() {
            Placement::Bar => true,
            Placement::Timed => false,
        })
        .filter_map(|item| {
            let (first, last) = item.date_span()?;
            if last < window_first || first > window_last {
                return None;
            }
            Some(Bar {
                id: item.id.clone(),
                first: first.max(window_first),
                last: last.min(window_last),
            })
        })
        .collect();

    bars.sort_by(|a, b| a.first.cmp(&b.first).then(a.last.cmp(&b.last)).then(a.id.cmp(&b.id)));

    let assigned = assign_rows(&bars);
    let row_count = assigned.iter().max().map_or(0, |max| max + 1);

    let mut rows = BTreeMap::new();
    let mut placements = Vec::with_capacity(bars.len());
    for (bar, row) in bars.into_iter().zip(assigned) {
        let first_day_index = window.index_of(bar.first).unwrap_or(0);
        let span_days = (bar.last - bar.first).num_days() as usize + 1;
        rows.insert(bar.id.clone(), row);
        placements.push(BarPlacement {
            id: bar.id,
            row,
            first_day_index,
            span_days,
        });
    }

    tracing::trace!(bars = placements.len(), rows = row_count, "packed bar band");

    RowAssignment {
        placements,
        rows,
        row_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;
    use crate::window::TripBounds;
    use chrono::{TimeZone, Utc};

    fn stay(id: &str, from: u32, to: u32) -> TimedItem {
        TimedItem::new(
            id,
            ItemKind::Accommodation,
            Utc.with_ymd_and_hms(2025, 1, from, 15, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, to, 11, 0, 0).unwrap(),
        )
    }

    fn january() -> DayWindow {
        DayWindow::from_bounds(
            TripBounds::new(
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn freed_row_is_reused() {
        let items = [stay("a", 1, 3), stay("b", 2, 4), stay("c", 4, 5)];
        let rows = pack_bars(&january(), &items);

        assert_eq!(rows.row_of(&"a".into()), Some(0));
        assert_eq!(rows.row_of(&"b".into()), Some(1));
        assert_eq!(rows.row_of(&"c".into()), Some(0));
        assert_eq!(rows.row_count(), 2);
    }

    #[test]
    fn checkout_day_blocks_same_day_checkin() {
        let items = [stay("a", 1, 3), stay("b", 3, 5)];
        let rows = pack_bars(&january(), &items);
        assert_eq!(rows.row_count(), 2);
    }

    #[test]
    fn row_zero_is_not_special() {
        // Row 0 frees up later than row 1; the next bar must take row 1.
        let items = [stay("long", 1, 8), stay("short", 2, 3), stay("next", 4, 6)];
        let rows = pack_bars(&january(), &items);
        assert_eq!(rows.row_of(&"next".into()), Some(1));
        assert_eq!(rows.row_count(), 2);
    }

    #[test]
    fn bars_are_clipped_to_window() {
        let early = TimedItem::new(
            "early",
            ItemKind::Accommodation,
            Utc.with_ymd_and_hms(2024, 12, 28, 15, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 2, 11, 0, 0).unwrap(),
        );
        let outside = TimedItem::new(
            "outside",
            ItemKind::Accommodation,
            Utc.with_ymd_and_hms(2025, 2, 1, 15, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 3, 11, 0, 0).unwrap(),
        );
        let rows = pack_bars(&january(), &[early, outside]);

        assert_eq!(rows.placements().len(), 1);
        let placement = &rows.placements()[0];
        assert_eq!(placement.first_day_index, 0);
        assert_eq!(placement.span_days, 2);
    }

    #[test]
    fn band_height_has_a_floor() {
        let config = GridConfig::default();
        let empty = pack_bars(&january(), &[]);
        assert_eq!(empty.band_height(&config), config.min_band_height);

        let rows = pack_bars(&january(), &[stay("a", 1, 3), stay("b", 2, 4)]);
        assert_eq!(rows.band_height(&config), 2.0 * config.bar_row_height);
    }

    #[test]
    fn single_row_is_not_raised_to_the_floor() {
        let config = GridConfig::default();
        let one = pack_bars(&january(), &[stay("a", 1, 3)]);
        assert_eq!(one.row_count(), 1);
        assert_eq!(one.band_height(&config), config.bar_row_height);
        assert!(config.bar_row_height < config.min_band_height);
    }

    #[test]
    fn timed_items_stay_out_of_the_band() {
        let mut dinner = stay("dinner", 1, 2);
        dinner.kind = ItemKind::Food;
        assert_eq!(pack_bars(&january(), &[dinner]).row_count(), 0);
    }
}
