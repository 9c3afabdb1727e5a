//! Per-render geometry: item boxes on the hourly grid and the bar band.

use crate::columns::{ColumnSlot, pack_day};
use crate::config::GridConfig;
use crate::item::{ItemId, Placement, TimeRange, TimedItem};
use crate::mapper::CoordinateMapper;
use crate::rows::{RowAssignment, pack_bars};
use crate::window::DayWindow;

/// Which end of an item a resize gesture moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

/// The piece of a timed item drawn in one day column.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemBox {
    pub id: ItemId,
    pub day_index: usize,
    /// The item's full range, not just this day's piece.
    pub range: TimeRange,
    pub top: f64,
    pub height: f64,
    pub slot: ColumnSlot,
    /// The item starts on this day, so its top edge is real.
    pub starts_here: bool,
    /// The item ends on this day, so its bottom edge is real.
    pub ends_here: bool,
}

impl ItemBox {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// `frac_x` is the pointer's fraction across the day column.
    pub fn contains(&self, y: f64, frac_x: f64) -> bool {
        let left = self.slot.left();
        y >= self.top && y < self.bottom() && frac_x >= left && frac_x < left + self.slot.width()
    }

    pub fn has_handles(&self, config: &GridConfig) -> bool {
        self.height >= config.min_resize_height
    }
}

/// What lies under a pointer in the content pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Empty,
    Body(ItemId),
    Handle(ItemId, Edge),
}

/// Geometry for one render of the window.
#[derive(Debug, Clone, Default)]
pub struct GridLayout {
    boxes: Vec<ItemBox>,
    band: RowAssignment,
}

impl GridLayout {
    pub fn build(
        window: &DayWindow,
        items: &[TimedItem],
        mapper: &CoordinateMapper,
    ) -> Self {
        let mut boxes = Vec::new();

        for (day_index, &date) in window.days().iter().enumerate() {
            let assignment = pack_day(date, items);
            if assignment.is_empty() {
                continue;
            }
            let day = TimeRange::whole_day(date);

            for item in items {
                match item.kind.placement() {
                    Placement::Timed => {}
                    Placement::Bar => continue,
                }
                let (Some(range), Some(slot)) = (item.range(), assignment.get(&item.id)) else {
                    continue;
                };
                let Some(clipped) = range.intersect(&day) else {
                    continue;
                };
                let top = mapper.time_to_pixel_on(date, clipped.start);
                let bottom = mapper.time_to_pixel_on(date, clipped.end);
                boxes.push(ItemBox {
                    id: item.id.clone(),
                    day_index,
                    range,
                    top,
                    height: bottom - top,
                    slot,
                    starts_here: range.start >= day.start,
                    ends_here: range.end <= day.end,
                });
            }
        }

        let band = pack_bars(window, items);
        tracing::debug!(
            days = window.len(),
            boxes = boxes.len(),
            bar_rows = band.row_count(),
            "built grid layout"
        );

        GridLayout { boxes, band }
    }

    pub fn boxes(&self) -> &[ItemBox] {
        &self.boxes
    }

    pub fn boxes_on(&self, day_index: usize) -> impl Iterator<Item = &ItemBox> {
        self.boxes.iter().filter(move |b| b.day_index == day_index)
    }

    pub fn band(&self) -> &RowAssignment {
        &self.band
    }

    /// Top edge of the highest box on any day, the target of auto-scroll.
    pub fn topmost(&self) -> Option<f64> {
        self.boxes.iter().map(|b| b.top).min_by(f64::total_cmp)
    }

    pub fn find(&self, id: &ItemId, day_index: usize) -> Option<&ItemBox> {
        self.boxes_on(day_index).find(|b| &b.id == id)
    }

    /// Resolve a pointer to an item body, a resize handle or an empty cell.
    /// Handles sit on the real edges of boxes tall enough to carry them.
    pub fn hit_test(&self, day_index: usize, y: f64, frac_x: f64, config: &GridConfig) -> Hit {
        let Some(hit) = self.boxes_on(day_index).find(|b| b.contains(y, frac_x)) else {
            return Hit::Empty;
        };
        if hit.has_handles(config) {
            if hit.starts_here && y < hit.top + config.resize_handle_px {
                return Hit::Handle(hit.id.clone(), Edge::Top);
            }
            if hit.ends_here && y >= hit.bottom() - config.resize_handle_px {
                return Hit::Handle(hit.id.clone(), Edge::Bottom);
            }
        }
        Hit::Body(hit.id.clone())
    }
}
