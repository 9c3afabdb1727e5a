//! Shared scroll state for the grid's panes.
//!
//! The day header, time ruler, bar band and content grid scroll as separate
//! surfaces but must always show the same days. This controller owns the one
//! authoritative horizontal offset and day width, and tells the caller which
//! panes need to be moved whenever one of them scrolls.
//!
//! Until the container has a positive measured width every pixel quantity
//! is zero and pointer lookups return `None`.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::window::DayWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pane {
    DayHeader,
    TimeRuler,
    AllDayBand,
    Content,
}

impl Pane {
    pub const ALL: [Pane; 4] = [Pane::DayHeader, Pane::TimeRuler, Pane::AllDayBand, Pane::Content];
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub left: f64,
    pub top: f64,
}

/// A programmatic scroll the host must apply to one pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneScroll {
    pub pane: Pane,
    pub offset: ScrollOffset,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub day_width: f64,
    pub visible_day_count: usize,
    pub first_visible_day_index: usize,
}

/// A pointer position resolved against the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub day_index: usize,
    /// Fraction across the day column, in `[0, 1)`.
    pub frac_x: f64,
    /// Vertical offset within the day column.
    pub y: f64,
    /// Position in scrolled content coordinates.
    pub content_px: (f64, f64),
}

/// Result of a settle check or a paging request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewportChange {
    /// Set when the first visible day changed and the host must be told.
    pub first_visible: Option<usize>,
    pub scrolls: Vec<PaneScroll>,
}

#[derive(Debug, Clone)]
pub struct ViewportSync {
    container_width: f64,
    visible_days: usize,
    total_days: usize,
    last_in_range: Option<usize>,
    restrict: bool,
    scroll_left: f64,
    tops: [f64; 4],
    first_visible: usize,
    settle_delay: Duration,
    last_scroll_at: Option<Instant>,
}

fn slot(pane: Pane) -> usize {
    match pane {
        Pane::DayHeader => 0,
        Pane::TimeRuler => 1,
        Pane::AllDayBand => 2,
        Pane::Content => 3,
    }
}

impl ViewportSync {
    pub fn new(config: &GridConfig, window: &DayWindow) -> Self {
        ViewportSync {
            container_width: 0.0,
            visible_days: config.visible_days.max(1),
            total_days: window.len(),
            last_in_range: window.last_in_range(),
            restrict: config.restrict_to_trip,
            scroll_left: 0.0,
            tops: [0.0; 4],
            first_visible: 0,
            settle_delay: config.settle_delay,
            last_scroll_at: None,
        }
    }

    pub fn is_measured(&self) -> bool {
        self.container_width.is_finite() && self.container_width > 0.0
    }

    pub fn day_width(&self) -> f64 {
        if self.is_measured() {
            self.container_width / self.visible_days as f64
        } else {
            0.0
        }
    }

    pub fn state(&self) -> ViewportState {
        ViewportState {
            day_width: self.day_width(),
            visible_day_count: self.visible_days,
            first_visible_day_index: self.first_visible,
        }
    }

    pub fn offset(&self, pane: Pane) -> ScrollOffset {
        ScrollOffset {
            left: self.scroll_left,
            top: self.tops[slot(pane)],
        }
    }

    pub fn set_restrict(&mut self, restrict: bool) {
        self.restrict = restrict;
    }

    /// Highest first-visible index paging may reach.
    pub fn max_first_index(&self) -> usize {
        let max = self.total_days.saturating_sub(self.visible_days);
        match (self.restrict, self.last_in_range) {
            (true, Some(last)) => max.min((last + 1).saturating_sub(self.visible_days)),
            _ => max,
        }
    }

    /// The window changed; keep the first visible day within bounds.
    pub fn set_window(&mut self, window: &DayWindow) -> ViewportChange {
        self.total_days = window.len();
        self.last_in_range = window.last_in_range();
        self.jump_to(self.first_visible.min(self.max_first_index()), true)
    }

    /// The container was measured. Keeps the first visible day anchored.
    pub fn resize(&mut self, container_width: f64) -> Vec<PaneScroll> {
        self.container_width = container_width;
        self.scroll_left = self.first_visible as f64 * self.day_width();
        self.horizontal_scrolls(None)
    }

    /// A pane reported a scroll. Returns the other panes that must follow.
    pub fn on_scroll(&mut self, pane: Pane, offset: ScrollOffset, now: Instant) -> Vec<PaneScroll> {
        let mut scrolls = Vec::new();

        if offset.left != self.scroll_left {
            self.scroll_left = offset.left.max(0.0);
            self.last_scroll_at = Some(now);
            scrolls.extend(self.horizontal_scrolls(Some(pane)));
        }

        let index = slot(pane);
        if offset.top != self.tops[index] {
            match pane {
                Pane::Content => {
                    self.tops[index] = offset.top;
                    self.tops[slot(Pane::TimeRuler)] = offset.top;
                    scrolls.push(self.scroll_for(Pane::TimeRuler));
                }
                // The ruler only ever follows the content pane.
                Pane::TimeRuler => scrolls.push(self.scroll_for(Pane::TimeRuler)),
                Pane::DayHeader | Pane::AllDayBand => self.tops[index] = offset.top,
            }
        }

        dedup_panes(scrolls)
    }

    /// Recompute the first visible day once scrolling has been quiet for the
    /// settle delay.
    pub fn poll_settled(&mut self, now: Instant) -> ViewportChange {
        let Some(last) = self.last_scroll_at else {
            return ViewportChange::default();
        };
        if now.duration_since(last) < self.settle_delay {
            return ViewportChange::default();
        }
        self.last_scroll_at = None;

        let day_width = self.day_width();
        if day_width <= 0.0 {
            return ViewportChange::default();
        }
        let nearest = (self.scroll_left / day_width).round().max(0.0) as usize;
        let clamped = nearest.min(self.max_first_index());
        let snap = clamped != nearest;
        tracing::trace!(nearest, clamped, "scroll settled");
        self.jump_to(clamped, snap)
    }

    /// Move the first visible day by `delta` days, clamped to the window.
    pub fn page_by(&mut self, delta: isize) -> ViewportChange {
        self.scroll_to_day(self.first_visible.saturating_add_signed(delta))
    }

    pub fn scroll_to_day(&mut self, index: usize) -> ViewportChange {
        let target = index.min(self.max_first_index());
        self.last_scroll_at = None;
        self.jump_to(target, true)
    }

    /// Vertical offset that puts the highest item box just below the top of
    /// the content pane.
    pub fn auto_scroll(&mut self, topmost_px: Option<f64>, padding: f64) -> Vec<PaneScroll> {
        let Some(px) = topmost_px else {
            return Vec::new();
        };
        let top = (px - padding).max(0.0);
        self.tops[slot(Pane::Content)] = top;
        self.tops[slot(Pane::TimeRuler)] = top;
        tracing::debug!(top, "auto-scrolled content pane");
        vec![self.scroll_for(Pane::Content), self.scroll_for(Pane::TimeRuler)]
    }

    /// Resolve a pointer in content-pane viewport coordinates.
    pub fn locate(&self, x: f64, y: f64) -> Option<GridPoint> {
        let day_width = self.day_width();
        if day_width <= 0.0 || x < 0.0 {
            return None;
        }
        let content_x = x + self.scroll_left;
        let content_y = y + self.tops[slot(Pane::Content)];
        let column = (content_x / day_width).floor();
        if column < 0.0 || column as usize >= self.total_days {
            return None;
        }
        Some(GridPoint {
            day_index: column as usize,
            frac_x: (content_x - column * day_width) / day_width,
            y: content_y,
            content_px: (content_x, content_y),
        })
    }

    fn jump_to(&mut self, index: usize, snap: bool) -> ViewportChange {
        let changed = index != self.first_visible;
        self.first_visible = index;

        let mut change = ViewportChange::default();
        if changed {
            tracing::debug!(index, "first visible day changed");
            change.first_visible = Some(index);
        }
        if snap {
            let left = index as f64 * self.day_width();
            if left != self.scroll_left || changed {
                self.scroll_left = left;
                change.scrolls = self.horizontal_scrolls(None);
            }
        }
        change
    }

    fn scroll_for(&self, pane: Pane) -> PaneScroll {
        PaneScroll {
            pane,
            offset: self.offset(pane),
        }
    }

    fn horizontal_scrolls(&self, except: Option<Pane>) -> Vec<PaneScroll> {
        Pane::ALL
            .iter()
            .filter(|pane| Some(**pane) != except)
            .map(|pane| self.scroll_for(*pane))
            .collect()
    }
}

fn dedup_panes(scrolls: Vec<PaneScroll>) -> Vec<PaneScroll> {
    let mut out: Vec<PaneScroll> = Vec::with_capacity(scrolls.len());
    for scroll in scrolls {
        match out.iter_mut().find(|s| s.pane == scroll.pane) {
            Some(existing) => *existing = scroll,
            None => out.push(scroll),
        }
    }
    out
}
