//! The interactive day grid.
//!
//! [`CalendarGrid`] owns every piece of interaction state (the selection
//! machine, the drag controller and the viewport) and advances them only
//! through its event entry points. Pointer coordinates are given relative to
//! the content pane's viewport; the grid applies the current scroll offsets.

use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::drag::{CommitTicket, DragClick, DragController, DragMode, OptimisticUpdate};
use crate::error::GridResult;
use crate::host::GridHost;
use crate::item::{ItemId, TimeRange, TimedItem};
use crate::layout::{GridLayout, Hit};
use crate::mapper::CoordinateMapper;
use crate::selection::{ClickDisposition, CreateRequest, SelectionMachine, SelectionOutcome};
use crate::viewport::{GridPoint, Pane, ScrollOffset, ViewportChange, ViewportSync};
use crate::window::{DayWindow, TripBounds};

/// Raw pointer input on the content pane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Leave,
    Click { x: f64, y: f64 },
}

pub struct CalendarGrid {
    config: GridConfig,
    mapper: CoordinateMapper,
    bounds: Option<TripBounds>,
    padding: (usize, usize),
    today: NaiveDate,
    window: DayWindow,
    items: Vec<TimedItem>,
    item_ids: Vec<ItemId>,
    layout: GridLayout,
    selection: SelectionMachine,
    drag: DragController,
    viewport: ViewportSync,
}

impl std::fmt::Debug for CalendarGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarGrid")
            .field("days", &self.window.len())
            .field("items", &self.items.len())
            .field("selecting", &self.selection.is_selecting())
            .field("dragging", &self.drag.is_active())
            .finish()
    }
}

/// Items the layout will leave out, reported once per snapshot.
fn warn_unplaceable(items: &[TimedItem]) {
    for item in items.iter().filter(|item| item.range().is_none()) {
        tracing::warn!(
            id = %item.id,
            kind = item.kind.label(),
            "skipping item without a valid time range"
        );
    }
}

fn sorted_ids(items: &[TimedItem]) -> Vec<ItemId> {
    let mut ids: Vec<ItemId> = items.iter().map(|item| item.id.clone()).collect();
    ids.sort();
    ids
}

impl CalendarGrid {
    /// `today` anchors the window when there are neither bounds nor items.
    pub fn new(
        config: GridConfig,
        bounds: Option<TripBounds>,
        items: Vec<TimedItem>,
        today: NaiveDate,
    ) -> GridResult<Self> {
        config.validate()?;
        warn_unplaceable(&items);
        let window = DayWindow::resolve(bounds, &items, today, config.week_start);
        let mapper = CoordinateMapper::new(config.hour_height);
        let layout = GridLayout::build(&window, &items, &mapper);
        let item_ids = sorted_ids(&items);

        Ok(CalendarGrid {
            selection: SelectionMachine::new(&config),
            drag: DragController::new(&config),
            viewport: ViewportSync::new(&config, &window),
            config,
            mapper,
            bounds,
            padding: (0, 0),
            today,
            window,
            items,
            item_ids,
            layout,
        })
    }

    /// Show extra days around the trip bounds. Has no effect without bounds.
    pub fn with_padding(mut self, before: usize, after: usize) -> Self {
        self.padding = (before, after);
        self.rebuild_window();
        self.viewport = ViewportSync::new(&self.config, &self.window);
        self
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn window(&self) -> &DayWindow {
        &self.window
    }

    pub fn items(&self) -> &[TimedItem] {
        &self.items
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn viewport(&self) -> &ViewportSync {
        &self.viewport
    }

    pub fn selection(&self) -> &SelectionMachine {
        &self.selection
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// The paging surface for whoever owns the grid.
    pub fn pager(&mut self) -> DayPager<'_> {
        DayPager { grid: self }
    }

    /// First render: measure the container and scroll to the highest item box.
    pub fn mount(&mut self, container_width: f64, host: &mut dyn GridHost) {
        self.resize(container_width, host);
        self.auto_scroll(host);
    }

    pub fn resize(&mut self, container_width: f64, host: &mut dyn GridHost) {
        for scroll in self.viewport.resize(container_width) {
            host.set_pane_scroll(scroll);
        }
    }

    pub fn set_restrict_to_trip(&mut self, restrict: bool, host: &mut dyn GridHost) {
        self.viewport.set_restrict(restrict);
        let change = self.viewport.set_window(&self.window);
        self.apply_viewport(change, host);
    }

    /// A fresh snapshot from the host. Auto-scrolls when the set of items
    /// changed, but never in the middle of a drag.
    pub fn set_items(&mut self, items: Vec<TimedItem>, host: &mut dyn GridHost) {
        let ids = sorted_ids(&items);
        let list_changed = ids != self.item_ids;
        warn_unplaceable(&items);
        self.items = items;
        self.item_ids = ids;
        self.rebuild_window();
        let change = self.viewport.set_window(&self.window);
        self.apply_viewport(change, host);

        if list_changed && !self.drag.is_active() {
            self.auto_scroll(host);
        }
    }

    pub fn pointer(&mut self, event: PointerEvent, host: &mut dyn GridHost) {
        match event {
            PointerEvent::Down { x, y } => self.on_down(x, y),
            PointerEvent::Move { x, y } => self.on_move(x, y, host),
            PointerEvent::Up { x, y } => self.on_up(x, y, host),
            PointerEvent::Leave => self.on_leave(host),
            PointerEvent::Click { x, y } => self.on_click(x, y, host),
        }
    }

    pub fn scroll(
        &mut self,
        pane: Pane,
        offset: ScrollOffset,
        now: Instant,
        host: &mut dyn GridHost,
    ) {
        for scroll in self.viewport.on_scroll(pane, offset, now) {
            host.set_pane_scroll(scroll);
        }
    }

    /// Drive time-based work: settles the visible day index after scrolling.
    pub fn tick(&mut self, now: Instant, host: &mut dyn GridHost) {
        let change = self.viewport.poll_settled(now);
        self.apply_viewport(change, host);
    }

    /// The host's answer to a commit. Rolls the item back when the newest
    /// commit for it failed.
    pub fn resolve_commit(
        &mut self,
        ticket: CommitTicket,
        succeeded: bool,
        host: &mut dyn GridHost,
    ) {
        if let Some(rollback) = self.drag.resolve(ticket, succeeded) {
            self.apply_optimistic(rollback, host);
        }
    }

    /// The span a creation gesture would commit right now, for previewing.
    pub fn selection_preview(&self) -> Option<TimeRange> {
        self.selection.preview()
    }

    fn on_down(&mut self, x: f64, y: f64) {
        self.selection.settle();
        self.drag.settle();
        if self.drag.is_active() || self.selection.is_selecting() {
            return;
        }
        let Some((point, date)) = self.resolve(x, y) else {
            return;
        };
        let at = self.mapper.instant_on(date, point.y);

        match self.layout.hit_test(point.day_index, point.y, point.frac_x, &self.config) {
            Hit::Empty => {
                self.selection.press(point.day_index, date, at);
            }
            Hit::Body(id) => self.press_item(id, DragMode::Moving, at, point),
            Hit::Handle(id, edge) => self.press_item(id, DragMode::Resizing(edge), at, point),
        }
    }

    fn press_item(&mut self, id: ItemId, mode: DragMode, at: DateTime<Utc>, point: GridPoint) {
        let item = self.items.iter().find(|item| item.id == id);
        let Some(range) = item.and_then(TimedItem::range) else {
            return;
        };
        self.drag.press(id, range, mode, at, point.content_px);
    }

    fn on_move(&mut self, x: f64, y: f64, host: &mut dyn GridHost) {
        let Some((point, date)) = self.resolve(x, y) else {
            return;
        };
        let at = self.mapper.instant_on(date, point.y);

        if self.drag.is_active() {
            if let Some(update) = self.drag.motion(at, point.content_px) {
                self.apply_optimistic(update, host);
            }
        } else if self.selection.is_selecting() {
            self.selection.drag(point.day_index, at);
        }
    }

    fn on_up(&mut self, x: f64, y: f64, host: &mut dyn GridHost) {
        if self.drag.is_active() {
            self.finish_drag(host);
            return;
        }
        let inside = self.resolve(x, y).is_some();
        if let SelectionOutcome::Committed(request) = self.selection.release(inside) {
            host.request_create(request);
        }
    }

    fn on_leave(&mut self, host: &mut dyn GridHost) {
        if self.drag.is_active() {
            self.finish_drag(host);
        }
        self.selection.leave();
    }

    fn on_click(&mut self, x: f64, y: f64, host: &mut dyn GridHost) {
        match self.drag.click() {
            DragClick::Swallow => return,
            DragClick::OpenDetails(id) => {
                host.open_details(&id);
                return;
            }
            DragClick::Pass => {}
        }
        match self.selection.click() {
            ClickDisposition::Swallow => return,
            ClickDisposition::Pass => {}
        }

        let Some((point, date)) = self.resolve(x, y) else {
            return;
        };
        match self.layout.hit_test(point.day_index, point.y, point.frac_x, &self.config) {
            Hit::Empty => {
                let at = self.mapper.instant_on(date, point.y);
                let range = self.selection.point_span(date, at);
                tracing::debug!(range = %range, "point creation");
                host.request_create(CreateRequest {
                    day_index: point.day_index,
                    range,
                });
            }
            Hit::Body(id) | Hit::Handle(id, _) => host.open_details(&id),
        }
    }

    fn finish_drag(&mut self, host: &mut dyn GridHost) {
        if let Some(commit) = self.drag.release().and_then(|release| release.commit) {
            host.request_commit_move(commit);
        }
    }

    fn apply_optimistic(&mut self, update: OptimisticUpdate, host: &mut dyn GridHost) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == update.id) {
            item.set_range(update.range);
            self.layout = GridLayout::build(&self.window, &self.items, &self.mapper);
        }
        host.apply_optimistic(update);
    }

    fn apply_viewport(&mut self, change: ViewportChange, host: &mut dyn GridHost) {
        for scroll in change.scrolls {
            host.set_pane_scroll(scroll);
        }
        if let Some(index) = change.first_visible {
            host.on_visible_day_index_change(index);
        }
    }

    fn auto_scroll(&mut self, host: &mut dyn GridHost) {
        let topmost = self.layout.topmost();
        for scroll in self.viewport.auto_scroll(topmost, self.config.auto_scroll_padding) {
            host.set_pane_scroll(scroll);
        }
    }

    fn rebuild_window(&mut self) {
        let window =
            DayWindow::resolve(self.bounds, &self.items, self.today, self.config.week_start);
        self.window = match self.bounds {
            Some(_) => window.with_padding(self.padding.0, self.padding.1),
            None => window,
        };
        self.layout = GridLayout::build(&self.window, &self.items, &self.mapper);
    }

    fn resolve(&self, x: f64, y: f64) -> Option<(GridPoint, NaiveDate)> {
        let point = self.viewport.locate(x, y)?;
        let date = self.window.day(point.day_index)?;
        Some((point, date))
    }
}

/// Scroll-by-days handle handed to the grid's owner.
pub struct DayPager<'a> {
    grid: &'a mut CalendarGrid,
}

impl DayPager<'_> {
    pub fn current(&self) -> usize {
        self.grid.viewport.state().first_visible_day_index
    }

    /// Move by `delta` days, clamped to the window (and the trip bounds in
    /// restricted mode). Returns the resulting first visible day.
    pub fn page_by(&mut self, delta: isize, host: &mut dyn GridHost) -> usize {
        let change = self.grid.viewport.page_by(delta);
        self.grid.apply_viewport(change, host);
        self.current()
    }

    pub fn scroll_to_day(&mut self, index: usize, host: &mut dyn GridHost) -> usize {
        let change = self.grid.viewport.scroll_to_day(index);
        self.grid.apply_viewport(change, host);
        self.current()
    }

    pub fn scroll_to_date(&mut self, date: NaiveDate, host: &mut dyn GridHost) -> Option<usize> {
        let index = self.grid.window.index_of(date)?;
        Some(self.scroll_to_day(index, host))
    }
}
