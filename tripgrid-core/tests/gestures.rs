//! End-to-end pointer sessions against `CalendarGrid` with a recording host.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tripgrid_core::host::{HostCall, Recorder};
use tripgrid_core::viewport::{Pane, ScrollOffset};
use tripgrid_core::{
    CalendarGrid, GridConfig, ItemKind, PointerEvent, TimeRange, TimedItem, TripBounds,
};

const DAY_WIDTH: f64 = 100.0;

fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, h, m, 0).unwrap()
}

fn bounds() -> TripBounds {
    TripBounds::new(
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 16).unwrap(),
    )
    .unwrap()
}

fn museum() -> TimedItem {
    TimedItem::new("museum", ItemKind::Activity, at(11, 9, 0), at(11, 10, 0)).with_title("Museum")
}

/// A mounted week grid, one 100px column per day, with the museum on Tuesday.
fn grid_with(items: Vec<TimedItem>) -> (CalendarGrid, Recorder) {
    let config = GridConfig::default();
    let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let mut grid =
        CalendarGrid::new(config, Some(bounds()), items, today).expect("Should build grid");
    let mut host = Recorder::new();
    grid.mount(DAY_WIDTH * 7.0, &mut host);
    host.take();
    (grid, host)
}

fn x_of(day_index: usize) -> f64 {
    day_index as f64 * DAY_WIDTH + DAY_WIDTH / 2.0
}

fn content_top(grid: &CalendarGrid) -> f64 {
    grid.viewport().offset(Pane::Content).top
}

/// Viewport y of a time of day, given the content pane's vertical scroll.
fn y_of(top: f64, h: u32, m: u32) -> f64 {
    (h as f64 + m as f64 / 60.0) * 48.0 - top
}

fn down(grid: &mut CalendarGrid, host: &mut Recorder, x: f64, y: f64) {
    grid.pointer(PointerEvent::Down { x, y }, host);
}

fn mv(grid: &mut CalendarGrid, host: &mut Recorder, x: f64, y: f64) {
    grid.pointer(PointerEvent::Move { x, y }, host);
}

fn up_and_click(grid: &mut CalendarGrid, host: &mut Recorder, x: f64, y: f64) {
    grid.pointer(PointerEvent::Up { x, y }, host);
    grid.pointer(PointerEvent::Click { x, y }, host);
}

#[test]
fn mount_scrolls_to_highest_item() {
    let (grid, _) = grid_with(vec![museum()]);
    assert_eq!(grid.viewport().offset(Pane::Content).top, 9.0 * 48.0 - 48.0);
    assert_eq!(grid.viewport().offset(Pane::TimeRuler).top, 9.0 * 48.0 - 48.0);
}

#[test]
fn creation_drag_requests_one_span() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let top = content_top(&grid);
    let (x, start_y, end_y) = (x_of(3), y_of(top, 9, 10), y_of(top, 10, 20));

    down(&mut grid, &mut host, x, start_y);
    mv(&mut grid, &mut host, x, end_y);
    assert_eq!(grid.selection_preview(), Some(TimeRange::new(at(13, 9, 0), at(13, 10, 30))));
    up_and_click(&mut grid, &mut host, x, end_y);

    let creates = host.creates();
    assert_eq!(creates.len(), 1, "Trailing click must not create a second item");
    assert_eq!(creates[0].day_index, 3);
    assert_eq!(creates[0].range, TimeRange::new(at(13, 9, 0), at(13, 10, 30)));
}

#[test]
fn zero_movement_creation_gets_minimum_span() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let top = content_top(&grid);
    let (x, y) = (x_of(0), y_of(top, 9, 5));

    down(&mut grid, &mut host, x, y);
    up_and_click(&mut grid, &mut host, x, y);

    assert_eq!(host.creates()[0].range, TimeRange::new(at(10, 9, 0), at(10, 9, 15)));
}

#[test]
fn leaving_the_pane_cancels_creation() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let top = content_top(&grid);
    down(&mut grid, &mut host, x_of(2), y_of(top, 14, 10));
    mv(&mut grid, &mut host, x_of(2), y_of(top, 15, 10));
    grid.pointer(PointerEvent::Leave, &mut host);
    grid.pointer(PointerEvent::Up { x: x_of(2), y: y_of(top, 15, 10) }, &mut host);

    assert!(host.creates().is_empty());
}

#[test]
fn plain_click_on_empty_cell_creates_default_span() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let top = content_top(&grid);
    grid.pointer(PointerEvent::Click { x: x_of(4), y: y_of(top, 18, 40) }, &mut host);

    assert_eq!(host.creates()[0].range, TimeRange::new(at(14, 18, 30), at(14, 19, 30)));
}

#[test]
fn moving_an_item_previews_and_commits_once() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let top = content_top(&grid);

    down(&mut grid, &mut host, x_of(1), y_of(top, 9, 30));
    mv(&mut grid, &mut host, x_of(2), y_of(top, 10, 40));
    mv(&mut grid, &mut host, x_of(2), y_of(top, 11, 40));
    up_and_click(&mut grid, &mut host, x_of(2), y_of(top, 11, 40));

    let moved = TimeRange::new(at(12, 11, 15), at(12, 12, 15));
    let commits = host.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].range(), moved);
    assert_eq!(grid.items()[0].range(), Some(moved));

    assert!(host.calls.iter().any(|c| matches!(c, HostCall::Optimistic(_))));
    assert!(!host.calls.iter().any(|c| matches!(c, HostCall::OpenDetails(_))));
    assert!(host.creates().is_empty(), "A drag must not create items");
}

#[test]
fn press_without_moving_opens_details() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let top = content_top(&grid);
    let (x, y) = (x_of(1), y_of(top, 9, 30));

    down(&mut grid, &mut host, x, y);
    mv(&mut grid, &mut host, x + 1.0, y + 1.0);
    up_and_click(&mut grid, &mut host, x + 1.0, y + 1.0);

    assert_eq!(host.calls, vec![HostCall::OpenDetails("museum".into())]);
}

#[test]
fn resizing_bottom_above_start_is_clamped() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let top = content_top(&grid);
    let handle_y = y_of(top, 10, 0) - 2.0;

    down(&mut grid, &mut host, x_of(1), handle_y);
    mv(&mut grid, &mut host, x_of(1), y_of(top, 7, 10));
    up_and_click(&mut grid, &mut host, x_of(1), y_of(top, 7, 10));

    let commit = &host.commits()[0];
    assert_eq!(commit.range(), TimeRange::new(at(11, 9, 0), at(11, 9, 15)));
    assert!(commit.start < commit.end);
}

#[test]
fn resizing_top_keeps_the_end() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let top = content_top(&grid);
    let handle_y = y_of(top, 9, 0) + 2.0;

    down(&mut grid, &mut host, x_of(1), handle_y);
    mv(&mut grid, &mut host, x_of(1), y_of(top, 8, 20));
    up_and_click(&mut grid, &mut host, x_of(1), y_of(top, 8, 20));

    assert_eq!(host.commits()[0].range(), TimeRange::new(at(11, 8, 15), at(11, 10, 0)));
}

#[test]
fn failed_commit_rolls_back_the_item() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let top = content_top(&grid);

    down(&mut grid, &mut host, x_of(1), y_of(top, 9, 30));
    mv(&mut grid, &mut host, x_of(1), y_of(top, 13, 40));
    up_and_click(&mut grid, &mut host, x_of(1), y_of(top, 13, 40));
    let commit = host.commits().remove(0);
    host.take();

    grid.resolve_commit(commit.ticket, false, &mut host);
    assert_eq!(grid.items()[0].range(), museum().range());
    match host.calls.as_slice() {
        [HostCall::Optimistic(update)] => assert_eq!(Some(update.range), museum().range()),
        other => panic!("Expected a single rollback, got {:?}", other),
    }
}

#[test]
fn successful_commit_keeps_the_preview() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let top = content_top(&grid);

    down(&mut grid, &mut host, x_of(1), y_of(top, 9, 30));
    mv(&mut grid, &mut host, x_of(1), y_of(top, 13, 40));
    up_and_click(&mut grid, &mut host, x_of(1), y_of(top, 13, 40));
    let commit = host.commits().remove(0);
    host.take();

    grid.resolve_commit(commit.ticket, true, &mut host);
    assert!(host.calls.is_empty());
    assert_eq!(grid.items()[0].range(), Some(commit.range()));
}

#[test]
fn horizontal_scroll_syncs_panes_and_settles() {
    let config = GridConfig {
        visible_days: 3,
        ..GridConfig::default()
    };
    let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let mut grid = CalendarGrid::new(config, Some(bounds()), vec![museum()], today).unwrap();
    let mut host = Recorder::new();
    grid.mount(300.0, &mut host);
    host.take();

    let now = Instant::now();
    let top = grid.viewport().offset(Pane::Content).top;
    grid.scroll(Pane::Content, ScrollOffset { left: 260.0, top }, now, &mut host);
    let synced: Vec<Pane> = host
        .take()
        .into_iter()
        .filter_map(|c| match c {
            HostCall::PaneScroll(s) => Some(s.pane),
            _ => None,
        })
        .collect();
    assert_eq!(synced, vec![Pane::DayHeader, Pane::TimeRuler, Pane::AllDayBand]);

    grid.tick(now + Duration::from_millis(50), &mut host);
    assert!(host.calls.is_empty(), "Still inside the settle delay");

    grid.tick(now + Duration::from_secs(1), &mut host);
    assert!(host.calls.contains(&HostCall::VisibleDay(3)));
}

#[test]
fn pager_respects_trip_bounds_when_restricted() {
    let config = GridConfig {
        visible_days: 3,
        restrict_to_trip: true,
        ..GridConfig::default()
    };
    let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let mut grid = CalendarGrid::new(config, Some(bounds()), vec![museum()], today)
        .unwrap()
        .with_padding(0, 7);
    let mut host = Recorder::new();
    grid.mount(300.0, &mut host);
    host.take();

    assert_eq!(grid.window().len(), 14);
    assert_eq!(grid.pager().page_by(10, &mut host), 4);
    assert!(host.calls.contains(&HostCall::VisibleDay(4)));

    grid.set_restrict_to_trip(false, &mut host);
    assert_eq!(grid.pager().page_by(10, &mut host), 11);
    assert_eq!(grid.pager().page_by(-20, &mut host), 0);
}

#[test]
fn unmeasured_grid_ignores_pointers() {
    let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let mut grid =
        CalendarGrid::new(GridConfig::default(), Some(bounds()), vec![museum()], today).unwrap();
    let mut host = Recorder::new();

    grid.pointer(PointerEvent::Down { x: 50.0, y: 50.0 }, &mut host);
    grid.pointer(PointerEvent::Up { x: 50.0, y: 50.0 }, &mut host);
    grid.pointer(PointerEvent::Click { x: 50.0, y: 50.0 }, &mut host);
    assert!(host.calls.is_empty());
}

#[test]
fn malformed_items_do_not_break_layout() {
    let mut broken = TimedItem::new("broken", ItemKind::Food, at(11, 12, 0), at(11, 13, 0));
    broken.start = None;
    let (grid, _) = grid_with(vec![museum(), broken]);

    assert_eq!(grid.layout().boxes().len(), 1);
}

#[test]
fn new_items_trigger_auto_scroll() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let breakfast = TimedItem::new("breakfast", ItemKind::Food, at(12, 7, 0), at(12, 8, 0));
    grid.set_items(vec![museum(), breakfast], &mut host);

    assert_eq!(grid.viewport().offset(Pane::Content).top, 7.0 * 48.0 - 48.0);
}

#[test]
fn snapshot_during_drag_keeps_the_scroll() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let top = content_top(&grid);

    down(&mut grid, &mut host, x_of(1), y_of(top, 9, 30));
    mv(&mut grid, &mut host, x_of(1), y_of(top, 11, 40));
    assert!(grid.drag().is_active());

    let breakfast = TimedItem::new("breakfast", ItemKind::Food, at(12, 7, 0), at(12, 8, 0));
    grid.set_items(vec![museum(), breakfast], &mut host);
    assert_eq!(content_top(&grid), top, "No auto-scroll while an item is being dragged");
    assert!(grid.drag().is_active());
}

#[test]
fn creation_drag_stays_on_its_own_day() {
    let (mut grid, mut host) = grid_with(vec![museum()]);
    let top = content_top(&grid);

    down(&mut grid, &mut host, x_of(3), y_of(top, 9, 10));
    mv(&mut grid, &mut host, x_of(3), y_of(top, 10, 20));
    mv(&mut grid, &mut host, x_of(4), y_of(top, 12, 20));
    assert_eq!(grid.selection_preview(), Some(TimeRange::new(at(13, 9, 0), at(13, 10, 30))));
    up_and_click(&mut grid, &mut host, x_of(4), y_of(top, 12, 20));

    let creates = host.creates();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].day_index, 3);
    assert_eq!(creates[0].range, TimeRange::new(at(13, 9, 0), at(13, 10, 30)));
}

/// Counts warning events seen by the thread's subscriber.
struct WarnCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn unplaceable_items_warn_once_per_snapshot() {
    let warnings = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));

    tracing::subscriber::with_default(subscriber, || {
        let mut broken = TimedItem::new("broken", ItemKind::Food, at(11, 12, 0), at(11, 13, 0));
        broken.start = None;
        let (mut grid, mut host) = grid_with(vec![museum(), broken.clone()]);
        assert_eq!(warnings.load(Ordering::SeqCst), 1);

        let top = content_top(&grid);
        down(&mut grid, &mut host, x_of(1), y_of(top, 9, 30));
        for hour in 10..15 {
            mv(&mut grid, &mut host, x_of(1), y_of(top, hour, 40));
        }
        up_and_click(&mut grid, &mut host, x_of(1), y_of(top, 14, 40));
        assert!(host.calls.iter().filter(|c| matches!(c, HostCall::Optimistic(_))).count() > 1);
        assert_eq!(warnings.load(Ordering::SeqCst), 1, "Previews must not repeat the warning");

        grid.set_items(vec![museum(), broken], &mut host);
        assert_eq!(warnings.load(Ordering::SeqCst), 2);
    });
}
