/// Height of one hour row on the time grid, in pixels.
pub const DEFAULT_HOUR_HEIGHT: f64 = 48.0;

/// Smallest schedulable granularity.
pub const SNAP_MINUTES: i64 = 15;

/// Shortest span a creation gesture may commit.
pub const MIN_SPAN_MINUTES: i64 = 15;

/// Length of an item created by a plain click on an empty cell.
pub const DEFAULT_CREATE_MINUTES: i64 = 60;

/// Height of one row in the multi-day bar band.
pub const BAR_ROW_HEIGHT: f64 = 24.0;

/// Band height when there are no bars to show.
pub const MIN_BAND_HEIGHT: f64 = 32.0;

/// Space left above the highest item box when auto-scrolling the content pane.
pub const AUTO_SCROLL_PADDING: f64 = 48.0;

/// Pointer displacement (px) after which a press on an item becomes a drag.
pub const DRAG_THRESHOLD: f64 = 4.0;

/// Height of the grab zone at the top and bottom edge of an item box.
pub const RESIZE_HANDLE_PX: f64 = 8.0;

/// Boxes shorter than this do not get resize handles.
pub const MIN_RESIZE_HEIGHT: f64 = 30.0;

pub const DEFAULT_VISIBLE_DAYS: usize = 7;

pub const DEFAULT_SETTLE_DELAY_MS: u64 = 150;

pub const HOURS_PER_DAY: f64 = 24.0;
