//! Click-and-drag creation of a new time span.
//!
//! # State Machine
//!
//! ```text
//! Idle --down on empty cell--> Selecting --up in a cell--> JustCommitted --click/down--> Idle
//!                                  |
//!                                  +--leave / up outside--> Idle
//! ```
//!
//! `JustCommitted` exists so the click event produced by the same physical
//! press that committed a span is swallowed rather than creating a second
//! item.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::GridConfig;
use crate::item::TimeRange;
use crate::quantize::{ceil_to, floor_to};

/// An in-progress creation drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSpan {
    pub day_index: usize,
    pub day: NaiveDate,
    pub start: DateTime<Utc>,
    pub current: DateTime<Utc>,
}

/// A span handed to the host to open item creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateRequest {
    pub day_index: usize,
    pub range: TimeRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selecting(SelectionSpan),
    /// A span was just committed; the trailing click must be swallowed.
    JustCommitted(CreateRequest),
}

/// Result of feeding one pointer event to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Ignored,
    Started,
    Updated,
    Committed(CreateRequest),
    Cancelled,
}

/// What the widget should do with a click event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDisposition {
    /// Handled here, do nothing else with it.
    Swallow,
    /// Not ours, the widget may treat it as a plain click.
    Pass,
}

fn last_instant_of(day: NaiveDate) -> DateTime<Utc> {
    TimeRange::whole_day(day).end - Duration::milliseconds(1)
}

/// Order, extend and clamp a raw `(start, current)` pair into a committable
/// span on `day`.
///
/// The result always satisfies `start <= end`, lasts at least `min_span`
/// and ends no later than 23:59:59.999 of `day`.
pub fn normalize_span(
    day: NaiveDate,
    start: DateTime<Utc>,
    current: DateTime<Utc>,
    snap_minutes: i64,
    min_span: Duration,
) -> TimeRange {
    let first = TimeRange::whole_day(day).start;
    let limit = last_instant_of(day);

    let (mut start, end) = if current < start {
        (current, start)
    } else {
        (start, current)
    };
    start = start.clamp(first, limit);
    let mut end = end.clamp(first, limit).max(start + min_span);

    if end > limit {
        end = limit;
        start = start.min(floor_to(limit - min_span, snap_minutes));
    }
    TimeRange::new(start, end)
}

/// Owns the creation gesture for the content pane.
#[derive(Debug, Clone)]
pub struct SelectionMachine {
    state: SelectionState,
    snap_minutes: i64,
    min_span: Duration,
    default_span: Duration,
}

impl SelectionMachine {
    pub fn new(config: &GridConfig) -> Self {
        SelectionMachine {
            state: SelectionState::Idle,
            snap_minutes: config.snap_minutes,
            min_span: config.min_span(),
            default_span: Duration::minutes(config.default_create_minutes),
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.state, SelectionState::Selecting(_))
    }

    /// The span as it should be previewed right now.
    pub fn preview(&self) -> Option<TimeRange> {
        match self.state {
            SelectionState::Selecting(span) => Some(normalize_span(
                span.day,
                span.start,
                span.current,
                self.snap_minutes,
                self.min_span,
            )),
            SelectionState::Idle | SelectionState::JustCommitted(_) => None,
        }
    }

    /// Pointer-down on an empty cell. The caller has already checked that no
    /// item lies under the pointer and no drag is active.
    pub fn press(
        &mut self,
        day_index: usize,
        day: NaiveDate,
        at: DateTime<Utc>,
    ) -> SelectionOutcome {
        match self.state {
            SelectionState::Selecting(_) => SelectionOutcome::Ignored,
            SelectionState::Idle | SelectionState::JustCommitted(_) => {
                let start = floor_to(at, self.snap_minutes);
                self.state = SelectionState::Selecting(SelectionSpan {
                    day_index,
                    day,
                    start,
                    current: start,
                });
                tracing::debug!(day_index, start = %start, "selection started");
                SelectionOutcome::Started
            }
        }
    }

    /// Pointer-move. Moves over other days leave the span untouched.
    pub fn drag(&mut self, day_index: usize, at: DateTime<Utc>) -> SelectionOutcome {
        let SelectionState::Selecting(span) = &mut self.state else {
            return SelectionOutcome::Ignored;
        };
        if span.day_index != day_index {
            return SelectionOutcome::Ignored;
        }
        let day = TimeRange::whole_day(span.day);
        let current = ceil_to(at, self.snap_minutes).clamp(day.start, last_instant_of(span.day));
        if current == span.current {
            return SelectionOutcome::Ignored;
        }
        span.current = current;
        tracing::trace!(current = %current, "selection updated");
        SelectionOutcome::Updated
    }

    /// Pointer-up. `inside_cell` is false when the release happened outside
    /// every day cell, which discards the span.
    pub fn release(&mut self, inside_cell: bool) -> SelectionOutcome {
        let SelectionState::Selecting(span) = self.state else {
            return SelectionOutcome::Ignored;
        };
        if !inside_cell {
            return self.cancel();
        }
        let range = normalize_span(
            span.day,
            span.start,
            span.current,
            self.snap_minutes,
            self.min_span,
        );
        let request = CreateRequest {
            day_index: span.day_index,
            range,
        };
        self.state = SelectionState::JustCommitted(request);
        tracing::debug!(day_index = span.day_index, range = %range, "selection committed");
        SelectionOutcome::Committed(request)
    }

    /// Pointer left the content pane.
    pub fn leave(&mut self) -> SelectionOutcome {
        match self.state {
            SelectionState::Selecting(_) => self.cancel(),
            SelectionState::Idle | SelectionState::JustCommitted(_) => SelectionOutcome::Ignored,
        }
    }

    /// A click event arrived.
    pub fn click(&mut self) -> ClickDisposition {
        match self.state {
            SelectionState::JustCommitted(_) => {
                self.state = SelectionState::Idle;
                tracing::trace!("swallowed click trailing a committed selection");
                ClickDisposition::Swallow
            }
            SelectionState::Selecting(_) => ClickDisposition::Swallow,
            SelectionState::Idle => ClickDisposition::Pass,
        }
    }

    /// Drop a pending `JustCommitted` without waiting for its click.
    pub fn settle(&mut self) {
        if let SelectionState::JustCommitted(_) = self.state {
            self.state = SelectionState::Idle;
        }
    }

    /// Span for a plain click on an empty cell.
    pub fn point_span(&self, day: NaiveDate, at: DateTime<Utc>) -> TimeRange {
        let start = floor_to(at, self.snap_minutes);
        normalize_span(day, start, start + self.default_span, self.snap_minutes, self.min_span)
    }

    fn cancel(&mut self) -> SelectionOutcome {
        self.state = SelectionState::Idle;
        tracing::debug!("selection cancelled");
        SelectionOutcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn machine() -> SelectionMachine {
        SelectionMachine::new(&GridConfig::default())
    }

    fn committed(outcome: SelectionOutcome) -> TimeRange {
        match outcome {
            SelectionOutcome::Committed(request) => request.range,
            other => panic!("Expected Committed, got {:?}", other),
        }
    }

    #[test]
    fn zero_movement_commits_minimum_span() {
        let mut sel = machine();
        assert_eq!(sel.press(0, day(), at(9, 7)), SelectionOutcome::Started);
        assert_eq!(committed(sel.release(true)), TimeRange::new(at(9, 0), at(9, 15)));
    }

    #[test]
    fn drag_down_ceils_the_end() {
        let mut sel = machine();
        sel.press(0, day(), at(9, 0));
        assert_eq!(sel.drag(0, at(10, 20)), SelectionOutcome::Updated);
        assert_eq!(committed(sel.release(true)), TimeRange::new(at(9, 0), at(10, 30)));
    }

    #[test]
    fn drag_up_swaps_the_ends() {
        let mut sel = machine();
        sel.press(0, day(), at(11, 10));
        sel.drag(0, at(8, 20));
        assert_eq!(committed(sel.release(true)), TimeRange::new(at(8, 30), at(11, 0)));
    }

    #[test]
    fn moves_into_other_days_are_ignored() {
        let mut sel = machine();
        sel.press(2, day(), at(9, 0));
        assert_eq!(sel.drag(3, at(15, 0)), SelectionOutcome::Ignored);
        assert_eq!(committed(sel.release(true)), TimeRange::new(at(9, 0), at(9, 15)));
    }

    #[test]
    fn end_is_clamped_to_the_origin_day() {
        let mut sel = machine();
        sel.press(0, day(), at(22, 0));
        sel.drag(0, at(23, 55));
        let range = committed(sel.release(true));
        assert_eq!(range.start, at(22, 0));
        assert_eq!(range.end, last_instant_of(day()));
    }

    #[test]
    fn last_slot_of_the_day_keeps_minimum_span() {
        let mut sel = machine();
        sel.press(0, day(), at(23, 50));
        let range = committed(sel.release(true));
        assert!(range.duration() >= Duration::minutes(15));
        assert_eq!(range.end.date_naive(), day());
    }

    #[test]
    fn leave_and_outside_release_cancel() {
        let mut sel = machine();
        sel.press(0, day(), at(9, 0));
        assert_eq!(sel.leave(), SelectionOutcome::Cancelled);
        assert_eq!(sel.state(), &SelectionState::Idle);

        sel.press(0, day(), at(9, 0));
        assert_eq!(sel.release(false), SelectionOutcome::Cancelled);
        assert_eq!(sel.click(), ClickDisposition::Pass);
    }

    #[test]
    fn trailing_click_is_swallowed_once() {
        let mut sel = machine();
        sel.press(0, day(), at(9, 0));
        sel.release(true);
        assert_eq!(sel.click(), ClickDisposition::Swallow);
        assert_eq!(sel.click(), ClickDisposition::Pass);
    }

    #[test]
    fn press_after_commit_starts_fresh() {
        let mut sel = machine();
        sel.press(0, day(), at(9, 0));
        sel.release(true);
        assert_eq!(sel.press(1, day(), at(14, 0)), SelectionOutcome::Started);
        assert!(sel.is_selecting());
    }

    #[test]
    fn point_span_uses_default_length() {
        let sel = machine();
        assert_eq!(sel.point_span(day(), at(13, 40)), TimeRange::new(at(13, 30), at(14, 30)));
    }
}
