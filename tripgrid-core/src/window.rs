//! The contiguous run of days the grid displays.

use std::ops::Range;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::item::{TimedItem, TimeRange, day_start};

/// Inclusive first/last day of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TripBounds {
    pub fn new(start: NaiveDate, end: NaiveDate) -> GridResult<Self> {
        if start > end {
            return Err(GridError::InvalidBounds {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(TripBounds { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings.
    pub fn from_args(start: &str, end: &str) -> GridResult<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn parse_date(s: &str) -> GridResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| GridError::Parse(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s)))
}

/// Ordered, de-duplicated, gap-free sequence of UTC days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayWindow {
    days: Vec<NaiveDate>,
    /// Indices of the days that fall inside the trip bounds.
    in_range: Range<usize>,
}

impl DayWindow {
    /// Every day from `bounds.start` to `bounds.end`.
    pub fn from_bounds(bounds: TripBounds) -> Self {
        let days: Vec<NaiveDate> =
            bounds.start.iter_days().take_while(|d| *d <= bounds.end).collect();
        let len = days.len();
        DayWindow { days, in_range: 0..len }
    }

    /// Extend the window with extra days on either side. The extra days are
    /// outside the trip range.
    pub fn with_padding(self, before: usize, after: usize) -> Self {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return self;
        };
        let start = first - Duration::days(before as i64);
        let end = last + Duration::days(after as i64);
        let days: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
        let in_range = (self.in_range.start + before)..(self.in_range.end + before);
        DayWindow { days, in_range }
    }

    /// The seven days of the week containing `date`.
    pub fn week_of(date: NaiveDate, week_start: Weekday) -> Self {
        let back = (7 + date.weekday().num_days_from_monday() as i64
            - week_start.num_days_from_monday() as i64)
            % 7;
        let first = date - Duration::days(back);
        let days: Vec<NaiveDate> = first.iter_days().take(7).collect();
        DayWindow { days, in_range: 0..7 }
    }

    /// Trip bounds when known; otherwise the week of the earliest item with a
    /// valid start, falling back to the week of `today`.
    pub fn resolve(
        bounds: Option<TripBounds>,
        items: &[TimedItem],
        today: NaiveDate,
        week_start: Weekday,
    ) -> Self {
        if let Some(bounds) = bounds {
            return Self::from_bounds(bounds);
        }
        let earliest = items
            .iter()
            .filter_map(|item| item.range())
            .map(|range| range.start.date_naive())
            .min()
            .unwrap_or(today);
        Self::week_of(earliest, week_start)
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, index: usize) -> Option<NaiveDate> {
        self.days.get(index).copied()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }

    /// Days are contiguous, so the index is the day offset from the first.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let first = self.first()?;
        let offset = (date - first).num_days();
        if offset < 0 || offset as usize >= self.days.len() {
            return None;
        }
        Some(offset as usize)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index_of(date).is_some()
    }

    pub fn in_range(&self) -> Range<usize> {
        self.in_range.clone()
    }

    /// Index of the last day inside the trip bounds.
    pub fn last_in_range(&self) -> Option<usize> {
        (!self.in_range.is_empty()).then(|| self.in_range.end - 1)
    }

    /// The instant range covered by day `index`.
    pub fn day_range(&self, index: usize) -> Option<TimeRange> {
        self.day(index).map(TimeRange::whole_day)
    }

    /// The instant range covered by the whole window.
    pub fn span(&self) -> Option<TimeRange> {
        let first = self.first()?;
        let last = self.last()?;
        Some(TimeRange::new(day_start(first), day_start(last) + Duration::days(1)))
    }
}
