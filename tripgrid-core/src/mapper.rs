//! Pixel <-> time conversion for a single day column.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};

use crate::constants::HOURS_PER_DAY;
use crate::item::day_start;
use crate::window::DayWindow;

/// Maps vertical pixel offsets within a day column to times of day.
///
/// Stateless apart from the fixed hour height; `y = 0` is midnight at the top
/// of the column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    hour_height: f64,
}

impl CoordinateMapper {
    pub fn new(hour_height: f64) -> Self {
        CoordinateMapper { hour_height }
    }

    pub fn hour_height(&self) -> f64 {
        self.hour_height
    }

    pub fn day_height(&self) -> f64 {
        self.hour_height * HOURS_PER_DAY
    }

    /// Time of day under `y`, truncated to the minute.
    ///
    /// Offsets above the column clamp to 00:00, offsets below it to 23:59.
    pub fn time_of_day(&self, y: f64) -> NaiveTime {
        if !(self.hour_height > 0.0) || !(y > 0.0) {
            return NaiveTime::MIN;
        }
        if y >= self.day_height() {
            return NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);
        }
        let hour = (y / self.hour_height).floor();
        let within = y - hour * self.hour_height;
        let minute = (within / self.hour_height * 60.0).floor();
        NaiveTime::from_hms_opt(hour as u32, (minute as u32).min(59), 0).unwrap_or(NaiveTime::MIN)
    }

    /// `date` at the time of day under `y`.
    pub fn instant_on(&self, date: NaiveDate, y: f64) -> DateTime<Utc> {
        date.and_time(self.time_of_day(y)).and_utc()
    }

    /// The instant under `y` in column `day_index`; `None` outside the window.
    pub fn pixel_to_time(
        &self,
        window: &DayWindow,
        day_index: usize,
        y: f64,
    ) -> Option<DateTime<Utc>> {
        window.day(day_index).map(|date| self.instant_on(date, y))
    }

    /// Offset of `instant` within its own UTC day.
    pub fn time_to_pixel(&self, instant: DateTime<Utc>) -> f64 {
        let time = instant.time();
        let hours = time.hour() as f64
            + time.minute() as f64 / 60.0
            + time.second() as f64 / 3600.0
            + time.nanosecond() as f64 / 3_600_000_000_000.0;
        hours * self.hour_height
    }

    /// Offset of `instant` within the column for `date`. Instants before that
    /// day clamp to the top, instants after it to the bottom.
    pub fn time_to_pixel_on(&self, date: NaiveDate, instant: DateTime<Utc>) -> f64 {
        let start = day_start(date);
        if instant <= start {
            return 0.0;
        }
        let elapsed = (instant - start).num_milliseconds() as f64 / 3_600_000.0;
        (elapsed * self.hour_height).min(self.day_height())
    }
}
