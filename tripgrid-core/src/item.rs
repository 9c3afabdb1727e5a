//! Items rendered on the grid.
//!
//! Items are owned by the host. The engine only reads a snapshot per render
//! and derives layout metadata from it, so every type here is a plain value.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Host-assigned item identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

/// What an item is. Decides which part of the grid renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Travel,
    Food,
    Activity,
    /// A lodging stay, drawn as a multi-day bar above the hourly grid.
    Accommodation,
}

/// Where an item kind is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A box on the hourly grid of each day it touches.
    Timed,
    /// A bar in the row band spanning whole days.
    Bar,
}

impl ItemKind {
    pub fn placement(self) -> Placement {
        match self {
            ItemKind::Travel | ItemKind::Food | ItemKind::Activity => Placement::Timed,
            ItemKind::Accommodation => Placement::Bar,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Travel => "travel",
            ItemKind::Food => "food",
            ItemKind::Activity => "activity",
            ItemKind::Accommodation => "accommodation",
        }
    }
}

/// A half-open instant range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        TimeRange { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Touching ranges (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The part of this range that falls on `other`, if any.
    pub fn intersect(&self, other: &TimeRange) -> Option<TimeRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(TimeRange { start, end })
    }

    /// The whole UTC day `[00:00, next 00:00)`.
    pub fn whole_day(date: NaiveDate) -> Self {
        let start = day_start(date);
        TimeRange {
            start,
            end: start + Duration::days(1),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// UTC midnight at the start of `date`.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Any start/end bounded entry rendered on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedItem {
    pub id: ItemId,
    pub kind: ItemKind,
    #[serde(default)]
    pub title: String,
    /// Missing or unparseable instants deserialize to `None`; such items are
    /// skipped by layout instead of rejecting the whole snapshot.
    #[serde(default, deserialize_with = "lenient_instant")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_instant")]
    pub end: Option<DateTime<Utc>>,
}

impl TimedItem {
    pub fn new(
        id: impl Into<String>,
        kind: ItemKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        TimedItem {
            id: ItemId::new(id),
            kind,
            title: String::new(),
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// The item's range, or `None` when an instant is missing or the range is
    /// empty or reversed.
    pub fn range(&self) -> Option<TimeRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start < end => Some(TimeRange { start, end }),
            _ => None,
        }
    }

    pub fn set_range(&mut self, range: TimeRange) {
        self.start = Some(range.start);
        self.end = Some(range.end);
    }

    /// Whole-day span `(first, last)` covered by this item, both inclusive.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let range = self.range()?;
        Some((range.start.date_naive(), range.end.date_naive()))
    }
}

impl fmt::Display for TimedItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}", self.title)
        }
    }
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC) or a bare date.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(day_start)
}

fn lenient_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|s| {
        let parsed = parse_instant(s);
        if parsed.is_none() {
            tracing::warn!(value = s, "ignoring unparseable instant");
        }
        parsed
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn touching_ranges_do_not_overlap() {
        let a = TimeRange::new(at(9, 0), at(10, 0));
        let b = TimeRange::new(at(10, 0), at(11, 0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&TimeRange::new(at(9, 59), at(10, 30))));
    }

    #[test]
    fn reversed_or_missing_instants_have_no_range() {
        let mut item = TimedItem::new("a", ItemKind::Food, at(12, 0), at(11, 0));
        assert_eq!(item.range(), None);

        item.end = None;
        assert_eq!(item.range(), None);
    }

    #[test]
    fn accommodation_is_a_bar() {
        assert_eq!(ItemKind::Accommodation.placement(), Placement::Bar);
        assert_eq!(ItemKind::Travel.placement(), Placement::Timed);
    }

    #[test]
    fn deserializes_lenient_instants() {
        let json = r#"[
            {"id": "ok", "kind": "activity",
             "start": "2025-03-10T09:00:00Z", "end": "2025-03-10T10:00"},
            {"id": "bad", "kind": "food", "start": "not a time", "end": "2025-03-10T10:00:00Z"}
        ]"#;

        let items: Vec<TimedItem> = serde_json::from_str(json).expect("Should parse");
        assert_eq!(items[0].range(), Some(TimeRange::new(at(9, 0), at(10, 0))));
        assert_eq!(items[1].start, None);
        assert_eq!(items[1].range(), None);
    }

    #[test]
    fn intersect_clips_to_day() {
        let overnight = TimeRange::new(at(22, 0), at(22, 0) + Duration::hours(4));
        let day = TimeRange::whole_day(at(0, 0).date_naive());
        let clipped = overnight.intersect(&day).expect("Should intersect");
        assert_eq!(clipped.end, day.end);
    }
}
