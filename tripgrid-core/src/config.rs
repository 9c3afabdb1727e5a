//! Grid geometry and gesture tuning.

use std::time::Duration;

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::*;
use crate::error::{GridError, GridResult};

/// Tunables for layout and interaction. Every field has a default so a host
/// can supply a partial config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub hour_height: f64,
    pub snap_minutes: i64,
    pub min_span_minutes: i64,
    pub default_create_minutes: i64,
    pub bar_row_height: f64,
    pub min_band_height: f64,
    pub auto_scroll_padding: f64,
    pub drag_threshold: f64,
    pub resize_handle_px: f64,
    pub min_resize_height: f64,
    pub visible_days: usize,
    /// Quiet period after the last scroll event before the visible day index
    /// is recomputed. Written as a humantime string, e.g. `"150ms"`.
    #[serde(
        serialize_with = "serialize_humantime",
        deserialize_with = "deserialize_humantime"
    )]
    pub settle_delay: Duration,
    #[serde(with = "weekday_name")]
    pub week_start: Weekday,
    pub restrict_to_trip: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            hour_height: DEFAULT_HOUR_HEIGHT,
            snap_minutes: SNAP_MINUTES,
            min_span_minutes: MIN_SPAN_MINUTES,
            default_create_minutes: DEFAULT_CREATE_MINUTES,
            bar_row_height: BAR_ROW_HEIGHT,
            min_band_height: MIN_BAND_HEIGHT,
            auto_scroll_padding: AUTO_SCROLL_PADDING,
            drag_threshold: DRAG_THRESHOLD,
            resize_handle_px: RESIZE_HANDLE_PX,
            min_resize_height: MIN_RESIZE_HEIGHT,
            visible_days: DEFAULT_VISIBLE_DAYS,
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            week_start: Weekday::Mon,
            restrict_to_trip: false,
        }
    }
}

impl GridConfig {
    /// Reject values that would make pixel math degenerate.
    pub fn validate(&self) -> GridResult<()> {
        if !(self.hour_height.is_finite() && self.hour_height > 0.0) {
            return Err(GridError::Config(format!(
                "hour_height must be positive, got {}",
                self.hour_height
            )));
        }
        if self.snap_minutes <= 0 || 1440 % self.snap_minutes != 0 {
            return Err(GridError::Config(format!(
                "snap_minutes must divide a day, got {}",
                self.snap_minutes
            )));
        }
        if self.min_span_minutes < self.snap_minutes {
            return Err(GridError::Config(
                "min_span_minutes must be at least snap_minutes".into(),
            ));
        }
        if self.visible_days == 0 {
            return Err(GridError::Config("visible_days must be at least 1".into()));
        }
        Ok(())
    }

    pub fn from_toml(content: &str) -> GridResult<Self> {
        let config: GridConfig =
            toml::from_str(content).map_err(|e| GridError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> GridResult<String> {
        toml::to_string_pretty(self).map_err(|e| GridError::Serialization(e.to_string()))
    }

    pub fn day_height(&self) -> f64 {
        self.hour_height * HOURS_PER_DAY
    }

    pub fn snap(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.snap_minutes)
    }

    pub fn min_span(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.min_span_minutes)
    }
}

fn serialize_humantime<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&humantime::format_duration(*value).to_string())
}

fn deserialize_humantime<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    let raw = String::deserialize(d)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

mod weekday_name {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Weekday, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string().to_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Weekday, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse::<Weekday>()
            .map_err(|_| serde::de::Error::custom(format!("unknown weekday '{}'", raw)))
    }
}
