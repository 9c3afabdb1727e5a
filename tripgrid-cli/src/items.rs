//! Item and script files, in TOML or JSON depending on the extension.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tripgrid_core::viewport::Pane;
use tripgrid_core::{PointerEvent, TimedItem, TripBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    pub fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Format::Toml),
            Some("json") => Ok(Format::Json),
            _ => anyhow::bail!(
                "Unsupported file type for {}. Use a .toml or .json file",
                path.display()
            ),
        }
    }
}

fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = Format::of(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    parse(&content, format).with_context(|| format!("Could not parse {}", path.display()))
}

fn parse<T: DeserializeOwned>(content: &str, format: Format) -> Result<T> {
    Ok(match format {
        Format::Toml => toml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    })
}

/// Trip dates as written in an item file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDates {
    pub start: String,
    pub end: String,
}

/// An itinerary: optional trip dates plus the items to lay out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip: Option<TripDates>,

    #[serde(default)]
    pub items: Vec<TimedItem>,
}

impl ItemFile {
    pub fn load(path: &Path) -> Result<Self> {
        read(path)
    }

    pub fn render_as(&self, format: Format) -> Result<String> {
        Ok(match format {
            Format::Toml => toml::to_string_pretty(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        })
    }

    /// Write the file back, keeping its format.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = self.render_as(Format::of(path)?)?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Could not write {}", path.display()))
    }

    /// Bounds from `--start`/`--end`, falling back to the file's `[trip]`.
    pub fn bounds(&self, start: Option<&str>, end: Option<&str>) -> Result<Option<TripBounds>> {
        match (start, end) {
            (Some(start), Some(end)) => Ok(Some(TripBounds::from_args(start, end)?)),
            (None, None) => match &self.trip {
                Some(trip) => Ok(Some(TripBounds::from_args(&trip.start, &trip.end)?)),
                None => Ok(None),
            },
            _ => anyhow::bail!("--start and --end must be given together"),
        }
    }
}

/// One step of a recorded pointer session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Leave,
    Click { x: f64, y: f64 },
    Scroll { pane: Pane, left: f64, top: f64 },
    /// Let time pass, so scroll settling can happen.
    Wait { ms: u64 },
    Page { delta: isize },
    Resize { width: f64 },
}

impl Step {
    pub fn pointer(&self) -> Option<PointerEvent> {
        match *self {
            Step::Down { x, y } => Some(PointerEvent::Down { x, y }),
            Step::Move { x, y } => Some(PointerEvent::Move { x, y }),
            Step::Up { x, y } => Some(PointerEvent::Up { x, y }),
            Step::Leave => Some(PointerEvent::Leave),
            Step::Click { x, y } => Some(PointerEvent::Click { x, y }),
            Step::Scroll { .. }
            | Step::Wait { .. }
            | Step::Page { .. }
            | Step::Resize { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        read(path)
    }
}
