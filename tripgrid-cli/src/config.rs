//! CLI settings at ~/.config/tripgrid/config.toml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tripgrid_core::GridConfig;

static DEFAULT_LOG_LEVEL: &str = "warn";

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Settings file contents. Grid options live under `[grid]`; every key may
/// also be set through `TRIPGRID_*` variables, e.g. `TRIPGRID_GRID__HOUR_HEIGHT`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub grid: GridConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_level: default_log_level(),
            grid: GridConfig::default(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("tripgrid");

        Ok(config_dir.join("config.toml"))
    }

    /// The explicit `--config` path with `~` expanded, or the default path.
    pub fn resolve_path(explicit: Option<&str>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).into_owned())),
            None => Self::config_path(),
        }
    }

    /// Load settings, creating the default file on first run. An explicit
    /// path must exist.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(explicit)?;

        if explicit.is_none() && !path.exists() {
            Self::create_default_config(&path)?;
        }

        let settings: Settings = Config::builder()
            .add_source(File::from(path.clone()).required(explicit.is_some()))
            .add_source(
                Environment::with_prefix("TRIPGRID")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Could not read {}", path.display()))?
            .try_deserialize()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        settings.grid.validate()?;
        Ok(settings)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> Result<()> {
        let grid = GridConfig::default();
        let contents = format!(
            "\
# tripgrid configuration

# Log filter when RUST_LOG is unset:
# log_level = \"{log_level}\"

[grid]
# Pixels per hour in the content pane:
# hour_height = {hour_height}

# Creation and move snapping, in minutes:
# snap_minutes = {snap}
# min_span_minutes = {min_span}

# Length of the span a plain click creates:
# default_create_minutes = {create}

# Days shown side by side:
# visible_days = {visible}

# Quiet time before the first visible day is recomputed after scrolling:
# settle_delay = \"{settle}\"

# First day of the fallback week:
# week_start = \"monday\"

# Keep paging inside the trip dates:
# restrict_to_trip = false
",
            log_level = DEFAULT_LOG_LEVEL,
            hour_height = grid.hour_height,
            snap = grid.snap_minutes,
            min_span = grid.min_span_minutes,
            create = grid.default_create_minutes,
            visible = grid.visible_days,
            settle = humantime::format_duration(grid.settle_delay),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Could not create config directory")?;
        }

        std::fs::write(path, contents).context("Could not write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Settings::create_default_config(&path).unwrap();

        let settings = Settings::load(path.to_str()).expect("Should load generated file");
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.grid, GridConfig::default());
    }

    #[test]
    fn grid_section_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            concat!(
                "log_level = \"debug\"\n\n",
                "[grid]\nhour_height = 60\nvisible_days = 3\nsettle_delay = \"300ms\"\n",
            ),
        )
        .unwrap();

        let settings = Settings::load(path.to_str()).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.grid.hour_height, 60.0);
        assert_eq!(settings.grid.visible_days, 3);
        assert_eq!(settings.grid.settle_delay, std::time::Duration::from_millis(300));
        assert_eq!(settings.grid.snap_minutes, 15);
    }

    #[test]
    fn invalid_grid_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[grid]\nsnap_minutes = 7\n").unwrap();

        assert!(Settings::load(path.to_str()).is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        assert!(Settings::load(path.to_str()).is_err());
    }
}
