use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::Settings;

pub fn run(settings: &Settings, explicit: Option<&str>) -> Result<()> {
    let config_path = Settings::resolve_path(explicit)?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!();
    println!("{}", "Effective settings".bold());
    for line in toml::to_string_pretty(settings)?.lines() {
        println!("  {}", line);
    }

    Ok(())
}
