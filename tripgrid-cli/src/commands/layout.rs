use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use tripgrid_core::CalendarGrid;

use crate::config::Settings;
use crate::items::ItemFile;
use crate::render::Render;

pub struct LayoutArgs<'a> {
    pub items: &'a Path,
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
    pub padding: usize,
    pub today: NaiveDate,
}

/// Print the band rows and per-day boxes for an itinerary.
pub fn run(settings: &Settings, args: LayoutArgs) -> Result<()> {
    let file = ItemFile::load(args.items)?;
    let bounds = file.bounds(args.start, args.end)?;
    let grid = CalendarGrid::new(settings.grid.clone(), bounds, file.items, args.today)?
        .with_padding(args.padding, args.padding);

    let window = grid.window();
    let band = grid.layout().band();

    if band.row_count() > 0 {
        let height = band.band_height(grid.config());
        println!(
            "{} {}",
            "Bars".bold(),
            format!("({} rows, {:.0}px)", band.row_count(), height).dimmed()
        );
        for placement in band.placements() {
            println!("  {}", placement.render());
        }
        println!();
    }

    for (index, date) in window.days().iter().enumerate() {
        let label = format!("{}  {}", index, date.format("%a %b %-d"));
        if window.in_range().contains(&index) {
            println!("{}", label.bold());
        } else {
            println!("{}", label.dimmed());
        }

        let mut boxes: Vec<_> = grid.layout().boxes_on(index).collect();
        if boxes.is_empty() {
            println!("  {}", "nothing scheduled".dimmed());
            continue;
        }
        boxes.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.slot.column.cmp(&b.slot.column)));
        for item_box in boxes {
            println!("  {}", item_box.render());
        }
    }

    let skipped: Vec<_> = grid.items().iter().filter(|item| item.range().is_none()).collect();
    if !skipped.is_empty() {
        println!();
        println!("{}", "Skipped".red().bold());
        for item in skipped {
            println!("  {}", item.render());
        }
    }

    Ok(())
}
