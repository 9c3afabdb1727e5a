//! Colored terminal rendering for tripgrid types.
//!
//! Extension traits that add owo_colors output to tripgrid-core types.

use owo_colors::OwoColorize;
use tripgrid_core::host::HostCall;
use tripgrid_core::layout::ItemBox;
use tripgrid_core::rows::BarPlacement;
use tripgrid_core::{ItemKind, TimeRange, TimedItem};

use crate::items::Step;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Colorize text according to the item kind
fn colorize_kind(kind: ItemKind, text: &str) -> String {
    match kind {
        ItemKind::Travel => text.blue().to_string(),
        ItemKind::Food => text.yellow().to_string(),
        ItemKind::Activity => text.green().to_string(),
        ItemKind::Accommodation => text.magenta().to_string(),
    }
}

/// "Tue 09:00 → 10:30", repeating the weekday when the range crosses midnight.
pub fn format_range(range: &TimeRange) -> String {
    let start = range.start.format("%a %H:%M");
    if range.start.date_naive() == range.end.date_naive() {
        format!("{} → {}", start, range.end.format("%H:%M"))
    } else {
        format!("{} → {}", start, range.end.format("%a %H:%M"))
    }
}

impl Render for TimedItem {
    fn render(&self) -> String {
        let name = colorize_kind(self.kind, &self.to_string());
        let when = match self.range() {
            Some(range) => format_range(&range),
            None => "no valid time".red().to_string(),
        };
        format!("{} {} {}", name, when.dimmed(), format!("({})", self.kind.label()).dimmed())
    }
}

impl Render for ItemBox {
    fn render(&self) -> String {
        let column = format!("[{}/{}]", self.slot.column + 1, self.slot.total_columns);
        let geometry = format!("y={:.0} h={:.0}", self.top, self.height);
        format!(
            "{} {} {} {}",
            format_range(&self.range),
            column.cyan(),
            self.id.bold(),
            geometry.dimmed()
        )
    }
}

impl Render for BarPlacement {
    fn render(&self) -> String {
        format!(
            "row {} {} {}",
            self.row,
            self.id.bold(),
            format!("day {} +{}", self.first_day_index, self.span_days).dimmed()
        )
    }
}

impl Render for HostCall {
    fn render(&self) -> String {
        match self {
            HostCall::Create(request) => format!(
                "{} day {} {}",
                "create".green(),
                request.day_index,
                format_range(&request.range)
            ),
            HostCall::CommitMove(commit) => format!(
                "{} {} {} {}",
                "commit".yellow(),
                commit.id.bold(),
                format_range(&commit.range()),
                format!("#{}", commit.ticket.0).dimmed()
            ),
            HostCall::VisibleDay(index) => format!("{} {}", "visible".cyan(), index),
            HostCall::Optimistic(update) => {
                format!("{} {} {}", "preview".dimmed(), update.id, format_range(&update.range))
            }
            HostCall::OpenDetails(id) => format!("{} {}", "details".blue(), id.bold()),
            HostCall::PaneScroll(scroll) => format!(
                "{} {:?} {:.0},{:.0}",
                "scroll".dimmed(),
                scroll.pane,
                scroll.offset.left,
                scroll.offset.top
            ),
        }
    }
}

impl Render for Step {
    fn render(&self) -> String {
        let text = match self {
            Step::Down { x, y } => format!("down {x:.0},{y:.0}"),
            Step::Move { x, y } => format!("move {x:.0},{y:.0}"),
            Step::Up { x, y } => format!("up {x:.0},{y:.0}"),
            Step::Leave => "leave".to_string(),
            Step::Click { x, y } => format!("click {x:.0},{y:.0}"),
            Step::Scroll { pane, left, top } => format!("scroll {pane:?} {left:.0},{top:.0}"),
            Step::Wait { ms } => format!("wait {ms}ms"),
            Step::Page { delta } => format!("page {delta:+}"),
            Step::Resize { width } => format!("resize {width:.0}"),
        };
        format!("> {}", text).dimmed().to_string()
    }
}
