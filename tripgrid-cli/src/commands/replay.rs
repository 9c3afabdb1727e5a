//! Replay a recorded pointer session against an itinerary.
//!
//! The replay host plays the part of the page embedding the grid: it keeps
//! its own copy of the items, turns creation requests into new items and
//! persists commits on a background task. Commit outcomes come back over a
//! channel and are fed to the grid between steps, the way a real host would
//! answer asynchronously.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tripgrid_core::drag::{CommitTicket, MoveCommit, OptimisticUpdate};
use tripgrid_core::host::HostCall;
use tripgrid_core::selection::CreateRequest;
use tripgrid_core::viewport::{PaneScroll, ScrollOffset};
use tripgrid_core::{CalendarGrid, GridHost, ItemId, ItemKind, TimeRange, TimedItem};

use crate::config::Settings;
use crate::items::{ItemFile, Script, Step, TripDates};
use crate::render::Render;

pub struct ReplayArgs<'a> {
    pub items: &'a Path,
    pub script: &'a Path,
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
    pub width: f64,
    pub today: NaiveDate,
    /// Write committed changes back to the item file.
    pub write: bool,
    /// Report every commit as failed.
    pub fail_commits: bool,
}

type CommitResult = (CommitTicket, bool);

struct ReplayHost {
    items: Vec<TimedItem>,
    trip: Option<TripDates>,
    persist_to: Option<PathBuf>,
    fail_commits: bool,
    created: usize,
    /// Set when the item list gained entries the grid has not seen yet.
    dirty: bool,
    results: mpsc::UnboundedSender<CommitResult>,
    in_flight: Vec<JoinHandle<()>>,
}

impl ReplayHost {
    fn print(&self, call: HostCall) {
        println!("  {}", call.render());
    }

    fn set_range(&mut self, id: &ItemId, range: TimeRange) {
        if let Some(item) = self.items.iter_mut().find(|item| &item.id == id) {
            item.set_range(range);
        }
    }

    /// Wait for every spawned persist so its result is in the channel.
    async fn settle(&mut self) -> Result<()> {
        for handle in std::mem::take(&mut self.in_flight) {
            handle.await?;
        }
        Ok(())
    }
}

impl GridHost for ReplayHost {
    fn request_create(&mut self, request: CreateRequest) {
        self.created += 1;
        let item = TimedItem::new(
            format!("new-{}", self.created),
            ItemKind::Activity,
            request.range.start,
            request.range.end,
        )
        .with_title("New item");
        self.items.push(item);
        self.dirty = true;
        self.print(HostCall::Create(request));
    }

    fn request_commit_move(&mut self, commit: MoveCommit) {
        self.set_range(&commit.id, commit.range());

        let ticket = commit.ticket;
        let snapshot = ItemFile {
            trip: self.trip.clone(),
            items: self.items.clone(),
        };
        let target = self.persist_to.clone();
        let fail = self.fail_commits;
        let results = self.results.clone();
        self.print(HostCall::CommitMove(commit));

        self.in_flight.push(tokio::spawn(async move {
            let succeeded = match (fail, target) {
                (true, _) => false,
                (false, None) => true,
                (false, Some(path)) => match snapshot.save(&path).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(error = %e, "could not persist commit");
                        false
                    }
                },
            };
            let _ = results.send((ticket, succeeded));
        }));
    }

    fn on_visible_day_index_change(&mut self, index: usize) {
        self.print(HostCall::VisibleDay(index));
    }

    fn apply_optimistic(&mut self, update: OptimisticUpdate) {
        self.set_range(&update.id, update.range);
        self.print(HostCall::Optimistic(update));
    }

    fn open_details(&mut self, id: &ItemId) {
        self.print(HostCall::OpenDetails(id.clone()));
    }

    fn set_pane_scroll(&mut self, scroll: PaneScroll) {
        tracing::debug!(
            pane = ?scroll.pane,
            left = scroll.offset.left,
            top = scroll.offset.top,
            "pane scroll"
        );
    }
}

pub async fn run(settings: &Settings, args: ReplayArgs<'_>) -> Result<()> {
    let file = ItemFile::load(args.items)?;
    let script = Script::load(args.script)?;
    let bounds = file.bounds(args.start, args.end)?;

    let (results, mut outcomes) = mpsc::unbounded_channel::<CommitResult>();
    let mut host = ReplayHost {
        items: file.items.clone(),
        trip: file.trip.clone(),
        persist_to: args.write.then(|| args.items.to_path_buf()),
        fail_commits: args.fail_commits,
        created: 0,
        dirty: false,
        results,
        in_flight: Vec::new(),
    };

    let mut grid = CalendarGrid::new(settings.grid.clone(), bounds, file.items, args.today)?;
    grid.mount(args.width, &mut host);

    // Scroll settling runs on a virtual clock advanced only by `wait` steps.
    let origin = Instant::now();
    let mut elapsed = Duration::ZERO;

    for step in &script.steps {
        println!("{}", step.render());
        let now = origin + elapsed;

        match *step {
            Step::Wait { ms } => elapsed += Duration::from_millis(ms),
            Step::Scroll { pane, left, top } => {
                grid.scroll(pane, ScrollOffset { left, top }, now, &mut host)
            }
            Step::Page { delta } => {
                grid.pager().page_by(delta, &mut host);
            }
            Step::Resize { width } => grid.resize(width, &mut host),
            _ => {
                if let Some(event) = step.pointer() {
                    grid.pointer(event, &mut host);
                }
            }
        }
        grid.tick(origin + elapsed, &mut host);

        host.settle().await?;
        while let Ok((ticket, succeeded)) = outcomes.try_recv() {
            if !succeeded {
                println!("  {}", format!("commit #{} failed", ticket.0).red());
            }
            grid.resolve_commit(ticket, succeeded, &mut host);
        }

        if host.dirty {
            host.dirty = false;
            let items = host.items.clone();
            grid.set_items(items, &mut host);
        }
    }

    println!();
    println!("{}", "Items".bold());
    for item in grid.items() {
        println!("  {}", item.render());
    }
    if args.write {
        ItemFile {
            trip: host.trip.clone(),
            items: host.items.clone(),
        }
        .save(args.items)
        .await?;
        println!("{}", format!("Saved {}", args.items.display()).dimmed());
    }

    Ok(())
}
