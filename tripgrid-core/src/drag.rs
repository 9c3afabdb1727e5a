//! Moving and resizing existing items.
//!
//! # State Machine
//!
//! ```text
//! Idle --press on body--> Active(Moving)          --up/leave--> Released --click--> Idle
//! Idle --press on handle--> Active(Resizing(edge)) --up/leave--> Released --click--> Idle
//! ```
//!
//! While active, every change of the previewed range is reported as an
//! [`OptimisticUpdate`]. Release emits at most one [`MoveCommit`]. The
//! `Released` state remembers whether the pointer moved so the click that
//! follows can be swallowed (after a drag) or turned into "open details"
//! (after a plain press).
//!
//! # Commit failures
//!
//! Commits are fire-and-forget; the host reports their outcome through
//! [`DragController::resolve`]. A failed commit rolls the item back to its
//! last confirmed range, but only when it is the newest commit for that item.
//! Outcomes of superseded commits never roll anything back.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::GridConfig;
use crate::item::{ItemId, TimeRange};
use crate::layout::Edge;
use crate::quantize::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Moving,
    Resizing(Edge),
}

/// Live state of an active move or resize.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub item: ItemId,
    /// Range when the press happened.
    pub original: TimeRange,
    /// Range currently previewed.
    pub current: TimeRange,
    /// Pointer time minus item start at press.
    pub anchor_offset: Duration,
    pub mode: DragMode,
    pub has_moved: bool,
    origin: (f64, f64),
}

/// Preview of an item at a range that is not persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticUpdate {
    pub id: ItemId,
    pub range: TimeRange,
}

/// Identifies one commit so its outcome can be matched later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitTicket(pub u64);

/// A time-range mutation for the host to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCommit {
    pub ticket: CommitTicket,
    pub id: ItemId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MoveCommit {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

/// What a finished gesture produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DragRelease {
    pub item: ItemId,
    pub mode: DragMode,
    pub moved: bool,
    pub commit: Option<MoveCommit>,
}

/// What the widget should do with the click that follows a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragClick {
    /// The press turned into a drag; the click belongs to it.
    Swallow,
    /// The press never moved; treat it as a click on the item.
    OpenDetails(ItemId),
    /// No drag session is waiting for its click.
    Pass,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum Session {
    #[default]
    Idle,
    Active(DragState),
    Released { item: ItemId, moved: bool },
}

#[derive(Debug, Clone)]
struct Pending {
    latest: CommitTicket,
    confirmed: TimeRange,
}

/// Owns the move/resize gesture and tracks commits in flight.
#[derive(Debug, Clone)]
pub struct DragController {
    session: Session,
    snap_minutes: i64,
    min_span: Duration,
    threshold: f64,
    next_ticket: u64,
    pending: HashMap<ItemId, Pending>,
    in_flight: HashMap<CommitTicket, (ItemId, TimeRange)>,
}

impl DragController {
    pub fn new(config: &GridConfig) -> Self {
        DragController {
            session: Session::Idle,
            snap_minutes: config.snap_minutes,
            min_span: Duration::minutes(config.snap_minutes),
            threshold: config.drag_threshold,
            next_ticket: 1,
            pending: HashMap::new(),
            in_flight: HashMap::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.session, Session::Active(_))
    }

    pub fn state(&self) -> Option<&DragState> {
        match &self.session {
            Session::Active(state) => Some(state),
            Session::Idle | Session::Released { .. } => None,
        }
    }

    /// Begin a gesture on `item`. `pointer_time` is the mapped time under the
    /// pointer and `pointer_px` its position in content coordinates.
    pub fn press(
        &mut self,
        item: ItemId,
        range: TimeRange,
        mode: DragMode,
        pointer_time: DateTime<Utc>,
        pointer_px: (f64, f64),
    ) -> bool {
        if self.is_active() {
            return false;
        }
        tracing::debug!(id = %item, ?mode, "drag started");
        self.session = Session::Active(DragState {
            item,
            original: range,
            current: range,
            anchor_offset: pointer_time - range.start,
            mode,
            has_moved: false,
            origin: pointer_px,
        });
        true
    }

    /// Pointer moved while a gesture is active. Returns the new preview when
    /// the range changed.
    pub fn motion(
        &mut self,
        pointer_time: DateTime<Utc>,
        pointer_px: (f64, f64),
    ) -> Option<OptimisticUpdate> {
        let snap_minutes = self.snap_minutes;
        let min_span = self.min_span;
        let threshold = self.threshold;
        let Session::Active(state) = &mut self.session else {
            return None;
        };

        if !state.has_moved {
            let dx = pointer_px.0 - state.origin.0;
            let dy = pointer_px.1 - state.origin.1;
            if dx.hypot(dy) <= threshold {
                return None;
            }
            state.has_moved = true;
        }

        let next = match state.mode {
            DragMode::Moving => {
                let start = round_to(pointer_time - state.anchor_offset, snap_minutes);
                TimeRange::new(start, start + state.original.duration())
            }
            DragMode::Resizing(Edge::Top) => {
                let end = state.current.end;
                let start = round_to(pointer_time, snap_minutes).min(end - min_span);
                TimeRange::new(start, end)
            }
            DragMode::Resizing(Edge::Bottom) => {
                let start = state.current.start;
                let end = round_to(pointer_time, snap_minutes).max(start + min_span);
                TimeRange::new(start, end)
            }
        };

        if next == state.current {
            return None;
        }
        state.current = next;
        tracing::trace!(id = %state.item, range = %next, "drag preview");
        Some(OptimisticUpdate {
            id: state.item.clone(),
            range: next,
        })
    }

    /// Pointer-up or pointer-leave. Ends the gesture and issues a commit when
    /// the range differs from where it started.
    pub fn release(&mut self) -> Option<DragRelease> {
        let Session::Active(state) = std::mem::take(&mut self.session) else {
            return None;
        };

        let commit = (state.current != state.original).then(|| {
            let ticket = CommitTicket(self.next_ticket);
            self.next_ticket += 1;

            let confirmed = self
                .pending
                .get(&state.item)
                .map_or(state.original, |p| p.confirmed);
            self.pending.insert(
                state.item.clone(),
                Pending {
                    latest: ticket,
                    confirmed,
                },
            );
            self.in_flight.insert(ticket, (state.item.clone(), state.current));

            MoveCommit {
                ticket,
                id: state.item.clone(),
                start: state.current.start,
                end: state.current.end,
            }
        });

        match &commit {
            Some(commit) => tracing::debug!(
                id = %commit.id,
                ticket = commit.ticket.0,
                range = %commit.range(),
                "drag committed"
            ),
            None => tracing::debug!(id = %state.item, "drag ended without change"),
        }

        self.session = Session::Released {
            item: state.item.clone(),
            moved: state.has_moved,
        };
        Some(DragRelease {
            item: state.item,
            mode: state.mode,
            moved: state.has_moved,
            commit,
        })
    }

    /// A click event arrived.
    pub fn click(&mut self) -> DragClick {
        match std::mem::take(&mut self.session) {
            Session::Released { moved: true, .. } => DragClick::Swallow,
            Session::Released { item, moved: false } => DragClick::OpenDetails(item),
            Session::Active(state) => {
                self.session = Session::Active(state);
                DragClick::Swallow
            }
            Session::Idle => DragClick::Pass,
        }
    }

    /// Forget a release whose click never came.
    pub fn settle(&mut self) {
        if let Session::Released { .. } = self.session {
            self.session = Session::Idle;
        }
    }

    /// Record the host's answer for `ticket`. Returns the range to restore
    /// when the newest commit for an item failed.
    pub fn resolve(&mut self, ticket: CommitTicket, succeeded: bool) -> Option<OptimisticUpdate> {
        let (id, range) = self.in_flight.remove(&ticket)?;
        let pending = self.pending.get_mut(&id)?;
        let newest = pending.latest == ticket;

        match (succeeded, newest) {
            (true, true) => {
                self.pending.remove(&id);
                None
            }
            (true, false) => {
                pending.confirmed = range;
                None
            }
            (false, true) => {
                let restored = pending.confirmed;
                self.pending.remove(&id);
                tracing::warn!(
                    id = %id,
                    ticket = ticket.0,
                    range = %restored,
                    "commit failed, rolling back"
                );
                Some(OptimisticUpdate { id, range: restored })
            }
            (false, false) => {
                tracing::debug!(
                    id = %id,
                    ticket = ticket.0,
                    "ignoring failure of superseded commit"
                );
                None
            }
        }
    }

    pub fn pending_commits(&self) -> usize {
        self.in_flight.len()
    }
}
