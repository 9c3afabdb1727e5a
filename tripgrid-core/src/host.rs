//! The outbound side of the grid: everything it asks its host to do.

use crate::drag::{MoveCommit, OptimisticUpdate};
use crate::item::ItemId;
use crate::selection::CreateRequest;
use crate::viewport::PaneScroll;

/// Receives the grid's requests. The grid never persists anything itself;
/// the host applies these and supplies a fresh item list on the next render.
pub trait GridHost {
    /// Open item creation pre-filled with a span.
    fn request_create(&mut self, request: CreateRequest);

    /// Persist a moved or resized item. Report the outcome back through
    /// `CalendarGrid::resolve_commit`.
    fn request_commit_move(&mut self, commit: MoveCommit);

    fn on_visible_day_index_change(&mut self, index: usize);

    /// Show an item at a range that is not persisted yet.
    fn apply_optimistic(&mut self, _update: OptimisticUpdate) {}

    fn open_details(&mut self, _id: &ItemId) {}

    /// Scroll a pane programmatically to keep the panes in sync.
    fn set_pane_scroll(&mut self, _scroll: PaneScroll) {}
}

/// One call made on a host, as recorded by [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Create(CreateRequest),
    CommitMove(MoveCommit),
    VisibleDay(usize),
    Optimistic(OptimisticUpdate),
    OpenDetails(ItemId),
    PaneScroll(PaneScroll),
}

/// A host that only remembers what it was asked.
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<HostCall>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn creates(&self) -> Vec<CreateRequest> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Create(request) => Some(*request),
                _ => None,
            })
            .collect()
    }

    pub fn commits(&self) -> Vec<MoveCommit> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::CommitMove(commit) => Some(commit.clone()),
                _ => None,
            })
            .collect()
    }
}

impl GridHost for Recorder {
    fn request_create(&mut self, request: CreateRequest) {
        self.calls.push(HostCall::Create(request));
    }

    fn request_commit_move(&mut self, commit: MoveCommit) {
        self.calls.push(HostCall::CommitMove(commit));
    }

    fn on_visible_day_index_change(&mut self, index: usize) {
        self.calls.push(HostCall::VisibleDay(index));
    }

    fn apply_optimistic(&mut self, update: OptimisticUpdate) {
        self.calls.push(HostCall::Optimistic(update));
    }

    fn open_details(&mut self, id: &ItemId) {
        self.calls.push(HostCall::OpenDetails(id.clone()));
    }

    fn set_pane_scroll(&mut self, scroll: PaneScroll) {
        self.calls.push(HostCall::PaneScroll(scroll));
    }
}
