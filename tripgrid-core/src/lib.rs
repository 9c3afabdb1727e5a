//! Layout and interaction engine for a trip calendar's day grid.
//!
//! This crate lays out host-owned items on a window of days and turns raw
//! pointer input into create, move and resize requests:
//! - `mapper`, `columns`, `rows` and `layout` derive per-render geometry
//! - `selection` and `drag` are the gesture state machines
//! - `viewport` keeps the scrollable panes in sync
//! - `grid` ties them together behind a single widget, talking to the host
//!   through the `host::GridHost` trait

pub mod columns;
pub mod config;
pub mod constants;
pub mod drag;
pub mod error;
pub mod grid;
pub mod host;
pub mod item;
pub mod layout;
pub mod mapper;
pub mod quantize;
pub mod rows;
pub mod selection;
pub mod viewport;
pub mod window;

pub use config::GridConfig;
pub use error::{GridError, GridResult};
pub use grid::{CalendarGrid, DayPager, PointerEvent};
pub use host::GridHost;
pub use item::{ItemId, ItemKind, TimeRange, TimedItem};
pub use window::{DayWindow, TripBounds};
