#![forbid(unsafe_code)]

//! `gridview` keeps a live picture of a gateway and the workers/resources it manages.
//!
//! Each polling cycle fetches a [`Snapshot`], reconciles it into the current
//! [`GraphModel`], and lays out only the nodes that just appeared, so selection and dragged
//! positions survive every refresh. Async APIs are executor-agnostic.
//!
//! ```no_run
//! use futures::executor::block_on;
//! use gridview::{FileSnapshotFetcher, GridviewConfig, Monitor, SystemClock};
//!
//! # fn main() -> gridview::Result<()> {
//! let config = GridviewConfig::default();
//! let fetcher = FileSnapshotFetcher::new("topology.json");
//! let mut monitor = Monitor::new(fetcher, SystemClock::new(), &config)?;
//! monitor.start();
//! if let Some(view) = block_on(monitor.tick()) {
//!     println!("{} nodes", view.model.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod layout;
mod monitor;
pub mod scheduler;
mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GridviewConfig;
pub use error::{Error, Result};
pub use fetch::{FetchError, FileSnapshotFetcher, FnFetcher, SnapshotFetcher, SnapshotFormat};
pub use monitor::Monitor;
pub use scheduler::{Completion, Phase, PollScheduler, Ticket, Trigger};
pub use session::{TopologySession, TopologyView};

pub use gridview_core::Error as ModelError;
pub use gridview_core::{
    ControlAction, ControlRequest, Edge, Entity, EntityKind, EntityStatus, GraphModel, Node,
    Point, PositionSource, Snapshot, TopologySummary,
};
pub use gridview_layout::{LayoutConfig, RankDir};
