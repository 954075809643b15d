#![forbid(unsafe_code)]

//! Topology model for a gateway and the workers/resources it manages (headless).
//!
//! - [`entity`]: snapshot records as reported by the backend
//! - [`model`]: the reconciled graph and the intents that edit it
//! - [`reconcile`]: merges a snapshot into the previous model without losing view state
//!
//! Everything here is synchronous and pure; polling and layout live in the `gridview` crate.

pub mod config;
pub mod entity;
pub mod error;
pub mod geom;
pub mod model;
mod reconcile;

pub use config::NodeSizes;
pub use entity::{
    Entity, EntityKind, EntityStatus, GatewayEntity, ResourceEntity, Snapshot, Transport,
    WorkerEntity,
};
pub use error::{Error, Result};
pub use geom::{BoxSize, Point};
pub use model::{
    ControlAction, ControlRequest, Edge, GraphModel, Node, PositionSource, TopologySummary,
};
pub use reconcile::{derive_edges, reconcile};
