//! The single update path for the current graph model.

use crate::config::GridviewConfig;
use crate::layout::place_new_nodes;
use crate::scheduler::Phase;
use chrono::{DateTime, Utc};
use gridview_core::{
    ControlAction, ControlRequest, GraphModel, NodeSizes, Point, Result, Snapshot, reconcile,
};
use gridview_layout::LayoutConfig;
use serde::Serialize;
use std::sync::Arc;

/// What the presentation layer renders after a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyView {
    pub model: Arc<GraphModel>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub phase: Phase,
}

/// Owns the current [`GraphModel`].
///
/// Snapshots and user intents both go through `&mut self`, so updates never interleave. The
/// model is swapped as a whole; views handed out earlier keep the `Arc` they were given.
#[derive(Debug, Clone)]
pub struct TopologySession {
    model: Arc<GraphModel>,
    node_sizes: NodeSizes,
    layout: LayoutConfig,
    last_updated: Option<DateTime<Utc>>,
}

impl TopologySession {
    /// Fails when `config` does not validate.
    pub fn new(config: &GridviewConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            model: Arc::new(GraphModel::new()),
            node_sizes: config.node_sizes,
            layout: config.layout.clone(),
            last_updated: None,
        })
    }

    pub fn model(&self) -> Arc<GraphModel> {
        Arc::clone(&self.model)
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Reconciles `snapshot` into the current model and lays out the nodes it adds.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot, at: DateTime<Utc>) -> Arc<GraphModel> {
        let mut next = reconcile(&self.model, snapshot);
        place_new_nodes(&mut next, &self.node_sizes, &self.layout);
        self.model = Arc::new(next);
        self.last_updated = Some(snapshot.fetched_at.unwrap_or(at));
        self.model()
    }

    pub fn select_node(&mut self, id: Option<&str>) -> Result<()> {
        self.update(|m| m.select(id))
    }

    /// A drag: the node lands at `position` and is manual from now on.
    pub fn set_position(&mut self, id: &str, position: Point) -> Result<()> {
        self.update(|m| m.set_position(id, position))
    }

    /// Returns one node to automatic placement and places it right away.
    pub fn clear_position(&mut self, id: &str) -> Result<()> {
        let (sizes, layout) = (self.node_sizes, self.layout.clone());
        self.update(|m| {
            m.clear_position(id)?;
            place_new_nodes(m, &sizes, &layout);
            Ok(())
        })
    }

    /// Forgets every position, manual ones included, and lays the whole graph out again.
    pub fn reset_layout(&mut self) {
        let mut next = (*self.model).clone();
        next.reset_layout();
        place_new_nodes(&mut next, &self.node_sizes, &self.layout);
        self.model = Arc::new(next);
    }

    pub fn request_action(&self, id: &str, action: ControlAction) -> Result<ControlRequest> {
        let request = self.model.control_request(id, action)?;
        tracing::debug!(id, ?action, "control request validated");
        Ok(request)
    }

    pub fn view(&self, is_loading: bool, error: Option<&str>, phase: Phase) -> TopologyView {
        TopologyView {
            model: self.model(),
            is_loading,
            error: error.map(str::to_string),
            last_updated: self.last_updated,
            phase,
        }
    }

    /// Applies `f` to a copy and swaps it in only on success.
    fn update(&mut self, f: impl FnOnce(&mut GraphModel) -> Result<()>) -> Result<()> {
        let mut next = (*self.model).clone();
        f(&mut next)?;
        self.model = Arc::new(next);
        Ok(())
    }
}
