//! The reconciled graph model and the user intents that edit it.
//!
//! A [`GraphModel`] is built by [`crate::reconcile`] and edited by intents (select, drag, clear).
//! Every intent checks its arguments before touching anything, so a failed intent leaves the
//! model unchanged.

use crate::entity::{Entity, EntityKind, EntityStatus};
use crate::error::{Error, Result};
use crate::geom::Point;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSource {
    /// Placed by the layout engine (or waiting for it).
    #[default]
    Auto,
    /// Dragged by the user. Never reverts on its own.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub entity: Entity,
    /// `None` until the layout engine fills it.
    pub position: Option<Point>,
    pub position_source: PositionSource,
    pub selected: bool,
}

impl Node {
    pub(crate) fn new(entity: Entity) -> Self {
        Self {
            entity,
            position: None,
            position_source: PositionSource::Auto,
            selected: false,
        }
    }

    pub fn id(&self) -> &str {
        self.entity.name()
    }

    pub fn kind(&self) -> EntityKind {
        self.entity.kind()
    }

    pub fn is_placeholder(&self) -> bool {
        self.position.is_none()
    }

    pub fn is_manual(&self) -> bool {
        self.position_source == PositionSource::Manual
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Restart,
    Stop,
}

/// A validated lifecycle request, ready for whatever transport dispatches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    pub id: String,
    pub kind: EntityKind,
    pub action: ControlAction,
}

/// Aggregates shown next to the gateway: counts and tool totals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopologySummary {
    pub gateway: Option<String>,
    pub workers: usize,
    pub resources: usize,
    pub total_tools: u64,
    /// Status counts over workers and resources.
    pub by_status: BTreeMap<EntityStatus, usize>,
}

/// Nodes keyed by entity name (in snapshot order), derived edges, and the current selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphModel {
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
    selected_id: Option<String>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        nodes: IndexMap<String, Node>,
        edges: Vec<Edge>,
        selected_id: Option<String>,
    ) -> Self {
        Self {
            nodes,
            edges,
            selected_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// Ids of nodes still waiting for a layout position.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .values()
            .filter(|n| n.is_placeholder())
            .map(Node::id)
    }

    fn require(&self, id: &str) -> Result<()> {
        if self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(Error::UnknownNode { id: id.to_string() })
        }
    }

    /// Selects `id`, or clears the selection with `None`.
    pub fn select(&mut self, id: Option<&str>) -> Result<()> {
        if let Some(id) = id {
            self.require(id)?;
        }
        if let Some(prev) = self.selected_id.take() {
            if let Some(node) = self.nodes.get_mut(&prev) {
                node.selected = false;
            }
        }
        if let Some(id) = id {
            if let Some(node) = self.nodes.get_mut(id) {
                node.selected = true;
            }
            self.selected_id = Some(id.to_string());
        }
        Ok(())
    }

    /// Records a drag: the node moves to `position` and becomes manual.
    pub fn set_position(&mut self, id: &str, position: Point) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::UnknownNode { id: id.to_string() })?;
        node.position = Some(position);
        node.position_source = PositionSource::Manual;
        Ok(())
    }

    /// Hands the node back to the layout engine on the next pass.
    pub fn clear_position(&mut self, id: &str) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::UnknownNode { id: id.to_string() })?;
        node.position = None;
        node.position_source = PositionSource::Auto;
        Ok(())
    }

    /// Clears every position, manual ones included.
    pub fn reset_layout(&mut self) {
        for node in self.nodes.values_mut() {
            node.position = None;
            node.position_source = PositionSource::Auto;
        }
    }

    /// Fills placeholder positions from a layout pass. Nodes that already have a position are
    /// left alone, as are ids the model does not know.
    pub fn apply_auto_positions(&mut self, positions: &BTreeMap<String, Point>) -> usize {
        let mut filled = 0usize;
        for node in self.nodes.values_mut() {
            if node.position.is_some() {
                continue;
            }
            if let Some(p) = positions.get(node.entity.name()) {
                node.position = Some(*p);
                node.position_source = PositionSource::Auto;
                filled += 1;
            }
        }
        filled
    }

    /// Validates a restart/stop request. The gateway is not controllable.
    pub fn control_request(&self, id: &str, action: ControlAction) -> Result<ControlRequest> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| Error::UnknownNode { id: id.to_string() })?;
        match node.kind() {
            EntityKind::Gateway => Err(Error::NotControllable {
                id: id.to_string(),
                kind: EntityKind::Gateway,
            }),
            kind @ (EntityKind::Worker | EntityKind::Resource) => Ok(ControlRequest {
                id: id.to_string(),
                kind,
                action,
            }),
        }
    }

    pub fn summary(&self) -> TopologySummary {
        let mut out = TopologySummary::default();
        for node in self.nodes.values() {
            match &node.entity {
                Entity::Gateway(g) => {
                    out.gateway = Some(g.name.clone());
                    continue;
                }
                Entity::Worker(w) => {
                    out.workers += 1;
                    out.total_tools += u64::from(w.tool_count.unwrap_or(0));
                }
                Entity::Resource(_) => out.resources += 1,
            }
            *out.by_status.entry(node.entity.status()).or_insert(0) += 1;
        }
        out
    }
}
