//! Snapshot reconciliation.

use crate::entity::{Entity, Snapshot};
use crate::model::{Edge, GraphModel, Node};
use indexmap::{IndexMap, IndexSet};

/// Merges `snapshot` into `previous` and returns the new model.
///
/// Nodes are matched by entity name. A surviving node keeps its position, position source and
/// selection; only its entity is replaced. New entities become placeholder nodes. Nodes whose
/// entity is gone are dropped, and the selection with them. Edges are derived from scratch.
///
/// The snapshot is expected to be validated ([`Snapshot::validate`]); on duplicate names the
/// last entity wins.
pub fn reconcile(previous: &GraphModel, snapshot: &Snapshot) -> GraphModel {
    let mut nodes: IndexMap<String, Node> = IndexMap::with_capacity(snapshot.entities.len());
    for entity in &snapshot.entities {
        let node = match previous.node(entity.name()) {
            Some(prev) => Node {
                entity: entity.clone(),
                ..prev.clone()
            },
            None => Node::new(entity.clone()),
        };
        nodes.insert(entity.name().to_string(), node);
    }

    let selected_id = match previous.selected_id() {
        Some(id) if nodes.contains_key(id) => Some(id.to_string()),
        Some(id) => {
            tracing::debug!(id, "selected node disappeared; clearing selection");
            None
        }
        None => None,
    };

    let edges = derive_edges(snapshot);
    let added = nodes.values().filter(|n| n.is_placeholder()).count();
    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        added,
        removed = previous
            .node_ids()
            .filter(|id| !nodes.contains_key(*id))
            .count(),
        "reconciled snapshot"
    );

    GraphModel::from_parts(nodes, edges, selected_id)
}

/// Derives the edge list of a snapshot.
///
/// Gateway edges come first, in snapshot order: one per worker and one per resource that no
/// worker references. Worker edges follow in worker order. References to unknown resources are
/// dropped with a warning; repeated references collapse into one edge.
pub fn derive_edges(snapshot: &Snapshot) -> Vec<Edge> {
    let resources: IndexSet<&str> = snapshot.resources().map(|r| r.name.as_str()).collect();

    let mut worker_edges: IndexSet<Edge> = IndexSet::new();
    let mut referenced: IndexSet<&str> = IndexSet::new();
    for worker in snapshot.workers() {
        for name in &worker.resources {
            if !resources.contains(name.as_str()) {
                tracing::warn!(
                    worker = %worker.name,
                    resource = %name,
                    "dropping edge to unknown resource"
                );
                continue;
            }
            referenced.insert(name.as_str());
            worker_edges.insert(Edge::new(worker.name.clone(), name.clone()));
        }
    }

    let mut edges: Vec<Edge> = Vec::with_capacity(snapshot.entities.len() + worker_edges.len());
    if let Some(gateway) = snapshot.gateway() {
        for entity in &snapshot.entities {
            match entity {
                Entity::Worker(w) => edges.push(Edge::new(gateway.name.clone(), w.name.clone())),
                Entity::Resource(r) if !referenced.contains(r.name.as_str()) => {
                    edges.push(Edge::new(gateway.name.clone(), r.name.clone()));
                }
                _ => {}
            }
        }
    }
    edges.extend(worker_edges);
    edges
}
