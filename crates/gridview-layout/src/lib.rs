#![forbid(unsafe_code)]

//! Layered (Sugiyama-style) layout for gateway topologies.
//!
//! The pipeline is: input hygiene, feedback edge detection, longest-path ranking, median
//! crossing minimization, coordinate assignment, then fixed-position resolution. Every stage
//! iterates in input order or over ordered maps, so identical input produces bit-identical
//! output.

pub use gridview_graphlib as graphlib;

pub mod acyclic;
pub mod error;
mod model;
pub mod order;
pub mod position;
pub mod rank;

pub use error::LayoutInputError;
pub use model::{LayoutConfig, LayoutEdge, LayoutNode, LayoutResult, Point, RankDir};
pub(crate) use model::Rect;

use graphlib::Graph;
use std::collections::BTreeMap;

/// Per-node label stored in the layout graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeLabel {
    pub width: f64,
    pub height: f64,
    pub root: bool,
}

/// Builds the layout graph, dropping (and reporting) edges whose endpoints are missing.
pub fn build_graph(
    nodes: &[LayoutNode],
    edges: &[LayoutEdge],
) -> (Graph<NodeLabel, ()>, Vec<LayoutInputError>) {
    let mut g: Graph<NodeLabel, ()> = Graph::new();
    for n in nodes {
        g.set_node(
            n.id.clone(),
            NodeLabel {
                width: n.width,
                height: n.height,
                root: n.root,
            },
        );
    }

    let mut dropped: Vec<LayoutInputError> = Vec::new();
    for e in edges {
        let missing = [&e.v, &e.w].into_iter().find(|id| !g.has_node(id));
        if let Some(missing) = missing {
            tracing::warn!(v = %e.v, w = %e.w, missing = %missing, "dropping edge with unknown endpoint");
            dropped.push(LayoutInputError::MissingEndpoint {
                v: e.v.clone(),
                w: e.w.clone(),
                missing: missing.clone(),
            });
            continue;
        }
        if e.v == e.w || g.has_edge(&e.v, &e.w) {
            continue;
        }
        g.set_edge(&e.v, &e.w, ());
    }
    (g, dropped)
}

/// Lays out `nodes` left-to-right (or per [`LayoutConfig::rank_dir`]).
///
/// Nodes listed in `fixed` keep exactly the given top-left coordinates; every other node gets a
/// computed position that does not overlap a fixed one. The result holds a position for every
/// input node.
pub fn layout(
    nodes: &[LayoutNode],
    edges: &[LayoutEdge],
    fixed: &BTreeMap<String, Point>,
    config: &LayoutConfig,
) -> LayoutResult {
    let (g, dropped_edges) = build_graph(nodes, edges);

    let roots: Vec<&str> = g
        .nodes()
        .filter(|id| g.node(id).is_some_and(|n| n.root))
        .collect();
    let feedback = acyclic::feedback_edges(&g, &roots);
    if !feedback.is_empty() {
        tracing::debug!(count = feedback.len(), "ignoring cycle-closing edges for ranking");
    }

    let ranking = rank::longest_path(&g, &feedback);
    let layering = order::order(&g, &ranking, &feedback, config.max_order_iterations);
    let computed = position::assign(&g, &layering, config);
    let positions = position::resolve_fixed(&g, &layering, &computed, fixed, config);

    LayoutResult {
        positions,
        ranks: ranking.by_node,
        overflow_rank: ranking.overflow_rank,
        dropped_edges,
    }
}
