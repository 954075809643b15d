//! Bridges the graph model and the layout engine.

use gridview_core::{EntityKind, GraphModel, NodeSizes, Point};
use gridview_layout::{LayoutConfig, LayoutEdge, LayoutNode, LayoutResult};
use std::collections::BTreeMap;

fn to_layout_point(p: Point) -> gridview_layout::Point {
    gridview_layout::Point::new(p.x, p.y)
}

fn from_layout_point(p: gridview_layout::Point) -> Point {
    Point::new(p.x, p.y)
}

/// Runs the layout engine over the whole model. Every node that already has a position is
/// passed as fixed; gateways are the roots.
pub fn layout_model(model: &GraphModel, sizes: &NodeSizes, config: &LayoutConfig) -> LayoutResult {
    let nodes: Vec<LayoutNode> = model
        .nodes()
        .map(|n| {
            let size = sizes.for_kind(n.kind());
            let node = LayoutNode::new(n.id(), size.width, size.height);
            if n.kind() == EntityKind::Gateway {
                node.root()
            } else {
                node
            }
        })
        .collect();
    let edges: Vec<LayoutEdge> = model
        .edges()
        .iter()
        .map(|e| LayoutEdge::new(e.source.as_str(), e.target.as_str()))
        .collect();
    let fixed: BTreeMap<String, gridview_layout::Point> = model
        .nodes()
        .filter_map(|n| n.position.map(|p| (n.id().to_string(), to_layout_point(p))))
        .collect();
    gridview_layout::layout(&nodes, &edges, &fixed, config)
}

/// Gives every placeholder node a computed position. Returns how many were placed.
pub fn place_new_nodes(model: &mut GraphModel, sizes: &NodeSizes, config: &LayoutConfig) -> usize {
    if model.placeholders().next().is_none() {
        return 0;
    }
    let result = layout_model(model, sizes, config);
    let positions: BTreeMap<String, Point> = result
        .positions
        .into_iter()
        .map(|(id, p)| (id, from_layout_point(p)))
        .collect();
    let placed = model.apply_auto_positions(&positions);
    tracing::debug!(placed, "placed new nodes");
    placed
}
