//! Coordinate assignment.
//!
//! Ranks become columns (or rows for `TB`/`BT`) sized by their widest member; nodes of one rank
//! are stacked along the cross axis and every stack is centered on the tallest one. Coordinates
//! are produced as node centers first and converted to top-left corners at the end.

use crate::graphlib::Graph;
use crate::{LayoutConfig, NodeLabel, Point, Rect};
use std::collections::BTreeMap;

/// Returns the top-left corner of every node in `layering`.
pub fn assign<E>(
    g: &Graph<NodeLabel, E>,
    layering: &[Vec<String>],
    config: &LayoutConfig,
) -> BTreeMap<String, Point> {
    let horizontal = config.rank_dir.is_horizontal();
    // (along the rank axis, across it)
    let extent = |id: &str| -> (f64, f64) {
        let n = g.node(id).cloned().unwrap_or_default();
        if horizontal {
            (n.width, n.height)
        } else {
            (n.height, n.width)
        }
    };

    let rank_depth: Vec<f64> = layering
        .iter()
        .map(|layer| layer.iter().map(|v| extent(v).0).fold(0.0, f64::max))
        .collect();
    let stack_len: Vec<f64> = layering
        .iter()
        .map(|layer| {
            let sum: f64 = layer.iter().map(|v| extent(v).1).sum();
            sum + config.node_sep * layer.len().saturating_sub(1) as f64
        })
        .collect();
    let max_stack = stack_len.iter().copied().fold(0.0, f64::max);

    let mut rank_start: Vec<f64> = Vec::with_capacity(layering.len());
    let mut cursor = 0.0;
    for depth in &rank_depth {
        rank_start.push(cursor);
        cursor += depth + config.rank_sep;
    }
    let total_depth = rank_start
        .last()
        .zip(rank_depth.last())
        .map_or(0.0, |(start, depth)| start + depth);

    let mut out: BTreeMap<String, Point> = BTreeMap::new();
    for (r, layer) in layering.iter().enumerate() {
        let mut along = rank_start[r] + rank_depth[r] / 2.0;
        if config.rank_dir.is_reversed() {
            along = total_depth - along;
        }

        let mut across = (max_stack - stack_len[r]) / 2.0;
        for v in layer {
            let (_, size) = extent(v);
            let center_across = across + size / 2.0;
            across += size + config.node_sep;

            let center = if horizontal {
                Point::new(along, center_across)
            } else {
                Point::new(center_across, along)
            };
            let n = g.node(v).cloned().unwrap_or_default();
            out.insert(
                v.clone(),
                Point::new(
                    config.margin_x + center.x - n.width / 2.0,
                    config.margin_y + center.y - n.height / 2.0,
                ),
            );
        }
    }
    out
}

/// Copies fixed positions verbatim and pushes free nodes off any box they would overlap.
///
/// Free nodes only move along the cross axis (down for `LR`/`RL`, right for `TB`/`BT`), so they
/// stay in their rank. Nodes are settled in layering order; a settled node becomes an obstacle
/// for the ones after it.
pub fn resolve_fixed<E>(
    g: &Graph<NodeLabel, E>,
    layering: &[Vec<String>],
    computed: &BTreeMap<String, Point>,
    fixed: &BTreeMap<String, Point>,
    config: &LayoutConfig,
) -> BTreeMap<String, Point> {
    let rect = |id: &str, p: Point| -> Rect {
        let n = g.node(id).cloned().unwrap_or_default();
        euclid::rect(p.x, p.y, n.width, n.height)
    };

    let mut out: BTreeMap<String, Point> = BTreeMap::new();
    let mut obstacles: Vec<Rect> = Vec::new();
    for v in g.nodes() {
        if let Some(&p) = fixed.get(v) {
            out.insert(v.to_string(), p);
            obstacles.push(rect(v, p));
        }
    }
    if obstacles.is_empty() {
        return computed.clone();
    }

    let horizontal = config.rank_dir.is_horizontal();
    // A negative gap would land a pushed node back on the box it was pushed off.
    let gap = config.node_sep.max(0.0);
    for v in layering.iter().flatten() {
        if out.contains_key(v) {
            continue;
        }
        let Some(&start) = computed.get(v) else {
            continue;
        };
        let mut placed = rect(v, start);
        // Each push moves strictly past one obstacle, so this ends after at most one pass per
        // obstacle.
        while let Some(hit) = obstacles.iter().find(|o| o.intersects(&placed)) {
            if horizontal {
                placed.origin.y = hit.max_y() + gap;
            } else {
                placed.origin.x = hit.max_x() + gap;
            }
        }
        out.insert(v.clone(), Point::new(placed.origin.x, placed.origin.y));
        obstacles.push(placed);
    }
    out
}
