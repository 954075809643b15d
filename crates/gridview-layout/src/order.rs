//! Node ordering / crossing minimization.
//!
//! Layers start in breadth-first discovery order from the roots. Alternating down and up sweeps
//! then move every node to the median position of its neighbours in the adjacent rank, keeping
//! whichever layering has the fewest crossings. The overflow rank is never reordered.

use crate::graphlib::{EdgeKey, Graph, alg};
use crate::rank::Ranking;
use crate::NodeLabel;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// Sweeps without improvement before giving up early.
const MAX_STALE_SWEEPS: usize = 4;

pub fn order<E>(
    g: &Graph<NodeLabel, E>,
    ranking: &Ranking,
    feedback: &HashSet<EdgeKey>,
    max_iterations: usize,
) -> Vec<Vec<String>> {
    let mut layering = init_order(g, ranking);
    let Some(max_rank) = ranking.max_reachable_rank() else {
        return layering;
    };
    let swept = max_rank + 1;

    let forward = |e: &EdgeKey| -> bool {
        !e.is_self_loop()
            && !feedback.contains(e)
            && match (ranking.rank(&e.v), ranking.rank(&e.w)) {
                (Some(rv), Some(rw)) => rw == rv + 1 && rw <= max_rank,
                _ => false,
            }
    };
    let adjacent: Vec<EdgeKey> = g.edges().filter(|e| forward(*e)).cloned().collect();

    let mut best = layering.clone();
    let mut best_cc = cross_count(&adjacent, &layering[..swept]);
    let mut stale = 0usize;

    for i in 0..max_iterations {
        if best_cc == 0 {
            break;
        }
        if i % 2 == 0 {
            for r in 1..swept {
                let (fixed, free) = layering.split_at_mut(r);
                sort_by_median(&mut free[0], &fixed[r - 1], &adjacent, Side::Predecessors);
            }
        } else {
            for r in (0..max_rank).rev() {
                let (free, fixed) = layering.split_at_mut(r + 1);
                sort_by_median(&mut free[r], &fixed[0], &adjacent, Side::Successors);
            }
        }

        let cc = cross_count(&adjacent, &layering[..swept]);
        if cc < best_cc {
            best = layering.clone();
            best_cc = cc;
            stale = 0;
        } else {
            stale += 1;
            if stale >= MAX_STALE_SWEEPS {
                break;
            }
        }
    }

    tracing::debug!(crossings = best_cc, "layered ordering settled");
    best
}

/// Initial layering: BFS discovery order from the roots, overflow rank sorted by id.
pub fn init_order<E>(g: &Graph<NodeLabel, E>, ranking: &Ranking) -> Vec<Vec<String>> {
    let layer_count = ranking.by_node.values().max().map_or(0, |m| m + 1);
    let mut layering: Vec<Vec<String>> = vec![Vec::new(); layer_count];

    let roots: Vec<&str> = g
        .nodes()
        .filter(|id| g.node(id).is_some_and(|n| n.root))
        .collect();
    for v in alg::bfs_order(g, &roots) {
        if ranking.overflow.binary_search(&v).is_ok() {
            continue;
        }
        if let Some(r) = ranking.rank(&v) {
            layering[r].push(v);
        }
    }
    if let Some(r) = ranking.overflow_rank {
        layering[r].extend(ranking.overflow.iter().cloned());
    }
    layering
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Predecessors,
    Successors,
}

fn sort_by_median(
    layer: &mut Vec<String>,
    neighbor_layer: &[String],
    edges: &[EdgeKey],
    side: Side,
) {
    let neighbor_pos: HashMap<&str, usize> = neighbor_layer
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();

    let medians: Vec<Option<f64>> = layer
        .iter()
        .map(|v| {
            let mut positions: Vec<usize> = edges
                .iter()
                .filter_map(|e| {
                    let (own, other) = match side {
                        Side::Predecessors => (&e.w, &e.v),
                        Side::Successors => (&e.v, &e.w),
                    };
                    if own != v {
                        return None;
                    }
                    neighbor_pos.get(other.as_str()).copied()
                })
                .collect();
            positions.sort_unstable();
            median_value(&positions)
        })
        .collect();

    // Nodes without neighbours keep their slot; the rest are placed by (median, previous index).
    let mut movable: Vec<(f64, usize)> = medians
        .iter()
        .enumerate()
        .filter_map(|(i, m)| m.map(|m| (m, i)))
        .collect();
    movable.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut next = movable.into_iter();
    let mut out: Vec<String> = Vec::with_capacity(layer.len());
    for (i, m) in medians.iter().enumerate() {
        if m.is_none() {
            out.push(layer[i].clone());
        } else if let Some((_, src)) = next.next() {
            out.push(layer[src].clone());
        }
    }
    *layer = out;
}

/// Median of sorted neighbour positions, weighted toward the denser side for even counts > 2.
pub fn median_value(positions: &[usize]) -> Option<f64> {
    let n = positions.len();
    if n == 0 {
        return None;
    }
    let m = n / 2;
    if n % 2 == 1 {
        return Some(positions[m] as f64);
    }
    let lo = positions[m - 1] as f64;
    let hi = positions[m] as f64;
    if n == 2 {
        return Some((lo + hi) / 2.0);
    }
    let left = lo - positions[0] as f64;
    let right = positions[n - 1] as f64 - hi;
    if left + right == 0.0 {
        return Some((lo + hi) / 2.0);
    }
    Some((lo * right + hi * left) / (left + right))
}

/// Total number of edge crossings between consecutive layers.
pub fn cross_count(edges: &[EdgeKey], layering: &[Vec<String>]) -> usize {
    let mut cc = 0usize;
    for i in 1..layering.len() {
        cc += two_layer_cross_count(edges, &layering[i - 1], &layering[i]);
    }
    cc
}

fn two_layer_cross_count(edges: &[EdgeKey], north: &[String], south: &[String]) -> usize {
    if south.is_empty() || north.is_empty() {
        return 0;
    }

    let south_pos: HashMap<&str, usize> = south
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();

    let mut south_entries: Vec<usize> = Vec::new();
    for v in north {
        let mut entries: Vec<usize> = edges
            .iter()
            .filter(|e| &e.v == v)
            .filter_map(|e| south_pos.get(e.w.as_str()).copied())
            .collect();
        entries.sort_unstable();
        south_entries.extend(entries);
    }

    // Accumulator tree (Barth et al.): each insertion counts the already-inserted entries that lie
    // to its right.
    let mut first_index: usize = 1;
    while first_index < south.len() {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree: Vec<usize> = vec![0; tree_size];

    let mut cc = 0usize;
    for pos in south_entries {
        let mut index = pos + first_index;
        tree[index] += 1;
        let mut weight_sum = 0usize;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += 1;
        }
        cc += weight_sum;
    }
    cc
}
