//! Feedback edge detection.
//!
//! Topologies reported by a gateway are acyclic in practice, but the layout accepts arbitrary
//! edges. Edges that close a cycle are collected here and ignored by ranking and ordering so that
//! "longest path from a root" stays well defined.

use crate::graphlib::{EdgeKey, Graph};
use rustc_hash::FxHashSet as HashSet;
use std::collections::BTreeSet;

/// DFS-based feedback arc set.
///
/// Roots are explored first (in the given order), then every remaining node in insertion order,
/// so the chosen set only depends on input order.
pub fn feedback_edges<N, E>(g: &Graph<N, E>, roots: &[&str]) -> HashSet<EdgeKey> {
    fn dfs<'a, N, E>(
        g: &'a Graph<N, E>,
        v: &'a str,
        visited: &mut BTreeSet<&'a str>,
        stack: &mut BTreeSet<&'a str>,
        fas: &mut HashSet<EdgeKey>,
    ) {
        if !visited.insert(v) {
            return;
        }
        stack.insert(v);
        for e in g.out_edges(v) {
            if e.is_self_loop() {
                continue;
            }
            if stack.contains(e.w.as_str()) {
                fas.insert(e.clone());
            } else {
                dfs(g, e.w.as_str(), visited, stack, fas);
            }
        }
        stack.remove(v);
    }

    let mut fas: HashSet<EdgeKey> = HashSet::default();
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut stack: BTreeSet<&str> = BTreeSet::new();

    for &root in roots {
        if g.has_node(root) {
            dfs(g, root, &mut visited, &mut stack, &mut fas);
        }
    }
    for v in g.nodes() {
        dfs(g, v, &mut visited, &mut stack, &mut fas);
    }
    fas
}
