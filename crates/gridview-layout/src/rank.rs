//! Rank (tier) assignment.
//!
//! A node's rank is the length of the longest directed path from any root reaching it. Roots
//! therefore sit at rank 0 unless another root points at them. Nodes without a path from a root
//! are collected into one overflow rank to the right of everything else.

use crate::graphlib::{EdgeKey, Graph};
use crate::NodeLabel;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    pub by_node: BTreeMap<String, usize>,
    /// Nodes unreachable from all roots, sorted by id.
    pub overflow: Vec<String>,
    pub overflow_rank: Option<usize>,
}

impl Ranking {
    pub fn rank(&self, id: &str) -> Option<usize> {
        self.by_node.get(id).copied()
    }

    /// Highest rank holding a reachable node.
    pub fn max_reachable_rank(&self) -> Option<usize> {
        self.by_node
            .iter()
            .filter(|(id, _)| self.overflow.binary_search(*id).is_err())
            .map(|(_, &r)| r)
            .max()
    }
}

pub fn longest_path<E>(g: &Graph<NodeLabel, E>, feedback: &HashSet<EdgeKey>) -> Ranking {
    let roots: Vec<&str> = g
        .nodes()
        .filter(|id| g.node(id).is_some_and(|n| n.root))
        .collect();

    // Reachability along forward (non-feedback) edges.
    let mut reachable: HashSet<&str> = HashSet::default();
    let mut q: VecDeque<&str> = VecDeque::new();
    for &r in &roots {
        if reachable.insert(r) {
            q.push_back(r);
        }
    }
    while let Some(v) = q.pop_front() {
        for e in g.out_edges(v) {
            if e.is_self_loop() || feedback.contains(e) {
                continue;
            }
            if reachable.insert(e.w.as_str()) {
                q.push_back(e.w.as_str());
            }
        }
    }

    // Kahn over the reachable DAG, relaxing ranks upward.
    let mut indegree: HashMap<&str, usize> = HashMap::default();
    for e in g.edges() {
        if e.is_self_loop() || feedback.contains(e) {
            continue;
        }
        if reachable.contains(e.v.as_str()) {
            *indegree.entry(e.w.as_str()).or_insert(0) += 1;
        }
    }

    let mut rank: HashMap<&str, usize> = HashMap::default();
    let mut queue: VecDeque<&str> = g
        .nodes()
        .filter(|id| reachable.contains(id) && indegree.get(id).copied().unwrap_or(0) == 0)
        .collect();
    for &v in &queue {
        rank.insert(v, 0);
    }

    while let Some(v) = queue.pop_front() {
        let r = rank.get(v).copied().unwrap_or(0);
        for e in g.out_edges(v) {
            if e.is_self_loop() || feedback.contains(e) {
                continue;
            }
            let w = e.w.as_str();
            let entry = rank.entry(w).or_insert(0);
            if r + 1 > *entry {
                *entry = r + 1;
            }
            if let Some(d) = indegree.get_mut(w) {
                *d = d.saturating_sub(1);
                if *d == 0 {
                    queue.push_back(w);
                }
            }
        }
    }

    let mut by_node: BTreeMap<String, usize> = rank
        .iter()
        .map(|(&id, &r)| (id.to_string(), r))
        .collect();

    let mut overflow: Vec<String> = g
        .nodes()
        .filter(|id| !reachable.contains(id))
        .map(str::to_string)
        .collect();
    overflow.sort();
    overflow.dedup();

    let overflow_rank = if overflow.is_empty() {
        None
    } else {
        Some(by_node.values().max().map_or(0, |m| m + 1))
    };
    if let Some(r) = overflow_rank {
        for id in &overflow {
            by_node.insert(id.clone(), r);
        }
    }

    Ranking {
        by_node,
        overflow,
        overflow_rank,
    }
}
