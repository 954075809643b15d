#![forbid(unsafe_code)]

//! Graph container APIs used by `gridview-layout`.
//!
//! Nodes and edges are stored in insertion order and every query returns them in that order, so
//! algorithms built on top never depend on hash iteration order.

use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
}

impl EdgeKey {
    pub fn new(v: impl Into<String>, w: impl Into<String>) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.v == self.w
    }
}

#[derive(Debug, Clone)]
struct NodeEntry<N> {
    id: String,
    label: N,
    out_edges: Vec<usize>,
}

#[derive(Debug, Clone)]
struct EdgeEntry<E> {
    key: EdgeKey,
    label: E,
}

/// A simple directed graph (no multi-edges, no compound nodes).
#[derive(Debug, Clone)]
pub struct Graph<N, E> {
    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,
    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<EdgeKey, usize>,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Graph<N, E> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
        }
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts a node, or replaces the label of an existing one (keeping its position in the
    /// insertion order).
    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
            out_edges: Vec::new(),
        });
        self.node_index.insert(id, idx);
        self
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].label)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().map(|e| &e.key)
    }

    pub fn has_edge(&self, v: &str, w: &str) -> bool {
        self.edge_index.contains_key(&EdgeKey::new(v, w))
    }

    pub fn edge(&self, v: &str, w: &str) -> Option<&E> {
        self.edge_index
            .get(&EdgeKey::new(v, w))
            .map(|&idx| &self.edges[idx].label)
    }

    /// Adds the edge `v -> w`.
    ///
    /// Both endpoints must already exist; returns `false` (and leaves the graph untouched) when
    /// either is missing. Setting an existing edge replaces its label.
    pub fn set_edge(&mut self, v: &str, w: &str, label: E) -> bool {
        let Some(&vi) = self.node_index.get(v) else {
            return false;
        };
        if !self.node_index.contains_key(w) {
            return false;
        }
        let key = EdgeKey::new(v, w);
        if let Some(&idx) = self.edge_index.get(&key) {
            self.edges[idx].label = label;
            return true;
        }

        let idx = self.edges.len();
        self.edges.push(EdgeEntry {
            key: key.clone(),
            label,
        });
        self.edge_index.insert(key, idx);
        self.nodes[vi].out_edges.push(idx);
        true
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        let Some(&idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.nodes[idx]
            .out_edges
            .iter()
            .map(|&e| self.edges[e].key.w.as_str())
            .collect()
    }

    pub fn out_edges(&self, v: &str) -> Vec<&EdgeKey> {
        let Some(&idx) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.nodes[idx]
            .out_edges
            .iter()
            .map(|&e| &self.edges[e].key)
            .collect()
    }
}

pub mod alg {
    use super::Graph;
    use std::collections::{BTreeSet, VecDeque};

    /// Breadth-first discovery order starting from `roots`.
    ///
    /// Roots are visited in the given order, successors in edge insertion order. Nodes not
    /// reachable from any root are not part of the result.
    pub fn bfs_order<N, E>(g: &Graph<N, E>, roots: &[&str]) -> Vec<String> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut out: Vec<String> = Vec::new();
        let mut q: VecDeque<&str> = VecDeque::new();

        for &root in roots {
            if g.has_node(root) && seen.insert(root) {
                q.push_back(root);
            }
        }
        while let Some(v) = q.pop_front() {
            out.push(v.to_string());
            for w in g.successors(v) {
                if seen.insert(w) {
                    q.push_back(w);
                }
            }
        }
        out
    }
}
