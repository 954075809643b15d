//! Layout input/output types and geometry primitives.
//!
//! These are `Clone`-friendly plain data so tests can build inputs inline and compare outputs
//! with `assert_eq!`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LayoutInputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDir {
    /// Rank 0 on the left, increasing to the right.
    #[default]
    LR,
    RL,
    TB,
    BT,
}

impl RankDir {
    pub fn is_horizontal(self) -> bool {
        matches!(self, RankDir::LR | RankDir::RL)
    }

    pub fn is_reversed(self) -> bool {
        matches!(self, RankDir::RL | RankDir::BT)
    }
}

/// Spacing and iteration knobs for [`crate::layout`].
///
/// All distances are in the same unit as node sizes (CSS pixels in the web viewer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub rank_dir: RankDir,
    /// Gap between neighbouring nodes within one rank.
    pub node_sep: f64,
    /// Gap between the widest node of one rank and the next rank.
    pub rank_sep: f64,
    pub margin_x: f64,
    pub margin_y: f64,
    /// Upper bound on median sweeps during crossing minimization.
    pub max_order_iterations: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rank_dir: RankDir::LR,
            node_sep: 60.0,
            rank_sep: 150.0,
            margin_x: 40.0,
            margin_y: 40.0,
            max_order_iterations: 24,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub width: f64,
    pub height: f64,
    /// Roots occupy rank 0; every other rank is measured from them.
    pub root: bool,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            root: false,
        }
    }

    pub fn root(mut self) -> Self {
        self.root = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEdge {
    pub v: String,
    pub w: String,
}

impl LayoutEdge {
    pub fn new(v: impl Into<String>, w: impl Into<String>) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutResult {
    /// Top-left corner of every input node.
    pub positions: BTreeMap<String, Point>,
    pub ranks: BTreeMap<String, usize>,
    /// Rank holding nodes unreachable from every root, if there are any.
    pub overflow_rank: Option<usize>,
    pub dropped_edges: Vec<LayoutInputError>,
}

/// Axis-aligned node box used for collision checks.
pub(crate) type Rect = euclid::default::Rect<f64>;
