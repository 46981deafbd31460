#![forbid(unsafe_code)]

//! Deterministic layered graph layout.
//!
//! Given a directed graph whose nodes carry sizes, `layout` assigns each
//! node a center coordinate obeying the configured rank direction. The
//! pipeline is the classic layered scheme: break cycles, assign ranks
//! (tight-tree by default), place rank rows, then transform into the
//! requested orientation.
//!
//! Determinism is a contract, not an accident: node and edge iteration
//! follow insertion order everywhere, so identical input graphs produce
//! identical coordinates.

mod acyclic;
mod graph;
mod position;
mod rank;

pub use graph::{EdgeKey, Graph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankDir {
    #[default]
    TB,
    BT,
    LR,
    RL,
}

impl RankDir {
    /// True when ranks advance along the vertical axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, RankDir::TB | RankDir::BT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ranker {
    LongestPath,
    #[default]
    TightTree,
}

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub rankdir: RankDir,
    /// Gap between adjacent nodes within a rank.
    pub nodesep: f64,
    /// Gap between adjacent ranks.
    pub ranksep: f64,
    pub ranker: Ranker,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rankdir: RankDir::TB,
            nodesep: 50.0,
            ranksep: 50.0,
            ranker: Ranker::TightTree,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeLabel {
    pub width: f64,
    pub height: f64,
    /// Center coordinates, filled in by [`layout`].
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rank: Option<i32>,
}

impl NodeLabel {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct EdgeLabel {
    /// Minimum rank distance between the endpoints.
    pub minlen: usize,
    /// Aggregated multiplicity; cycle breaking merges opposite edges.
    pub weight: f64,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            minlen: 1,
            weight: 1.0,
        }
    }
}

/// Runs the layered pipeline, writing center coordinates into every node
/// label. Cycle-breaking may reverse or merge edges in place; callers build
/// a fresh graph per call and read back only node positions.
pub fn layout(g: &mut Graph<NodeLabel, EdgeLabel>, cfg: &LayoutConfig) {
    if g.node_count() == 0 {
        return;
    }

    let horizontal = !cfg.rankdir.is_vertical();
    if horizontal {
        position::swap_width_height(g);
    }

    acyclic::run(g);
    rank::rank(g, cfg.ranker);
    let total_extent = position::position(g, cfg);
    position::apply_rankdir(g, cfg.rankdir, total_extent);

    if horizontal {
        position::swap_width_height(g);
    }
}
