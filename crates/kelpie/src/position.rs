//! Coordinate assignment.
//!
//! Nodes are placed rank by rank in a top-to-bottom frame: each rank row is
//! centered on the widest row, nodes keep their insertion order within a
//! rank, and `nodesep`/`ranksep` gaps separate them. The rank-direction
//! transform then maps the frame onto the requested orientation.

use crate::graph::Graph;
use crate::{EdgeLabel, LayoutConfig, NodeLabel, RankDir};

/// Positions every node center in the TB frame and returns the total extent
/// along the rank axis (needed by the BT/RL flips).
pub(crate) fn position(g: &mut Graph<NodeLabel, EdgeLabel>, cfg: &LayoutConfig) -> f64 {
    let max_rank = g
        .nodes()
        .filter_map(|(_, lbl)| lbl.rank)
        .max()
        .unwrap_or(0)
        .max(0) as usize;

    let mut rows: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    for (id, lbl) in g.nodes() {
        let r = lbl.rank.unwrap_or(0).max(0) as usize;
        rows[r].push(id.to_string());
    }

    let size_of = |g: &Graph<NodeLabel, EdgeLabel>, id: &str| -> (f64, f64) {
        g.node(id).map(|n| (n.width, n.height)).unwrap_or((0.0, 0.0))
    };

    let mut row_heights: Vec<f64> = Vec::with_capacity(rows.len());
    let mut row_widths: Vec<f64> = Vec::with_capacity(rows.len());
    for ids in &rows {
        let mut h: f64 = 0.0;
        let mut w: f64 = 0.0;
        for (i, id) in ids.iter().enumerate() {
            let (nw, nh) = size_of(g, id);
            h = h.max(nh);
            w += nw;
            if i + 1 < ids.len() {
                w += cfg.nodesep;
            }
        }
        row_heights.push(h);
        row_widths.push(w);
    }
    let max_row_width = row_widths.iter().copied().fold(0.0_f64, f64::max);

    let mut y_cursor: f64 = 0.0;
    for (row_ix, ids) in rows.iter().enumerate() {
        let row_h = row_heights[row_ix];
        let y = y_cursor + row_h / 2.0;

        let mut x_cursor = (max_row_width - row_widths[row_ix]) / 2.0;
        for id in ids {
            let (nw, _) = size_of(g, id);
            let x = x_cursor + nw / 2.0;
            if let Some(n) = g.node_mut(id) {
                n.x = Some(x);
                n.y = Some(y);
            }
            x_cursor += nw + cfg.nodesep;
        }

        y_cursor += row_h;
        if row_ix + 1 < rows.len() {
            y_cursor += cfg.ranksep;
        }
    }

    y_cursor
}

/// Maps the TB frame onto the requested rank direction.
pub(crate) fn apply_rankdir(
    g: &mut Graph<NodeLabel, EdgeLabel>,
    rankdir: RankDir,
    total_extent: f64,
) {
    match rankdir {
        RankDir::TB => {}
        RankDir::BT => {
            for id in g.node_ids() {
                if let Some(n) = g.node_mut(&id) {
                    if let Some(y) = n.y {
                        n.y = Some(total_extent - y);
                    }
                }
            }
        }
        RankDir::LR => {
            for id in g.node_ids() {
                if let Some(n) = g.node_mut(&id) {
                    let (Some(x), Some(y)) = (n.x, n.y) else {
                        continue;
                    };
                    n.x = Some(y);
                    n.y = Some(x);
                }
            }
        }
        RankDir::RL => {
            for id in g.node_ids() {
                if let Some(n) = g.node_mut(&id) {
                    let (Some(x), Some(y)) = (n.x, n.y) else {
                        continue;
                    };
                    n.x = Some(total_extent - y);
                    n.y = Some(x);
                }
            }
        }
    }
}

/// For LR/RL the rank axis is horizontal, so node extents swap before the
/// TB-frame pass and swap back afterwards.
pub(crate) fn swap_width_height(g: &mut Graph<NodeLabel, EdgeLabel>) {
    for id in g.node_ids() {
        if let Some(n) = g.node_mut(&id) {
            std::mem::swap(&mut n.width, &mut n.height);
        }
    }
}
