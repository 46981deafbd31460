//! Rank assignment: longest-path with an optional tight-tree refinement.
//!
//! Both rankers assume an acyclic input; [`crate::acyclic`] runs first in the
//! layout pipeline. Missing labels and ranks degrade to `0` so arbitrary
//! caller graphs never panic.

use crate::graph::Graph;
use crate::{EdgeLabel, NodeLabel, Ranker};
use rustc_hash::{FxHashMap, FxHashSet};

pub(crate) fn rank(g: &mut Graph<NodeLabel, EdgeLabel>, ranker: Ranker) {
    match ranker {
        Ranker::LongestPath => longest_path(g),
        Ranker::TightTree => {
            longest_path(g);
            tight_tree(g);
        }
    }
    normalize(g);
}

/// Assigns each node the smallest rank compatible with its outgoing edges.
/// Sinks land on rank 0; sources end up negative until [`normalize`] shifts
/// the minimum back to 0.
fn longest_path(g: &mut Graph<NodeLabel, EdgeLabel>) {
    fn dfs(g: &Graph<NodeLabel, EdgeLabel>, v: &str, visited: &mut FxHashMap<String, i32>) -> i32 {
        if let Some(&rank) = visited.get(v) {
            return rank;
        }
        // Pre-mark so an unexpected residual cycle terminates instead of
        // recursing forever.
        visited.insert(v.to_string(), 0);

        let mut outs: Vec<(String, i32)> = Vec::new();
        g.for_each_out_edge(v, |w, lbl| outs.push((w.to_string(), lbl.minlen.max(1) as i32)));

        let mut rank: Option<i32> = None;
        for (w, minlen) in outs {
            let candidate = dfs(g, &w, visited) - minlen;
            rank = Some(match rank {
                Some(current) => current.min(candidate),
                None => candidate,
            });
        }

        let rank = rank.unwrap_or(0);
        visited.insert(v.to_string(), rank);
        rank
    }

    let mut visited: FxHashMap<String, i32> = FxHashMap::default();
    for v in g.sources() {
        dfs(g, &v, &mut visited);
    }
    // Sweep stragglers (defensive; a DAG has every node under some source).
    for v in g.node_ids() {
        dfs(g, &v, &mut visited);
    }

    for (v, rank) in visited {
        if let Some(lbl) = g.node_mut(&v) {
            lbl.rank = Some(rank);
        }
    }
}

fn node_rank(g: &Graph<NodeLabel, EdgeLabel>, v: &str) -> i32 {
    g.node(v).and_then(|n| n.rank).unwrap_or(0)
}

pub(crate) fn slack(g: &Graph<NodeLabel, EdgeLabel>, v: &str, w: &str) -> i32 {
    let minlen = g.edge(v, w).map(|lbl| lbl.minlen.max(1) as i32).unwrap_or(1);
    node_rank(g, w) - node_rank(g, v) - minlen
}

/// Pulls ranks together until every node hangs off a tight spanning forest.
///
/// This grows a set of tree nodes connected by zero-slack edges; while some
/// node remains outside, the minimum-slack edge crossing the cut determines
/// how far the whole tree shifts to make that edge tight. Disconnected
/// components each seed a fresh tree root.
fn tight_tree(g: &mut Graph<NodeLabel, EdgeLabel>) {
    let ids = g.node_ids();
    if ids.is_empty() {
        return;
    }

    let mut in_tree: FxHashSet<String> = FxHashSet::default();
    in_tree.insert(ids[0].clone());

    loop {
        grow_tight_tree(g, &mut in_tree);
        if in_tree.len() >= ids.len() {
            break;
        }

        match find_min_slack_edge(g, &in_tree) {
            Some((slack, tail_in_tree)) => {
                let delta = if tail_in_tree { slack } else { -slack };
                for v in &in_tree {
                    if let Some(lbl) = g.node_mut(v) {
                        let rank = lbl.rank.unwrap_or(0);
                        lbl.rank = Some(rank + delta);
                    }
                }
            }
            None => {
                // No edge crosses the cut: start a new component root.
                let Some(next) = ids.iter().find(|v| !in_tree.contains(*v)) else {
                    break;
                };
                in_tree.insert(next.clone());
            }
        }
    }
}

fn grow_tight_tree(g: &Graph<NodeLabel, EdgeLabel>, in_tree: &mut FxHashSet<String>) {
    let mut stack: Vec<String> = in_tree.iter().cloned().collect();
    stack.sort(); // the seed set is tiny; sorting keeps traversal deterministic
    while let Some(v) = stack.pop() {
        let mut adjacent: Vec<String> = Vec::new();
        g.for_each_out_edge(&v, |w, _| adjacent.push(w.to_string()));
        g.for_each_in_edge(&v, |u, _| adjacent.push(u.to_string()));

        for w in adjacent {
            if in_tree.contains(&w) {
                continue;
            }
            let tight = if g.has_edge(&v, &w) {
                slack(g, &v, &w) == 0
            } else {
                slack(g, &w, &v) == 0
            };
            if tight {
                in_tree.insert(w.clone());
                stack.push(w);
            }
        }
    }
}

/// Minimum-slack edge with exactly one endpoint in the tree. Returns the
/// slack and whether the tail is the in-tree endpoint.
fn find_min_slack_edge(
    g: &Graph<NodeLabel, EdgeLabel>,
    in_tree: &FxHashSet<String>,
) -> Option<(i32, bool)> {
    let mut best: Option<(i32, bool)> = None;
    for (v, w, _) in g.edges() {
        let in_v = in_tree.contains(v);
        let in_w = in_tree.contains(w);
        if in_v == in_w {
            continue;
        }
        let slack = slack(g, v, w);
        match best {
            Some((best_slack, _)) if slack >= best_slack => {}
            _ => best = Some((slack, in_v)),
        }
    }
    best
}

fn normalize(g: &mut Graph<NodeLabel, EdgeLabel>) {
    let min = g
        .nodes()
        .filter_map(|(_, lbl)| lbl.rank)
        .min()
        .unwrap_or(0);
    if min == 0 {
        return;
    }
    for v in g.node_ids() {
        if let Some(lbl) = g.node_mut(&v) {
            lbl.rank = Some(lbl.rank.unwrap_or(0) - min);
        }
    }
}
