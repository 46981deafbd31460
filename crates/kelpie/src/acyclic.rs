//! Cycle breaking by reversing a DFS feedback arc set.
//!
//! Rankers require a DAG. Edges found pointing back into the active DFS
//! stack are reversed in place; when the opposite edge already exists the
//! weights merge instead. The caller only reads node coordinates, so the
//! reversal is not undone.

use crate::graph::{EdgeKey, Graph};
use crate::{EdgeLabel, NodeLabel};
use rustc_hash::FxHashSet;

pub(crate) fn run(g: &mut Graph<NodeLabel, EdgeLabel>) {
    for key in dfs_fas(g) {
        if key.v == key.w {
            let _ = g.remove_edge(&key.v, &key.w);
            continue;
        }
        let Some(label) = g.remove_edge(&key.v, &key.w) else {
            continue;
        };
        if g.has_edge(&key.w, &key.v) {
            if let Some(existing) = g.edge_mut(&key.w, &key.v) {
                existing.weight += label.weight;
                existing.minlen = existing.minlen.max(label.minlen);
            }
        } else {
            g.set_edge(key.w.clone(), key.v.clone(), label);
        }
    }
}

fn dfs_fas(g: &Graph<NodeLabel, EdgeLabel>) -> Vec<EdgeKey> {
    let mut fas: Vec<EdgeKey> = Vec::new();
    let mut visited: FxHashSet<String> = FxHashSet::default();
    let mut stack: FxHashSet<String> = FxHashSet::default();

    fn dfs(
        g: &Graph<NodeLabel, EdgeLabel>,
        v: &str,
        visited: &mut FxHashSet<String>,
        stack: &mut FxHashSet<String>,
        fas: &mut Vec<EdgeKey>,
    ) {
        if !visited.insert(v.to_string()) {
            return;
        }
        stack.insert(v.to_string());
        let mut outs: Vec<String> = Vec::new();
        g.for_each_out_edge(v, |w, _| outs.push(w.to_string()));
        for w in outs {
            if w == v {
                fas.push(EdgeKey {
                    v: v.to_string(),
                    w,
                });
                continue;
            }
            if stack.contains(&w) {
                fas.push(EdgeKey {
                    v: v.to_string(),
                    w,
                });
            } else {
                dfs(g, &w, visited, stack, fas);
            }
        }
        stack.remove(v);
    }

    for v in g.node_ids() {
        dfs(g, &v, &mut visited, &mut stack, &mut fas);
    }
    fas
}
