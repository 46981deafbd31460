//! Structural invariant checks run after every parse.
//!
//! The parsers are tolerant line by line, but the graph they hand back must
//! be internally consistent: edges resolve, parents exist, the container
//! hierarchy is a forest, and membership lists agree with `parent` fields.

use crate::error::{ParseError, Result};
use crate::model::Graph;
use rustc_hash::FxHashSet;

pub(crate) fn validate(graph: &Graph) -> Result<()> {
    // Edge endpoints resolve to a node or a subgraph.
    for edge in graph.edges.values() {
        for endpoint in [&edge.from, &edge.to] {
            if !graph.nodes.contains_key(endpoint) && !graph.subgraphs.contains_key(endpoint) {
                return Err(ParseError::new(
                    0,
                    format!("edge {} references unknown endpoint {endpoint:?}", edge.id),
                ));
            }
        }
    }

    // Parents reference existing subgraphs.
    for node in graph.nodes.values() {
        if let Some(parent) = &node.parent {
            if !graph.subgraphs.contains_key(parent) {
                return Err(ParseError::new(
                    0,
                    format!("node {:?} has unknown parent {parent:?}", node.id),
                ));
            }
        }
    }
    for subgraph in graph.subgraphs.values() {
        if let Some(parent) = &subgraph.parent {
            if !graph.subgraphs.contains_key(parent) {
                return Err(ParseError::new(
                    0,
                    format!("subgraph {:?} has unknown parent {parent:?}", subgraph.id),
                ));
            }
        }
    }

    // The parent relation over subgraphs is acyclic.
    for start in graph.subgraphs.keys() {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut cursor = start.as_str();
        loop {
            if !seen.insert(cursor) {
                return Err(ParseError::new(
                    0,
                    format!("subgraph parent cycle through {start:?}"),
                ));
            }
            match graph.subgraphs.get(cursor).and_then(|s| s.parent.as_deref()) {
                Some(next) => cursor = next,
                None => break,
            }
        }
    }

    // Membership lists agree with parent fields, and nothing is claimed by
    // two containers.
    let mut claimed: FxHashSet<&str> = FxHashSet::default();
    for subgraph in graph.subgraphs.values() {
        for child in &subgraph.children {
            let Some(node) = graph.nodes.get(child) else {
                return Err(ParseError::new(
                    0,
                    format!(
                        "subgraph {:?} lists unknown child {child:?}",
                        subgraph.id
                    ),
                ));
            };
            if node.parent.as_deref() != Some(subgraph.id.as_str()) {
                return Err(ParseError::new(
                    0,
                    format!(
                        "node {child:?} is listed in subgraph {:?} but its parent is {:?}",
                        subgraph.id, node.parent
                    ),
                ));
            }
            if !claimed.insert(child.as_str()) {
                return Err(ParseError::new(
                    0,
                    format!("node {child:?} is claimed by more than one subgraph"),
                ));
            }
        }
    }

    Ok(())
}
