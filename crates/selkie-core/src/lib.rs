#![forbid(unsafe_code)]

//! Diagram text to semantic graph.
//!
//! Two dialects are supported, Mermaid-style flowcharts and C4-Context,
//! selected by a one-rule detector and parsed by two independent parsers
//! that share the output model. The model is pure identity and
//! relationship: geometry lives in the companion layout crate and only ever
//! refers back to the stable ids issued here.

mod c4;
pub mod detect;
mod error;
mod flowchart;
pub mod model;
mod text;
mod validate;

pub use detect::detect;
pub use error::{ParseError, Result};
pub use model::{
    BoundaryType, C4EdgeData, C4NodeData, C4Type, Dialect, Direction, Edge, EdgeId, EdgeKind,
    Graph, GraphMeta, Node, NodeId, NodeKind, Subgraph, SubgraphId,
};

/// Parses diagram text into a semantic graph.
///
/// The dialect is detected from the first non-blank token. Both parsers are
/// tolerant of noise lines; the finished graph is checked against the
/// structural invariants before being returned.
pub fn parse(source: &str) -> Result<Graph> {
    if source.trim().is_empty() {
        return Err(ParseError::new(0, "empty source"));
    }
    let graph = match detect(source) {
        Dialect::C4Context => c4::parse(source)?,
        Dialect::Flowchart => flowchart::parse(source)?,
    };
    validate::validate(&graph)?;
    Ok(graph)
}
